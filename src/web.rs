//! Browser bindings: `web-sys` behind the [`Page`] and [`Scheduler`] traits.
//!
//! Listener and observer closures are leaked with `forget`; they live as long
//! as the page does.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{self, Reflect};
use web_sys::{
    AddEventListenerOptions, Document, Element, EventTarget, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, MouseEvent,
    ScrollToOptions, Window,
};

use crate::analytics::{AnalyticsSink, LogSink, TrackedEvent};
use crate::app::App;
use crate::config::{Config, CONFIG_ELEMENT_ID};
use crate::env::Env;
use crate::error::{FxError, Result};
use crate::page::{
    DomEvent, EventKind, IntersectionCallback, IntersectionEntry, IntersectionOptions, Listener,
    NodeId, ObserverId, Page, Rect, ScrollBehavior, Target, Viewport,
};
use crate::scheduler::{Scheduler, Task};

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

type NodeTable = Rc<RefCell<Vec<Element>>>;

fn intern(nodes: &NodeTable, element: Element) -> NodeId {
    let mut nodes = nodes.borrow_mut();
    if let Some(i) = nodes.iter().position(|known| known.is_same_node(Some(&*element))) {
        return NodeId(i);
    }
    nodes.push(element);
    NodeId(nodes.len() - 1)
}

pub struct BrowserPage {
    window: Window,
    document: Document,
    nodes: NodeTable,
    observers: RefCell<Vec<IntersectionObserver>>,
    body: NodeId,
    head: NodeId,
}

impl BrowserPage {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| FxError::Js("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| FxError::Js("no document".to_string()))?;
        let body: Element = document
            .body()
            .ok_or_else(|| FxError::MissingElement("body".to_string()))?
            .into();
        let head: Element = document
            .head()
            .ok_or_else(|| FxError::MissingElement("head".to_string()))?
            .into();

        let nodes: NodeTable = Rc::new(RefCell::new(Vec::new()));
        let body = intern(&nodes, body);
        let head = intern(&nodes, head);
        Ok(Self {
            window,
            document,
            nodes,
            observers: RefCell::new(Vec::new()),
            body,
            head,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn el(&self, node: NodeId) -> Element {
        self.nodes.borrow()[node.0].clone()
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.el(node).dyn_into::<HtmlElement>().ok()
    }

    fn event_target(&self, target: Target) -> EventTarget {
        match target {
            Target::Window => self.window.clone().into(),
            Target::Document => self.document.clone().into(),
            Target::Node(node) => self.el(node).into(),
        }
    }

    fn attach(&self, target: Target, kind: EventKind, once: bool, mut listener: Listener) {
        let nodes = self.nodes.clone();
        let callback = Closure::wrap(Box::new(move |event: web_sys::Event| {
            // Only clicks need their target; interning every mousemove target would grow the table.
            let target = if kind == EventKind::Click {
                event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .map(|el| intern(&nodes, el))
            } else {
                None
            };
            let (x, y) = event
                .dyn_ref::<MouseEvent>()
                .map(|m| (f64::from(m.client_x()), f64::from(m.client_y())))
                .unwrap_or_default();

            let dom_event = DomEvent::pointer(target, x, y);
            listener(&dom_event);
            if dom_event.default_prevented() {
                event.prevent_default();
            }
            if dom_event.propagation_stopped() {
                event.stop_propagation();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        let event_target = self.event_target(target);
        let result = if once {
            let options = AddEventListenerOptions::new();
            options.set_once(true);
            event_target.add_event_listener_with_callback_and_add_event_listener_options(
                kind.as_str(),
                callback.as_ref().unchecked_ref(),
                &options,
            )
        } else {
            event_target.add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref())
        };
        if let Err(err) = result {
            warn!("could not listen for {}: {:?}", kind.as_str(), err);
        }
        callback.forget();
    }
}

impl Page for BrowserPage {
    fn query(&self, selector: &str) -> Option<NodeId> {
        match self.document.query_selector(selector) {
            Ok(found) => found.map(|el| intern(&self.nodes, el)),
            Err(err) => {
                warn!("bad selector {selector}: {:?}", err);
                None
            }
        }
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                warn!("bad selector {selector}: {:?}", err);
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|el| intern(&self.nodes, el))
            .collect()
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        match self.el(root).query_selector(selector) {
            Ok(found) => found.map(|el| intern(&self.nodes, el)),
            Err(err) => {
                warn!("bad selector {selector}: {:?}", err);
                None
            }
        }
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        match self.el(node).closest(selector) {
            Ok(found) => found.map(|el| intern(&self.nodes, el)),
            Err(err) => {
                warn!("bad selector {selector}: {:?}", err);
                None
            }
        }
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let inner = self.el(node);
        self.el(ancestor).contains(Some(&*inner))
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn head(&self) -> NodeId {
        self.head
    }

    fn create_element(&self, tag: &str) -> Result<NodeId> {
        let element = self
            .document
            .create_element(tag)
            .map_err(|err| FxError::Js(format!("createElement({tag}): {err:?}")))?;
        Ok(intern(&self.nodes, element))
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        if let Err(err) = self.el(parent).append_child(&self.el(child)) {
            warn!("appendChild failed: {:?}", err);
        }
    }

    fn remove(&self, node: NodeId) {
        self.el(node).remove();
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.el(node).is_connected()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.el(node).get_attribute(name)
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Err(err) = self.el(node).set_attribute(name, value) {
            warn!("setAttribute({name}) failed: {:?}", err);
        }
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Err(err) = self.el(node).remove_attribute(name) {
            warn!("removeAttribute({name}) failed: {:?}", err);
        }
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Err(err) = self.el(node).class_list().add_1(class) {
            warn!("classList.add({class}) failed: {:?}", err);
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Err(err) = self.el(node).class_list().remove_1(class) {
            warn!("classList.remove({class}) failed: {:?}", err);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.el(node).class_list().contains(class)
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        let value = self.html(node)?.style().get_property_value(property).ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        let Some(html) = self.html(node) else {
            return;
        };
        let style = html.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
        if let Err(err) = result {
            warn!("style {property} failed: {:?}", err);
        }
    }

    fn set_inner_html(&self, node: NodeId, html: &str) {
        self.el(node).set_inner_html(html);
    }

    fn text(&self, node: NodeId) -> String {
        self.el(node).text_content().unwrap_or_default()
    }

    fn set_text(&self, node: NodeId, text: &str) {
        self.el(node).set_text_content(Some(text));
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        let rect = self.el(node).get_bounding_client_rect();
        Rect::new(rect.top(), rect.left(), rect.width(), rect.height())
    }

    fn viewport(&self) -> Viewport {
        let root = self.document.document_element();
        let width = self
            .window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .or_else(|| root.as_ref().map(|r| f64::from(r.client_width())))
            .unwrap_or(0.0);
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .or_else(|| root.as_ref().map(|r| f64::from(r.client_height())))
            .unwrap_or(0.0);
        Viewport { width, height }
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn supports_intersection(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
    }

    fn supports_touch(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("ontouchstart")).unwrap_or(false)
    }

    fn listen(&self, target: Target, kind: EventKind, listener: Listener) {
        self.attach(target, kind, false, listener);
    }

    fn listen_once(&self, target: Target, kind: EventKind, listener: Listener) {
        self.attach(target, kind, true, listener);
    }

    fn observe_intersection(
        &self,
        targets: &[NodeId],
        options: IntersectionOptions,
        mut callback: IntersectionCallback,
    ) -> Option<ObserverId> {
        if !self.supports_intersection() {
            return None;
        }

        let id = ObserverId(self.observers.borrow().len());
        let nodes = self.nodes.clone();
        let closure = Closure::wrap(Box::new(move |entries: js_sys::Array, _observer: JsValue| {
            let entries: Vec<IntersectionEntry> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| IntersectionEntry {
                    target: intern(&nodes, entry.target()),
                    is_intersecting: entry.is_intersecting(),
                })
                .collect();
            callback(id, &entries);
        }) as Box<dyn FnMut(js_sys::Array, JsValue)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        let observer = match IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init) {
            Ok(observer) => observer,
            Err(err) => {
                warn!("IntersectionObserver unavailable: {:?}", err);
                return None;
            }
        };
        closure.forget();

        for &target in targets {
            observer.observe(&self.el(target));
        }
        self.observers.borrow_mut().push(observer);
        Some(id)
    }

    fn unobserve(&self, observer: ObserverId, node: NodeId) {
        if let Some(observer) = self.observers.borrow().get(observer.0) {
            observer.unobserve(&self.el(node));
        }
    }
}

pub struct BrowserScheduler {
    window: Window,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for BrowserScheduler {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn set_timeout(&self, delay_ms: u32, task: Task) {
        Timeout::new(delay_ms, move || task()).forget();
    }

    fn request_frame(&self, task: Task) {
        let callback = Closure::once_into_js(move || task());
        if let Err(err) = self.window.request_animation_frame(callback.unchecked_ref()) {
            warn!("requestAnimationFrame failed: {:?}", err);
        }
    }
}

/// Prints tracked events to the browser console as objects, falling back
/// to a JSON log line.
pub struct ConsoleSink;

impl AnalyticsSink for ConsoleSink {
    fn record(&self, event: &TrackedEvent) {
        match serde_wasm_bindgen::to_value(event) {
            Ok(value) => gloo_console::log!("Event tracked:", value),
            Err(err) => {
                warn!("could not convert {:?}: {}", event, err);
                LogSink.record(event);
            }
        }
    }
}

fn load_config(page: &BrowserPage) -> Config {
    let Some(node) = page.query(&format!("#{CONFIG_ELEMENT_ID}")) else {
        return Config::default();
    };
    match Config::from_json(&page.text(node)) {
        Ok(config) => {
            info!("Loaded config overrides from #{CONFIG_ELEMENT_ID}");
            config
        }
        Err(err) => {
            warn!("{err}, using defaults");
            Config::default()
        }
    }
}

fn mount() -> Result<()> {
    let page = Rc::new(BrowserPage::new()?);
    let scheduler = Rc::new(BrowserScheduler::new(page.window().clone()));
    let config = load_config(&page);
    let env = Env::new(page, scheduler, Rc::new(ConsoleSink), config);

    let app = App::mount(&env);
    APP.with(|slot| *slot.borrow_mut() = Some(app));
    Ok(())
}

/// Mounts the app now, or on `DOMContentLoaded` while the document is still loading.
pub fn start() -> Result<()> {
    let window = web_sys::window().ok_or_else(|| FxError::Js("no window".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| FxError::Js("no document".to_string()))?;

    if document.ready_state() != "loading" {
        return mount();
    }

    let callback = Closure::once_into_js(|| {
        if let Err(err) = mount() {
            warn!("landing page enhancements disabled: {err}");
        }
    });
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    document
        .add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            callback.unchecked_ref(),
            &options,
        )
        .map_err(|err| FxError::Js(format!("{err:?}")))
}

/// Stops the animation loops of the mounted app, if any. Exported to the
/// page as `landingFxShutdown` for use before navigating away.
#[wasm_bindgen(js_name = landingFxShutdown)]
pub fn shutdown() {
    APP.with(|slot| {
        if let Some(app) = slot.borrow().as_ref() {
            app.shutdown();
        }
    });
}
