//! In-memory [`Page`] for running controllers without a browser.
//!
//! Nodes live in an arena and are never freed. Layout is whatever the test
//! says it is: bounding rects, scroll offset and viewport are plain setters.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use log::warn;

use super::selector::{Matchable, SelectorList};
use super::{
    DomEvent, EventKind, IntersectionCallback, IntersectionEntry, IntersectionOptions, Listener,
    NodeId, ObserverId, Page, Rect, ScrollBehavior, Target, Viewport,
};
use crate::analytics::RecordingSink;
use crate::config::Config;
use crate::env::Env;
use crate::error::Result;
use crate::scheduler::ManualScheduler;

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    inner_html: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Rect,
}

impl Matchable for NodeData {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

struct ListenerEntry {
    id: usize,
    target: Target,
    kind: EventKind,
    once: bool,
    listener: Rc<RefCell<Listener>>,
}

struct Observer {
    options: IntersectionOptions,
    targets: Vec<NodeId>,
    callback: Rc<RefCell<IntersectionCallback>>,
}

pub struct MemoryPage {
    nodes: RefCell<Vec<NodeData>>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    listeners: RefCell<Vec<ListenerEntry>>,
    next_listener: Cell<usize>,
    observers: RefCell<Vec<Observer>>,
    scroll_y: Cell<f64>,
    viewport: Cell<Viewport>,
    intersection: Cell<bool>,
    touch: Cell<bool>,
    scroll_requests: RefCell<Vec<(f64, ScrollBehavior)>>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// An empty `html > head + body` document on a 1440x900 desktop viewport
    /// with intersection detection and no touch.
    pub fn new() -> Self {
        let page = Self {
            nodes: RefCell::new(Vec::new()),
            root: NodeId(0),
            head: NodeId(1),
            body: NodeId(2),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            observers: RefCell::new(Vec::new()),
            scroll_y: Cell::new(0.0),
            viewport: Cell::new(Viewport {
                width: 1440.0,
                height: 900.0,
            }),
            intersection: Cell::new(true),
            touch: Cell::new(false),
            scroll_requests: RefCell::new(Vec::new()),
        };
        let root = page.alloc("html");
        let head = page.alloc("head");
        let body = page.alloc("body");
        page.append_child(root, head);
        page.append_child(root, body);
        page
    }

    /// Starts building a detached element.
    pub fn element(&self, tag: &str) -> ElementBuilder<'_> {
        ElementBuilder {
            page: self,
            node: self.alloc(tag),
        }
    }

    pub fn set_viewport(&self, width: f64, height: f64) {
        self.viewport.set(Viewport { width, height });
    }

    pub fn set_scroll_y(&self, y: f64) {
        self.scroll_y.set(y);
    }

    pub fn set_intersection_supported(&self, supported: bool) {
        self.intersection.set(supported);
    }

    pub fn set_touch(&self, touch: bool) {
        self.touch.set(touch);
    }

    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        self.with_node_mut(node, |n| n.rect = rect);
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].tag.clone()
    }

    pub fn inner_html(&self, node: NodeId) -> Option<String> {
        self.nodes.borrow()[node.0].inner_html.clone()
    }

    /// Every node ever allocated, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn scroll_requests(&self) -> Vec<(f64, ScrollBehavior)> {
        self.scroll_requests.borrow().clone()
    }

    pub fn listener_count(&self, target: Target, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .count()
    }

    /// Options of every observer created so far, in creation order.
    pub fn observer_options(&self) -> Vec<IntersectionOptions> {
        self.observers.borrow().iter().map(|o| o.options.clone()).collect()
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observers.borrow().iter().any(|o| o.targets.contains(&node))
    }

    /// Clicks `node`. The event bubbles through its ancestors to the document.
    pub fn click(&self, node: NodeId) -> DomEvent {
        let event = DomEvent::new(Some(node));
        self.dispatch(Target::Node(node), EventKind::Click, &event);
        event
    }

    pub fn hover(&self, node: NodeId) {
        self.dispatch(Target::Node(node), EventKind::MouseEnter, &DomEvent::new(Some(node)));
    }

    pub fn unhover(&self, node: NodeId) {
        self.dispatch(Target::Node(node), EventKind::MouseLeave, &DomEvent::new(Some(node)));
    }

    pub fn move_pointer(&self, x: f64, y: f64) {
        self.dispatch(Target::Document, EventKind::MouseMove, &DomEvent::pointer(None, x, y));
    }

    /// Sets the scroll offset and fires a window scroll event.
    pub fn scroll_window(&self, y: f64) {
        self.scroll_y.set(y);
        self.dispatch(Target::Window, EventKind::Scroll, &DomEvent::new(None));
    }

    /// Reports `node` to every observer currently watching it.
    pub fn set_intersecting(&self, node: NodeId, is_intersecting: bool) {
        let watching: Vec<(ObserverId, Rc<RefCell<IntersectionCallback>>)> = self
            .observers
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, o)| o.targets.contains(&node))
            .map(|(i, o)| (ObserverId(i), o.callback.clone()))
            .collect();

        let entry = [IntersectionEntry {
            target: node,
            is_intersecting,
        }];
        for (id, callback) in watching {
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (&mut *callback)(id, &entry);
            }
        }
    }

    pub fn dispatch(&self, target: Target, kind: EventKind, event: &DomEvent) {
        let bubbles = matches!(kind, EventKind::Click | EventKind::MouseMove);
        let path = match target {
            Target::Node(node) if bubbles => {
                let mut path: Vec<Target> = self.ancestors(node).into_iter().map(Target::Node).collect();
                path.push(Target::Document);
                path
            }
            other => vec![other],
        };

        for hop in path {
            self.fire(hop, kind, event);
            if event.propagation_stopped() {
                break;
            }
        }
    }

    fn fire(&self, target: Target, kind: EventKind, event: &DomEvent) {
        let matching: Vec<(usize, bool, Rc<RefCell<Listener>>)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .map(|l| (l.id, l.once, l.listener.clone()))
            .collect();

        self.listeners
            .borrow_mut()
            .retain(|l| !(l.once && matching.iter().any(|(id, _, _)| *id == l.id)));

        for (_, _, listener) in matching {
            match listener.try_borrow_mut() {
                Ok(mut listener) => (&mut *listener)(event),
                Err(_) => warn!("re-entrant {} listener skipped", kind.as_str()),
            }
        }
    }

    // Inclusive, nearest first.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut chain = vec![node];
        let mut current = nodes[node.0].parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = nodes[parent.0].parent;
        }
        chain
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = nodes[node.0].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(nodes[next.0].children.iter().rev().copied());
        }
        out
    }

    fn parse(&self, selector: &str) -> Option<SelectorList> {
        match SelectorList::parse(selector) {
            Ok(list) => Some(list),
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }

    fn matches(&self, node: NodeId, list: &SelectorList) -> bool {
        list.matches(&self.nodes.borrow()[node.0])
    }

    fn with_node_mut<R>(&self, node: NodeId, f: impl FnOnce(&mut NodeData) -> R) -> R {
        f(&mut self.nodes.borrow_mut()[node.0])
    }

    fn alloc(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            ..NodeData::default()
        });
        NodeId(nodes.len() - 1)
    }

    fn add_listener(&self, target: Target, kind: EventKind, once: bool, listener: Listener) {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push(ListenerEntry {
            id,
            target,
            kind,
            once,
            listener: Rc::new(RefCell::new(listener)),
        });
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let nodes = self.nodes.borrow();
        out.push_str(&nodes[node.0].text);
        let children = nodes[node.0].children.clone();
        drop(nodes);
        for child in children {
            self.collect_text(child, out);
        }
    }
}

impl Page for MemoryPage {
    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(list) = self.parse(selector) else {
            return Vec::new();
        };
        self.descendants(self.root)
            .into_iter()
            .filter(|n| self.matches(*n, &list))
            .collect()
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        let list = self.parse(selector)?;
        self.descendants(root).into_iter().find(|n| self.matches(*n, &list))
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let list = self.parse(selector)?;
        self.ancestors(node).into_iter().find(|n| self.matches(*n, &list))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn head(&self) -> NodeId {
        self.head
    }

    fn create_element(&self, tag: &str) -> Result<NodeId> {
        Ok(self.alloc(tag))
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        self.remove(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    fn remove(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.ancestors(node).contains(&self.root)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let nodes = self.nodes.borrow();
        if name == "class" {
            let classes = &nodes[node.0].classes;
            return (!classes.is_empty()).then(|| classes.join(" "));
        }
        nodes[node.0].attrs.get(name).cloned()
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.with_node_mut(node, |n| {
            if name == "class" {
                n.classes = value.split_whitespace().map(str::to_string).collect();
            } else {
                n.attrs.insert(name.to_string(), value.to_string());
            }
        });
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        self.with_node_mut(node, |n| {
            if name == "class" {
                n.classes.clear();
            } else {
                n.attrs.remove(name);
            }
        });
    }

    fn add_class(&self, node: NodeId, class: &str) {
        self.with_node_mut(node, |n| {
            if !n.has_class(class) {
                n.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        self.with_node_mut(node, |n| n.classes.retain(|c| c != class));
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        Matchable::has_class(&self.nodes.borrow()[node.0], class)
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes.borrow()[node.0].styles.get(property).cloned()
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        self.with_node_mut(node, |n| {
            if value.is_empty() {
                n.styles.remove(property);
            } else {
                n.styles.insert(property.to_string(), value.to_string());
            }
        });
    }

    fn set_inner_html(&self, node: NodeId, html: &str) {
        self.with_node_mut(node, |n| n.inner_html = Some(html.to_string()));
    }

    fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn set_text(&self, node: NodeId, text: &str) {
        for child in self.children(node) {
            self.remove(child);
        }
        self.with_node_mut(node, |n| n.text = text.to_string());
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.nodes.borrow()[node.0].rect
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    /// Jumps straight to `top` without firing a scroll event.
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        self.scroll_requests.borrow_mut().push((top, behavior));
        self.scroll_y.set(top.max(0.0));
    }

    fn supports_intersection(&self) -> bool {
        self.intersection.get()
    }

    fn supports_touch(&self) -> bool {
        self.touch.get()
    }

    fn listen(&self, target: Target, kind: EventKind, listener: Listener) {
        self.add_listener(target, kind, false, listener);
    }

    fn listen_once(&self, target: Target, kind: EventKind, listener: Listener) {
        self.add_listener(target, kind, true, listener);
    }

    fn observe_intersection(
        &self,
        targets: &[NodeId],
        options: IntersectionOptions,
        callback: IntersectionCallback,
    ) -> Option<ObserverId> {
        if !self.intersection.get() {
            return None;
        }
        let mut observers = self.observers.borrow_mut();
        observers.push(Observer {
            options,
            targets: targets.to_vec(),
            callback: Rc::new(RefCell::new(callback)),
        });
        Some(ObserverId(observers.len() - 1))
    }

    fn unobserve(&self, observer: ObserverId, node: NodeId) {
        if let Some(o) = self.observers.borrow_mut().get_mut(observer.0) {
            o.targets.retain(|t| *t != node);
        }
    }
}

/// Fluent setup for fixture markup.
pub struct ElementBuilder<'a> {
    page: &'a MemoryPage,
    node: NodeId,
}

impl<'a> ElementBuilder<'a> {
    pub fn id(self, id: &str) -> Self {
        self.page.set_attribute(self.node, "id", id);
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.page.add_class(self.node, class);
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.page.set_attribute(self.node, name, value);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.page.set_text(self.node, text);
        self
    }

    pub fn rect(self, rect: Rect) -> Self {
        self.page.set_rect(self.node, rect);
        self
    }

    pub fn append_to(self, parent: NodeId) -> NodeId {
        self.page.append_child(parent, self.node);
        self.node
    }

    pub fn build(self) -> NodeId {
        self.node
    }
}

/// A [`MemoryPage`], a [`ManualScheduler`] and a [`RecordingSink`] wired into an [`Env`].
pub struct Harness {
    pub page: Rc<MemoryPage>,
    pub scheduler: Rc<ManualScheduler>,
    pub sink: Rc<RecordingSink>,
    env: Env,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        let page = Rc::new(MemoryPage::new());
        let scheduler = Rc::new(ManualScheduler::new());
        let sink = Rc::new(RecordingSink::default());
        let env = Env::new(page.clone(), scheduler.clone(), sink.clone(), Config::default());
        Self {
            page,
            scheduler,
            sink,
            env,
        }
    }

    pub fn env(&self) -> Env {
        self.env.clone()
    }

    /// Same page, clock, sink and style registry, different config.
    pub fn env_with(&self, config: Config) -> Env {
        Env {
            config: Rc::new(config),
            ..self.env.clone()
        }
    }

    pub fn body(&self) -> NodeId {
        self.page.body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;

    #[test]
    fn clicks_bubble_to_the_document_unless_stopped() {
        let page = MemoryPage::new();
        let item = page.element("div").class("showcase-item").append_to(page.body());
        let button = page.element("button").class("play-button").append_to(item);
        let seen = Rc::new(RefCell::new(Vec::new()));

        for (target, name) in [(Target::Node(item), "item"), (Target::Document, "document")] {
            let seen = seen.clone();
            page.listen(target, EventKind::Click, Box::new(move |_| seen.borrow_mut().push(name)));
        }
        page.click(button);
        assert_eq!(*seen.borrow(), vec!["item", "document"]);

        page.listen(Target::Node(button), EventKind::Click, Box::new(|e| e.stop_propagation()));
        page.click(button);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn created_elements_start_detached() {
        let page = MemoryPage::new();
        let before = page.node_count();

        let node = page.create_element("button").unwrap();

        assert_eq!(page.node_count(), before + 1);
        assert_eq!(page.tag(node), "button");
        assert!(!page.is_attached(node));
        page.append_child(page.body(), node);
        assert!(page.is_attached(node));
    }

    #[test]
    fn once_listeners_fire_a_single_time() {
        let page = MemoryPage::new();
        let link = page.element("a").attr("href", "/pricing").append_to(page.body());
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        page.listen_once(
            Target::Node(link),
            EventKind::MouseEnter,
            Box::new(move |_| counter.set(counter.get() + 1)),
        );

        page.hover(link);
        page.hover(link);
        assert_eq!(hits.get(), 1);
        assert_eq!(page.listener_count(Target::Node(link), EventKind::MouseEnter), 0);
    }

    #[test]
    fn queries_walk_in_document_order_and_skip_detached_nodes() {
        let page = MemoryPage::new();
        let first = page.element("div").class("faq-item").append_to(page.body());
        let nested = page.element("div").class("faq-item").append_to(first);
        let _detached = page.element("div").class("faq-item").build();

        assert_eq!(page.query_all(".faq-item"), vec![first, nested]);
        assert_eq!(page.query_within(first, ".faq-item"), Some(nested));
        assert_eq!(page.closest(nested, "div.faq-item"), Some(nested));
        assert!(page.contains(first, nested));
    }

    #[test]
    fn text_concatenates_descendants() {
        let page = MemoryPage::new();
        let link = page.element("a").text("Download ").append_to(page.body());
        page.element("span").text("now").append_to(link);
        assert_eq!(page.text(link), "Download now");
    }
}
