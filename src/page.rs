//! Page environment seen by the controllers.
//!
//! Controllers never reach for `window` or `document` directly. They talk to a
//! [`Page`], which the browser build backs with `web-sys` and tests back with
//! the in-memory arena in [`memory`].

use std::cell::Cell;

use crate::error::Result;

pub mod memory;
pub mod selector;

/// Opaque handle to an element owned by a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Handle to an intersection observer created by [`Page::observe_intersection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top, left, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Window,
    Document,
    Node(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Scroll,
    MouseMove,
    MouseEnter,
    MouseLeave,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Scroll => "scroll",
            EventKind::MouseMove => "mousemove",
            EventKind::MouseEnter => "mouseenter",
            EventKind::MouseLeave => "mouseleave",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// Event delivered to a listener.
///
/// The flags are read back by the page after the listener returns, so a
/// listener only has to call [`DomEvent::prevent_default`].
#[derive(Debug, Default)]
pub struct DomEvent {
    pub target: Option<NodeId>,
    pub client_x: f64,
    pub client_y: f64,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl DomEvent {
    pub fn new(target: Option<NodeId>) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn pointer(target: Option<NodeId>, client_x: f64, client_y: f64) -> Self {
        Self {
            target,
            client_x,
            client_y,
            ..Self::default()
        }
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

pub type Listener = Box<dyn FnMut(&DomEvent)>;

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionOptions {
    pub threshold: f64,
    pub root_margin: String,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: "0px".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
}

pub type IntersectionCallback = Box<dyn FnMut(ObserverId, &[IntersectionEntry])>;

/// DOM access for one page.
///
/// Individual operations do not fail: implementations log and swallow the
/// errors of the underlying platform so a broken enhancement never breaks the
/// page.
pub trait Page {
    fn query(&self, selector: &str) -> Option<NodeId>;
    fn query_all(&self, selector: &str) -> Vec<NodeId>;
    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId>;
    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId>;
    /// True when `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    fn body(&self) -> NodeId;
    fn head(&self) -> NodeId;
    /// Fails only when the platform rejects the tag name.
    fn create_element(&self, tag: &str) -> Result<NodeId>;
    fn append_child(&self, parent: NodeId, child: NodeId);
    fn remove(&self, node: NodeId);
    fn is_attached(&self, node: NodeId) -> bool;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&self, node: NodeId, name: &str);

    fn add_class(&self, node: NodeId, class: &str);
    fn remove_class(&self, node: NodeId, class: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn style(&self, node: NodeId, property: &str) -> Option<String>;
    /// An empty `value` clears the property.
    fn set_style(&self, node: NodeId, property: &str, value: &str);

    /// Only used for fixed markup such as icons, never for page-derived text.
    fn set_inner_html(&self, node: NodeId, html: &str);
    fn text(&self, node: NodeId) -> String;
    fn set_text(&self, node: NodeId, text: &str);

    fn bounding_rect(&self, node: NodeId) -> Rect;
    fn viewport(&self) -> Viewport;
    fn scroll_y(&self) -> f64;
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);

    fn supports_intersection(&self) -> bool;
    fn supports_touch(&self) -> bool;

    fn listen(&self, target: Target, kind: EventKind, listener: Listener);
    /// Like [`Page::listen`], but the listener is dropped after its first call.
    fn listen_once(&self, target: Target, kind: EventKind, listener: Listener);

    /// Returns `None` when intersection detection is unavailable.
    fn observe_intersection(
        &self,
        targets: &[NodeId],
        options: IntersectionOptions,
        callback: IntersectionCallback,
    ) -> Option<ObserverId>;
    fn unobserve(&self, observer: ObserverId, node: NodeId);
}
