use std::cell::Cell;
use std::rc::Rc;

use log::{debug, warn};

use crate::env::Env;
use crate::error::{FxError, Result};
use crate::page::{EventKind, NodeId, Target};

pub const STYLE_ID: &str = "showcase-modal-styles";
pub const ACTIVE_CLASS: &str = "active";

const CLOSE_ICON: &str = r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><line x1="18" y1="6" x2="6" y2="18"/><line x1="6" y1="6" x2="18" y2="18"/></svg>"#;

const MODAL_CSS: &str = r#"
.showcase-modal {
    position: fixed;
    top: 0;
    left: 0;
    right: 0;
    bottom: 0;
    z-index: 9999;
    display: flex;
    align-items: center;
    justify-content: center;
    opacity: 0;
    transition: opacity 0.3s ease;
}
.showcase-modal.active {
    opacity: 1;
}
.modal-backdrop {
    position: absolute;
    top: 0;
    left: 0;
    right: 0;
    bottom: 0;
    background: rgba(0, 0, 0, 0.9);
    backdrop-filter: blur(10px);
}
.modal-content {
    position: relative;
    max-width: 900px;
    width: 90%;
    background: white;
    border-radius: 20px;
    overflow: hidden;
    transform: scale(0.9);
    transition: transform 0.3s ease;
}
.showcase-modal.active .modal-content {
    transform: scale(1);
}
.modal-close {
    position: absolute;
    top: 20px;
    right: 20px;
    width: 40px;
    height: 40px;
    background: rgba(0, 0, 0, 0.5);
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    cursor: pointer;
    z-index: 10;
    transition: all 0.2s ease;
}
.modal-close:hover {
    background: rgba(0, 0, 0, 0.8);
    transform: rotate(90deg);
}
.modal-close svg {
    stroke: white;
}
.modal-media {
    width: 100%;
    aspect-ratio: 16 / 9;
    background: linear-gradient(135deg, #667eea22 0%, #764ba222 100%);
}
.modal-media img {
    width: 100%;
    height: 100%;
    object-fit: cover;
}
.modal-text {
    padding: 30px;
}
.modal-text h3 {
    font-size: 24px;
    font-weight: 700;
    margin-bottom: 10px;
    color: #1a202c;
}
.modal-text p {
    font-size: 16px;
    color: #4a5568;
    line-height: 1.6;
}
@media (max-width: 768px) {
    .modal-content { width: 95%; }
    .modal-text { padding: 20px; }
    .modal-text h3 { font-size: 20px; }
    .modal-text p { font-size: 14px; }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open(NodeId),
    /// Fading out; the overlay is still in the document.
    Closing(NodeId),
}

/// What the overlay shows, read from the showcase item around a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowcaseEntry {
    pub media_src: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy)]
struct Overlay {
    root: NodeId,
    image: NodeId,
    title: NodeId,
    description: NodeId,
}

/// Full-screen preview for showcase items. One overlay is built on first
/// open and reused afterwards.
#[derive(Clone)]
pub struct MediaModal {
    triggers: Rc<Vec<NodeId>>,
    state: Rc<Cell<ModalState>>,
    overlay: Rc<Cell<Option<Overlay>>>,
}

impl MediaModal {
    pub fn mount(env: &Env) -> Self {
        let modal = Self {
            triggers: Rc::new(env.page.query_all(&env.config.showcase.trigger)),
            state: Rc::new(Cell::new(ModalState::Closed)),
            overlay: Rc::new(Cell::new(None)),
        };

        for (index, &trigger) in modal.triggers.iter().enumerate() {
            let env_ = env.clone();
            let modal_ = modal.clone();
            env.page.listen(
                Target::Node(trigger),
                EventKind::Click,
                Box::new(move |event| {
                    event.prevent_default();
                    event.stop_propagation();
                    if let Err(err) = modal_.open(&env_, index) {
                        warn!("showcase {}: {err}", index + 1);
                    }
                }),
            );
        }
        modal
    }

    /// Opens the overlay for the `index`-th trigger. Ignored while another
    /// overlay is open or still fading out.
    pub fn open(&self, env: &Env, index: usize) -> Result<()> {
        if self.state.get() != ModalState::Closed {
            debug!("showcase modal already shown, ignoring open");
            return Ok(());
        }
        let config = &env.config.showcase;
        let trigger = *self
            .triggers
            .get(index)
            .ok_or_else(|| FxError::MissingElement(format!("{} #{}", config.trigger, index + 1)))?;
        let entry = read_entry(env, trigger)?;

        env.styles.ensure(STYLE_ID, MODAL_CSS);
        let overlay = self.overlay(env)?;
        let page = &env.page;
        page.set_attribute(overlay.image, "src", &entry.media_src);
        page.set_attribute(overlay.image, "alt", &entry.title);
        page.set_text(overlay.title, &entry.title);
        page.set_text(overlay.description, &entry.description);

        page.append_child(page.body(), overlay.root);
        page.set_style(page.body(), "overflow", "hidden");
        self.state.set(ModalState::Open(overlay.root));

        let page = env.page.clone();
        let state = self.state.clone();
        let root = overlay.root;
        env.scheduler.set_timeout(
            config.open_delay_ms,
            Box::new(move || {
                if state.get() == ModalState::Open(root) {
                    page.add_class(root, ACTIVE_CLASS);
                }
            }),
        );

        debug!("opened showcase modal for {:?}", entry.title);
        Ok(())
    }

    /// Fades the overlay out, then detaches it and unlocks page scroll.
    pub fn close(&self, env: &Env) {
        let ModalState::Open(root) = self.state.get() else {
            return;
        };
        env.page.remove_class(root, ACTIVE_CLASS);
        self.state.set(ModalState::Closing(root));

        let page = env.page.clone();
        let state = self.state.clone();
        env.scheduler.set_timeout(
            env.config.showcase.close_delay_ms,
            Box::new(move || {
                page.remove(root);
                page.set_style(page.body(), "overflow", "");
                state.set(ModalState::Closed);
            }),
        );
    }

    pub fn state(&self) -> ModalState {
        self.state.get()
    }

    fn overlay(&self, env: &Env) -> Result<Overlay> {
        if let Some(overlay) = self.overlay.get() {
            return Ok(overlay);
        }
        let (overlay, controls) = build_overlay(env)?;
        for control in controls {
            let env_ = env.clone();
            let modal_ = self.clone();
            env.page.listen(
                Target::Node(control),
                EventKind::Click,
                Box::new(move |_| modal_.close(&env_)),
            );
        }
        self.overlay.set(Some(overlay));
        Ok(overlay)
    }
}

pub fn read_entry(env: &Env, trigger: NodeId) -> Result<ShowcaseEntry> {
    let config = &env.config.showcase;
    let page = &env.page;
    let missing = |selector: &str| FxError::MissingElement(selector.to_string());

    let item = page.closest(trigger, &config.item).ok_or_else(|| missing(&config.item))?;
    let media = page.query_within(item, &config.media).ok_or_else(|| missing(&config.media))?;
    let content = page
        .query_within(item, &config.content)
        .ok_or_else(|| missing(&config.content))?;
    let title = page.query_within(content, "h3").ok_or_else(|| missing("h3"))?;
    let description = page.query_within(content, "p").ok_or_else(|| missing("p"))?;

    Ok(ShowcaseEntry {
        media_src: page.attribute(media, "src").unwrap_or_default(),
        title: page.text(title).trim().to_string(),
        description: page.text(description).trim().to_string(),
    })
}

/// Builds the detached overlay tree. Also returns the close button and
/// backdrop, which both dismiss it.
fn build_overlay(env: &Env) -> Result<(Overlay, [NodeId; 2])> {
    let page = &env.page;
    let el = |tag: &str, class: &str, parent: Option<NodeId>| -> Result<NodeId> {
        let node = page.create_element(tag)?;
        if !class.is_empty() {
            page.set_attribute(node, "class", class);
        }
        if let Some(parent) = parent {
            page.append_child(parent, node);
        }
        Ok(node)
    };

    let root = el("div", "showcase-modal", None)?;
    let backdrop = el("div", "modal-backdrop", Some(root))?;
    let content = el("div", "modal-content", Some(root))?;

    let close_button = el("button", "modal-close", Some(content))?;
    page.set_attribute(close_button, "aria-label", "Close");
    page.set_inner_html(close_button, CLOSE_ICON);

    let media = el("div", "modal-media", Some(content))?;
    let image = el("img", "", Some(media))?;

    let text = el("div", "modal-text", Some(content))?;
    let title = el("h3", "", Some(text))?;
    let description = el("p", "", Some(text))?;

    let overlay = Overlay {
        root,
        image,
        title,
        description,
    };
    Ok((overlay, [close_button, backdrop]))
}
