use std::cell::Cell;
use std::rc::Rc;

use log::{debug, warn};

use crate::config::CursorConfig;
use crate::env::Env;
use crate::page::{EventKind, NodeId, Target, Viewport};
use crate::scheduler::{FrameLoop, LoopHandle};

pub const STYLE_ID: &str = "cursor-styles";
pub const HOVER_CLASS: &str = "hover";

const CURSOR_CSS: &str = r#"
.custom-cursor,
.cursor-follower {
    position: fixed;
    pointer-events: none;
    z-index: 10000;
    border-radius: 50%;
    transition: all 0.1s ease;
}
.custom-cursor {
    width: 10px;
    height: 10px;
    background: linear-gradient(135deg, #667EEA 0%, #764BA2 100%);
    transform: translate(-50%, -50%);
}
.cursor-follower {
    width: 40px;
    height: 40px;
    border: 2px solid rgba(102, 126, 234, 0.5);
    transform: translate(-50%, -50%);
}
.custom-cursor.hover {
    transform: translate(-50%, -50%) scale(1.5);
}
.cursor-follower.hover {
    transform: translate(-50%, -50%) scale(1.5);
    border-color: rgba(102, 126, 234, 0.8);
}
* {
    cursor: none !important;
}
"#;

pub fn should_activate(config: &CursorConfig, viewport: Viewport, touch: bool) -> bool {
    config.enabled && viewport.width > config.min_viewport_width && !touch
}

/// One smoothing step: move `smoothing` of the remaining distance.
pub fn follow(current: f64, target: f64, smoothing: f64) -> f64 {
    current + (target - current) * smoothing
}

/// Dot that tracks the pointer plus a ring that eases after it.
pub struct CustomCursor {
    dot: NodeId,
    ring: NodeId,
    ring_pos: Rc<Cell<(f64, f64)>>,
    frames: LoopHandle,
}

impl CustomCursor {
    /// `None` on small or touch screens, when disabled in config, or when the
    /// cursor elements cannot be created.
    pub fn mount(env: &Env) -> Option<Self> {
        let config = &env.config.cursor;
        let page = &env.page;
        if !should_activate(config, page.viewport(), page.supports_touch()) {
            debug!("custom cursor not active on this device");
            return None;
        }

        let (dot, ring) = match (page.create_element("div"), page.create_element("div")) {
            (Ok(dot), Ok(ring)) => (dot, ring),
            (Err(err), _) | (_, Err(err)) => {
                warn!("custom cursor disabled: {err}");
                return None;
            }
        };
        page.set_attribute(dot, "class", "custom-cursor");
        page.set_attribute(ring, "class", "cursor-follower");
        page.append_child(page.body(), dot);
        page.append_child(page.body(), ring);
        env.styles.ensure(STYLE_ID, CURSOR_CSS);

        let pointer = Rc::new(Cell::new((0.0, 0.0)));
        let ring_pos = Rc::new(Cell::new((0.0, 0.0)));

        {
            let page_ = page.clone();
            let pointer = pointer.clone();
            page.listen(
                Target::Document,
                EventKind::MouseMove,
                Box::new(move |event| {
                    pointer.set((event.client_x, event.client_y));
                    page_.set_style(dot, "left", &format!("{}px", event.client_x));
                    page_.set_style(dot, "top", &format!("{}px", event.client_y));
                }),
            );
        }

        let frames = {
            let page_ = page.clone();
            let ring_pos = ring_pos.clone();
            let smoothing = config.smoothing;
            FrameLoop::start(env.scheduler.clone(), move || {
                let (mx, my) = pointer.get();
                let (fx, fy) = ring_pos.get();
                let next = (follow(fx, mx, smoothing), follow(fy, my, smoothing));
                ring_pos.set(next);
                page_.set_style(ring, "left", &format!("{}px", next.0));
                page_.set_style(ring, "top", &format!("{}px", next.1));
            })
        };

        for target in page.query_all(&config.hover_targets) {
            for (kind, entering) in [(EventKind::MouseEnter, true), (EventKind::MouseLeave, false)] {
                let page_ = page.clone();
                page.listen(
                    Target::Node(target),
                    kind,
                    Box::new(move |_| {
                        for node in [dot, ring] {
                            if entering {
                                page_.add_class(node, HOVER_CLASS);
                            } else {
                                page_.remove_class(node, HOVER_CLASS);
                            }
                        }
                    }),
                );
            }
        }

        Some(Self {
            dot,
            ring,
            ring_pos,
            frames,
        })
    }

    pub fn dot(&self) -> NodeId {
        self.dot
    }

    pub fn ring(&self) -> NodeId {
        self.ring
    }

    pub fn ring_position(&self) -> (f64, f64) {
        self.ring_pos.get()
    }

    pub fn stop(&self) {
        self.frames.stop();
    }
}
