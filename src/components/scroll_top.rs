use log::debug;

use crate::env::Env;
use crate::error::Result;
use crate::page::{EventKind, NodeId, ScrollBehavior, Target};
use crate::scheduler::throttle;

pub const STYLE_ID: &str = "scroll-to-top-styles";
pub const VISIBLE_CLASS: &str = "visible";

const ICON: &str = r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><polyline points="18 15 12 9 6 15"/></svg>"#;

const BUTTON_CSS: &str = r#"
.scroll-to-top {
    position: fixed;
    bottom: 30px;
    right: 30px;
    width: 50px;
    height: 50px;
    background: linear-gradient(135deg, #667EEA 0%, #764BA2 100%);
    border: none;
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    cursor: pointer;
    opacity: 0;
    visibility: hidden;
    transform: translateY(20px);
    transition: all 0.3s ease;
    z-index: 1000;
    box-shadow: 0 4px 12px rgba(102, 126, 234, 0.3);
}
.scroll-to-top.visible {
    opacity: 1;
    visibility: visible;
    transform: translateY(0);
}
.scroll-to-top:hover {
    transform: translateY(-5px);
    box-shadow: 0 8px 20px rgba(102, 126, 234, 0.4);
}
.scroll-to-top svg {
    stroke: white;
}
@media (max-width: 768px) {
    .scroll-to-top {
        bottom: 20px;
        right: 20px;
        width: 45px;
        height: 45px;
    }
}
"#;

/// Floating button that shows up once the page is scrolled past the threshold.
pub struct ScrollToTopButton {
    button: NodeId,
}

impl ScrollToTopButton {
    pub fn mount(env: &Env) -> Result<Self> {
        let config = &env.config.scroll_top;
        let page = &env.page;

        let button = page.create_element("button")?;
        page.set_attribute(button, "class", "scroll-to-top");
        page.set_attribute(button, "aria-label", "Scroll to top");
        page.set_inner_html(button, ICON);
        env.styles.ensure(STYLE_ID, BUTTON_CSS);
        page.append_child(page.body(), button);

        let mut on_scroll = {
            let page = page.clone();
            let threshold = config.threshold;
            throttle(env.scheduler.clone(), config.throttle_ms, move || {
                if page.scroll_y() > threshold {
                    page.add_class(button, VISIBLE_CLASS);
                } else {
                    page.remove_class(button, VISIBLE_CLASS);
                }
            })
        };
        page.listen(Target::Window, EventKind::Scroll, Box::new(move |_| on_scroll()));

        let page_ = page.clone();
        page.listen(
            Target::Node(button),
            EventKind::Click,
            Box::new(move |_| page_.scroll_to(0.0, ScrollBehavior::Smooth)),
        );

        debug!("scroll-to-top button mounted");
        Ok(Self { button })
    }

    pub fn node(&self) -> NodeId {
        self.button
    }
}
