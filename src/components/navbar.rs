use std::cell::Cell;
use std::rc::Rc;

use log::debug;

use crate::env::Env;
use crate::page::{EventKind, NodeId, ScrollBehavior, Target};
use crate::scheduler::throttle;

pub const COMPACT_CLASS: &str = "scrolled";
pub const HIDDEN_TRANSFORM: &str = "translateY(-100%)";
pub const SHOWN_TRANSFORM: &str = "translateY(0)";

/// Outcome of one scroll step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub compact: bool,
    pub hidden: bool,
}

/// Compact past `compact_threshold`; hidden while moving down past `hide_after`.
pub fn nav_state(current: f64, previous: f64, compact_threshold: f64, hide_after: f64) -> NavState {
    NavState {
        compact: current > compact_threshold,
        hidden: current > previous && current > hide_after,
    }
}

#[derive(Clone)]
pub struct NavigationBar {
    navbar: NodeId,
    last_scroll_y: Rc<Cell<f64>>,
}

impl NavigationBar {
    /// Returns `None` when the page has no navbar.
    pub fn mount(env: &Env) -> Option<Self> {
        let config = &env.config.navbar;
        let Some(navbar) = env.page.query(&config.selector) else {
            debug!("no {} on page, navbar disabled", config.selector);
            return None;
        };

        let nav = Self {
            navbar,
            last_scroll_y: Rc::new(Cell::new(0.0)),
        };

        nav.handle_scroll(env);
        let mut on_scroll = {
            let env_ = env.clone();
            let nav_ = nav.clone();
            throttle(env.scheduler.clone(), config.throttle_ms, move || nav_.handle_scroll(&env_))
        };
        env.page
            .listen(Target::Window, EventKind::Scroll, Box::new(move |_| on_scroll()));

        setup_mobile_menu(env);
        setup_smooth_scroll(env);
        Some(nav)
    }

    fn handle_scroll(&self, env: &Env) {
        let config = &env.config.navbar;
        let current = env.page.scroll_y();
        let state = nav_state(
            current,
            self.last_scroll_y.get(),
            config.compact_threshold,
            config.hide_after,
        );

        if state.compact {
            env.page.add_class(self.navbar, COMPACT_CLASS);
        } else {
            env.page.remove_class(self.navbar, COMPACT_CLASS);
        }
        let transform = if state.hidden { HIDDEN_TRANSFORM } else { SHOWN_TRANSFORM };
        env.page.set_style(self.navbar, "transform", transform);

        self.last_scroll_y.set(current);
    }

    pub fn node(&self) -> NodeId {
        self.navbar
    }
}

fn setup_mobile_menu(env: &Env) {
    let config = &env.config.navbar;
    let (Some(toggle), Some(menu)) = (
        env.page.query(&config.mobile_toggle),
        env.page.query(&config.mobile_menu),
    ) else {
        debug!("mobile menu markup missing, skipping");
        return;
    };

    let env_ = env.clone();
    env.page.listen(
        Target::Node(toggle),
        EventKind::Click,
        Box::new(move |_| {
            let page = &env_.page;
            let open = !page.has_class(menu, "active");
            for node in [menu, toggle] {
                if open {
                    page.add_class(node, "active");
                } else {
                    page.remove_class(node, "active");
                }
            }
            page.set_style(page.body(), "overflow", if open { "hidden" } else { "" });
        }),
    );

    // Outside clicks close the menu.
    let env_ = env.clone();
    env.page.listen(
        Target::Document,
        EventKind::Click,
        Box::new(move |event| {
            let page = &env_.page;
            if !page.has_class(menu, "active") {
                return;
            }
            let inside = event
                .target
                .map_or(false, |t| page.contains(menu, t) || page.contains(toggle, t));
            if !inside {
                close_mobile_menu(&env_, menu, toggle);
            }
        }),
    );

    for link in env.page.query_all(&config.mobile_links) {
        let env_ = env.clone();
        env.page.listen(
            Target::Node(link),
            EventKind::Click,
            Box::new(move |_| close_mobile_menu(&env_, menu, toggle)),
        );
    }
}

fn close_mobile_menu(env: &Env, menu: NodeId, toggle: NodeId) {
    env.page.remove_class(menu, "active");
    env.page.remove_class(toggle, "active");
    env.page.set_style(env.page.body(), "overflow", "");
}

fn setup_smooth_scroll(env: &Env) {
    let config = &env.config.navbar;
    for anchor in env.page.query_all(&config.anchors) {
        let env_ = env.clone();
        env.page.listen(
            Target::Node(anchor),
            EventKind::Click,
            Box::new(move |event| {
                let config = &env_.config.navbar;
                let Some(href) = env_.page.attribute(anchor, "href") else {
                    return;
                };
                if config.skip_anchors.iter().any(|skip| *skip == href) {
                    return;
                }

                event.prevent_default();
                if let Some(target) = env_.page.query(&href) {
                    let top = env_.page.bounding_rect(target).top + env_.page.scroll_y() - config.header_offset;
                    env_.page.scroll_to(top, ScrollBehavior::Smooth);
                }
            }),
        );
    }
}
