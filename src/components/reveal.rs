use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use log::debug;

use crate::env::Env;
use crate::page::{EventKind, IntersectionOptions, NodeId, ObserverId, Rect, Target};
use crate::scheduler::throttle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    Intersection,
    ScrollFallback,
}

/// Fallback visibility test: the element has started entering from the bottom.
pub fn entering_viewport(rect: Rect, viewport_height: f64, fraction: f64) -> bool {
    rect.top <= viewport_height * fraction && rect.bottom() >= 0.0
}

/// One-shot entrance animation for every element carrying the reveal marker.
#[derive(Clone)]
pub struct ScrollRevealObserver {
    elements: Rc<Vec<NodeId>>,
    seen: Rc<RefCell<HashSet<NodeId>>>,
    mode: RevealMode,
}

impl ScrollRevealObserver {
    pub fn mount(env: &Env) -> Self {
        let config = &env.config.reveal;
        let mut reveal = Self {
            elements: Rc::new(env.page.query_all(&config.selector)),
            seen: Rc::new(RefCell::new(HashSet::new())),
            mode: RevealMode::Intersection,
        };

        let options = IntersectionOptions {
            threshold: config.threshold,
            root_margin: config.root_margin.clone(),
        };
        let observed = {
            let env_ = env.clone();
            let reveal_ = reveal.clone();
            env.page.observe_intersection(
                &reveal.elements,
                options,
                Box::new(move |observer, entries| {
                    for entry in entries.iter().filter(|e| e.is_intersecting) {
                        reveal_.animate(&env_, entry.target, Some(observer));
                    }
                }),
            )
        };

        if observed.is_none() {
            debug!("intersection detection unavailable, revealing on scroll");
            reveal.mode = RevealMode::ScrollFallback;
            reveal.check_elements(env);

            let mut on_scroll = {
                let env_ = env.clone();
                let reveal_ = reveal.clone();
                throttle(env.scheduler.clone(), config.throttle_ms, move || reveal_.check_elements(&env_))
            };
            env.page
                .listen(Target::Window, EventKind::Scroll, Box::new(move |_| on_scroll()));
        }

        debug!("tracking {} reveal element(s)", reveal.elements.len());
        reveal
    }

    fn check_elements(&self, env: &Env) {
        let config = &env.config.reveal;
        let height = env.page.viewport().height;
        for &element in self.elements.iter() {
            if entering_viewport(env.page.bounding_rect(element), height, config.viewport_fraction) {
                self.animate(env, element, None);
            }
        }
    }

    /// Schedules the entrance animation unless it was already scheduled.
    fn animate(&self, env: &Env, element: NodeId, observer: Option<ObserverId>) {
        if !self.seen.borrow_mut().insert(element) {
            return;
        }
        if let Some(observer) = observer {
            env.page.unobserve(observer, element);
        }

        let config = &env.config.reveal;
        let delay = env
            .page
            .attribute(element, &config.delay_attribute)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0);

        let page = env.page.clone();
        let class = config.animate_class.clone();
        env.scheduler
            .set_timeout(delay, Box::new(move || page.add_class(element, &class)));
    }

    pub fn mode(&self) -> RevealMode {
        self.mode
    }

    pub fn is_triggered(&self, element: NodeId) -> bool {
        self.seen.borrow().contains(&element)
    }

    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }
}
