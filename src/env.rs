use std::rc::Rc;

use crate::analytics::{AnalyticsSink, TrackedEvent};
use crate::config::Config;
use crate::page::Page;
use crate::scheduler::Scheduler;
use crate::styles::StyleRegistry;

/// Everything a controller may touch. Cloning is cheap.
#[derive(Clone)]
pub struct Env {
    pub page: Rc<dyn Page>,
    pub scheduler: Rc<dyn Scheduler>,
    pub styles: StyleRegistry,
    pub analytics: Rc<dyn AnalyticsSink>,
    pub config: Rc<Config>,
}

impl Env {
    pub fn new(
        page: Rc<dyn Page>,
        scheduler: Rc<dyn Scheduler>,
        analytics: Rc<dyn AnalyticsSink>,
        config: Config,
    ) -> Self {
        Self {
            styles: StyleRegistry::new(page.clone()),
            page,
            scheduler,
            analytics,
            config: Rc::new(config),
        }
    }

    pub fn track(&self, event: TrackedEvent) {
        self.analytics.record(&event);
    }
}
