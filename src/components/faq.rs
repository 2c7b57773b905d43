use std::rc::Rc;

use log::warn;

use crate::analytics::TrackedEvent;
use crate::env::Env;
use crate::page::{EventKind, NodeId, Target};

pub const OPEN_CLASS: &str = "active";

/// FAQ list where at most one answer is open.
#[derive(Clone)]
pub struct AccordionList {
    items: Rc<Vec<NodeId>>,
}

impl AccordionList {
    pub fn mount(env: &Env) -> Self {
        let config = &env.config.faq;
        let list = Self {
            items: Rc::new(env.page.query_all(&config.item)),
        };

        for (index, &item) in list.items.iter().enumerate() {
            let Some(question) = env.page.query_within(item, &config.question) else {
                warn!("faq item {} has no {}", index + 1, config.question);
                continue;
            };
            let env_ = env.clone();
            let list_ = list.clone();
            env.page.listen(
                Target::Node(question),
                EventKind::Click,
                Box::new(move |_| list_.toggle(&env_, index)),
            );
        }
        list
    }

    /// Closes everything, then reopens `index` unless it was the open one.
    pub fn toggle(&self, env: &Env, index: usize) {
        let Some(&item) = self.items.get(index) else {
            return;
        };
        let was_open = env.page.has_class(item, OPEN_CLASS);

        for &other in self.items.iter() {
            env.page.remove_class(other, OPEN_CLASS);
        }

        if !was_open {
            env.page.add_class(item, OPEN_CLASS);
            env.track(TrackedEvent::FaqOpened { question: index + 1 });
        }
    }

    pub fn open_index(&self, env: &Env) -> Option<usize> {
        self.items.iter().position(|&item| env.page.has_class(item, OPEN_CLASS))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
