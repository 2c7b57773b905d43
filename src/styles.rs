use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, warn};

use crate::page::Page;

/// One `<style>` block per id, however many times a controller asks for it.
#[derive(Clone)]
pub struct StyleRegistry {
    page: Rc<dyn Page>,
    registered: Rc<RefCell<HashSet<String>>>,
}

impl StyleRegistry {
    pub fn new(page: Rc<dyn Page>) -> Self {
        Self {
            page,
            registered: Rc::new(RefCell::new(HashSet::new())),
        }
    }

    /// Injects `css` under `id` unless that id is already registered or
    /// already present in the markup. Returns true when a block was added.
    pub fn ensure(&self, id: &str, css: &str) -> bool {
        if self.registered.borrow().contains(id) {
            return false;
        }
        self.registered.borrow_mut().insert(id.to_string());

        if self.page.query(&format!("#{id}")).is_some() {
            debug!("style block #{id} already in markup");
            return false;
        }

        let style = match self.page.create_element("style") {
            Ok(style) => style,
            Err(err) => {
                warn!("style block #{id} not injected: {err}");
                return false;
            }
        };
        self.page.set_attribute(style, "id", id);
        self.page.set_text(style, css);
        self.page.append_child(self.page.head(), style);
        debug!("registered style block #{id}");
        true
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.registered.borrow().contains(id)
    }
}
