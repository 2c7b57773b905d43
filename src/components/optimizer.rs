use log::{debug, warn};

use crate::env::Env;
use crate::page::{EventKind, IntersectionOptions, NodeId, Target};

/// Lazy-loads deferred images and prefetches link targets on first hover.
pub struct ResourceOptimizer {
    lazy_images: Vec<NodeId>,
    lazy_loading: bool,
}

impl ResourceOptimizer {
    pub fn mount(env: &Env) -> Self {
        let config = &env.config.optimizer;

        let lazy_images = env.page.query_all(&config.lazy_image);
        let observed = {
            let page = env.page.clone();
            let source_attr = config.source_attribute.clone();
            env.page.observe_intersection(
                &lazy_images,
                IntersectionOptions::default(),
                Box::new(move |observer, entries| {
                    for entry in entries.iter().filter(|e| e.is_intersecting) {
                        let img = entry.target;
                        if let Some(src) = page.attribute(img, &source_attr) {
                            page.set_attribute(img, "src", &src);
                            page.remove_attribute(img, &source_attr);
                            page.unobserve(observer, img);
                        }
                    }
                }),
            )
        };
        if observed.is_none() {
            debug!("intersection detection unavailable, deferred images left as-is");
        }

        for link in env.page.query_all(&config.link) {
            let page = env.page.clone();
            env.page.listen_once(
                Target::Node(link),
                EventKind::MouseEnter,
                Box::new(move |_| {
                    let Some(href) = page.attribute(link, "href") else {
                        return;
                    };
                    if href.is_empty() || href.starts_with('#') {
                        return;
                    }
                    let hint = match page.create_element("link") {
                        Ok(hint) => hint,
                        Err(err) => {
                            warn!("prefetch hint for {href} skipped: {err}");
                            return;
                        }
                    };
                    page.set_attribute(hint, "rel", "prefetch");
                    page.set_attribute(hint, "href", &href);
                    page.append_child(page.head(), hint);
                }),
            );
        }

        Self {
            lazy_images,
            lazy_loading: observed.is_some(),
        }
    }

    pub fn lazy_images(&self) -> &[NodeId] {
        &self.lazy_images
    }

    pub fn is_lazy_loading(&self) -> bool {
        self.lazy_loading
    }
}
