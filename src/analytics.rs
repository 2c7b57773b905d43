//! Page-view and click tracking.
//!
//! There is no analytics backend: events go to an [`AnalyticsSink`], which in
//! the browser prints to the console. Recording must never fail or block, so
//! sinks swallow their own errors.

use std::cell::RefCell;

use log::{debug, info, warn};
use serde::Serialize;

use crate::env::Env;
use crate::page::{EventKind, NodeId, Target};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackedEvent {
    PageView,
    FaqOpened {
        question: usize,
    },
    Interaction {
        category: String,
        action: String,
        label: Option<String>,
    },
}

impl TrackedEvent {
    pub fn click(category: &str, label: Option<String>) -> Self {
        TrackedEvent::Interaction {
            category: category.to_string(),
            action: "Click".to_string(),
            label,
        }
    }
}

pub trait AnalyticsSink {
    fn record(&self, event: &TrackedEvent);
}

/// Writes each event as one JSON log line.
#[derive(Debug, Default)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn record(&self, event: &TrackedEvent) {
        match serde_json::to_string(event) {
            Ok(json) => info!("Event tracked: {json}"),
            Err(err) => warn!("could not encode {event:?}: {err}"),
        }
    }
}

/// Keeps every event in memory, for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<TrackedEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<TrackedEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl AnalyticsSink for RecordingSink {
    fn record(&self, event: &TrackedEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Logs the page view and clicks on the download and social links.
pub struct EventLogger {
    download_links: Vec<NodeId>,
    social_links: Vec<NodeId>,
}

impl EventLogger {
    pub fn mount(env: &Env) -> Self {
        let config = &env.config.analytics;
        env.track(TrackedEvent::PageView);

        let download_links = env.page.query_all(&config.download_selector());
        for &link in &download_links {
            let env_ = env.clone();
            env.page.listen(
                Target::Node(link),
                EventKind::Click,
                Box::new(move |_| {
                    let label = env_.page.text(link).trim().to_string();
                    env_.track(TrackedEvent::click("Download Button", Some(label)));
                }),
            );
        }

        let social_links = env.page.query_all(&config.social_link);
        for &link in &social_links {
            let env_ = env.clone();
            env.page.listen(
                Target::Node(link),
                EventKind::Click,
                Box::new(move |_| {
                    let platform = env_.page.attribute(link, "aria-label");
                    env_.track(TrackedEvent::click("Social Link", platform));
                }),
            );
        }

        debug!(
            "analytics: {} download link(s), {} social link(s)",
            download_links.len(),
            social_links.len()
        );
        Self {
            download_links,
            social_links,
        }
    }

    pub fn tracked_links(&self) -> usize {
        self.download_links.len() + self.social_links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_a_snake_case_tag() {
        let json = serde_json::to_value(TrackedEvent::FaqOpened { question: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "faq_opened", "question": 3 }));

        let json = serde_json::to_value(TrackedEvent::click("Social Link", None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event": "interaction",
                "category": "Social Link",
                "action": "Click",
                "label": null
            })
        );
    }

    #[test]
    fn page_view_is_a_bare_tag() {
        let json = serde_json::to_string(&TrackedEvent::PageView).unwrap();
        assert_eq!(json, r#"{"event":"page_view"}"#);
    }
}
