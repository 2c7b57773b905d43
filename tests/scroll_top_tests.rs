//! Integration tests for the scroll-to-top button

use landing_fx::components::scroll_top::{ScrollToTopButton, STYLE_ID, VISIBLE_CLASS};
use landing_fx::config::Config;
use landing_fx::page::memory::Harness;
use landing_fx::page::{Page, ScrollBehavior};
use proptest::prelude::*;

#[test]
fn test_button_is_injected_with_label_and_styles() {
    let h = Harness::new();
    let button = ScrollToTopButton::mount(&h.env()).unwrap().node();

    assert!(h.page.is_attached(button));
    assert_eq!(h.page.tag(button), "button");
    assert!(h.page.has_class(button, "scroll-to-top"));
    assert!(!h.page.has_class(button, VISIBLE_CLASS));
    assert_eq!(h.page.attribute(button, "aria-label").as_deref(), Some("Scroll to top"));
    assert!(h.page.inner_html(button).unwrap().starts_with("<svg"));
    assert_eq!(h.page.query_all(&format!("style#{STYLE_ID}")).len(), 1);
}

#[test]
fn test_visibility_switches_strictly_above_threshold() {
    let h = Harness::new();
    let button = ScrollToTopButton::mount(&h.env()).unwrap().node();

    for (y, visible) in [(499.0, false), (500.0, false), (501.0, true), (500.0, false)] {
        h.page.scroll_window(y);
        assert_eq!(h.page.has_class(button, VISIBLE_CLASS), visible, "offset {y}");
        h.scheduler.advance(100);
    }
}

#[test]
fn test_click_scrolls_smoothly_to_top() {
    let h = Harness::new();
    let button = ScrollToTopButton::mount(&h.env()).unwrap().node();
    h.page.set_scroll_y(1200.0);

    h.page.click(button);

    assert_eq!(h.page.scroll_requests(), vec![(0.0, ScrollBehavior::Smooth)]);
    assert_eq!(h.page.scroll_y(), 0.0);
}

#[test]
fn test_style_block_shared_between_mounts() {
    let h = Harness::new();
    ScrollToTopButton::mount(&h.env()).unwrap();
    ScrollToTopButton::mount(&h.env()).unwrap();

    assert_eq!(h.page.query_all(".scroll-to-top").len(), 2);
    assert_eq!(h.page.query_all(&format!("style#{STYLE_ID}")).len(), 1);
}

#[test]
fn test_threshold_from_config() {
    let h = Harness::new();
    let config = Config::from_json(r#"{ "scroll_top": { "threshold": 800.0 } }"#).unwrap();
    let button = ScrollToTopButton::mount(&h.env_with(config)).unwrap().node();

    h.page.scroll_window(600.0);
    assert!(!h.page.has_class(button, VISIBLE_CLASS));

    h.scheduler.advance(100);
    h.page.scroll_window(801.0);
    assert!(h.page.has_class(button, VISIBLE_CLASS));
}

proptest! {
    #[test]
    fn visible_exactly_when_past_threshold(y in 0.0f64..5000.0) {
        let h = Harness::new();
        let button = ScrollToTopButton::mount(&h.env()).unwrap().node();

        h.page.scroll_window(y);

        prop_assert_eq!(h.page.has_class(button, VISIBLE_CLASS), y > 500.0);
    }
}
