//! Integration tests for scroll-triggered entrance animations

use landing_fx::components::reveal::{entering_viewport, RevealMode, ScrollRevealObserver};
use landing_fx::page::memory::Harness;
use landing_fx::page::{IntersectionOptions, Page, Rect};

const ANIMATE: &str = "aos-animate";

#[test]
fn test_observer_uses_threshold_and_bottom_margin() {
    let h = Harness::new();
    let card = h.page.element("div").attr("data-aos", "fade-up").append_to(h.body());

    let reveal = ScrollRevealObserver::mount(&h.env());

    assert_eq!(reveal.mode(), RevealMode::Intersection);
    assert!(h.page.is_observed(card));
    assert_eq!(
        h.page.observer_options(),
        vec![IntersectionOptions {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
        }]
    );
}

#[test]
fn test_intersecting_element_animates_after_its_delay() {
    let h = Harness::new();
    let first = h.page.element("div").attr("data-aos", "fade-up").append_to(h.body());
    let delayed = h
        .page
        .element("div")
        .attr("data-aos", "fade-up")
        .attr("data-aos-delay", "200")
        .append_to(h.body());
    let reveal = ScrollRevealObserver::mount(&h.env());

    h.page.set_intersecting(first, false);
    assert!(!reveal.is_triggered(first));

    h.page.set_intersecting(first, true);
    h.page.set_intersecting(delayed, true);
    h.scheduler.advance(0);
    assert!(h.page.has_class(first, ANIMATE));
    assert!(!h.page.has_class(delayed, ANIMATE));

    h.scheduler.advance(199);
    assert!(!h.page.has_class(delayed, ANIMATE));
    h.scheduler.advance(1);
    assert!(h.page.has_class(delayed, ANIMATE));
}

#[test]
fn test_element_stops_being_observed_once_triggered() {
    let h = Harness::new();
    let card = h
        .page
        .element("div")
        .attr("data-aos", "zoom-in")
        .attr("data-aos-delay", "100")
        .append_to(h.body());
    let reveal = ScrollRevealObserver::mount(&h.env());

    h.page.set_intersecting(card, true);
    h.page.set_intersecting(card, true);
    h.page.set_intersecting(card, false);

    assert!(reveal.is_triggered(card));
    assert!(!h.page.is_observed(card));
    assert_eq!(h.scheduler.pending_timeouts(), 1);
}

#[test]
fn test_malformed_delay_counts_as_zero() {
    let h = Harness::new();
    let card = h
        .page
        .element("div")
        .attr("data-aos", "fade-up")
        .attr("data-aos-delay", "soon")
        .append_to(h.body());
    ScrollRevealObserver::mount(&h.env());

    h.page.set_intersecting(card, true);
    h.scheduler.advance(0);

    assert!(h.page.has_class(card, ANIMATE));
}

#[test]
fn test_fallback_checks_on_mount_and_on_scroll() {
    let h = Harness::new();
    h.page.set_intersection_supported(false);
    let visible = h
        .page
        .element("div")
        .attr("data-aos", "fade-up")
        .rect(Rect::new(300.0, 0.0, 400.0, 200.0))
        .append_to(h.body());
    let below = h
        .page
        .element("div")
        .attr("data-aos", "fade-up")
        .rect(Rect::new(850.0, 0.0, 400.0, 200.0))
        .append_to(h.body());

    let reveal = ScrollRevealObserver::mount(&h.env());
    assert_eq!(reveal.mode(), RevealMode::ScrollFallback);
    assert!(reveal.is_triggered(visible));
    assert!(!reveal.is_triggered(below));

    h.page.set_rect(below, Rect::new(700.0, 0.0, 400.0, 200.0));
    h.page.scroll_window(150.0);
    assert!(reveal.is_triggered(below));

    h.scheduler.advance(100);
    assert!(h.page.has_class(visible, ANIMATE));
    assert!(h.page.has_class(below, ANIMATE));
}

#[test]
fn test_fallback_never_schedules_twice() {
    let h = Harness::new();
    h.page.set_intersection_supported(false);
    let card = h
        .page
        .element("div")
        .attr("data-aos", "fade-up")
        .attr("data-aos-delay", "1000")
        .rect(Rect::new(100.0, 0.0, 400.0, 200.0))
        .append_to(h.body());
    ScrollRevealObserver::mount(&h.env());

    for y in [10.0, 20.0, 30.0] {
        h.page.scroll_window(y);
        h.scheduler.advance(100);
    }
    // Only the animation timer is left; the throttle timers have expired.
    assert_eq!(h.scheduler.pending_timeouts(), 1);

    h.scheduler.advance(700);
    assert!(h.page.has_class(card, ANIMATE));
    assert_eq!(h.scheduler.pending_timeouts(), 0);
}

#[test]
fn test_entering_viewport_boundaries() {
    // 900 * 0.9 = 810
    assert!(entering_viewport(Rect::new(810.0, 0.0, 10.0, 10.0), 900.0, 0.9));
    assert!(!entering_viewport(Rect::new(811.0, 0.0, 10.0, 10.0), 900.0, 0.9));
    assert!(entering_viewport(Rect::new(-10.0, 0.0, 10.0, 10.0), 900.0, 0.9));
    assert!(!entering_viewport(Rect::new(-11.0, 0.0, 10.0, 10.0), 900.0, 0.9));
}
