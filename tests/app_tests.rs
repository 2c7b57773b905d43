//! Integration tests for mounting the whole page

use landing_fx::analytics::TrackedEvent;
use landing_fx::app::{App, LOADED_CLASS};
use landing_fx::config::Config;
use landing_fx::page::memory::Harness;
use landing_fx::page::{NodeId, Page};

struct Landing {
    faq_question: NodeId,
    play_button: NodeId,
}

fn landing_page(h: &Harness) -> Landing {
    let body = h.body();
    h.page.element("nav").id("navbar").append_to(body);

    let hero = h.page.element("section").class("hero").append_to(body);
    h.page.element("div").class("floating-particles").append_to(hero);
    h.page
        .element("a")
        .attr("href", "https://testflight.apple.com/join/rCjyxU41")
        .text("Download")
        .append_to(hero);

    h.page
        .element("div")
        .class("feature-card")
        .attr("data-aos", "fade-up")
        .append_to(body);
    h.page
        .element("div")
        .class("pricing-card")
        .attr("data-aos", "fade-up")
        .attr("data-aos-delay", "100")
        .append_to(body);

    let item = h.page.element("div").class("showcase-item").append_to(body);
    h.page
        .element("img")
        .class("showcase-gif")
        .attr("data-src", "/media/demo.gif")
        .append_to(item);
    let content = h.page.element("div").class("showcase-content").append_to(item);
    h.page.element("h3").text("Demo").append_to(content);
    h.page.element("p").text("A short tour").append_to(content);
    let play_button = h.page.element("button").class("play-button").append_to(item);

    let faq = h.page.element("div").class("faq-item").append_to(body);
    let faq_question = h.page.element("div").class("faq-question").append_to(faq);

    h.page
        .element("a")
        .class("social-link")
        .attr("aria-label", "GitHub")
        .append_to(body);

    Landing {
        faq_question,
        play_button,
    }
}

#[test]
fn test_mount_wires_every_controller() {
    let h = Harness::new();
    let landing = landing_page(&h);

    let app = App::mount(&h.env());

    assert!(h.page.has_class(h.body(), LOADED_CLASS));
    assert!(app.navbar.is_some());
    assert_eq!(app.particles.as_ref().map(|p| p.nodes().len()), Some(30));
    assert!(app.cursor.is_some());
    assert_eq!(app.faq.len(), 1);
    assert_eq!(app.reveal.elements().len(), 2);
    assert_eq!(app.pricing.cards().len(), 1);
    assert_eq!(app.analytics.tracked_links(), 2);
    assert_eq!(app.optimizer.lazy_images().len(), 1);
    let scroll_top = app.scroll_top.as_ref().unwrap();
    assert!(h.page.is_attached(scroll_top.node()));

    h.page.click(landing.faq_question);
    h.page.click(landing.play_button);
    assert_eq!(
        h.sink.events(),
        vec![TrackedEvent::PageView, TrackedEvent::FaqOpened { question: 1 }]
    );
    assert!(h.page.query(".showcase-modal").is_some());
}

#[test]
fn test_bare_page_still_mounts() {
    let h = Harness::new();

    let app = App::mount(&h.env());

    assert!(h.page.has_class(h.body(), LOADED_CLASS));
    assert!(app.navbar.is_none());
    assert!(app.particles.is_none());
    assert!(app.faq.is_empty());
    assert!(h.page.query(".scroll-to-top").is_some());
    assert_eq!(h.sink.events(), vec![TrackedEvent::PageView]);
}

#[test]
fn test_shutdown_stops_frame_loops() {
    let h = Harness::new();
    landing_page(&h);
    let app = App::mount(&h.env());
    assert_eq!(h.scheduler.pending_frames(), 2);

    app.shutdown();
    h.scheduler.run_frame();

    assert_eq!(h.scheduler.pending_frames(), 0);
}

#[test]
fn test_mobile_viewport_skips_cursor() {
    let h = Harness::new();
    h.page.set_viewport(390.0, 844.0);
    landing_page(&h);

    let app = App::mount(&h.env());

    assert!(app.cursor.is_none());
    assert!(h.page.query(".custom-cursor").is_none());
    assert_eq!(h.scheduler.pending_frames(), 1);
}

#[test]
fn test_config_overrides_reach_controllers() {
    let h = Harness::new();
    landing_page(&h);
    let config = Config::from_json(
        r#"{
            "particles": { "count": 5 },
            "cursor": { "enabled": false },
            "scroll_top": { "threshold": 1000.0 }
        }"#,
    )
    .unwrap();

    let app = App::mount(&h.env_with(config));

    assert_eq!(app.particles.as_ref().map(|p| p.nodes().len()), Some(5));
    assert!(app.cursor.is_none());

    h.page.scroll_window(800.0);
    let scroll_top = app.scroll_top.as_ref().unwrap();
    assert!(!h.page.has_class(scroll_top.node(), "visible"));
}
