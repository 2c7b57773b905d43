//! Integration tests for lazy images and link prefetching

use landing_fx::components::optimizer::ResourceOptimizer;
use landing_fx::page::memory::Harness;
use landing_fx::page::{NodeId, Page};

fn lazy_image(h: &Harness, src: &str) -> NodeId {
    h.page
        .element("img")
        .attr("src", "placeholder.svg")
        .attr("data-src", src)
        .append_to(h.body())
}

fn prefetch_hints(h: &Harness) -> Vec<Option<String>> {
    h.page
        .query_all("link[rel=\"prefetch\"]")
        .into_iter()
        .map(|link| h.page.attribute(link, "href"))
        .collect()
}

#[test]
fn test_image_source_swapped_once_visible() {
    let h = Harness::new();
    let img = lazy_image(&h, "/img/hero.png");
    let optimizer = ResourceOptimizer::mount(&h.env());

    assert!(optimizer.is_lazy_loading());
    assert_eq!(optimizer.lazy_images(), &[img]);
    assert!(h.page.is_observed(img));

    h.page.set_intersecting(img, false);
    assert_eq!(h.page.attribute(img, "src").as_deref(), Some("placeholder.svg"));

    h.page.set_intersecting(img, true);
    assert_eq!(h.page.attribute(img, "src").as_deref(), Some("/img/hero.png"));
    assert_eq!(h.page.attribute(img, "data-src"), None);
    assert!(!h.page.is_observed(img));
}

#[test]
fn test_swapped_image_is_left_alone_afterwards() {
    let h = Harness::new();
    let img = lazy_image(&h, "/img/hero.png");
    ResourceOptimizer::mount(&h.env());

    h.page.set_intersecting(img, true);
    h.page.set_attribute(img, "src", "/img/replaced.png");
    h.page.set_attribute(img, "data-src", "/img/late.png");
    h.page.set_intersecting(img, true);

    assert_eq!(h.page.attribute(img, "src").as_deref(), Some("/img/replaced.png"));
}

#[test]
fn test_images_untouched_without_intersection_detection() {
    let h = Harness::new();
    h.page.set_intersection_supported(false);
    let img = lazy_image(&h, "/img/hero.png");

    let optimizer = ResourceOptimizer::mount(&h.env());

    assert!(!optimizer.is_lazy_loading());
    assert_eq!(h.page.attribute(img, "src").as_deref(), Some("placeholder.svg"));
    assert_eq!(h.page.attribute(img, "data-src").as_deref(), Some("/img/hero.png"));
}

#[test]
fn test_images_without_deferred_source_are_ignored() {
    let h = Harness::new();
    h.page.element("img").attr("src", "/img/logo.svg").append_to(h.body());

    let optimizer = ResourceOptimizer::mount(&h.env());

    assert!(optimizer.lazy_images().is_empty());
}

#[test]
fn test_first_hover_prefetches_link_target() {
    let h = Harness::new();
    let link = h.page.element("a").attr("href", "/pricing").append_to(h.body());
    ResourceOptimizer::mount(&h.env());

    h.page.hover(link);
    h.page.unhover(link);
    h.page.hover(link);

    assert_eq!(prefetch_hints(&h), vec![Some("/pricing".to_string())]);
    assert_eq!(h.page.children(h.page.head()).len(), 1);
}

#[test]
fn test_fragment_and_empty_links_are_not_prefetched() {
    let h = Harness::new();
    let fragment = h.page.element("a").attr("href", "#faq").append_to(h.body());
    let empty = h.page.element("a").attr("href", "").append_to(h.body());
    let bare = h.page.element("a").append_to(h.body());
    ResourceOptimizer::mount(&h.env());

    for link in [fragment, empty, bare] {
        h.page.hover(link);
    }

    assert!(prefetch_hints(&h).is_empty());
}
