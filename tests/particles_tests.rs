//! Integration tests for the particle background

use landing_fx::components::particles::{Particle, ParticleField};
use landing_fx::page::memory::Harness;
use landing_fx::page::Page;

fn particle(x: f64, y: f64, vx: f64, vy: f64, size: f64) -> Particle {
    Particle { x, y, vx, vy, size }
}

#[test]
fn test_mount_spawns_configured_count() {
    let h = Harness::new();
    let container = h.page.element("div").class("floating-particles").append_to(h.body());

    let field = ParticleField::mount(&h.env()).unwrap();

    assert_eq!(field.nodes().len(), 30);
    assert_eq!(h.page.children(container), field.nodes());
    for node in field.nodes() {
        assert_eq!(h.page.style(node, "position").as_deref(), Some("absolute"));
        assert!(h.page.style(node, "background").unwrap().starts_with("rgba("));
    }
    for p in field.particles() {
        assert!((0.0..1440.0).contains(&p.x));
        assert!((0.0..900.0).contains(&p.y));
    }
}

#[test]
fn test_missing_container_disables_field() {
    let h = Harness::new();
    assert!(ParticleField::mount(&h.env()).is_none());
    assert_eq!(h.scheduler.pending_frames(), 0);
}

#[test]
fn test_positions_after_five_frames() {
    let h = Harness::new();
    h.page.set_viewport(100.0, 50.0);
    let container = h.page.element("div").class("floating-particles").append_to(h.body());
    let field = ParticleField::with_particles(
        &h.env(),
        container,
        vec![
            particle(10.0, 10.0, 2.0, 1.0, 3.0),
            particle(98.0, 48.0, 1.0, 1.0, 4.0),
        ],
    );

    h.scheduler.run_frames(5);

    let particles = field.particles();
    assert_eq!(particles[0], particle(20.0, 15.0, 2.0, 1.0, 3.0));
    // Overshoots to (101, 51) on frame 3, then comes back
    assert_eq!(particles[1], particle(99.0, 49.0, -1.0, -1.0, 4.0));

    let node = field.nodes()[1];
    assert_eq!(h.page.style(node, "left").as_deref(), Some("99px"));
    assert_eq!(h.page.style(node, "top").as_deref(), Some("49px"));
    assert_eq!(h.page.style(node, "width").as_deref(), Some("4px"));
    assert_eq!(h.page.style(node, "height").as_deref(), Some("4px"));
}

#[test]
fn test_fixed_particles_take_colors_in_order() {
    let h = Harness::new();
    let container = h.page.element("div").append_to(h.body());
    let env = h.env();
    let field = ParticleField::with_particles(
        &env,
        container,
        (0..6).map(|_| particle(1.0, 1.0, 0.0, 0.0, 2.0)).collect(),
    );

    let colors = &env.config.particles.colors;
    let nodes = field.nodes();
    assert_eq!(h.page.style(nodes[0], "background").as_ref(), Some(&colors[0]));
    assert_eq!(h.page.style(nodes[5], "background").as_ref(), Some(&colors[0]));
    assert_eq!(h.page.style(nodes[1], "background").as_ref(), Some(&colors[1]));
}

#[test]
fn test_stop_freezes_positions() {
    let h = Harness::new();
    let container = h.page.element("div").append_to(h.body());
    let field = ParticleField::with_particles(&h.env(), container, vec![particle(10.0, 10.0, 1.0, 1.0, 2.0)]);

    h.scheduler.run_frames(2);
    field.stop();
    h.scheduler.run_frames(3);

    assert_eq!(field.particles()[0].x, 12.0);
    assert_eq!(h.scheduler.pending_frames(), 0);
}
