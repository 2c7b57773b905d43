use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::ParticleConfig;
use crate::env::Env;
use crate::page::{NodeId, Viewport};
use crate::scheduler::{FrameLoop, LoopHandle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
}

impl Particle {
    pub fn random<R: Rng>(rng: &mut R, viewport: Viewport, config: &ParticleConfig) -> Self {
        Self {
            x: rng.gen::<f64>() * viewport.width,
            y: rng.gen::<f64>() * viewport.height,
            vx: (rng.gen::<f64>() - 0.5) * config.speed_spread,
            vy: (rng.gen::<f64>() - 0.5) * config.speed_spread,
            size: rng.gen::<f64>() * config.size_spread + config.min_size,
        }
    }

    /// Moves one frame, reversing a velocity component once that coordinate
    /// is outside the viewport. The position itself is not clamped.
    pub fn step(&mut self, viewport: Viewport) {
        self.x += self.vx;
        self.y += self.vy;

        if self.x < 0.0 || self.x > viewport.width {
            self.vx = -self.vx;
        }
        if self.y < 0.0 || self.y > viewport.height {
            self.vy = -self.vy;
        }
    }
}

struct Dot {
    node: NodeId,
    particle: Particle,
}

/// Ambient dots drifting around the hero background.
pub struct ParticleField {
    dots: Rc<RefCell<Vec<Dot>>>,
    frames: LoopHandle,
}

impl ParticleField {
    /// Spawns `config.count` random particles. `None` without a container.
    pub fn mount(env: &Env) -> Option<Self> {
        let config = &env.config.particles;
        let Some(container) = env.page.query(&config.container) else {
            debug!("no {} on page, particles disabled", config.container);
            return None;
        };

        let mut rng = SmallRng::seed_from_u64(env.scheduler.now_ms().to_bits());
        let viewport = env.page.viewport();
        let spawned = (0..config.count)
            .map(|_| {
                let particle = Particle::random(&mut rng, viewport, config);
                let color = if config.colors.is_empty() {
                    None
                } else {
                    Some(config.colors[rng.gen_range(0..config.colors.len())].clone())
                };
                (particle, color)
            })
            .collect();

        Some(Self::build(env, container, spawned))
    }

    /// Builds a field from fixed particles, colouring them round-robin.
    pub fn with_particles(env: &Env, container: NodeId, particles: Vec<Particle>) -> Self {
        let colors = &env.config.particles.colors;
        let spawned = particles
            .into_iter()
            .enumerate()
            .map(|(i, p)| (p, (!colors.is_empty()).then(|| colors[i % colors.len()].clone())))
            .collect();
        Self::build(env, container, spawned)
    }

    fn build(env: &Env, container: NodeId, spawned: Vec<(Particle, Option<String>)>) -> Self {
        let page = &env.page;
        let dots: Vec<Dot> = spawned
            .into_iter()
            .filter_map(|(particle, color)| {
                let node = match page.create_element("div") {
                    Ok(node) => node,
                    Err(err) => {
                        warn!("particle skipped: {err}");
                        return None;
                    }
                };
                page.set_style(node, "position", "absolute");
                page.set_style(node, "border-radius", "50%");
                page.set_style(node, "pointer-events", "none");
                if let Some(color) = color {
                    page.set_style(node, "background", &color);
                }
                page.set_style(node, "filter", "blur(2px)");
                page.append_child(container, node);
                Some(Dot { node, particle })
            })
            .collect();
        debug!("spawned {} particles", dots.len());

        let dots = Rc::new(RefCell::new(dots));
        let frames = {
            let dots = dots.clone();
            let page = env.page.clone();
            FrameLoop::start(env.scheduler.clone(), move || {
                let viewport = page.viewport();
                for dot in dots.borrow_mut().iter_mut() {
                    dot.particle.step(viewport);
                    let p = dot.particle;
                    page.set_style(dot.node, "left", &format!("{}px", p.x));
                    page.set_style(dot.node, "top", &format!("{}px", p.y));
                    page.set_style(dot.node, "width", &format!("{}px", p.size));
                    page.set_style(dot.node, "height", &format!("{}px", p.size));
                }
            })
        };

        Self { dots, frames }
    }

    pub fn particles(&self) -> Vec<Particle> {
        self.dots.borrow().iter().map(|d| d.particle).collect()
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.dots.borrow().iter().map(|d| d.node).collect()
    }

    pub fn stop(&self) {
        self.frames.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport {
        width: 100.0,
        height: 50.0,
    };

    #[test]
    fn overshoots_before_reversing() {
        let mut p = Particle {
            x: 99.5,
            y: 10.0,
            vx: 1.0,
            vy: 0.0,
            size: 3.0,
        };
        p.step(VIEW);
        assert_eq!(p.x, 100.5);
        assert_eq!(p.vx, -1.0);
        p.step(VIEW);
        assert_eq!(p.x, 99.5);
        assert_eq!(p.vx, -1.0);
    }

    #[test]
    fn random_particles_stay_in_configured_ranges() {
        let config = ParticleConfig::default();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = Particle::random(&mut rng, VIEW, &config);
            assert!((0.0..VIEW.width).contains(&p.x));
            assert!((0.0..VIEW.height).contains(&p.y));
            assert!((-0.25..0.25).contains(&p.vx));
            assert!((-0.25..0.25).contains(&p.vy));
            assert!((2.0..6.0).contains(&p.size));
        }
    }
}
