use log::{info, warn};

use crate::analytics::EventLogger;
use crate::components::{
    cursor::CustomCursor, faq::AccordionList, navbar::NavigationBar, optimizer::ResourceOptimizer,
    particles::ParticleField, pricing::PricingCardHover, reveal::ScrollRevealObserver,
    scroll_top::ScrollToTopButton, showcase::MediaModal,
};
use crate::env::Env;

pub const LOADED_CLASS: &str = "loaded";

/// Every controller on the page, created once.
pub struct App {
    pub navbar: Option<NavigationBar>,
    pub faq: AccordionList,
    pub particles: Option<ParticleField>,
    pub reveal: ScrollRevealObserver,
    pub pricing: PricingCardHover,
    pub showcase: MediaModal,
    pub scroll_top: Option<ScrollToTopButton>,
    pub analytics: EventLogger,
    pub optimizer: ResourceOptimizer,
    pub cursor: Option<CustomCursor>,
}

impl App {
    /// Expects the page structure to be parsed already.
    pub fn mount(env: &Env) -> Self {
        info!("Landing page enhancements starting");

        let app = Self {
            navbar: NavigationBar::mount(env),
            faq: AccordionList::mount(env),
            particles: ParticleField::mount(env),
            reveal: ScrollRevealObserver::mount(env),
            pricing: PricingCardHover::mount(env),
            showcase: MediaModal::mount(env),
            scroll_top: ScrollToTopButton::mount(env)
                .map_err(|err| warn!("scroll-to-top button disabled: {err}"))
                .ok(),
            analytics: EventLogger::mount(env),
            optimizer: ResourceOptimizer::mount(env),
            cursor: CustomCursor::mount(env),
        };

        env.page.add_class(env.page.body(), LOADED_CLASS);
        info!(
            "Landing page ready: {} faq item(s), {} reveal element(s), {} tracked link(s)",
            app.faq.len(),
            app.reveal.elements().len(),
            app.analytics.tracked_links()
        );
        app
    }

    /// Stops the per-frame loops. Listeners stay attached.
    pub fn shutdown(&self) {
        if let Some(particles) = &self.particles {
            particles.stop();
        }
        if let Some(cursor) = &self.cursor {
            cursor.stop();
        }
    }
}
