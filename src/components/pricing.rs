use crate::env::Env;
use crate::page::{EventKind, NodeId, Target};

/// Primes the transform/shadow transition when a pricing card is hovered.
/// Leaving a card changes nothing.
pub struct PricingCardHover {
    cards: Vec<NodeId>,
}

impl PricingCardHover {
    pub fn mount(env: &Env) -> Self {
        let cards = env.page.query_all(&env.config.pricing.card);
        for &card in &cards {
            let env_ = env.clone();
            env.page.listen(
                Target::Node(card),
                EventKind::MouseEnter,
                Box::new(move |_| {
                    env_.page
                        .set_style(card, "transition", &env_.config.pricing.transition);
                }),
            );
        }
        Self { cards }
    }

    pub fn cards(&self) -> &[NodeId] {
        &self.cards
    }
}
