//! Deck factory.
//!
//! The catalog is fixed; every game gets a fresh Fisher–Yates permutation of
//! it. Shuffles are seeded from the [`Environment`], so a simulated game with
//! a known seed always deals the same hands.

use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

use crate::{
    card::{Card, Metrics},
    env::Environment,
};

/// Letter, attack, defense, speed.
const CATALOG: [(char, u32, u32, u32); 16] = [
    ('A', 50, 30, 20),
    ('B', 40, 60, 25),
    ('C', 70, 20, 50),
    ('D', 30, 40, 70),
    ('E', 60, 50, 30),
    ('F', 20, 80, 40),
    ('G', 80, 35, 45),
    ('H', 45, 55, 65),
    ('I', 35, 70, 55),
    ('J', 90, 15, 35),
    ('K', 55, 45, 80),
    ('L', 25, 65, 60),
    ('M', 65, 25, 75),
    ('N', 75, 60, 10),
    ('O', 15, 90, 85),
    ('P', 85, 40, 25),
];

/// Ordered stack of cards to be dealt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Number of cards in the standard catalog.
    pub const STANDARD_SIZE: usize = CATALOG.len();

    /// The standard catalog in catalog order.
    #[must_use]
    pub fn standard() -> Self {
        let cards = CATALOG
            .iter()
            .map(|&(letter, attack, defense, speed)| {
                Card::new(
                    format!("Card {letter}"),
                    format!("/cards/card{letter}.png"),
                    Metrics::new(attack, defense, speed),
                )
            })
            .collect();
        Self { cards }
    }

    /// The standard catalog, shuffled with a seed drawn from `env`.
    #[must_use]
    pub fn shuffled<E: Environment>(env: &E) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(env.random_u64());
        let mut deck = Self::standard();
        deck.shuffle(&mut rng);
        deck
    }

    /// A deck holding exactly `cards`, in order.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Permute the deck in place.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if the deck holds no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards in dealing order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Consume the deck, yielding its cards in dealing order.
    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::card::Metric;

    #[test]
    fn standard_catalog_has_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), Deck::STANDARD_SIZE);

        let names: HashSet<_> = deck.cards().iter().map(Card::name).collect();
        assert_eq!(names.len(), Deck::STANDARD_SIZE);
    }

    #[test]
    fn standard_catalog_starts_with_sample_cards() {
        let deck = Deck::standard();
        let first = &deck.cards()[0];
        assert_eq!(first.name(), "Card A");
        assert_eq!(first.image_ref(), "/cards/cardA.png");
        assert_eq!(first.value(Metric::Attack), 50);
        assert_eq!(deck.cards()[2].value(Metric::Attack), 70);
        assert_eq!(deck.cards()[3].value(Metric::Speed), 70);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut deck = Deck::standard();
        deck.shuffle(&mut rng);

        let mut shuffled: Vec<_> = deck.cards().iter().map(|c| c.name().to_string()).collect();
        let mut original: Vec<_> =
            Deck::standard().cards().iter().map(|c| c.name().to_string()).collect();
        shuffled.sort();
        original.sort();
        assert_eq!(shuffled, original);
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = Deck::standard();
        let mut b = Deck::standard();
        a.shuffle(&mut ChaCha8Rng::seed_from_u64(42));
        b.shuffle(&mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
