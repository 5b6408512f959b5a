//! A seat at the table.

use std::collections::VecDeque;

use crate::{card::Card, error::GameError};

/// Player identifier. Equal to the session id of the player's connection.
pub type PlayerId = u64;

/// Longest display name, in characters.
///
/// Keeps every player-listing event well under the frame payload limit.
pub const MAX_NAME_LEN: usize = 32;

/// Check a display name before it is seated anywhere.
///
/// # Errors
///
/// - `GameError::NameTooLong` if `name` exceeds [`MAX_NAME_LEN`] characters
pub fn validate_name(name: &str) -> Result<(), GameError> {
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(GameError::NameTooLong { len, max: MAX_NAME_LEN });
    }
    Ok(())
}

/// One player's cards.
///
/// The hand is played from the front. Won cards go to a separate pile and are
/// never played again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    hand: VecDeque<Card>,
    won_pile: Vec<Card>,
}

impl Player {
    /// Create a player with no cards.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), hand: VecDeque::new(), won_pile: Vec::new() }
    }

    /// Player id.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cards in hand, next to play first.
    pub fn hand(&self) -> &VecDeque<Card> {
        &self.hand
    }

    /// Cards won so far.
    pub fn won_pile(&self) -> &[Card] {
        &self.won_pile
    }

    /// Card that would be revealed next.
    pub fn top_card(&self) -> Option<&Card> {
        self.hand.front()
    }

    /// True if the player can reveal a card.
    pub fn has_hand(&self) -> bool {
        !self.hand.is_empty()
    }

    /// True if the player holds any card at all.
    pub fn is_active(&self) -> bool {
        self.has_hand() || !self.won_pile.is_empty()
    }

    /// Total cards held.
    pub fn card_count(&self) -> usize {
        self.hand.len() + self.won_pile.len()
    }

    pub(crate) fn clear(&mut self) {
        self.hand.clear();
        self.won_pile.clear();
    }

    pub(crate) fn deal(&mut self, card: Card) {
        self.hand.push_back(card);
    }

    pub(crate) fn reveal(&mut self) -> Option<Card> {
        self.hand.pop_front()
    }

    pub(crate) fn collect(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.won_pile.extend(cards);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Metrics;

    fn card(name: &str) -> Card {
        Card::new(name, "", Metrics::new(1, 1, 1))
    }

    #[test]
    fn names_up_to_the_limit_are_accepted() {
        assert_eq!(validate_name(""), Ok(()));
        assert_eq!(validate_name(&"é".repeat(MAX_NAME_LEN)), Ok(()));
        assert_eq!(
            validate_name(&"x".repeat(MAX_NAME_LEN + 1)),
            Err(GameError::NameTooLong { len: MAX_NAME_LEN + 1, max: MAX_NAME_LEN })
        );
    }

    #[test]
    fn hand_plays_from_front() {
        let mut player = Player::new(1, "ana");
        player.deal(card("first"));
        player.deal(card("second"));

        assert_eq!(player.top_card().map(Card::name), Some("first"));
        assert_eq!(player.reveal().map(|c| c.name().to_string()), Some("first".to_string()));
        assert_eq!(player.top_card().map(Card::name), Some("second"));
    }

    #[test]
    fn won_cards_keep_player_active() {
        let mut player = Player::new(1, "ana");
        assert!(!player.is_active());

        player.collect([card("won")]);
        assert!(!player.has_hand());
        assert!(player.is_active());
        assert_eq!(player.card_count(), 1);

        player.clear();
        assert!(!player.is_active());
    }
}
