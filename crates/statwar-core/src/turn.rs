//! Turn resolution.
//!
//! One accepted metric choice plays exactly one round:
//!
//! 1. Every player with a card in hand reveals their front card.
//! 2. The highest value of the chosen metric wins.
//! 3. A shared maximum is a tie: the revealed cards join the showdown pot.
//! 4. A single maximum takes the revealed cards and the whole pot.
//! 5. The turn passes to the next player in seat order with a card in hand.
//! 6. The game ends once fewer than two players hold cards or nobody can
//!    reveal.
//!
//! Every round consumes at least one hand card, so a game with `D` cards
//! lasts at most `D` rounds.

use crate::{
    card::{Card, Metric},
    error::GameError,
    player::PlayerId,
    room::{Phase, Room},
};

/// A card revealed in a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    /// Owner at reveal time
    pub player_id: PlayerId,
    /// The card
    pub card: Card,
}

/// Result of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Metric the round was decided on
    pub metric: Metric,
    /// Revealed cards in seat order
    pub revealed: Vec<Reveal>,
    /// True if two or more cards shared the maximum
    pub tie: bool,
    /// Player who took the cards, absent on a tie
    pub round_winner: Option<PlayerId>,
    /// Cards left in the pot after the round
    pub pot_size: usize,
    /// Next chooser, absent once the game is over
    pub current_player_id: Option<PlayerId>,
    /// Winner, if this round ended the game
    pub game_winner: Option<PlayerId>,
}

impl Room {
    /// Play one round on the metric chosen by `requester`.
    ///
    /// # Errors
    ///
    /// Fails without touching the room:
    ///
    /// - `GameError::WrongPhase` if no game is running
    /// - `GameError::NotYourTurn` if `requester` is not the current player
    /// - `GameError::UnknownMetric` if `metric` names no metric
    pub fn resolve_turn(
        &mut self,
        requester: PlayerId,
        metric: &str,
    ) -> Result<RoundOutcome, GameError> {
        if self.phase != Phase::InProgress {
            return Err(GameError::WrongPhase(self.phase));
        }
        if self.current_player_id != Some(requester) {
            return Err(GameError::NotYourTurn);
        }
        let metric: Metric = metric.parse()?;

        let revealed: Vec<Reveal> = self
            .players
            .iter_mut()
            .filter_map(|p| p.reveal().map(|card| Reveal { player_id: p.id(), card }))
            .collect();

        let best = revealed.iter().map(|r| r.card.value(metric)).max().unwrap_or(0);
        let mut leaders = revealed.iter().filter(|r| r.card.value(metric) == best);
        let round_winner = match (leaders.next(), leaders.next()) {
            (Some(only), None) => Some(only.player_id),
            _ => None,
        };

        let cards = revealed.iter().map(|r| r.card.clone());
        match round_winner {
            Some(winner) => {
                let pot = std::mem::take(&mut self.showdown_pot);
                if let Some(player) = self.players.iter_mut().find(|p| p.id() == winner) {
                    player.collect(cards.chain(pot));
                }
            },
            None => self.showdown_pot.extend(cards),
        }

        let seat = self.players.iter().position(|p| p.id() == requester).unwrap_or(0);
        self.current_player_id = self.first_with_hand_from(seat + 1);
        let game_winner = self.settle();

        Ok(RoundOutcome {
            metric,
            tie: round_winner.is_none(),
            revealed,
            round_winner,
            pot_size: self.showdown_pot.len(),
            current_player_id: self.current_player_id,
            game_winner,
        })
    }
}
