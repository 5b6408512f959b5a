//! Per-room game state machine.
//!
//! A room moves `Lobby -> InProgress -> Finished` and never back. Every
//! operation either fails with a [`GameError`] and leaves the room untouched,
//! or applies completely.
//!
//! # Invariants
//!
//! - Join order is turn order.
//! - While `InProgress`, `current_player_id` names a seated player with a
//!   non-empty hand, and at least two players hold cards.
//! - Cards held in hands, won piles and the pot, plus cards discarded by
//!   departed players, always add up to the number dealt.
//! - A `Finished` room has a winner and no current player.

use crate::{
    card::Card,
    code::RoomCode,
    deck::Deck,
    error::GameError,
    player::{Player, PlayerId},
};

/// Lifecycle phase of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Accepting players
    Lobby,
    /// Cards dealt, rounds being played
    InProgress,
    /// Winner decided
    Finished,
}

/// What changed when a player left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The removed player, with the cards they took out of play
    pub player: Player,
    /// New host, if the leaver was host and someone remains
    pub new_host: Option<PlayerId>,
    /// Player who inherited the turn, if the leaver was choosing
    pub turn_passed_to: Option<PlayerId>,
    /// Winner, if the departure ended the game
    pub game_winner: Option<PlayerId>,
    /// No players remain
    pub room_empty: bool,
}

/// One isolated match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub(crate) code: RoomCode,
    pub(crate) players: Vec<Player>,
    pub(crate) host_id: PlayerId,
    pub(crate) current_player_id: Option<PlayerId>,
    pub(crate) showdown_pot: Vec<Card>,
    pub(crate) phase: Phase,
    pub(crate) winner: Option<PlayerId>,
    pub(crate) dealt: usize,
    pub(crate) discarded: usize,
}

impl Room {
    /// Open a lobby whose only player is the host.
    pub fn new(code: RoomCode, host_id: PlayerId, host_name: impl Into<String>) -> Self {
        Self {
            code,
            players: vec![Player::new(host_id, host_name)],
            host_id,
            current_player_id: None,
            showdown_pot: Vec::new(),
            phase: Phase::Lobby,
            winner: None,
            dealt: 0,
            discarded: 0,
        }
    }

    /// Room code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Players in turn order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Look up a seated player.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    /// True if `id` is seated here.
    pub fn contains(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    /// Host (may start the game).
    pub fn host_id(&self) -> PlayerId {
        self.host_id
    }

    /// Player who chooses the next metric.
    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.current_player_id
    }

    /// The current player.
    pub fn current_player(&self) -> Option<&Player> {
        self.current_player_id.and_then(|id| self.player(id))
    }

    /// Cards carried over from tied rounds.
    pub fn showdown_pot(&self) -> &[Card] {
        &self.showdown_pot
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Winner once `Finished`.
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Cards dealt at start.
    pub fn dealt(&self) -> usize {
        self.dealt
    }

    /// Cards that left play with departed players.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Cards currently held by seated players or the pot.
    pub fn cards_in_play(&self) -> usize {
        self.players.iter().map(Player::card_count).sum::<usize>() + self.showdown_pot.len()
    }

    /// Seat a new player at the end of the turn order.
    ///
    /// # Errors
    ///
    /// - `GameError::RoomNotJoinable` if the game has started
    /// - `GameError::AlreadySeated` if `id` is already in this room
    pub fn join(&mut self, id: PlayerId, name: impl Into<String>) -> Result<(), GameError> {
        if self.phase != Phase::Lobby {
            return Err(GameError::RoomNotJoinable);
        }
        if self.contains(id) {
            return Err(GameError::AlreadySeated(id));
        }

        self.players.push(Player::new(id, name));
        Ok(())
    }

    /// Deal `deck` and begin play.
    ///
    /// Cards are dealt one at a time in turn order until the deck runs out,
    /// so hand sizes differ by at most one. The first player with a card
    /// chooses first. If the deal leaves fewer than two players holding
    /// cards the room finishes immediately.
    ///
    /// # Errors
    ///
    /// - `GameError::NotHost` if `requester` is not the host
    /// - `GameError::WrongPhase` if the room is not in its lobby
    /// - `GameError::EmptyDeck` if `deck` has no cards
    pub fn start(&mut self, requester: PlayerId, deck: Deck) -> Result<(), GameError> {
        if requester != self.host_id || !self.contains(requester) {
            return Err(GameError::NotHost);
        }
        if self.phase != Phase::Lobby {
            return Err(GameError::WrongPhase(self.phase));
        }
        if deck.is_empty() {
            return Err(GameError::EmptyDeck);
        }

        for player in &mut self.players {
            player.clear();
        }
        self.showdown_pot.clear();
        self.winner = None;
        self.discarded = 0;
        self.dealt = deck.len();

        let seats = self.players.len();
        for (i, card) in deck.into_cards().into_iter().enumerate() {
            self.players[i % seats].deal(card);
        }

        self.phase = Phase::InProgress;
        self.current_player_id = self.first_with_hand_from(0);
        self.settle();
        Ok(())
    }

    /// Remove a player from the room.
    ///
    /// The leaver's cards leave play. The first remaining player becomes host
    /// if the leaver was host. During a game, a leaving chooser passes the
    /// turn to the next player with a card in hand, and the departure may end
    /// the game. Returns `None` if `id` is not seated here.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Departure> {
        let seat = self.players.iter().position(|p| p.id() == id)?;
        let player = self.players.remove(seat);

        let mut new_host = None;
        if self.host_id == id
            && let Some(first) = self.players.first()
        {
            self.host_id = first.id();
            new_host = Some(first.id());
        }

        let mut turn_passed_to = None;
        let mut game_winner = None;
        if self.phase == Phase::InProgress {
            self.discarded += player.card_count();

            if self.current_player_id == Some(id) {
                self.current_player_id = self.first_with_hand_from(seat);
                turn_passed_to = self.current_player_id;
            }

            game_winner = self.settle();
            if game_winner.is_some() {
                turn_passed_to = None;
            }
        }

        Some(Departure {
            player,
            new_host,
            turn_passed_to,
            game_winner,
            room_empty: self.players.is_empty(),
        })
    }

    /// First player with a card in hand, scanning turn order from `seat`
    /// and wrapping around.
    pub(crate) fn first_with_hand_from(&self, seat: usize) -> Option<PlayerId> {
        let seats = self.players.len();
        (0..seats)
            .map(|offset| &self.players[(seat + offset) % seats])
            .find(|p| p.has_hand())
            .map(Player::id)
    }

    /// Finish the game if no further meaningful round is possible.
    ///
    /// The game is over when at most one player holds cards (that player
    /// wins), or when nobody can reveal a card (the largest won pile wins,
    /// earliest seat on a tie). Leftover pot cards go to the winner.
    pub(crate) fn settle(&mut self) -> Option<PlayerId> {
        if self.phase != Phase::InProgress {
            return None;
        }

        let mut active = self.players.iter().filter(|p| p.is_active());
        let sole_active = match (active.next(), active.next()) {
            (Some(only), None) => Some(only.id()),
            _ => None,
        };
        let winner = sole_active.or_else(|| {
            if self.players.iter().any(Player::has_hand) {
                return None;
            }
            // max_by_key keeps the last maximum; reversing keeps the earliest seat
            self.players.iter().rev().max_by_key(|p| p.won_pile().len()).map(Player::id)
        })?;

        let pot = std::mem::take(&mut self.showdown_pot);
        if let Some(player) = self.players.iter_mut().find(|p| p.id() == winner) {
            player.collect(pot);
        }

        self.phase = Phase::Finished;
        self.current_player_id = None;
        self.winner = Some(winner);
        Some(winner)
    }
}
