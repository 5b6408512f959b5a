//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific game scenarios.

use statwar_core::Phase;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Cards are never created or lost.
///
/// Hands, won piles, the pot and cards discarded by departed players always
/// add up to the number of cards dealt.
pub struct CardConservation;

impl Invariant for CardConservation {
    fn name(&self) -> &'static str {
        "card_conservation"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for room in &state.rooms {
            let accounted = room.cards_in_play() + room.discarded;
            if room.phase != Phase::Lobby && accounted != room.dealt {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "room {}: {} cards accounted for ({} in play, {} discarded), {} dealt",
                        room.code,
                        accounted,
                        room.cards_in_play(),
                        room.discarded,
                        room.dealt
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The current player is seated and can reveal.
///
/// While a game runs, `current_player_id` names a seated player with a
/// non-empty hand. Outside a game there is no current player.
pub struct CurrentPlayerSeated;

impl Invariant for CurrentPlayerSeated {
    fn name(&self) -> &'static str {
        "current_player_seated"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for room in &state.rooms {
            let violation = match (room.phase, room.current_player_id) {
                (Phase::InProgress, None) if !room.players.is_empty() => {
                    Some("game running without a current player".to_string())
                },
                (Phase::InProgress, Some(id)) => match room.player(id) {
                    None => Some(format!("current player {id} is not seated")),
                    Some(p) if p.hand == 0 => Some(format!("current player {id} has no cards")),
                    Some(_) => None,
                },
                (Phase::Lobby | Phase::Finished, Some(id)) => {
                    Some(format!("current player {id} outside a running game"))
                },
                _ => None,
            };

            if let Some(message) = violation {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("room {}: {message}", room.code),
                });
            }
        }
        Ok(())
    }
}

/// The pot holds cards only while a tie is unresolved.
///
/// A non-empty pot means the game is running and the last round tied. A
/// finished game has paid its pot to the winner.
pub struct PotOnlyAfterTie;

impl Invariant for PotOnlyAfterTie {
    fn name(&self) -> &'static str {
        "pot_only_after_tie"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for room in &state.rooms {
            if room.pot == 0 {
                continue;
            }
            if room.phase != Phase::InProgress || room.last_round_tied != Some(true) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "room {}: pot of {} in {:?} after last round tied = {:?}",
                        room.code, room.pot, room.phase, room.last_round_tied
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A finished room has a seated winner.
pub struct FinishedHasWinner;

impl Invariant for FinishedHasWinner {
    fn name(&self) -> &'static str {
        "finished_has_winner"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for room in &state.rooms {
            let ok = match (room.phase, room.winner) {
                (Phase::Finished, Some(id)) => room.player(id).is_some(),
                (Phase::Finished, None) => false,
                (_, winner) => winner.is_none(),
            };

            if !ok {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "room {}: phase {:?} with winner {:?}",
                        room.code, room.phase, room.winner
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::{PlayerSnapshot, RoomSnapshot};

    fn running_room() -> RoomSnapshot {
        RoomSnapshot {
            code: "TEST".to_string(),
            phase: Phase::InProgress,
            players: vec![
                PlayerSnapshot { id: 1, hand: 2, won: 0 },
                PlayerSnapshot { id: 2, hand: 2, won: 0 },
            ],
            current_player_id: Some(1),
            winner: None,
            pot: 0,
            dealt: 4,
            discarded: 0,
            last_round_tied: None,
        }
    }

    #[test]
    fn running_room_passes() {
        let state = SystemSnapshot::single(running_room());
        assert!(CardConservation.check(&state).is_ok());
        assert!(CurrentPlayerSeated.check(&state).is_ok());
        assert!(PotOnlyAfterTie.check(&state).is_ok());
        assert!(FinishedHasWinner.check(&state).is_ok());
    }

    #[test]
    fn lost_card_detected() {
        let mut room = running_room();
        room.players[1].hand = 1;
        let err = CardConservation.check(&SystemSnapshot::single(room)).unwrap_err();
        assert_eq!(err.invariant, "card_conservation");
    }

    #[test]
    fn empty_handed_chooser_detected() {
        let mut room = running_room();
        room.players[0].hand = 0;
        room.players[0].won = 2;
        assert!(CurrentPlayerSeated.check(&SystemSnapshot::single(room)).is_err());
    }

    #[test]
    fn pot_without_tie_detected() {
        let mut room = running_room();
        room.players[0].hand = 1;
        room.players[1].hand = 1;
        room.pot = 2;
        room.last_round_tied = Some(false);
        assert!(PotOnlyAfterTie.check(&SystemSnapshot::single(room.clone())).is_err());

        room.last_round_tied = Some(true);
        assert!(PotOnlyAfterTie.check(&SystemSnapshot::single(room)).is_ok());
    }

    #[test]
    fn finished_without_winner_detected() {
        let mut room = running_room();
        room.phase = Phase::Finished;
        room.current_player_id = None;
        assert!(FinishedHasWinner.check(&SystemSnapshot::single(room.clone())).is_err());

        room.winner = Some(2);
        assert!(FinishedHasWinner.check(&SystemSnapshot::single(room)).is_ok());
    }
}
