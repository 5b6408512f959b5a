//! Property-based tests for dealing and turn resolution
//!
//! Games are driven with random player counts, decks and metric choices. After
//! every step the room must conserve cards and keep a valid chooser, and every
//! game must finish within one round per dealt card.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statwar_core::{Card, Deck, GameError, Metric, Metrics, Phase, Room};

fn arbitrary_metric() -> impl Strategy<Value = Metric> {
    prop_oneof![Just(Metric::Attack), Just(Metric::Defense), Just(Metric::Speed)]
}

/// Small value range so ties are common.
fn arbitrary_deck() -> impl Strategy<Value = Deck> {
    prop::collection::vec((0u32..4, 0u32..4, 0u32..4), 1..40).prop_map(|stats| {
        Deck::from_cards(
            stats
                .into_iter()
                .enumerate()
                .map(|(i, (a, d, s))| Card::new(format!("c{i}"), "", Metrics::new(a, d, s)))
                .collect(),
        )
    })
}

fn seated_room(players: u64) -> Room {
    let mut room = Room::new("PROP".parse().unwrap(), 1, "p1");
    for id in 2..=players {
        room.join(id, format!("p{id}")).unwrap();
    }
    room
}

/// Won-pile size of every seated player, in seat order.
fn won_piles(room: &Room) -> Vec<(u64, usize)> {
    room.players().iter().map(|p| (p.id(), p.won_pile().len())).collect()
}

fn check_room(room: &Room) -> Result<(), TestCaseError> {
    prop_assert_eq!(room.cards_in_play() + room.discarded(), room.dealt());

    match room.phase() {
        Phase::InProgress => {
            let current = room.current_player();
            prop_assert!(current.is_some_and(|p| p.has_hand()));
            prop_assert!(room.players().iter().filter(|p| p.is_active()).count() >= 2);
        },
        Phase::Finished => {
            prop_assert!(room.current_player_id().is_none());
            prop_assert!(room.winner().is_some());
            prop_assert!(room.showdown_pot().is_empty());
        },
        Phase::Lobby => {},
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: hand sizes after the deal differ by at most one
    #[test]
    fn prop_deal_is_fair(players in 1u64..8, cards in 1usize..60, seed in any::<u64>()) {
        let mut room = seated_room(players);
        let mut deck = Deck::from_cards(Deck::standard().into_cards().into_iter().cycle().take(cards).collect());
        deck.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
        room.start(1, deck).unwrap();

        if room.phase() == Phase::InProgress {
            let low = cards / players as usize;
            for player in room.players() {
                let held = player.hand().len();
                prop_assert!(held == low || held == low + 1);
            }
        }
        prop_assert_eq!(room.cards_in_play(), cards);
    }

    /// Property: every game terminates within one round per card
    #[test]
    fn prop_games_terminate(
        players in 2u64..6,
        deck in arbitrary_deck(),
        metrics in prop::collection::vec(arbitrary_metric(), 64),
    ) {
        let dealt = deck.len();
        let mut room = seated_room(players);
        room.start(1, deck).unwrap();
        check_room(&room)?;

        let mut rounds = 0;
        while let Some(current) = room.current_player_id() {
            let metric = metrics[rounds % metrics.len()];
            let pot_before = room.showdown_pot().len();
            let piles_before = won_piles(&room);
            let outcome = room.resolve_turn(current, metric.as_str())?;
            rounds += 1;

            if outcome.tie && outcome.game_winner.is_none() {
                prop_assert_eq!(outcome.pot_size, pot_before + outcome.revealed.len());
            }
            if let Some(winner) = outcome.round_winner {
                // A clean win pays the revealed cards and the whole pot to one pile
                prop_assert_eq!(outcome.pot_size, 0);
                for (id, after) in won_piles(&room) {
                    let before = piles_before.iter().find(|(p, _)| *p == id).map_or(0, |(_, n)| *n);
                    let gained = if id == winner { outcome.revealed.len() + pot_before } else { 0 };
                    prop_assert_eq!(after, before + gained, "pile of player {}", id);
                }
            }
            check_room(&room)?;
            prop_assert!(rounds <= dealt);
        }

        prop_assert_eq!(room.phase(), Phase::Finished);
        prop_assert_eq!(room.cards_in_play(), dealt);
    }

    /// Property: out-of-turn choices never change the room
    #[test]
    fn prop_only_current_player_moves(
        players in 2u64..6,
        deck in arbitrary_deck(),
        intruder in 1u64..6,
    ) {
        let mut room = seated_room(players);
        room.start(1, deck).unwrap();

        if room.current_player_id() != Some(intruder) && room.phase() == Phase::InProgress {
            let before = room.players().to_vec();
            prop_assert_eq!(room.resolve_turn(intruder, "attack"), Err(GameError::NotYourTurn));
            prop_assert_eq!(room.players(), before.as_slice());
        }
    }

    /// Property: departures keep the room consistent
    #[test]
    fn prop_departures_keep_room_valid(
        players in 2u64..6,
        deck in arbitrary_deck(),
        leavers in prop::collection::vec(1u64..6, 1..5),
    ) {
        let mut room = seated_room(players);
        room.start(1, deck).unwrap();

        for id in leavers {
            let host_before = room.host_id();
            if let Some(departure) = room.remove_player(id) {
                if departure.room_empty {
                    break;
                }
                if host_before == id {
                    prop_assert_eq!(Some(room.host_id()), room.players().first().map(|p| p.id()));
                }
            }
            check_room(&room)?;
        }
    }
}
