//! Statwar core.
//!
//! Pure game logic with no I/O: the card catalog, the deck factory, players,
//! and the per-room state machine that deals cards, rotates turns and resolves
//! rounds. Randomness comes in through the [`Environment`] trait so the same
//! code runs with OS entropy in production and seeded RNGs in simulation.
//!
//! # Components
//!
//! - [`Card`], [`Metric`]: immutable card values and the comparison metrics
//! - [`Deck`]: the fixed catalog and its shuffled permutations
//! - [`Player`]: hand and won pile of one seat
//! - [`Room`]: lobby, dealing, turn order and game-over detection
//! - [`RoundOutcome`]: result of one round, produced by [`Room::resolve_turn`]
//! - [`GameError`]: client-scoped rejection reasons

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod card;
pub mod code;
pub mod deck;
pub mod env;
pub mod error;
pub mod player;
pub mod room;
pub mod turn;

pub use card::{Card, Metric, Metrics};
pub use code::RoomCode;
pub use deck::Deck;
pub use env::Environment;
pub use error::GameError;
pub use player::{MAX_NAME_LEN, Player, PlayerId, validate_name};
pub use room::{Departure, Phase, Room};
pub use turn::{Reveal, RoundOutcome};
