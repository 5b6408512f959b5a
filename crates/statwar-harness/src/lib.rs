//! Deterministic simulation harness for statwar games.
//!
//! A seeded [`SimEnv`] replaces OS time and entropy, so deals, room codes and
//! metric choices are reproducible from a single `u64`.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties of room state after
//! every step: conservation of cards, a valid chooser, a pot that only exists
//! after ties, and a winner for every finished game. [`SimGame`] wires these
//! checks into a full game loop.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_env;
pub mod sim_game;

pub use invariants::{
    CardConservation, CurrentPlayerSeated, FinishedHasWinner, Invariant, InvariantRegistry,
    InvariantResult, PlayerSnapshot, PotOnlyAfterTie, RoomSnapshot, SystemSnapshot, Violation,
};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_game::{GameReport, SimError, SimGame};
