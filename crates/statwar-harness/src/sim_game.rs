//! Seeded single-room game driver.
//!
//! Plays a room from deal to game over with shuffles and metric choices drawn
//! from a [`SimEnv`], checking the standard invariants after every step. The
//! whole game is a function of the seed, so any failure replays exactly.

use statwar_core::{
    Deck, Departure, Environment, GameError, Metric, PlayerId, Room, RoomCode, RoundOutcome,
};

use crate::{
    invariants::{InvariantRegistry, RoomSnapshot, SystemSnapshot, Violation},
    sim_env::SimEnv,
};

/// Why a simulated game stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The room rejected an action the driver believed valid
    Game(GameError),
    /// An invariant failed after a step
    Violations(Vec<Violation>),
    /// The game outlived its round bound
    NoProgress {
        /// Rounds played
        rounds: usize,
    },
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Game(e) => write!(f, "game error: {e}"),
            Self::Violations(violations) => {
                let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
                write!(f, "invariant violation:\n  {}", messages.join("\n  "))
            },
            Self::NoProgress { rounds } => write!(f, "no game over after {rounds} rounds"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<GameError> for SimError {
    fn from(e: GameError) -> Self {
        Self::Game(e)
    }
}

/// Summary of a finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReport {
    /// Seed the game was played with
    pub seed: u64,
    /// Rounds played
    pub rounds: usize,
    /// Rounds that ended in a tie
    pub ties: usize,
    /// Winner, if anyone was left to win
    pub winner: Option<PlayerId>,
}

/// Deterministic game in one room.
pub struct SimGame {
    env: SimEnv,
    room: Room,
    registry: InvariantRegistry,
    last_round_tied: Option<bool>,
    rounds: usize,
    ties: usize,
}

impl SimGame {
    /// Seat players `1..=players` in a fresh lobby; player 1 hosts.
    pub fn new(seed: u64, players: u64) -> Result<Self, SimError> {
        let env = SimEnv::with_seed(seed);
        let mut room = Room::new(RoomCode::generate(&env), 1, "p1");
        for id in 2..=players {
            room.join(id, format!("p{id}"))?;
        }

        Ok(Self {
            env,
            room,
            registry: InvariantRegistry::standard(),
            last_round_tied: None,
            rounds: 0,
            ties: 0,
        })
    }

    /// The room under test.
    pub fn room(&self) -> &Room {
        &self.room
    }

    /// The environment driving this game.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Deal a shuffled standard deck.
    pub fn start(&mut self) -> Result<(), SimError> {
        let host = self.room.host_id();
        self.start_with(Deck::shuffled(&self.env), host)
    }

    /// Deal `deck` on behalf of `requester`.
    pub fn start_with(&mut self, deck: Deck, requester: PlayerId) -> Result<(), SimError> {
        self.room.start(requester, deck)?;
        self.check()
    }

    /// Play one round with a random metric. Returns `None` once no one is
    /// choosing.
    pub fn step(&mut self) -> Result<Option<RoundOutcome>, SimError> {
        let Some(current) = self.room.current_player_id() else {
            return Ok(None);
        };

        let metric = Metric::ALL[(self.env.random_u64() % 3) as usize];
        let outcome = self.room.resolve_turn(current, metric.as_str())?;
        self.rounds += 1;
        if outcome.tie {
            self.ties += 1;
        }
        self.last_round_tied = Some(outcome.tie);

        tracing::debug!(
            round = self.rounds,
            chooser = current,
            %metric,
            tie = outcome.tie,
            pot = outcome.pot_size,
            "round resolved"
        );

        self.check()?;
        Ok(Some(outcome))
    }

    /// Remove a player mid-game.
    pub fn depart(&mut self, id: PlayerId) -> Result<Option<Departure>, SimError> {
        let departure = self.room.remove_player(id);
        if departure.as_ref().is_some_and(|d| d.room_empty) {
            return Ok(departure);
        }
        self.check()?;
        Ok(departure)
    }

    /// Play until game over.
    ///
    /// Fails with `SimError::NoProgress` if the game runs longer than one
    /// round per dealt card.
    pub fn run_to_end(&mut self) -> Result<GameReport, SimError> {
        let bound = self.room.dealt();
        while self.step()?.is_some() {
            if self.rounds > bound {
                return Err(SimError::NoProgress { rounds: self.rounds });
            }
        }

        Ok(GameReport {
            seed: self.env.seed(),
            rounds: self.rounds,
            ties: self.ties,
            winner: self.room.winner(),
        })
    }

    fn check(&self) -> Result<(), SimError> {
        let snapshot = SystemSnapshot::single(
            RoomSnapshot::from_room(&self.room).with_last_round_tied(self.last_round_tied),
        );
        self.registry.check_all(&snapshot).map_err(SimError::Violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_game() {
        let mut a = SimGame::new(11, 3).unwrap();
        let mut b = SimGame::new(11, 3).unwrap();
        a.start().unwrap();
        b.start().unwrap();

        assert_eq!(a.room().code(), b.room().code());
        assert_eq!(a.run_to_end().unwrap(), b.run_to_end().unwrap());
    }

    #[test]
    fn game_reaches_a_winner() {
        let mut game = SimGame::new(3, 2).unwrap();
        game.start().unwrap();

        let report = game.run_to_end().unwrap();
        assert!(report.winner.is_some());
        assert!(report.rounds <= Deck::STANDARD_SIZE);
    }
}
