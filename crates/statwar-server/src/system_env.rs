//! Production environment backed by the OS clock and entropy.
//!
//! Room codes, session IDs and deck shuffles all draw from `getrandom`, so
//! live games are not reproducible. Use `statwar_harness::SimEnv` when a game
//! must be replayed from a seed.

use statwar_core::Environment;

/// Production environment using system time and cryptographic RNG.
///
/// # Panics
///
/// Panics if the OS RNG fails. A server that cannot draw room codes or
/// shuffle decks cannot host games, and OS RNG failure indicates a broken
/// host.
#[derive(Debug, Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).expect("invariant: OS RNG is available to the server");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn time_advances() {
        let env = SystemEnv::new();

        let t1 = env.now();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = env.now();

        assert!(t2 > t1);
    }

    #[test]
    fn random_bytes_differ_between_calls() {
        let env = SystemEnv::new();

        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        env.random_bytes(&mut first);
        env.random_bytes(&mut second);

        assert_ne!(first, second);
    }

    #[test]
    fn room_codes_come_from_os_entropy() {
        let env = SystemEnv::new();
        let codes: std::collections::HashSet<_> =
            (0..16).map(|_| statwar_core::RoomCode::generate(&env)).collect();

        // 36^4 codes; sixteen draws colliding down to a handful means a stuck RNG
        assert!(codes.len() > 8);
    }
}
