//! Shareable room codes.

use std::{fmt, str::FromStr};

use crate::{env::Environment, error::GameError};

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Bytes at or above this value are discarded so `byte % 36` stays uniform.
const REJECT_FROM: u8 = 252;

/// Short code players type to find a room.
///
/// Always [`RoomCode::LEN`] characters from `[0-9A-Z]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode(String);

impl RoomCode {
    /// Characters per code.
    pub const LEN: usize = 4;

    /// Draw a uniformly random code from `env`.
    pub fn generate<E: Environment>(env: &E) -> Self {
        let mut code = String::with_capacity(Self::LEN);
        let mut buf = [0u8; 8];

        while code.len() < Self::LEN {
            env.random_bytes(&mut buf);
            for &byte in buf.iter().filter(|&&b| b < REJECT_FROM) {
                if code.len() == Self::LEN {
                    break;
                }
                code.push(char::from(ALPHABET[usize::from(byte % 36)]));
            }
        }

        Self(code)
    }

    /// The code as typed by players.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses user input, ignoring surrounding whitespace and letter case.
///
/// Anything that cannot be a code names no room.
impl FromStr for RoomCode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let valid = normalized.len() == Self::LEN
            && normalized.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());

        if valid { Ok(Self(normalized)) } else { Err(GameError::RoomNotFound(s.to_string())) }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    /// Repeats a fixed byte pattern.
    #[derive(Clone)]
    struct Pattern(&'static [u8]);

    impl Environment for Pattern {
        type Instant = Instant;

        fn now(&self) -> Instant {
            Instant::now()
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            for (dst, src) in buffer.iter_mut().zip(self.0.iter().cycle()) {
                *dst = *src;
            }
        }
    }

    #[test]
    fn generated_code_uses_alphabet() {
        let code = RoomCode::generate(&Pattern(&[0, 10, 35, 71]));
        assert_eq!(code.as_str(), "0AZZ");
    }

    #[test]
    fn high_bytes_are_rejected() {
        let code = RoomCode::generate(&Pattern(&[255, 252, 1, 253, 2, 3, 254, 4]));
        assert_eq!(code.as_str(), "1234");
    }

    #[test]
    fn parse_normalizes_input() {
        let code: RoomCode = "  ab1z ".parse().unwrap();
        assert_eq!(code.as_str(), "AB1Z");
        assert_eq!(code.to_string(), "AB1Z");
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        for input in ["", "ABC", "ABCDE", "AB-1", "ÀBCD"] {
            assert_eq!(
                input.parse::<RoomCode>(),
                Err(GameError::RoomNotFound(input.to_string())),
                "{input:?}"
            );
        }
    }
}
