//! Cards and comparison metrics.

use std::{fmt, str::FromStr};

use crate::error::GameError;

/// Card attribute compared in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Attack value
    Attack,
    /// Defense value
    Defense,
    /// Speed value
    Speed,
}

impl Metric {
    /// Every metric, in wire order.
    pub const ALL: [Metric; 3] = [Metric::Attack, Metric::Defense, Metric::Speed];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::Speed => "speed",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| GameError::UnknownMetric(s.to_string()))
    }
}

/// Values of every metric on one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Metrics {
    /// Attack value
    pub attack: u32,
    /// Defense value
    pub defense: u32,
    /// Speed value
    pub speed: u32,
}

impl Metrics {
    /// Create a metric set.
    #[must_use]
    pub const fn new(attack: u32, defense: u32, speed: u32) -> Self {
        Self { attack, defense, speed }
    }

    /// Value of `metric`.
    #[must_use]
    pub const fn get(&self, metric: Metric) -> u32 {
        match metric {
            Metric::Attack => self.attack,
            Metric::Defense => self.defense,
            Metric::Speed => self.speed,
        }
    }
}

/// Immutable playing card.
///
/// Cards move between hands, the pot and won piles but are never modified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Card {
    name: String,
    image_ref: String,
    metrics: Metrics,
}

impl Card {
    /// Create a card.
    pub fn new(name: impl Into<String>, image_ref: impl Into<String>, metrics: Metrics) -> Self {
        Self { name: name.into(), image_ref: image_ref.into(), metrics }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opaque image reference, passed through to clients.
    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    /// All metric values.
    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Value of a single metric.
    pub fn value(&self, metric: Metric) -> u32 {
        self.metrics.get(metric)
    }
}
