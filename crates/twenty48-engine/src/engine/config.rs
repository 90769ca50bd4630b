use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::core::CELLS;

use super::{history::DEFAULT_HISTORY_CAPACITY, tile_spawner::DEFAULT_FOUR_PROBABILITY};

/// Inclusive range of tiles to spawn at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCount {
    pub min: usize,
    pub max: usize,
}

impl TileCount {
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn range(self) -> RangeInclusive<usize> {
        self.min..=self.max
    }

    fn is_valid(self) -> bool {
        self.min >= 1 && self.min <= self.max && self.max <= CELLS
    }
}

/// Tunable session rules.
///
/// Every field is optional so that a partial JSON document can be loaded.
/// Missing or out-of-range values fall back to the standard rules through the
/// `*_or_default` accessors.
///
/// ```
/// use twenty48_engine::SessionConfig;
///
/// let config = SessionConfig::from_json_str(r#"{ "historyCapacity": 10 }"#).unwrap();
/// assert_eq!(config.history_capacity_or_default(), 10);
/// assert_eq!(config.initial_tiles_or_default(), 1..=3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Maximum number of undo steps kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_capacity: Option<usize>,
    /// Tiles placed when a new game starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_tiles: Option<TileCount>,
    /// Tiles placed after each committed move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiles_per_move: Option<TileCount>,
    /// Chance that a spawned tile is a 4.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub four_probability: Option<f64>,
    /// Hold the session busy after each committed move until `settle` is called.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_settle: Option<bool>,
}

impl SessionConfig {
    pub const DEFAULT_INITIAL_TILES: TileCount = TileCount::new(1, 3);
    pub const DEFAULT_TILES_PER_MOVE: TileCount = TileCount::new(1, 2);

    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    #[must_use]
    pub fn history_capacity_or_default(&self) -> usize {
        match self.history_capacity {
            Some(n) if n >= 1 => n,
            _ => DEFAULT_HISTORY_CAPACITY,
        }
    }

    #[must_use]
    pub fn initial_tiles_or_default(&self) -> RangeInclusive<usize> {
        self.initial_tiles
            .filter(|count| count.is_valid())
            .unwrap_or(Self::DEFAULT_INITIAL_TILES)
            .range()
    }

    #[must_use]
    pub fn tiles_per_move_or_default(&self) -> RangeInclusive<usize> {
        self.tiles_per_move
            .filter(|count| count.is_valid())
            .unwrap_or(Self::DEFAULT_TILES_PER_MOVE)
            .range()
    }

    #[must_use]
    pub fn four_probability_or_default(&self) -> f64 {
        match self.four_probability {
            Some(p) if p.is_finite() && (0.0..=1.0).contains(&p) => p,
            _ => DEFAULT_FOUR_PROBABILITY,
        }
    }

    #[must_use]
    pub fn require_settle_or_default(&self) -> bool {
        self.require_settle.unwrap_or(false)
    }
}
