use std::ops::RangeInclusive;

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{CELLS, Grid, Position};

/// Probability that a spawned tile is a 4 rather than a 2.
pub const DEFAULT_FOUR_PROBABILITY: f64 = 0.1;

/// Positions written by one spawn call, in the order they were drawn.
pub type Spawned = ArrayVec<Position, CELLS>;

/// Places up to `count` new tiles on distinct empty cells.
///
/// Cells are drawn without replacement: each draw picks a uniform index into
/// the list of still-empty cells and removes it from that list. Each tile is a
/// 4 with probability `four_probability`, otherwise a 2. A full grid is left
/// unchanged.
///
/// # Panics
///
/// Panics if `four_probability` is outside `0.0..=1.0`.
pub fn add_random_tiles<R>(grid: &mut Grid, count: usize, four_probability: f64, rng: &mut R) -> Spawned
where
    R: Rng + ?Sized,
{
    let mut empty = grid.empty_cells();
    let mut spawned = Spawned::new();
    for _ in 0..count.min(empty.len()) {
        let pos = empty.remove(rng.random_range(0..empty.len()));
        let value = if rng.random_bool(four_probability) { 4 } else { 2 };
        grid.set(pos, value);
        spawned.push(pos);
    }
    spawned
}

/// Seed for deterministic tile spawning.
///
/// A 128-bit seed serialized as a 32-character hex string. Two sessions built
/// from the same seed and fed the same moves spawn identical tiles.
///
/// # Example
///
/// ```
/// use twenty48_engine::{GameSession, TileSeed};
/// use rand::Rng as _;
///
/// let seed: TileSeed = rand::rng().random();
///
/// let first = GameSession::with_seed(seed);
/// let second = GameSession::with_seed(seed);
/// assert_eq!(first.grid(), second.grid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSeed([u8; 16]);

impl TileSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl Serialize for TileSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        serializer.serialize_str(&format!("{num:032x}"))
    }
}

impl<'de> Deserialize<'de> for TileSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<TileSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TileSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        TileSeed(seed)
    }
}

/// Seeded source of new tiles for one session.
#[derive(Debug, Clone)]
pub struct TileSpawner {
    rng: Pcg32,
    four_probability: f64,
}

impl Default for TileSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSpawner {
    /// Creates a spawner seeded from the thread-local generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: TileSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            four_probability: DEFAULT_FOUR_PROBABILITY,
        }
    }

    /// Sets the chance of spawning a 4, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn with_four_probability(mut self, probability: f64) -> Self {
        self.four_probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            DEFAULT_FOUR_PROBABILITY
        };
        self
    }

    #[must_use]
    pub fn four_probability(&self) -> f64 {
        self.four_probability
    }

    /// Draws a tile count uniformly from `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is empty.
    pub fn draw_count(&mut self, range: RangeInclusive<usize>) -> usize {
        self.rng.random_range(range)
    }

    /// Spawns up to `count` tiles on `grid`. See [`add_random_tiles`].
    pub fn spawn(&mut self, grid: &mut Grid, count: usize) -> Spawned {
        add_random_tiles(grid, count, self.four_probability, &mut self.rng)
    }
}
