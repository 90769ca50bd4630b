//! Persistable session state.
//!
//! The snapshot is the JSON document a persistence layer writes and reads
//! back:
//!
//! ```json
//! { "grid": [[2,0,0,0], ...], "score": 12, "bestScore": 340, "history": [{ "grid": ..., "score": 8 }] }
//! ```
//!
//! Loading is strict about the grid and lenient about everything else:
//!
//! - `grid` (or its older name `board`) must be N×N with every cell a
//!   non-negative integer that is 0 or a power of two no larger than
//!   [`MAX_TILE`](crate::core::MAX_TILE), otherwise the whole snapshot is
//!   rejected
//! - `score` and `bestScore` fall back to 0 when absent or not a number;
//!   scores too large for a `u64` saturate
//! - `history` falls back to empty when it is not an array; an array holding
//!   a malformed grid rejects the whole snapshot

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::Grid;

use super::history::HistoryEntry;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("malformed session snapshot: {source}")]
pub struct SnapshotError {
    source: serde_json::Error,
}

impl From<serde_json::Error> for SnapshotError {
    fn from(source: serde_json::Error) -> Self {
        Self { source }
    }
}

/// Complete saved state of a session.
///
/// # Example
///
/// ```
/// use twenty48_engine::{GameSession, SessionSnapshot, TileSeed};
///
/// let session = GameSession::with_seed(TileSeed::from_bytes([3; 16]));
/// let json = session.snapshot().to_json_string().unwrap();
///
/// let loaded = SessionSnapshot::from_json_str(&json).unwrap();
/// assert_eq!(&loaded.grid, session.grid());
/// assert_eq!(loaded.score, session.score());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(alias = "board")]
    pub grid: Grid,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: u64,
    #[serde(default, deserialize_with = "lenient_score")]
    pub best_score: u64,
    #[serde(default, deserialize_with = "lenient_history")]
    pub history: Vec<HistoryEntry>,
}

impl SessionSnapshot {
    pub fn from_json_str(s: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "saturating float-to-int cast of a checked non-negative value"
)]
fn score_from_value(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 => f as u64,
        _ => 0,
    }
}

pub(crate) fn lenient_score<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(score_from_value(&value))
}

fn lenient_history<'de, D>(deserializer: D) -> Result<Vec<HistoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Array(_) => serde_json::from_value(value).map_err(serde::de::Error::custom),
        _ => Ok(Vec::new()),
    }
}
