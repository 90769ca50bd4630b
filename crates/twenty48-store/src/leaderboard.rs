use serde::{Deserialize, Deserializer, Serialize};
use twenty48_engine::LeaderboardEntry;

/// Best finished games, highest score first.
///
/// Holds at most [`Self::MAX_ENTRIES`] entries. Entries with equal scores
/// keep the order in which they were inserted. A deserialized list is
/// re-sorted and truncated the same way.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use twenty48_engine::LeaderboardEntry;
/// use twenty48_store::Leaderboard;
///
/// let mut board = Leaderboard::new();
/// board.insert(LeaderboardEntry::new("Ann", 1024, Utc::now()));
/// let rank = board.insert(LeaderboardEntry::new("Ben", 2048, Utc::now()));
///
/// assert_eq!(rank, Some(0));
/// assert_eq!(board.entries()[1].name, "Ann");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub const MAX_ENTRIES: usize = 10;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a leaderboard from entries in any order.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = LeaderboardEntry>,
    {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(Self::MAX_ENTRIES);
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if a game with `score` would make it onto the board.
    #[must_use]
    pub fn qualifies(&self, score: u64) -> bool {
        self.rank_for(score) < Self::MAX_ENTRIES
    }

    /// Inserts `entry` at its rank and drops whatever falls off the end.
    ///
    /// Returns the zero-based rank of the new entry, or `None` if it did not make the cut.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let rank = self.rank_for(entry.score);
        if rank >= Self::MAX_ENTRIES {
            return None;
        }
        self.entries.insert(rank, entry);
        self.entries.truncate(Self::MAX_ENTRIES);
        Some(rank)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn rank_for(&self, score: u64) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }
}

impl<'de> Deserialize<'de> for Leaderboard {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<LeaderboardEntry>::deserialize(deserializer).map(Self::from_entries)
    }
}
