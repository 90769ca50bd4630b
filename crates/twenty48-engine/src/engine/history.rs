use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::Grid;

use super::snapshot::lenient_score;

/// Default number of undo steps kept per game.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// State of the game right before a committed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(alias = "board")]
    pub grid: Grid,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: u64,
}

/// Bounded undo stack, oldest entry first.
///
/// Pushing onto a full history evicts the oldest entry.
///
/// ```
/// use twenty48_engine::{Grid, History, HistoryEntry};
///
/// let mut history = History::with_capacity(2);
/// for score in [0, 4, 12] {
///     history.push(HistoryEntry { grid: Grid::EMPTY, score });
/// }
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.pop().map(|e| e.score), Some(12));
/// assert_eq!(history.pop().map(|e| e.score), Some(4));
/// assert!(history.pop().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// Creates an empty history. A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a history from entries ordered oldest first, keeping only the newest ones that fit.
    #[must_use]
    pub fn from_entries<I>(entries: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = HistoryEntry>,
    {
        let mut history = Self::with_capacity(capacity);
        for entry in entries {
            history.push(entry);
        }
        history
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pushes a new entry, returning the evicted oldest entry if the history was full.
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Removes and returns the newest entry.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }
}
