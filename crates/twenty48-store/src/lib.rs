//! Persistence for 2048 sessions.
//!
//! Three values are kept under separate keys of a [`Storage`]: the current
//! session snapshot, the best score, and the leaderboard. [`GameStore`] reads
//! and writes them; [`SavedGame`] wraps a session so that every change is
//! written back immediately.

pub use self::{game_store::*, leaderboard::*, storage::*};

mod game_store;
mod leaderboard;
mod storage;
