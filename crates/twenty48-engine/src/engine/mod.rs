//! Game session logic on top of the pure [`core`](crate::core) transforms.
//!
//! - [`GameSession`] - One game: grid, score, best score, undo history, terminal state
//! - [`TileSpawner`] - Seeded random tile placement
//! - [`TileSeed`] - Seed for deterministic tile spawns
//! - [`History`] - Bounded undo stack
//! - [`SessionSnapshot`] - Persistable session state with validated loading
//! - [`SessionConfig`] - Tunable rules with standard defaults
//! - [`LeaderboardEntry`] - Record submitted at the end of a game
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] (or [`GameSession::restore`] a snapshot)
//! 2. Feed it directions with [`GameSession::try_move`]
//! 3. Each committed move pushes an undo step, adds merge points, spawns one
//!    or two tiles, and re-checks whether any move is left
//! 4. Rejected moves change nothing and report why
//! 5. Once no move is left the session is over until a new game starts
//!
//! # Example
//!
//! ```
//! use twenty48_engine::{Direction, GameSession};
//!
//! let mut session = GameSession::new();
//!
//! if let Ok(view) = session.try_move(Direction::Left) {
//!     println!("score {} (+{})", view.score, view.gained);
//! }
//!
//! if session.is_terminal() {
//!     println!("Game over!");
//! }
//! ```

pub use self::{
    config::*, game_session::*, history::*, leaderboard::*, snapshot::*, tile_spawner::*,
};

mod config;
mod game_session;
mod history;
mod leaderboard;
mod snapshot;
mod tile_spawner;
