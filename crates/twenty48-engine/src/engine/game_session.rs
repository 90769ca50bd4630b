use std::ops::RangeInclusive;

use chrono::Utc;
use log::{debug, info};
use rand::Rng as _;

use crate::{
    MoveError, UndoError,
    core::{Direction, Grid},
};

use super::{
    config::SessionConfig,
    history::{History, HistoryEntry},
    leaderboard::LeaderboardEntry,
    snapshot::SessionSnapshot,
    tile_spawner::{Spawned, TileSeed, TileSpawner},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    /// Accepting moves.
    Playing,
    /// A committed move is still being presented; waiting for [`GameSession::settle`].
    Settling,
    /// No move can change the grid.
    GameOver,
}

/// Immutable copy of everything a renderer needs after a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub grid: Grid,
    pub score: u64,
    pub best_score: u64,
    pub state: SessionState,
    /// Cells filled by the spawn that ended this change. Empty after undo.
    pub spawned: Spawned,
    /// Points gained by this change. Zero for anything but a committed move.
    pub gained: u64,
}

impl SessionView {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_game_over()
    }
}

/// One game of 2048 with score tracking and undo.
///
/// The session owns the live grid, the score, the best score, and a bounded
/// undo history. A move is either committed as a whole (history, grid, score,
/// spawned tiles, and terminal flag all update together) or rejected with no
/// observable change.
///
/// # Example
///
/// ```
/// use twenty48_engine::{Direction, GameSession, MoveError, TileSeed};
///
/// let mut session = GameSession::with_seed(TileSeed::from_bytes([1; 16]));
/// assert_eq!(session.score(), 0);
///
/// for dir in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
///     match session.try_move(dir) {
///         Ok(view) => assert!(!view.spawned.is_empty()),
///         Err(MoveError::NoChange) => {}
///         Err(e) => panic!("unexpected: {e}"),
///     }
/// }
///
/// if !session.history().is_empty() {
///     session.try_undo().unwrap();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    grid: Grid,
    score: u64,
    best_score: u64,
    history: History,
    state: SessionState,
    spawner: TileSpawner,
    config: SessionConfig,
    moves: usize,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Starts a new game with the standard rules and a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic tile spawns.
    #[must_use]
    pub fn with_seed(seed: TileSeed) -> Self {
        Self::with_config(SessionConfig::default(), seed)
    }

    #[must_use]
    pub fn with_config(config: SessionConfig, seed: TileSeed) -> Self {
        let mut this = Self::blank(config, seed);
        this.start_new_game();
        this
    }

    /// Resumes a saved game.
    ///
    /// Only the newest entries that fit the configured capacity are kept from
    /// the saved history. The best score is raised to the saved score if it
    /// lags behind, and the terminal flag is derived from the grid.
    #[must_use]
    pub fn restore(snapshot: SessionSnapshot, config: SessionConfig, seed: TileSeed) -> Self {
        let mut this = Self::blank(config, seed);
        let capacity = this.config.history_capacity_or_default();
        this.history = History::from_entries(snapshot.history, capacity);
        this.grid = snapshot.grid;
        this.score = snapshot.score;
        this.best_score = snapshot.best_score.max(snapshot.score);
        this.moves = this.history.len();
        this.state = if this.grid.has_moves_available() {
            SessionState::Playing
        } else {
            SessionState::GameOver
        };
        info!(
            "restored session: score {}, {} undo steps, state {:?}",
            this.score,
            this.history.len(),
            this.state
        );
        this
    }

    fn blank(config: SessionConfig, seed: TileSeed) -> Self {
        let spawner =
            TileSpawner::with_seed(seed).with_four_probability(config.four_probability_or_default());
        Self {
            grid: Grid::EMPTY,
            score: 0,
            best_score: 0,
            history: History::with_capacity(config.history_capacity_or_default()),
            state: SessionState::Playing,
            spawner,
            config,
            moves: 0,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_game_over()
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of committed moves in the current game, net of undos.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Raises the best score to `best` if it is higher. Never lowers it.
    pub fn raise_best_score(&mut self, best: u64) {
        self.best_score = self.best_score.max(best);
    }

    /// Clears the grid, score, and history, then places the opening tiles.
    ///
    /// The best score carries over.
    pub fn start_new_game(&mut self) -> SessionView {
        self.grid = Grid::EMPTY;
        self.score = 0;
        self.history.clear();
        self.moves = 0;
        let spawned = self.spawn(self.config.initial_tiles_or_default());
        self.state = SessionState::Playing;
        info!("new game with {} tiles", spawned.len());
        self.view_with(spawned, 0)
    }

    /// Moves all tiles towards `dir`.
    ///
    /// On success the pre-move state is pushed to the history, the merge
    /// points are added to the score, new tiles are spawned, and the terminal
    /// flag is re-evaluated. On error nothing changes.
    pub fn try_move(&mut self, dir: Direction) -> Result<SessionView, MoveError> {
        match self.state {
            SessionState::GameOver => return Err(MoveError::GameOver),
            SessionState::Settling => return Err(MoveError::Busy),
            SessionState::Playing => {}
        }

        let (grid, shift) = self.grid.shifted(dir);
        if !shift.moved {
            debug!("move {dir} rejected: grid unchanged");
            return Err(MoveError::NoChange);
        }

        self.history.push(HistoryEntry {
            grid: self.grid,
            score: self.score,
        });
        self.grid = grid;
        self.score = self.score.saturating_add(shift.gained);
        self.moves += 1;
        let spawned = self.spawn(self.config.tiles_per_move_or_default());
        self.raise_best_score(self.score);

        self.state = match (
            self.grid.has_moves_available(),
            self.config.require_settle_or_default(),
        ) {
            (false, _) => SessionState::GameOver,
            (true, true) => SessionState::Settling,
            (true, false) => SessionState::Playing,
        };
        debug!(
            "move {dir} committed: +{} (score {}), spawned {}, state {:?}",
            shift.gained,
            self.score,
            spawned.len(),
            self.state
        );
        Ok(self.view_with(spawned, shift.gained))
    }

    /// Restores the grid and score from before the most recent committed move.
    ///
    /// The best score is left as it is.
    pub fn try_undo(&mut self) -> Result<SessionView, UndoError> {
        match self.state {
            SessionState::GameOver => return Err(UndoError::GameOver),
            SessionState::Settling => return Err(UndoError::Busy),
            SessionState::Playing => {}
        }
        let entry = self.history.pop().ok_or(UndoError::EmptyHistory)?;
        self.grid = entry.grid;
        self.score = entry.score;
        self.moves = self.moves.saturating_sub(1);
        debug!("undo: score {}, {} steps left", self.score, self.history.len());
        Ok(self.view())
    }

    /// Marks the presentation of the last move as finished.
    ///
    /// Returns `true` if the session was waiting for it.
    pub fn settle(&mut self) -> bool {
        if self.state.is_settling() {
            self.state = SessionState::Playing;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        self.view_with(Spawned::new(), 0)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            grid: self.grid,
            score: self.score,
            best_score: self.best_score,
            history: self.history.iter().copied().collect(),
        }
    }

    /// Builds the leaderboard record for the current score, dated now.
    #[must_use]
    pub fn leaderboard_entry(&self, name: &str) -> LeaderboardEntry {
        LeaderboardEntry::new(name, self.score, Utc::now())
    }

    fn spawn(&mut self, count: RangeInclusive<usize>) -> Spawned {
        let count = self.spawner.draw_count(count);
        self.spawner.spawn(&mut self.grid, count)
    }

    fn view_with(&self, spawned: Spawned, gained: u64) -> SessionView {
        SessionView {
            grid: self.grid,
            score: self.score,
            best_score: self.best_score,
            state: self.state,
            spawned,
            gained,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MAX_TILE, Position, SIZE};

    fn seed(byte: u8) -> TileSeed {
        TileSeed::from_bytes([byte; 16])
    }

    fn grid(rows: [[u32; SIZE]; SIZE]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    fn session_at(rows: [[u32; SIZE]; SIZE], score: u64) -> GameSession {
        session_with(rows, score, SessionConfig::default())
    }

    fn session_with(rows: [[u32; SIZE]; SIZE], score: u64, config: SessionConfig) -> GameSession {
        let snapshot = SessionSnapshot {
            grid: grid(rows),
            score,
            best_score: score,
            history: Vec::new(),
        };
        GameSession::restore(snapshot, config, seed(0))
    }

    #[test]
    fn test_new_game_opening() {
        for byte in 0..50 {
            let session = GameSession::with_seed(seed(byte));
            let occupied = session.grid().occupied_count();
            assert!((1..=3).contains(&occupied), "{occupied} opening tiles");
            assert!(session.grid().rows().iter().flatten().all(|&v| matches!(v, 0 | 2 | 4)));
            assert_eq!(session.score(), 0);
            assert!(session.history().is_empty());
            assert!(session.state().is_playing());
        }
    }

    #[test]
    fn test_new_game_reports_spawned_cells() {
        let mut session = GameSession::with_seed(seed(4));
        let view = session.start_new_game();
        assert_eq!(view.spawned.len(), view.grid.occupied_count());
        for pos in &view.spawned {
            assert_ne!(view.grid.get(*pos), 0);
        }
    }

    #[test]
    fn test_committed_move() {
        let mut session = session_at([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], 10);
        let view = session.try_move(Direction::Left).unwrap();

        assert_eq!(view.gained, 4);
        assert_eq!(view.score, 14);
        assert_eq!(view.best_score, 14);
        assert_eq!(view.grid.get(Position::new(0, 0)), 4);
        assert!((1..=2).contains(&view.spawned.len()));
        assert_eq!(view.grid.occupied_count(), 1 + view.spawned.len());
        for pos in &view.spawned {
            assert_ne!(*pos, Position::new(0, 0));
            assert!(matches!(view.grid.get(*pos), 2 | 4));
        }
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn test_rejected_move_is_transparent() {
        let rows = [[0, 0, 2, 4], [0, 0, 0, 8], [0; 4], [0; 4]];
        let mut session = session_at(rows, 20);
        session.try_move(Direction::Left).unwrap();
        session.try_undo().unwrap();
        let history = session.history().clone();

        assert_eq!(session.try_move(Direction::Right), Err(MoveError::NoChange));
        assert_eq!(*session.grid(), grid(rows));
        assert_eq!(session.score(), 20);
        assert_eq!(session.history(), &history);
        assert_eq!(session.moves(), 0);
    }

    #[test]
    fn test_full_grid_rejects_blocked_direction() {
        let rows = [
            [2, 4, 8, 16],
            [2, 4, 8, 16],
            [4, 8, 16, 32],
            [8, 16, 32, 64],
        ];
        let mut session = session_at(rows, 64);
        assert!(!session.is_terminal());

        for dir in [Direction::Left, Direction::Right] {
            assert_eq!(session.try_move(dir), Err(MoveError::NoChange));
        }
        assert_eq!(*session.grid(), grid(rows));
        assert_eq!(session.score(), 64);
        assert!(session.history().is_empty());

        let view = session.try_move(Direction::Up).unwrap();
        assert_eq!(view.gained, 4 + 8 + 16 + 32);
    }

    #[test]
    fn test_no_change_on_packed_grid() {
        let rows = [[2, 4, 8, 16], [4, 8, 16, 32], [0; 4], [0; 4]];
        let mut session = session_at(rows, 50);
        session.history = History::from_entries(
            (0..100).map(|score| HistoryEntry {
                grid: Grid::EMPTY,
                score,
            }),
            100,
        );
        let history = session.history().clone();

        assert_eq!(session.try_move(Direction::Up), Err(MoveError::NoChange));
        assert_eq!(session.try_move(Direction::Left), Err(MoveError::NoChange));
        assert_eq!(*session.grid(), grid(rows));
        assert_eq!(session.score(), 50);
        assert_eq!(session.history(), &history);
        assert_eq!(session.history().len(), 100);
    }

    #[test]
    fn test_undo_restores_previous_state() {
        let mut session = GameSession::with_seed(seed(8));
        let dir = Direction::ALL
            .into_iter()
            .find(|&dir| session.grid().shifted(dir).1.moved)
            .unwrap();
        let before_grid = *session.grid();
        let before_score = session.score();

        session.try_move(dir).unwrap();
        let view = session.try_undo().unwrap();

        assert_eq!(view.grid, before_grid);
        assert_eq!(view.score, before_score);
        assert!(view.spawned.is_empty());
        assert!(session.history().is_empty());
        assert_eq!(session.moves(), 0);
        assert_eq!(session.try_undo(), Err(UndoError::EmptyHistory));
    }

    #[test]
    fn test_undo_keeps_best_score() {
        let mut session = session_at([[4, 4, 0, 0], [0; 4], [0; 4], [0; 4]], 0);
        session.try_move(Direction::Left).unwrap();
        assert_eq!(session.best_score(), 8);
        session.try_undo().unwrap();
        assert_eq!(session.score(), 0);
        assert_eq!(session.best_score(), 8);
    }

    #[test]
    fn test_best_score_survives_new_game() {
        let mut session = session_at([[8, 8, 0, 0], [0; 4], [0; 4], [0; 4]], 100);
        session.try_move(Direction::Left).unwrap();
        assert_eq!(session.best_score(), 116);
        session.start_new_game();
        assert_eq!(session.score(), 0);
        assert_eq!(session.best_score(), 116);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_history_capacity() {
        let config = SessionConfig {
            history_capacity: Some(3),
            ..SessionConfig::default()
        };
        let mut session = GameSession::with_config(config, seed(21));
        let mut committed = 0;
        'outer: while committed < 10 {
            for dir in Direction::ALL {
                if session.try_move(dir).is_ok() {
                    committed += 1;
                    continue 'outer;
                }
            }
            break;
        }
        assert_eq!(session.history().len(), committed.min(3));
    }

    #[test]
    fn test_move_into_game_over() {
        // One 2 per move, so the spawn fills exactly the cell freed by the merge.
        let config = SessionConfig {
            tiles_per_move: Some(crate::TileCount::new(1, 1)),
            four_probability: Some(0.0),
            ..SessionConfig::default()
        };
        let rows = [
            [4, 2, 2, 8],
            [16, 32, 64, 128],
            [4, 8, 16, 32],
            [128, 64, 4, 16],
        ];
        let mut session = session_with(rows, 0, config);
        let view = session.try_move(Direction::Left).unwrap();

        assert_eq!(view.grid.rows()[0], [4, 4, 8, 2]);
        assert_eq!(view.spawned.as_slice(), &[Position::new(0, 3)]);
        // The new 4 4 pair keeps the game going.
        assert!(!view.is_terminal());

        let rows = [
            [2, 2, 8, 16],
            [16, 32, 64, 128],
            [4, 8, 16, 32],
            [128, 64, 4, 16],
        ];
        let mut session = session_with(rows, 0, session.config().clone());
        let view = session.try_move(Direction::Left).unwrap();
        assert_eq!(view.grid.rows()[0], [4, 8, 16, 2]);
        assert!(view.is_terminal());
        assert!(session.is_terminal());

        assert_eq!(session.try_move(Direction::Right), Err(MoveError::GameOver));
        assert_eq!(session.try_undo(), Err(UndoError::GameOver));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_restore_derives_terminal_flag() {
        let locked = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
        let session = session_at(locked, 300);
        assert!(session.is_terminal());

        let open = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 0]];
        let session = session_at(open, 300);
        assert!(!session.is_terminal());
        assert_eq!(session.best_score(), 300);
    }

    #[test]
    fn test_restore_truncates_history() {
        let snapshot = SessionSnapshot {
            grid: Grid::EMPTY,
            score: 0,
            best_score: 0,
            history: (0..250)
                .map(|score| HistoryEntry {
                    grid: Grid::EMPTY,
                    score,
                })
                .collect(),
        };
        let session = GameSession::restore(snapshot, SessionConfig::default(), seed(0));
        assert_eq!(session.history().len(), 100);
        assert_eq!(session.history().iter().next().map(|e| e.score), Some(150));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut session = GameSession::with_seed(seed(13));
        for dir in Direction::ALL {
            session.try_move(dir).ok();
        }
        session.raise_best_score(4096);

        let json = session.snapshot().to_json_string().unwrap();
        let loaded = SessionSnapshot::from_json_str(&json).unwrap();
        let restored = GameSession::restore(loaded, SessionConfig::default(), seed(99));

        assert_eq!(restored.grid(), session.grid());
        assert_eq!(restored.score(), session.score());
        assert_eq!(restored.best_score(), 4096);
        assert_eq!(restored.history(), session.history());
    }

    #[test]
    fn test_huge_saved_score_saturates() {
        let json = r#"{"grid":[[2,2,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]],"score":1e30,"bestScore":1e30}"#;
        let snapshot = SessionSnapshot::from_json_str(json).unwrap();
        let mut session = GameSession::restore(snapshot, SessionConfig::default(), seed(0));

        let view = session.try_move(Direction::Left).unwrap();
        assert_eq!(view.gained, 4);
        assert_eq!(session.score(), u64::MAX);
        assert_eq!(session.best_score(), u64::MAX);

        session.try_undo().unwrap();
        assert_eq!(session.score(), u64::MAX);
    }

    #[test]
    fn test_largest_tiles_on_loaded_grid() {
        let half = MAX_TILE / 2;
        let mut session = session_at([[half, half, 0, 0], [0; 4], [0; 4], [0; 4]], 0);
        let view = session.try_move(Direction::Left).unwrap();
        assert_eq!(view.grid.rows()[0][0], MAX_TILE);
        assert_eq!(view.gained, u64::from(MAX_TILE));

        let mut session = session_at([[MAX_TILE, MAX_TILE, 0, 0], [0; 4], [0; 4], [0; 4]], 0);
        assert_eq!(session.try_move(Direction::Left), Err(MoveError::NoChange));
        assert_eq!(session.grid().rows()[0], [MAX_TILE, MAX_TILE, 0, 0]);
    }

    #[test]
    fn test_settle_gates_moves() {
        let config = SessionConfig {
            require_settle: Some(true),
            ..SessionConfig::default()
        };
        let mut session = session_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], 0, config);
        assert!(!session.settle());

        session.try_move(Direction::Left).unwrap();
        assert!(session.state().is_settling());
        let grid = *session.grid();
        assert_eq!(session.try_move(Direction::Right), Err(MoveError::Busy));
        assert_eq!(session.try_undo(), Err(UndoError::Busy));
        assert_eq!(*session.grid(), grid);
        assert_eq!(session.history().len(), 1);

        assert!(session.settle());
        assert!(session.state().is_playing());
        session.try_undo().unwrap();
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut first = GameSession::with_seed(seed(77));
        let mut second = GameSession::with_seed(seed(77));
        for dir in Direction::ALL.into_iter().cycle().take(40) {
            assert_eq!(first.try_move(dir), second.try_move(dir));
        }
        assert_eq!(first.grid(), second.grid());
    }

    #[test]
    fn test_leaderboard_entry_uses_current_score() {
        let session = session_at([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]], 640);
        let entry = session.leaderboard_entry("  ");
        assert_eq!(entry.name, LeaderboardEntry::ANONYMOUS);
        assert_eq!(entry.score, 640);
    }
}
