use log::{info, warn};
use rand::Rng as _;
use twenty48_engine::{
    Direction, GameSession, LeaderboardEntry, MoveError, SessionConfig, SessionSnapshot,
    SessionView, SnapshotError, TileSeed, UndoError,
};

use crate::{
    leaderboard::Leaderboard,
    storage::{Storage, StorageError},
};

/// Key of the saved session snapshot.
pub const SESSION_KEY: &str = "gameState";
/// Key of the best score, stored apart from the session so it survives a discarded save.
pub const BEST_SCORE_KEY: &str = "bestScore";
/// Key of the leaderboard.
pub const LEADERBOARD_KEY: &str = "leaders";

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum StoreError {
    #[display("{_0}")]
    Storage(StorageError),
    #[display("{_0}")]
    Snapshot(SnapshotError),
    #[display("failed to encode stored value: {_0}")]
    Json(serde_json::Error),
}

/// Reads and writes game data through a [`Storage`].
///
/// The `try_*` methods report failures; the others log them and carry on, so
/// a broken storage never interrupts play.
#[derive(Debug, Clone)]
pub struct GameStore<S> {
    storage: S,
    config: SessionConfig,
}

impl<S> GameStore<S>
where
    S: Storage,
{
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, SessionConfig::default())
    }

    pub fn with_config(storage: S, config: SessionConfig) -> Self {
        Self { storage, config }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resumes the saved game, or starts a new one if there is none or it is malformed.
    ///
    /// The separately stored best score is merged in either way.
    pub fn load_session(&self) -> GameSession {
        self.load_session_with_seed(rand::rng().random())
    }

    pub fn load_session_with_seed(&self, seed: TileSeed) -> GameSession {
        let mut session = match self.try_load_snapshot() {
            Ok(Some(snapshot)) => GameSession::restore(snapshot, self.config.clone(), seed),
            Ok(None) => {
                info!("no saved game, starting a new one");
                GameSession::with_config(self.config.clone(), seed)
            }
            Err(e) => {
                warn!("discarding saved game: {e}");
                GameSession::with_config(self.config.clone(), seed)
            }
        };
        session.raise_best_score(self.load_best_score());
        session
    }

    pub fn try_load_snapshot(&self) -> Result<Option<SessionSnapshot>, StoreError> {
        let Some(json) = self.storage.get(SESSION_KEY)? else {
            return Ok(None);
        };
        Ok(Some(SessionSnapshot::from_json_str(&json)?))
    }

    pub fn try_save_session(&mut self, session: &GameSession) -> Result<(), StoreError> {
        let json = session.snapshot().to_json_string()?;
        self.storage.set(SESSION_KEY, &json)?;
        Ok(())
    }

    pub fn save_session(&mut self, session: &GameSession) {
        if let Err(e) = self.try_save_session(session) {
            warn!("failed to save game: {e}");
        }
    }

    /// Returns the stored best score, or 0 if it is missing, unreadable, or not a number.
    pub fn load_best_score(&self) -> u64 {
        match self.storage.get(BEST_SCORE_KEY) {
            Ok(Some(value)) => value.trim().parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!("failed to read best score: {e}");
                0
            }
        }
    }

    pub fn try_save_best_score(&mut self, best: u64) -> Result<(), StoreError> {
        self.storage.set(BEST_SCORE_KEY, &best.to_string())?;
        Ok(())
    }

    pub fn save_best_score(&mut self, best: u64) {
        if let Err(e) = self.try_save_best_score(best) {
            warn!("failed to save best score: {e}");
        }
    }

    /// Returns the stored leaderboard. A missing or corrupt one reads as empty.
    pub fn leaderboard(&self) -> Leaderboard {
        self.try_leaderboard().unwrap_or_else(|e| {
            warn!("ignoring stored leaderboard: {e}");
            Leaderboard::new()
        })
    }

    pub fn try_leaderboard(&self) -> Result<Leaderboard, StoreError> {
        let Some(json) = self.storage.get(LEADERBOARD_KEY)? else {
            return Ok(Leaderboard::new());
        };
        Ok(serde_json::from_str(&json)?)
    }

    /// Adds `entry` to the stored leaderboard and returns the updated board.
    pub fn submit_score(&mut self, entry: LeaderboardEntry) -> Leaderboard {
        let mut board = self.leaderboard();
        let name = entry.name.clone();
        let rank = board.insert(entry);
        match serde_json::to_string(&board) {
            Ok(json) => {
                if let Err(e) = self.storage.set(LEADERBOARD_KEY, &json) {
                    warn!("failed to save leaderboard: {e}");
                }
            }
            Err(e) => warn!("failed to encode leaderboard: {e}"),
        }
        info!("leaderboard entry for {name}: rank {rank:?}");
        board
    }

    pub fn clear_leaderboard(&mut self) {
        if let Err(e) = self.storage.remove(LEADERBOARD_KEY) {
            warn!("failed to clear leaderboard: {e}");
        }
    }
}

/// A [`GameSession`] that saves itself after every change.
///
/// This is the driver a front-end holds: it forwards moves, undo, and new
/// games to the session and keeps the storage in step with the result.
///
/// # Example
///
/// ```
/// use twenty48_engine::Direction;
/// use twenty48_store::{GameStore, MemoryStorage, SavedGame};
///
/// let mut game = SavedGame::open(GameStore::new(MemoryStorage::new()));
/// let _ = game.try_move(Direction::Left);
/// let grid = *game.session().grid();
///
/// let reopened = SavedGame::open(GameStore::new(game.into_store().into_storage()));
/// assert_eq!(*reopened.session().grid(), grid);
/// ```
#[derive(Debug, Clone)]
pub struct SavedGame<S> {
    store: GameStore<S>,
    session: GameSession,
    saved_best: u64,
}

impl<S> SavedGame<S>
where
    S: Storage,
{
    /// Loads the saved game from `store`, starting a new one if needed.
    pub fn open(store: GameStore<S>) -> Self {
        let session = store.load_session();
        Self::from_parts(store, session)
    }

    pub fn open_with_seed(store: GameStore<S>, seed: TileSeed) -> Self {
        let session = store.load_session_with_seed(seed);
        Self::from_parts(store, session)
    }

    fn from_parts(store: GameStore<S>, session: GameSession) -> Self {
        let saved_best = store.load_best_score();
        let mut this = Self {
            store,
            session,
            saved_best,
        };
        this.persist();
        this
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn store(&self) -> &GameStore<S> {
        &self.store
    }

    pub fn into_store(self) -> GameStore<S> {
        self.store
    }

    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    pub fn new_game(&mut self) -> SessionView {
        let view = self.session.start_new_game();
        self.persist();
        view
    }

    pub fn try_move(&mut self, dir: Direction) -> Result<SessionView, MoveError> {
        let view = self.session.try_move(dir)?;
        self.persist();
        Ok(view)
    }

    pub fn try_undo(&mut self) -> Result<SessionView, UndoError> {
        let view = self.session.try_undo()?;
        self.persist();
        Ok(view)
    }

    pub fn settle(&mut self) -> bool {
        self.session.settle()
    }

    /// Records the current score on the leaderboard under `name`.
    pub fn submit_score(&mut self, name: &str) -> Leaderboard {
        let entry = self.session.leaderboard_entry(name);
        self.store.submit_score(entry)
    }

    pub fn leaderboard(&self) -> Leaderboard {
        self.store.leaderboard()
    }

    pub fn clear_leaderboard(&mut self) {
        self.store.clear_leaderboard();
    }

    fn persist(&mut self) {
        let best = self.session.best_score();
        if best > self.saved_best {
            self.store.save_best_score(best);
            self.saved_best = best;
        }
        self.store.save_session(&self.session);
    }
}
