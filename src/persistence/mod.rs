//! High score storage backends
//!
//! Sessions talk to a [`HighScoreStore`]: one load when a session controller is
//! built, one save whenever a session beats the stored value. Failures are
//! reported as [`PersistenceError`] and never stop play; callers log them and
//! carry on with the in-memory value.

use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::highscores::HighScores;
use crate::sim::GameId;

/// Errors from a high score backend
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Reading or writing the backing file failed
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Stored data could not be encoded or decoded
    #[error("malformed high score data: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored value is not a score
    #[error("malformed high score for {game}: {value:?}")]
    Malformed { game: &'static str, value: String },

    /// No storage is reachable (no window, storage disabled, quota)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub trait HighScoreStore {
    /// Best score recorded for `game`; 0 when nothing is stored yet
    fn load_high_score(&mut self, game: GameId) -> Result<u64, PersistenceError>;

    fn save_high_score(&mut self, game: GameId, score: u64) -> Result<(), PersistenceError>;
}

/// Volatile store, used by tests and when nothing else is available
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    scores: HashMap<GameId, u64>,
    /// Number of successful saves
    pub saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(game: GameId, score: u64) -> Self {
        let mut store = Self::new();
        store.scores.insert(game, score);
        store
    }
}

impl HighScoreStore for MemoryStore {
    fn load_high_score(&mut self, game: GameId) -> Result<u64, PersistenceError> {
        Ok(self.scores.get(&game).copied().unwrap_or(0))
    }

    fn save_high_score(&mut self, game: GameId, score: u64) -> Result<(), PersistenceError> {
        self.scores.insert(game, score);
        self.saves += 1;
        Ok(())
    }
}

/// A store whose every call fails, for exercising the fallback paths
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl HighScoreStore for UnavailableStore {
    fn load_high_score(&mut self, _game: GameId) -> Result<u64, PersistenceError> {
        Err(PersistenceError::Unavailable("no backend configured".into()))
    }

    fn save_high_score(&mut self, _game: GameId, _score: u64) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("no backend configured".into()))
    }
}

/// JSON file holding a [`HighScores`] table (native only)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read_table(&self) -> Result<HighScores, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HighScores::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HighScoreStore for JsonFileStore {
    fn load_high_score(&mut self, game: GameId) -> Result<u64, PersistenceError> {
        Ok(self.read_table()?.get(game))
    }

    fn save_high_score(&mut self, game: GameId, score: u64) -> Result<(), PersistenceError> {
        let mut table = self.read_table()?;
        table.set(game, score);
        let json = serde_json::to_string_pretty(&table)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        log::info!("High score saved for {} ({})", game.display_name(), score);
        Ok(())
    }
}

/// Browser LocalStorage, one key per game (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistenceError::Unavailable("LocalStorage not available".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl HighScoreStore for LocalStorageStore {
    fn load_high_score(&mut self, game: GameId) -> Result<u64, PersistenceError> {
        let key = HighScores::storage_key(game);
        let value = Self::storage()?
            .get_item(&key)
            .map_err(|_| PersistenceError::Unavailable(format!("cannot read {}", key)))?;
        match value {
            None => Ok(0),
            Some(raw) => raw.trim().parse().map_err(|_| PersistenceError::Malformed {
                game: game.as_str(),
                value: raw,
            }),
        }
    }

    fn save_high_score(&mut self, game: GameId, score: u64) -> Result<(), PersistenceError> {
        let key = HighScores::storage_key(game);
        Self::storage()?
            .set_item(&key, &score.to_string())
            .map_err(|_| PersistenceError::Unavailable(format!("cannot write {}", key)))?;
        log::info!("High score saved for {} ({})", game.display_name(), score);
        Ok(())
    }
}

/// The store a host gets when it does not bring its own
pub fn default_store() -> Box<dyn HighScoreStore> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(LocalStorageStore)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(JsonFileStore::new(crate::consts::HIGH_SCORE_FILE))
    }
}
