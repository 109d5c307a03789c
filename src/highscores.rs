//! High score table
//!
//! One best score per single-player game. Versus games keep no high score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::GameId;

/// Best score per game, keyed by the game's storage name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub scores: BTreeMap<String, u64>,
}

impl HighScores {
    /// Prefix of the per-game LocalStorage keys
    const STORAGE_PREFIX: &'static str = "arcade_highscore_";

    pub fn new() -> Self {
        Self {
            scores: BTreeMap::new(),
        }
    }

    /// LocalStorage key for one game
    pub fn storage_key(game: GameId) -> String {
        format!("{}{}", Self::STORAGE_PREFIX, game.as_str())
    }

    /// Stored best for `game`, 0 if none
    pub fn get(&self, game: GameId) -> u64 {
        self.scores.get(game.as_str()).copied().unwrap_or(0)
    }

    pub fn set(&mut self, game: GameId, score: u64) {
        self.scores.insert(game.as_str().to_string(), score);
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_game_reads_zero() {
        let mut table = HighScores::new();
        assert!(table.is_empty());
        assert_eq!(table.get(GameId::Snake), 0);
        table.set(GameId::Snake, 50);
        table.set(GameId::Snake, 20);
        assert_eq!(table.get(GameId::Snake), 20);
        assert_eq!(table.get(GameId::Breakout), 0);
    }

    #[test]
    fn test_serialized_by_storage_name() {
        let mut table = HighScores::new();
        table.set(GameId::Breakout, 310);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"scores":{"breakout":310}}"#);
        let back: HighScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(
            HighScores::storage_key(GameId::Snake),
            "arcade_highscore_snake"
        );
    }
}
