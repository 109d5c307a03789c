//! Session settings and preferences
//!
//! Persisted separately from high scores in LocalStorage.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::as_millis_u64;
use crate::consts::TERMINAL_NOTIFY_DELAY;
use crate::sim::GameId;
pub use crate::sim::Opponent;

impl Opponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Opponent::Computer => "Computer",
            Opponent::TwoPlayer => "Two Player",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "computer" | "cpu" | "ai" => Some(Opponent::Computer),
            "two-player" | "two player" | "2p" | "human" => Some(Opponent::TwoPlayer),
            _ => None,
        }
    }
}

/// Options a session is started with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Who plays the second paddle in versus games
    pub opponent: Opponent,
    /// Player names as typed; empty means "use the default name"
    pub player1_name: String,
    pub player2_name: String,
    /// Fixed RNG seed; a fresh random seed per start when None
    pub seed: Option<u64>,
    /// Delay between the terminal tick and the shell notification
    pub notify_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            opponent: Opponent::Computer,
            player1_name: String::new(),
            player2_name: String::new(),
            seed: None,
            notify_delay_ms: as_millis_u64(TERMINAL_NOTIFY_DELAY),
        }
    }
}

impl Settings {
    pub fn with_opponent(mut self, opponent: Opponent) -> Self {
        self.opponent = opponent;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_names(mut self, player1: &str, player2: &str) -> Self {
        self.player1_name = player1.to_string();
        self.player2_name = player2.to_string();
        self
    }

    pub fn notify_delay(&self) -> Duration {
        Duration::from_millis(self.notify_delay_ms)
    }

    /// Display names for `game`, player 1 first, with defaults substituted
    /// for blank entries
    pub fn player_names(&self, game: GameId) -> Vec<String> {
        fn or_default(name: &str, fallback: &str) -> String {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                fallback.to_string()
            } else {
                trimmed.to_string()
            }
        }

        if !game.is_versus() {
            return vec![or_default(&self.player1_name, "Player")];
        }
        let player2 = match self.opponent {
            Opponent::Computer => Opponent::Computer.as_str().to_string(),
            Opponent::TwoPlayer => or_default(&self.player2_name, "Player 2"),
        };
        vec![or_default(&self.player1_name, "Player 1"), player2]
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native: settings come from the command line, nothing is stored
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}
