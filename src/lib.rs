//! Arcade core - fixed-tick simulation for a small collection of arcade games
//!
//! Core modules:
//! - `sim`: Seeded simulation (entities, collisions, per-game rules)
//! - `platform`: Clock and cancellable timers
//! - `session`: Session controller composing clock + simulation
//! - `arcade`: Single-active-session switcher
//! - `persistence`: High score storage backends
//! - `shell`: Render sink / terminal listener boundary
//! - `web`: Browser binding (wasm32 only)

pub mod arcade;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod shell;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use arcade::Arcade;
pub use highscores::HighScores;
pub use session::SessionController;
pub use settings::{Opponent, Settings};
pub use sim::{GameId, Phase, Simulation};

use std::time::Duration;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Tick period of the grid-stepped game (snake)
    pub const GRID_TICK: Duration = Duration::from_millis(200);
    /// Tick period of the continuous-motion games
    pub const MOTION_TICK: Duration = Duration::from_millis(16);
    /// Maximum ticks delivered per clock advance to prevent spiral of death
    pub const MAX_CATCH_UP_TICKS: u32 = 8;
    /// Delay between entering Terminal and notifying the shell
    pub const TERMINAL_NOTIFY_DELAY: Duration = Duration::from_millis(500);
    /// High score table used by the native runner
    pub const HIGH_SCORE_FILE: &str = "arcade_highscores.json";
}

/// Whole milliseconds in a duration, saturating
#[inline]
pub fn as_millis_u64(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Uniform sample in [-half_width, half_width)
#[inline]
pub fn centered_spread(unit: f32, half_width: f32) -> f32 {
    (unit - 0.5) * 2.0 * half_width
}
