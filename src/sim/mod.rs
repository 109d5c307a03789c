//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `update` per tick)
//! - Seeded RNG only
//! - Stable iteration order (layout order for bricks, front-to-back for the snake)
//! - No rendering, timing or storage dependencies

pub mod breakout;
pub mod collision;
pub mod pong;
pub mod puck;
pub mod rect;
pub mod snake;
pub mod state;
pub mod tick;

pub use breakout::{Breakout, BreakoutConfig};
pub use collision::BrickReflection;
pub use pong::{Pong, PongConfig};
pub use puck::{AirHockey, PuckConfig};
pub use rect::{Rect, Span};
pub use snake::{Snake, SnakeConfig};
pub use state::{Direction, GameEvent, Movable, Phase, Side, TerminalCause, VersusScore};
pub use tick::{
    Body, GameId, Input, InputEffect, Motion, Opponent, Outcome, Scoreboard, Simulation, Snapshot,
};

/// Build the simulation for `game` with default tunables, seeded with `seed`
pub fn build_game(game: GameId, seed: u64) -> Box<dyn Simulation> {
    match game {
        GameId::Snake => Box::new(Snake::new(SnakeConfig::default(), seed)),
        GameId::AirHockey => Box::new(AirHockey::new(PuckConfig::default(), seed)),
        GameId::Pong => Box::new(Pong::new(PongConfig::default(), seed)),
        GameId::Breakout => Box::new(Breakout::new(BreakoutConfig::default())),
    }
}
