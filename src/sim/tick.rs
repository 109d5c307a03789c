//! The tickable-simulation seam shared by every game variant
//!
//! A variant owns its entities and rules; the session only talks to it through
//! [`Simulation`]: feed it inputs, call `update` once per tick, read snapshots.

use std::time::Duration;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::collision::Opening;
use super::rect::Rect;
use super::state::{Direction, GameEvent, Movable, Phase, Side, TerminalCause, VersusScore};
use crate::consts::{GRID_TICK, MOTION_TICK};

/// The games this core can host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameId {
    Snake,
    AirHockey,
    Pong,
    Breakout,
}

impl GameId {
    pub const ALL: [GameId; 4] = [
        GameId::Snake,
        GameId::AirHockey,
        GameId::Pong,
        GameId::Breakout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Snake => "snake",
            GameId::AirHockey => "air-hockey",
            GameId::Pong => "pong",
            GameId::Breakout => "breakout",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "snake" => Some(GameId::Snake),
            "air-hockey" | "airhockey" | "hockey" => Some(GameId::AirHockey),
            "pong" => Some(GameId::Pong),
            "breakout" | "bricks" => Some(GameId::Breakout),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GameId::Snake => "Snake",
            GameId::AirHockey => "Air Hockey",
            GameId::Pong => "Pong",
            GameId::Breakout => "Breakout",
        }
    }

    /// Fixed tick period. Grid game steps every 200ms, the rest at ~60 Hz.
    pub fn tick_period(&self) -> Duration {
        match self {
            GameId::Snake => GRID_TICK,
            _ => MOTION_TICK,
        }
    }

    /// Two-sided games keep a versus score and have no high score
    pub fn is_versus(&self) -> bool {
        matches!(self, GameId::AirHockey | GameId::Pong)
    }
}

/// Who controls the second paddle of a versus game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Opponent {
    #[default]
    Computer,
    TwoPlayer,
}

/// Held-key state along a paddle's movement axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    Stop,
    /// Toward smaller coordinates (up / left)
    Decrease,
    /// Toward larger coordinates (down / right)
    Increase,
}

impl Motion {
    pub fn sign(self) -> f32 {
        match self {
            Motion::Stop => 0.0,
            Motion::Decrease => -1.0,
            Motion::Increase => 1.0,
        }
    }
}

/// Semantic input commands (never raw device state)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Input {
    /// Snake heading change
    Direction(Direction),
    /// Pointer moved; field coordinates for that side's paddle
    PointerAt { side: Side, pos: Vec2 },
    /// Movement key pressed/released for that side's paddle
    Hold { side: Side, motion: Motion },
    /// Pause toggle (handled by the session)
    TogglePause,
}

/// What the session should do after a variant consumed an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEffect {
    Ignored,
    Recorded,
    /// The input starts play (snake's first direction)
    Activate,
}

/// Drawable element of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Body {
    /// Ball or puck
    Ball(Movable),
    RoundPaddle { side: Side, pos: Vec2, radius: f32 },
    Paddle { side: Option<Side>, rect: Rect },
    Goal(Opening),
    Brick { rect: Rect, row: u8 },
    SnakeCell { cell: IVec2, head: bool },
    Food(IVec2),
}

/// Score display state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scoreboard {
    Versus(VersusScore),
    Solo {
        score: u64,
        lives: Option<u8>,
        level: Option<u32>,
    },
}

/// Render-ready view of one variant after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub game: GameId,
    /// Ticks simulated since the last reset
    pub tick: u64,
    /// Field size in the variant's units (pixels; cells for snake)
    pub field: Vec2,
    pub bodies: Vec<Body>,
    pub scoreboard: Scoreboard,
}

/// Final result of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Winner { side: Side, score: VersusScore },
    Final {
        score: u64,
        level: Option<u32>,
        length: Option<usize>,
    },
}

impl Outcome {
    /// Result of a two-sided game; before the threshold the leader is reported
    pub fn versus(cause: Option<TerminalCause>, score: VersusScore) -> Self {
        let side = match cause {
            Some(TerminalCause::WinThreshold { winner }) => winner,
            _ => score.leader(),
        };
        Outcome::Winner { side, score }
    }
}

/// A game variant: entity state plus its rule engine.
///
/// Implementations must treat `update` as a no-op once terminal and must not
/// mutate entity state in `handle_input` beyond recording intent; recorded
/// intent is applied at the start of the next `update`.
pub trait Simulation {
    fn id(&self) -> GameId;

    fn tick_period(&self) -> Duration {
        self.id().tick_period()
    }

    /// Phase a fresh session starts in
    fn start_phase(&self) -> Phase {
        Phase::Active
    }

    /// Select computer or human control of the second paddle
    fn set_opponent(&mut self, _opponent: Opponent) {}

    /// Reinitialize entities, counters and RNG from `seed`
    fn reset(&mut self, seed: u64);

    fn handle_input(&mut self, input: Input, phase: Phase) -> InputEffect;

    /// Advance one tick, appending anything notable to `events`
    fn update(&mut self, events: &mut Vec<GameEvent>);

    fn terminal_cause(&self) -> Option<TerminalCause>;

    fn is_terminal(&self) -> bool {
        self.terminal_cause().is_some()
    }

    fn snapshot(&self) -> Snapshot;

    fn outcome(&self) -> Outcome;

    /// Single-player score eligible for the high score table
    fn score(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_id_round_trip_names() {
        for id in GameId::ALL {
            assert_eq!(GameId::from_str(id.as_str()), Some(id));
        }
        assert_eq!(GameId::from_str("AirHockey"), Some(GameId::AirHockey));
        assert_eq!(GameId::from_str("tictactoe"), None);
    }

    #[test]
    fn test_tick_periods_keep_ratio() {
        let grid = GameId::Snake.tick_period();
        let motion = GameId::Pong.tick_period();
        assert_eq!(grid.as_millis(), 200);
        assert_eq!(motion.as_millis(), 16);
        assert_eq!(GameId::Breakout.tick_period(), motion);
    }

    #[test]
    fn test_motion_sign() {
        assert_eq!(Motion::Decrease.sign(), -1.0);
        assert_eq!(Motion::Stop.sign(), 0.0);
        assert_eq!(Motion::Increase.sign(), 1.0);
    }
}
