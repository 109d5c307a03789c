//! Shared entity records and game-state vocabulary
//!
//! Everything a variant mutates inside a tick is built from these types.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the first move (snake) or for the clock to start
    Idle,
    /// Ticks mutate state
    Active,
    /// Ticks are suspended, nothing mutates
    Paused,
    /// Session ended, awaiting restart
    Terminal,
}

impl Phase {
    /// Whether a tick is allowed to mutate simulation state
    #[inline]
    pub fn accepts_ticks(self) -> bool {
        self == Phase::Active
    }
}

/// Side of a two-player field. Player 1 always defends the left goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// 0 for player 1, 1 for player 2
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Grid step direction for snake input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// One-cell step (y grows downward)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.delta() == -other.delta()
    }
}

/// A kinematic entity advanced once per tick (ball, puck, round paddle)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movable {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Movable {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self { pos, vel, radius }
    }

    /// Advance position by the current velocity (exactly once per tick)
    #[inline]
    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    /// Put the movable back at a serve point with a fresh velocity
    pub fn serve(&mut self, pos: Vec2, vel: Vec2) {
        self.pos = pos;
        self.vel = vel;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// A destructible brick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub rect: Rect,
    /// Row index, used by renderers for colour banding
    pub row: u8,
    /// Cleared to false once hit; never set back within a level
    pub visible: bool,
}

impl Brick {
    pub fn new(rect: Rect, row: u8) -> Self {
        Self {
            rect,
            row,
            visible: true,
        }
    }
}

/// Running score of a two-sided game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersusScore {
    pub player1: u32,
    pub player2: u32,
}

impl VersusScore {
    pub fn credit(&mut self, side: Side) {
        match side {
            Side::Left => self.player1 += 1,
            Side::Right => self.player2 += 1,
        }
    }

    /// The side that has reached `target`, player 1 checked first
    pub fn winner(&self, target: u32) -> Option<Side> {
        if self.player1 >= target {
            Some(Side::Left)
        } else if self.player2 >= target {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Side currently ahead; ties go to player 1
    pub fn leader(&self) -> Side {
        if self.player1 >= self.player2 {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalCause {
    /// Snake head left the grid
    WallCollision,
    /// Snake head entered its own body
    SelfCollision,
    /// Breakout ran out of lives
    LivesExhausted,
    /// A paddle-game side reached the win threshold
    WinThreshold { winner: Side },
}

/// Things that happened during a tick (for audio/effects/logging)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WallBounce,
    PaddleHit { side: Side },
    Goal { scorer: Side },
    BrickDestroyed { index: usize },
    BallLost { lives_left: u8 },
    LevelCleared { level: u32 },
    FoodEaten { length: usize },
    Terminal(TerminalCause),
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Fresh generator at the start of the seeded stream
    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}
