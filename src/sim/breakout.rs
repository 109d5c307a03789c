//! Breakout: clear a wall of bricks with a ball and a bottom paddle
//!
//! Losing the ball off the bottom costs a life; clearing every brick deals a
//! fresh layout and speeds the ball up.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{BrickReflection, paddle_rebound, reflect_off, strike_bricks, wall_contacts};
use super::rect::{Rect, Span};
use super::state::{Brick, GameEvent, Movable, Phase, Side, TerminalCause};
use super::tick::{
    Body, GameId, Input, InputEffect, Motion, Outcome, Scoreboard, Simulation, Snapshot,
};

/// Breakout tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakoutConfig {
    pub field: Vec2,
    pub ball_radius: f32,
    pub serve_pos: Vec2,
    pub serve_vel: Vec2,
    /// Paddle rectangle at reset
    pub paddle: Rect,
    /// Pixels per tick while a movement key is held
    pub paddle_speed: f32,
    /// Allowed range of the paddle's left edge
    pub paddle_travel: Span,
    /// Horizontal speed gained per pixel of hit offset from the paddle centre
    pub steer_gain: f32,
    pub brick_rows: u8,
    pub brick_cols: u8,
    pub brick_size: Vec2,
    /// Distance between neighbouring brick origins
    pub brick_pitch: Vec2,
    /// y of the first brick row
    pub brick_top: f32,
    pub brick_score: u64,
    pub lives: u8,
    /// Velocity multiplier applied when a level is cleared
    pub level_speedup: f32,
    pub reflection: BrickReflection,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            field: Vec2::new(600.0, 500.0),
            ball_radius: 8.0,
            serve_pos: Vec2::new(300.0, 400.0),
            serve_vel: Vec2::new(4.0, -4.0),
            paddle: Rect::new(250.0, 460.0, 100.0, 10.0),
            paddle_speed: 8.0,
            paddle_travel: Span::new(0.0, 500.0),
            steer_gain: 0.1,
            brick_rows: 5,
            brick_cols: 10,
            brick_size: Vec2::new(55.0, 25.0),
            brick_pitch: Vec2::new(60.0, 30.0),
            brick_top: 50.0,
            brick_score: 10,
            lives: 3,
            level_speedup: 1.1,
            reflection: BrickReflection::default(),
        }
    }
}

impl BreakoutConfig {
    /// A full wall of visible bricks, row-major
    pub fn layout(&self) -> Vec<Brick> {
        let mut bricks = Vec::with_capacity(self.brick_rows as usize * self.brick_cols as usize);
        for row in 0..self.brick_rows {
            for col in 0..self.brick_cols {
                let x = col as f32 * self.brick_pitch.x;
                let y = self.brick_top + row as f32 * self.brick_pitch.y;
                bricks.push(Brick::new(
                    Rect::new(x, y, self.brick_size.x, self.brick_size.y),
                    row,
                ));
            }
        }
        bricks
    }
}

#[derive(Debug, Clone)]
pub struct Breakout {
    config: BreakoutConfig,
    ball: Movable,
    paddle: Rect,
    bricks: Vec<Brick>,
    hold: Motion,
    /// Latest pointer x, applied at the next tick
    pointer_x: Option<f32>,
    score: u64,
    lives: u8,
    level: u32,
    ticks: u64,
    cause: Option<TerminalCause>,
}

impl Breakout {
    pub fn new(config: BreakoutConfig) -> Self {
        let mut game = Self {
            ball: Movable::new(config.serve_pos, config.serve_vel, config.ball_radius),
            paddle: config.paddle,
            bricks: Vec::new(),
            hold: Motion::Stop,
            pointer_x: None,
            score: 0,
            lives: config.lives,
            level: 1,
            ticks: 0,
            cause: None,
            config,
        };
        game.reset(0);
        game
    }

    pub fn ball(&self) -> &Movable {
        &self.ball
    }

    pub fn paddle(&self) -> &Rect {
        &self.paddle
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    fn move_paddle(&mut self) {
        let travel = self.config.paddle_travel;
        if let Some(x) = self.pointer_x.take() {
            self.paddle.min.x = travel.clamp(x - self.paddle.size.x * 0.5);
        }
        if self.hold != Motion::Stop {
            self.paddle.min.x =
                travel.clamp(self.paddle.min.x + self.hold.sign() * self.config.paddle_speed);
        }
    }

    fn serve(&mut self) {
        self.ball.serve(self.config.serve_pos, self.config.serve_vel);
    }
}

impl Simulation for Breakout {
    fn id(&self) -> GameId {
        GameId::Breakout
    }

    /// Breakout has no randomness; the seed is accepted for a uniform reset
    fn reset(&mut self, _seed: u64) {
        self.ball.radius = self.config.ball_radius;
        self.serve();
        self.paddle = self.config.paddle;
        self.bricks = self.config.layout();
        self.hold = Motion::Stop;
        self.pointer_x = None;
        self.score = 0;
        self.lives = self.config.lives;
        self.level = 1;
        self.ticks = 0;
        self.cause = None;
    }

    fn handle_input(&mut self, input: Input, phase: Phase) -> InputEffect {
        if phase == Phase::Terminal {
            return InputEffect::Ignored;
        }
        match input {
            Input::Hold {
                side: Side::Left,
                motion,
            } => {
                self.hold = motion;
                InputEffect::Recorded
            }
            Input::PointerAt {
                side: Side::Left,
                pos,
            } => {
                self.pointer_x = Some(pos.x);
                InputEffect::Recorded
            }
            _ => InputEffect::Ignored,
        }
    }

    fn update(&mut self, events: &mut Vec<GameEvent>) {
        if self.cause.is_some() {
            return;
        }
        self.ticks += 1;
        self.move_paddle();

        self.ball.integrate();

        let field = Rect::field(self.config.field.x, self.config.field.y);
        let sides = wall_contacts(&self.ball, &field).without_bottom();
        if sides.any() {
            self.ball.vel = reflect_off(self.ball.vel, sides);
            events.push(GameEvent::WallBounce);
        }

        if let Some(vel) = paddle_rebound(&self.ball, &self.paddle, self.config.steer_gain) {
            self.ball.vel = vel;
            events.push(GameEvent::PaddleHit { side: Side::Left });
        }

        let broken = strike_bricks(&mut self.ball, &mut self.bricks, self.config.reflection);
        self.score += broken.len() as u64 * self.config.brick_score;
        events.extend(broken.into_iter().map(|index| GameEvent::BrickDestroyed { index }));

        if self.ball.pos.y >= self.config.field.y {
            self.lives = self.lives.saturating_sub(1);
            events.push(GameEvent::BallLost {
                lives_left: self.lives,
            });
            if self.lives == 0 {
                log::debug!("Breakout over at level {} with {}", self.level, self.score);
                let cause = TerminalCause::LivesExhausted;
                self.cause = Some(cause);
                events.push(GameEvent::Terminal(cause));
                return;
            }
            self.serve();
        }

        // An empty layout has nothing to clear
        if !self.bricks.is_empty() && self.bricks.iter().all(|b| !b.visible) {
            self.level += 1;
            self.bricks = self.config.layout();
            self.ball.vel *= self.config.level_speedup;
            log::debug!("Breakout level {} reached", self.level);
            events.push(GameEvent::LevelCleared { level: self.level });
        }
    }

    fn terminal_cause(&self) -> Option<TerminalCause> {
        self.cause
    }

    fn snapshot(&self) -> Snapshot {
        let mut bodies: Vec<Body> = self
            .bricks
            .iter()
            .filter(|b| b.visible)
            .map(|b| Body::Brick {
                rect: b.rect,
                row: b.row,
            })
            .collect();
        bodies.push(Body::Paddle {
            side: None,
            rect: self.paddle,
        });
        bodies.push(Body::Ball(self.ball));
        Snapshot {
            game: GameId::Breakout,
            tick: self.ticks,
            field: self.config.field,
            bodies,
            scoreboard: Scoreboard::Solo {
                score: self.score,
                lives: Some(self.lives),
                level: Some(self.level),
            },
        }
    }

    fn outcome(&self) -> Outcome {
        Outcome::Final {
            score: self.score,
            level: Some(self.level),
            length: None,
        }
    }

    fn score(&self) -> Option<u64> {
        Some(self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Breakout {
        Breakout::new(BreakoutConfig::default())
    }

    #[test]
    fn test_layout() {
        let g = game();
        assert_eq!(g.bricks().len(), 50);
        let last = g.bricks()[49];
        assert_eq!(last.rect.min, Vec2::new(540.0, 170.0));
        assert_eq!(last.row, 4);
        assert!(g.bricks().iter().all(|b| b.visible));
    }

    #[test]
    fn test_brick_hit_scores_and_flips() {
        let mut g = game();
        g.ball.pos = Vec2::new(20.0, 60.0);
        let mut events = Vec::new();
        g.update(&mut events);
        assert_eq!(g.ball().pos, Vec2::new(24.0, 56.0));
        assert_eq!(g.ball().vel, Vec2::new(4.0, 4.0));
        assert!(!g.bricks()[0].visible);
        assert_eq!(g.score(), Some(10));
        assert!(events.contains(&GameEvent::BrickDestroyed { index: 0 }));
    }

    #[test]
    fn test_clearing_all_bricks_advances_level() {
        let mut g = game();
        for brick in g.bricks.iter_mut().skip(1) {
            brick.visible = false;
        }
        g.ball.pos = Vec2::new(20.0, 60.0);
        let mut events = Vec::new();
        g.update(&mut events);

        assert_eq!(g.level(), 2);
        assert_eq!(g.bricks().len(), 50);
        assert!(g.bricks().iter().all(|b| b.visible));
        assert!((g.ball().vel.x - 4.4).abs() < 1e-4);
        assert!((g.ball().vel.y - 4.4).abs() < 1e-4);
        assert!(events.contains(&GameEvent::LevelCleared { level: 2 }));
        assert!(!g.is_terminal());
    }

    #[test]
    fn test_empty_layout_never_clears() {
        let mut g = Breakout::new(BreakoutConfig {
            brick_rows: 0,
            ..BreakoutConfig::default()
        });
        assert!(g.bricks().is_empty());
        let mut events = Vec::new();
        for _ in 0..5 {
            g.update(&mut events);
        }
        assert_eq!(g.level(), 1);
        assert_eq!(g.ball().pos, Vec2::new(320.0, 380.0));
        assert_eq!(g.ball().vel, Vec2::new(4.0, -4.0));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::LevelCleared { .. }))
        );
    }

    #[test]
    fn test_lost_ball_keeps_score_and_level() {
        let mut g = game();
        g.score = 120;
        g.level = 3;
        g.ball.pos = Vec2::new(100.0, 497.0);
        g.ball.vel = Vec2::new(0.0, 4.0);
        let mut events = Vec::new();
        g.update(&mut events);

        assert_eq!(g.lives(), 2);
        assert_eq!(g.score(), Some(120));
        assert_eq!(g.level(), 3);
        assert_eq!(g.ball().pos, Vec2::new(300.0, 400.0));
        assert_eq!(g.ball().vel, Vec2::new(4.0, -4.0));
        assert!(events.contains(&GameEvent::BallLost { lives_left: 2 }));
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut g = game();
        g.lives = 1;
        g.ball.pos = Vec2::new(100.0, 497.0);
        g.ball.vel = Vec2::new(0.0, 4.0);
        let mut events = Vec::new();
        g.update(&mut events);
        assert_eq!(g.lives(), 0);
        assert_eq!(g.terminal_cause(), Some(TerminalCause::LivesExhausted));

        let before = g.snapshot();
        g.update(&mut events);
        assert_eq!(g.snapshot(), before);
    }

    #[test]
    fn test_paddle_sends_ball_up() {
        let mut g = game();
        g.ball.pos = Vec2::new(316.0, 450.0);
        g.ball.vel = Vec2::new(4.0, 4.0);
        let mut events = Vec::new();
        g.update(&mut events);
        // Hit 20px right of centre
        assert_eq!(g.ball().vel.y, -4.0);
        assert!((g.ball().vel.x - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_pointer_centres_paddle() {
        let mut g = game();
        let at = |x: f32| Input::PointerAt {
            side: Side::Left,
            pos: Vec2::new(x, 0.0),
        };
        assert_eq!(g.handle_input(at(120.0), Phase::Active), InputEffect::Recorded);
        let mut events = Vec::new();
        g.update(&mut events);
        assert_eq!(g.paddle().min.x, 70.0);

        g.handle_input(at(590.0), Phase::Active);
        g.update(&mut events);
        assert_eq!(g.paddle().min.x, 500.0);
    }

    #[test]
    fn test_pointer_recorded_while_paused() {
        let mut g = game();
        let input = Input::PointerAt {
            side: Side::Left,
            pos: Vec2::new(120.0, 0.0),
        };
        assert_eq!(g.handle_input(input, Phase::Idle), InputEffect::Recorded);
        assert_eq!(g.handle_input(input, Phase::Paused), InputEffect::Recorded);
        assert_eq!(g.handle_input(input, Phase::Terminal), InputEffect::Ignored);
        assert_eq!(g.paddle().min.x, 250.0);

        let mut events = Vec::new();
        g.update(&mut events);
        assert_eq!(g.paddle().min.x, 70.0);
    }

    #[test]
    fn test_held_key_moves_paddle() {
        let mut g = game();
        g.handle_input(
            Input::Hold {
                side: Side::Left,
                motion: Motion::Increase,
            },
            Phase::Active,
        );
        let mut events = Vec::new();
        g.update(&mut events);
        assert_eq!(g.paddle().min.x, 258.0);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut g = game();
        let mut events = Vec::new();
        for _ in 0..30 {
            g.update(&mut events);
        }
        g.reset(0);
        let once = g.snapshot();
        g.reset(0);
        assert_eq!(g.snapshot(), once);
        assert_eq!(once.bodies.len(), 52);
    }
}
