//! Pong: a ball between two rectangular paddles; the side walls are goals

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{reflect_off, side_paddle_contact, wall_contacts};
use super::rect::{Rect, Span};
use super::state::{GameEvent, Movable, Phase, RngState, Side, TerminalCause, VersusScore};
use super::tick::{
    Body, GameId, Input, InputEffect, Motion, Opponent, Outcome, Scoreboard, Simulation, Snapshot,
};
use crate::centered_spread;

/// Pong tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongConfig {
    pub field: Vec2,
    pub ball_radius: f32,
    /// |vx| of a served ball
    pub serve_speed: f32,
    /// Served vy is uniform in [-serve_spread, serve_spread)
    pub serve_spread: f32,
    pub paddle_size: Vec2,
    /// Top-left corner of each paddle at reset
    pub paddle_starts: [Vec2; 2],
    /// Pixels per tick while a movement key is held
    pub paddle_speed: f32,
    /// Allowed range of a paddle's top edge
    pub paddle_travel: Span,
    /// A paddle hit adds a vy kick uniform in [-hit_kick, hit_kick)
    pub hit_kick: f32,
    pub tracking_gain: f32,
    pub win_score: u32,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            field: Vec2::new(600.0, 400.0),
            ball_radius: 8.0,
            serve_speed: 4.0,
            serve_spread: 2.0,
            paddle_size: Vec2::new(10.0, 100.0),
            paddle_starts: [Vec2::new(10.0, 150.0), Vec2::new(580.0, 150.0)],
            paddle_speed: 6.0,
            paddle_travel: Span::new(0.0, 300.0),
            hit_kick: 1.0,
            tracking_gain: 0.1,
            win_score: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pong {
    config: PongConfig,
    opponent: Opponent,
    rng_state: RngState,
    rng: Pcg32,
    ball: Movable,
    paddles: [Rect; 2],
    /// Held movement key per side
    holds: [Motion; 2],
    score: VersusScore,
    ticks: u64,
    cause: Option<TerminalCause>,
}

impl Pong {
    pub fn new(config: PongConfig, seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let mut game = Self {
            rng: rng_state.to_rng(),
            rng_state,
            opponent: Opponent::default(),
            ball: Movable::new(Vec2::ZERO, Vec2::ZERO, config.ball_radius),
            paddles: [Rect::new(0.0, 0.0, 0.0, 0.0); 2],
            holds: [Motion::Stop; 2],
            score: VersusScore::default(),
            ticks: 0,
            cause: None,
            config,
        };
        game.reset(seed);
        game
    }

    pub fn ball(&self) -> &Movable {
        &self.ball
    }

    pub fn paddles(&self) -> [Rect; 2] {
        self.paddles
    }

    pub fn score(&self) -> VersusScore {
        self.score
    }

    fn serve(&mut self) {
        let vx = if self.rng.random_bool(0.5) {
            self.config.serve_speed
        } else {
            -self.config.serve_speed
        };
        let vy = centered_spread(self.rng.random::<f32>(), self.config.serve_spread);
        self.ball.serve(self.config.field * 0.5, Vec2::new(vx, vy));
    }

    fn move_paddles(&mut self) {
        let travel = self.config.paddle_travel;
        let left = &mut self.paddles[Side::Left.index()];
        left.min.y = travel.clamp(left.min.y + self.holds[0].sign() * self.config.paddle_speed);

        let right = &mut self.paddles[Side::Right.index()];
        match self.opponent {
            Opponent::Computer => {
                // Aim the paddle centre at the ball
                let gap = self.ball.pos.y - right.min.y - right.size.y * 0.5;
                right.min.y = travel.clamp(right.min.y + gap * self.config.tracking_gain);
            }
            Opponent::TwoPlayer => {
                right.min.y =
                    travel.clamp(right.min.y + self.holds[1].sign() * self.config.paddle_speed);
            }
        }
    }
}

impl Simulation for Pong {
    fn id(&self) -> GameId {
        GameId::Pong
    }

    fn set_opponent(&mut self, opponent: Opponent) {
        self.opponent = opponent;
    }

    fn reset(&mut self, seed: u64) {
        self.rng_state = RngState::new(seed);
        self.rng = self.rng_state.to_rng();
        let size = self.config.paddle_size;
        self.paddles = self
            .config
            .paddle_starts
            .map(|start| Rect::new(start.x, start.y, size.x, size.y));
        self.holds = [Motion::Stop; 2];
        self.score = VersusScore::default();
        self.ticks = 0;
        self.cause = None;
        self.ball.radius = self.config.ball_radius;
        self.serve();
    }

    fn handle_input(&mut self, input: Input, phase: Phase) -> InputEffect {
        if phase == Phase::Terminal {
            return InputEffect::Ignored;
        }
        match input {
            Input::Hold { side, motion } => {
                if side == Side::Right && self.opponent == Opponent::Computer {
                    return InputEffect::Ignored;
                }
                self.holds[side.index()] = motion;
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
        self.move_paddles();

        self.ball.integrate();

        let field = Rect::field(self.config.field.x, self.config.field.y);
        let sides = wall_contacts(&self.ball, &field).vertical_only();
        if sides.any() {
            self.ball.vel = reflect_off(self.ball.vel, sides);
            events.push(GameEvent::WallBounce);
        }

        for side in [Side::Left, Side::Right] {
            if side_paddle_contact(&self.ball, &self.paddles[side.index()], side) {
                let away = self.ball.vel.x.abs();
                self.ball.vel.x = match side {
                    Side::Left => away,
                    Side::Right => -away,
                };
                self.ball.vel.y += centered_spread(self.rng.random::<f32>(), self.config.hit_kick);
                events.push(GameEvent::PaddleHit { side });
            }
        }

        let scorer = if self.ball.pos.x <= 0.0 {
            Some(Side::Right)
        } else if self.ball.pos.x >= self.config.field.x {
            Some(Side::Left)
        } else {
            None
        };
        if let Some(scorer) = scorer {
            self.score.credit(scorer);
            events.push(GameEvent::Goal { scorer });
            log::debug!(
                "Pong point for {:?}: {}-{}",
                scorer,
                self.score.player1,
                self.score.player2
            );
            self.serve();
        }

        if let Some(winner) = self.score.winner(self.config.win_score) {
            let cause = TerminalCause::WinThreshold { winner };
            self.cause = Some(cause);
            events.push(GameEvent::Terminal(cause));
        }
    }

    fn terminal_cause(&self) -> Option<TerminalCause> {
        self.cause
    }

    fn snapshot(&self) -> Snapshot {
        let mut bodies = Vec::with_capacity(3);
        for side in [Side::Left, Side::Right] {
            bodies.push(Body::Paddle {
                side: Some(side),
                rect: self.paddles[side.index()],
            });
        }
        bodies.push(Body::Ball(self.ball));
        Snapshot {
            game: GameId::Pong,
            tick: self.ticks,
            field: self.config.field,
            bodies,
            scoreboard: Scoreboard::Versus(self.score),
        }
    }

    fn outcome(&self) -> Outcome {
        Outcome::versus(self.cause, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Pong {
        Pong::new(PongConfig::default(), 77)
    }

    #[test]
    fn test_serve_speed() {
        let g = game();
        assert_eq!(g.ball().pos, Vec2::new(300.0, 200.0));
        assert_eq!(g.ball().vel.x.abs(), 4.0);
        assert!(g.ball().vel.y >= -2.0 && g.ball().vel.y < 2.0);
    }

    #[test]
    fn test_ball_past_left_edge_scores_for_player2() {
        let mut g = game();
        g.ball.pos = Vec2::new(2.0, 30.0);
        g.ball.vel = Vec2::new(-4.0, 0.0);
        let mut events = Vec::new();
        g.update(&mut events);
        assert_eq!(g.score(), VersusScore { player1: 0, player2: 1 });
        assert_eq!(g.ball().pos, Vec2::new(300.0, 200.0));
        assert_eq!(g.ball().vel.x.abs(), 4.0);
    }

    #[test]
    fn test_left_paddle_returns_ball() {
        let mut g = game();
        g.ball.pos = Vec2::new(24.0, 200.0);
        g.ball.vel = Vec2::new(-4.0, 0.5);
        let mut events = Vec::new();
        g.update(&mut events);
        assert_eq!(g.ball().vel.x, 4.0);
        assert!(g.ball().vel.y >= -0.5 && g.ball().vel.y < 1.5);
        assert!(events.contains(&GameEvent::PaddleHit { side: Side::Left }));
        assert_eq!(g.score(), VersusScore::default());
    }

    #[test]
    fn test_held_key_moves_and_clamps() {
        let mut g = game();
        g.handle_input(
            Input::Hold {
                side: Side::Left,
                motion: Motion::Decrease,
            },
            Phase::Active,
        );
        let mut events = Vec::new();
        g.update(&mut events);
        assert_eq!(g.paddles()[0].min.y, 144.0);
        for _ in 0..40 {
            g.update(&mut events);
            if g.is_terminal() {
                break;
            }
        }
        assert_eq!(g.paddles()[0].min.y, 0.0);
    }

    #[test]
    fn test_computer_centres_on_ball() {
        let mut g = game();
        g.ball.pos = Vec2::new(300.0, 100.0);
        g.ball.vel = Vec2::ZERO;
        let mut events = Vec::new();
        g.update(&mut events);
        // Paddle centre at 200, ball at 100: move 10% of -100
        assert!((g.paddles()[1].min.y - 140.0).abs() < 1e-4);
    }

    #[test]
    fn test_tenth_point_wins() {
        let mut g = game();
        g.score.player1 = 9;
        g.ball.pos = Vec2::new(598.0, 30.0);
        g.ball.vel = Vec2::new(4.0, 0.0);
        let mut events = Vec::new();
        g.update(&mut events);
        assert_eq!(
            g.terminal_cause(),
            Some(TerminalCause::WinThreshold { winner: Side::Left })
        );
        assert_eq!(
            events.last(),
            Some(&GameEvent::Terminal(TerminalCause::WinThreshold { winner: Side::Left }))
        );
    }
}
