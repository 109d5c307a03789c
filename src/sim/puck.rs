//! Air hockey: a puck, two round paddles, goal mouths in the side walls

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{
    Opening, SideContact, deflect_circle, reflect_off, resolve_side_walls, wall_contacts,
};
use super::rect::{Rect, Span};
use super::state::{GameEvent, Movable, Phase, RngState, Side, TerminalCause, VersusScore};
use super::tick::{
    Body, GameId, Input, InputEffect, Opponent, Outcome, Scoreboard, Simulation, Snapshot,
};
use crate::centered_spread;

/// Air hockey tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuckConfig {
    pub field: Vec2,
    pub puck_radius: f32,
    pub paddle_radius: f32,
    /// |vx| of a served puck
    pub serve_speed: f32,
    /// Served vy is uniform in [-serve_spread, serve_spread)
    pub serve_spread: f32,
    /// Puck speed after touching a paddle
    pub hit_speed: f32,
    /// Vertical extent of both goal mouths
    pub goal_span: Span,
    /// Distance from the side wall to the goal line
    pub goal_depth: f32,
    pub paddle_starts: [Vec2; 2],
    /// Where each player's pointer may place their paddle
    pub reach: [Rect; 2],
    /// Fraction of the gap to the puck the computer closes per tick
    pub tracking_gain: f32,
    /// Vertical clamp for the computer paddle
    pub tracking_span: Span,
    pub win_score: u32,
}

impl Default for PuckConfig {
    fn default() -> Self {
        Self {
            field: Vec2::new(600.0, 400.0),
            puck_radius: 15.0,
            paddle_radius: 25.0,
            serve_speed: 3.0,
            serve_spread: 1.0,
            hit_speed: 5.0,
            goal_span: Span::new(150.0, 250.0),
            goal_depth: 10.0,
            paddle_starts: [Vec2::new(50.0, 200.0), Vec2::new(550.0, 200.0)],
            reach: [
                Rect::new(25.0, 25.0, 250.0, 350.0),
                Rect::new(325.0, 25.0, 250.0, 350.0),
            ],
            tracking_gain: 0.1,
            tracking_span: Span::new(25.0, 375.0),
            win_score: 5,
        }
    }
}

impl PuckConfig {
    fn openings(&self) -> [Opening; 2] {
        [
            Opening {
                wall: Side::Left,
                span: self.goal_span,
                goal_line: self.goal_depth,
            },
            Opening {
                wall: Side::Right,
                span: self.goal_span,
                goal_line: self.field.x - self.goal_depth,
            },
        ]
    }
}

#[derive(Debug, Clone)]
pub struct AirHockey {
    config: PuckConfig,
    opponent: Opponent,
    rng_state: RngState,
    rng: Pcg32,
    puck: Movable,
    paddles: [Vec2; 2],
    /// Latest pointer position per side, applied at the next tick
    pointers: [Option<Vec2>; 2],
    score: VersusScore,
    ticks: u64,
    cause: Option<TerminalCause>,
}

impl AirHockey {
    pub fn new(config: PuckConfig, seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let mut game = Self {
            rng: rng_state.to_rng(),
            rng_state,
            opponent: Opponent::default(),
            puck: Movable::new(Vec2::ZERO, Vec2::ZERO, config.puck_radius),
            paddles: config.paddle_starts,
            pointers: [None; 2],
            score: VersusScore::default(),
            ticks: 0,
            cause: None,
            config,
        };
        game.reset(seed);
        game
    }

    pub fn puck(&self) -> &Movable {
        &self.puck
    }

    pub fn paddles(&self) -> [Vec2; 2] {
        self.paddles
    }

    pub fn score(&self) -> VersusScore {
        self.score
    }

    /// Re-centre the puck with a fresh serve velocity
    fn serve(&mut self) {
        let vx = if self.rng.random_bool(0.5) {
            self.config.serve_speed
        } else {
            -self.config.serve_speed
        };
        let vy = centered_spread(self.rng.random::<f32>(), self.config.serve_spread);
        self.puck.serve(self.config.field * 0.5, Vec2::new(vx, vy));
    }

    fn apply_pointers(&mut self) {
        for side in [Side::Left, Side::Right] {
            let i = side.index();
            if let Some(target) = self.pointers[i].take() {
                let reach = self.config.reach[i];
                self.paddles[i] = target.clamp(reach.min, reach.max());
            }
        }
    }

    /// Proportional tracking of the puck's y; the lag is what makes it beatable
    fn track_puck(&mut self) {
        let paddle = &mut self.paddles[Side::Right.index()];
        paddle.y += (self.puck.pos.y - paddle.y) * self.config.tracking_gain;
        paddle.y = self.config.tracking_span.clamp(paddle.y);
    }
}

impl Simulation for AirHockey {
    fn id(&self) -> GameId {
        GameId::AirHockey
    }

    fn set_opponent(&mut self, opponent: Opponent) {
        self.opponent = opponent;
    }

    fn reset(&mut self, seed: u64) {
        self.rng_state = RngState::new(seed);
        self.rng = self.rng_state.to_rng();
        self.paddles = self.config.paddle_starts;
        self.pointers = [None; 2];
        self.score = VersusScore::default();
        self.ticks = 0;
        self.cause = None;
        self.puck.radius = self.config.puck_radius;
        self.serve();
    }

    fn handle_input(&mut self, input: Input, phase: Phase) -> InputEffect {
        if phase == Phase::Terminal {
            return InputEffect::Ignored;
        }
        match input {
            Input::PointerAt { side, pos } => {
                if side == Side::Right && self.opponent == Opponent::Computer {
                    return InputEffect::Ignored;
                }
                self.pointers[side.index()] = Some(pos);
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
        self.apply_pointers();

        self.puck.integrate();

        let field = Rect::field(self.config.field.x, self.config.field.y);
        let sides = wall_contacts(&self.puck, &field).vertical_only();
        if sides.any() {
            self.puck.vel = reflect_off(self.puck.vel, sides);
            events.push(GameEvent::WallBounce);
        }

        match resolve_side_walls(&mut self.puck, &field, &self.config.openings()) {
            SideContact::Goal { scorer } => {
                self.score.credit(scorer);
                events.push(GameEvent::Goal { scorer });
                log::debug!(
                    "Air hockey goal for {:?}: {}-{}",
                    scorer,
                    self.score.player1,
                    self.score.player2
                );
                self.serve();
            }
            SideContact::Rebound => events.push(GameEvent::WallBounce),
            SideContact::Clear => {}
        }

        for side in [Side::Left, Side::Right] {
            let center = self.paddles[side.index()];
            if let Some(vel) =
                deflect_circle(&self.puck, center, self.config.paddle_radius, self.config.hit_speed)
            {
                self.puck.vel = vel;
                events.push(GameEvent::PaddleHit { side });
            }
        }

        if self.opponent == Opponent::Computer {
            self.track_puck();
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
        let mut bodies: Vec<Body> = self
            .config
            .openings()
            .into_iter()
            .map(Body::Goal)
            .collect();
        for side in [Side::Left, Side::Right] {
            bodies.push(Body::RoundPaddle {
                side,
                pos: self.paddles[side.index()],
                radius: self.config.paddle_radius,
            });
        }
        bodies.push(Body::Ball(self.puck));
        Snapshot {
            game: GameId::AirHockey,
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
