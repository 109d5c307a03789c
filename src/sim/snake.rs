//! Grid-stepped snake
//!
//! The body is a queue: each step pushes a new head and pops the tail unless
//! food was eaten. Play starts lazily on the first direction input.

use std::collections::{HashSet, VecDeque};

use glam::{IVec2, Vec2};
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{hits_body, outside_grid};
use super::state::{Direction, GameEvent, Phase, RngState, TerminalCause};
use super::tick::{Body, GameId, Input, InputEffect, Outcome, Scoreboard, Simulation, Snapshot};

/// Snake tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnakeConfig {
    /// Board size in cells
    pub grid: IVec2,
    /// Starting head cell
    pub start: IVec2,
    /// Points per food
    pub food_score: u64,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            grid: IVec2::new(20, 20),
            start: IVec2::new(10, 10),
            food_score: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snake {
    config: SnakeConfig,
    rng_state: RngState,
    rng: Pcg32,
    /// Front is the head; no duplicate cells while alive
    body: VecDeque<IVec2>,
    /// Direction of the last applied step
    heading: Option<Direction>,
    /// Direction requested since the last step
    queued: Option<Direction>,
    food: Option<IVec2>,
    score: u64,
    ticks: u64,
    cause: Option<TerminalCause>,
}

impl Snake {
    pub fn new(config: SnakeConfig, seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let mut snake = Self {
            rng: rng_state.to_rng(),
            rng_state,
            body: VecDeque::new(),
            heading: None,
            queued: None,
            food: None,
            score: 0,
            ticks: 0,
            cause: None,
            config,
        };
        snake.reset(seed);
        snake
    }

    pub fn body(&self) -> &VecDeque<IVec2> {
        &self.body
    }

    pub fn food(&self) -> Option<IVec2> {
        self.food
    }

    pub fn heading(&self) -> Option<Direction> {
        self.heading
    }

    /// Place food uniformly among cells the body does not occupy.
    ///
    /// Samples the free-cell set directly, so a nearly full board costs no
    /// retries. A full board leaves no food.
    fn place_food(&mut self) {
        let occupied: HashSet<IVec2> = self.body.iter().copied().collect();
        let grid = self.config.grid;
        let free: Vec<IVec2> = (0..grid.y)
            .flat_map(|y| (0..grid.x).map(move |x| IVec2::new(x, y)))
            .filter(|cell| !occupied.contains(cell))
            .collect();

        self.food = if free.is_empty() {
            None
        } else {
            Some(free[self.rng.random_range(0..free.len())])
        };
    }

    fn end(&mut self, cause: TerminalCause, events: &mut Vec<GameEvent>) {
        log::debug!("Snake ended: {:?} (length {})", cause, self.body.len());
        self.cause = Some(cause);
        events.push(GameEvent::Terminal(cause));
    }
}

impl Simulation for Snake {
    fn id(&self) -> GameId {
        GameId::Snake
    }

    fn start_phase(&self) -> Phase {
        Phase::Idle
    }

    fn reset(&mut self, seed: u64) {
        self.rng_state = RngState::new(seed);
        self.rng = self.rng_state.to_rng();
        self.body.clear();
        self.body.push_back(self.config.start);
        self.heading = None;
        self.queued = None;
        self.score = 0;
        self.ticks = 0;
        self.cause = None;
        self.place_food();
    }

    fn handle_input(&mut self, input: Input, phase: Phase) -> InputEffect {
        let Input::Direction(dir) = input else {
            return InputEffect::Ignored;
        };

        match phase {
            Phase::Idle if self.heading.is_none() => {
                self.queued = Some(dir);
                InputEffect::Activate
            }
            Phase::Active => {
                // Reversal is judged against the step actually taken, so two quick
                // turns inside one tick cannot fold the snake onto itself.
                if self.heading.is_some_and(|h| dir.is_opposite(h)) {
                    return InputEffect::Ignored;
                }
                self.queued = Some(dir);
                InputEffect::Recorded
            }
            _ => InputEffect::Ignored,
        }
    }

    fn update(&mut self, events: &mut Vec<GameEvent>) {
        if self.cause.is_some() {
            return;
        }
        if let Some(dir) = self.queued.take() {
            self.heading = Some(dir);
        }
        let Some(dir) = self.heading else {
            return;
        };
        let Some(&head) = self.body.front() else {
            return;
        };

        self.ticks += 1;
        let next = head + dir.delta();

        if outside_grid(next, self.config.grid) {
            self.end(TerminalCause::WallCollision, events);
            return;
        }
        // Tested against the whole body, tail included, before the tail moves
        if hits_body(next, &self.body) {
            self.end(TerminalCause::SelfCollision, events);
            return;
        }

        self.body.push_front(next);
        if self.food == Some(next) {
            self.score += self.config.food_score;
            self.place_food();
            events.push(GameEvent::FoodEaten {
                length: self.body.len(),
            });
        } else {
            self.body.pop_back();
        }
    }

    fn terminal_cause(&self) -> Option<TerminalCause> {
        self.cause
    }

    fn snapshot(&self) -> Snapshot {
        let mut bodies: Vec<Body> = self
            .body
            .iter()
            .enumerate()
            .map(|(i, &cell)| Body::SnakeCell { cell, head: i == 0 })
            .collect();
        if let Some(food) = self.food {
            bodies.push(Body::Food(food));
        }
        Snapshot {
            game: GameId::Snake,
            tick: self.ticks,
            field: Vec2::new(self.config.grid.x as f32, self.config.grid.y as f32),
            bodies,
            scoreboard: Scoreboard::Solo {
                score: self.score,
                lives: None,
                level: None,
            },
        }
    }

    fn outcome(&self) -> Outcome {
        Outcome::Final {
            score: self.score,
            level: None,
            length: Some(self.body.len()),
        }
    }

    fn score(&self) -> Option<u64> {
        Some(self.score)
    }
}
