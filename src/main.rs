//! Arcade core entry point
//!
//! Native: runs one game headless in real time with a scripted player and logs
//! the result. Usage: `arcade-core [snake|air-hockey|pong|breakout] [seconds]`.
//! Web: the library's `WebArcade` binding is the entry point.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::thread;
    use std::time::{Duration, Instant};

    use arcade_core::persistence::default_store;
    use arcade_core::shell::{Frame, TerminalSummary};
    use arcade_core::sim::{Body, Direction, Input, Motion, Side, Snapshot};
    use arcade_core::{Arcade, GameId, Phase, Settings, as_millis_u64};

    const DEFAULT_SECONDS: u64 = 30;

    fn find_ball(snapshot: &Snapshot) -> Option<glam::Vec2> {
        snapshot.bodies.iter().find_map(|b| match b {
            Body::Ball(m) => Some(m.pos),
            _ => None,
        })
    }

    /// Greedy snake: step toward the food, preferring the longer axis
    fn steer_snake(snapshot: &Snapshot) -> Option<Direction> {
        let mut head = None;
        let mut food = None;
        for body in &snapshot.bodies {
            match body {
                Body::SnakeCell { cell, head: true } => head = Some(*cell),
                Body::Food(cell) => food = Some(*cell),
                _ => {}
            }
        }
        let gap = food? - head?;
        let dir = if gap.x.abs() >= gap.y.abs() {
            if gap.x > 0 { Direction::Right } else { Direction::Left }
        } else if gap.y > 0 {
            Direction::Down
        } else {
            Direction::Up
        };
        Some(dir)
    }

    /// Player 1's scripted move for the current frame
    fn autopilot(snapshot: &Snapshot) -> Option<Input> {
        match snapshot.game {
            GameId::Snake => steer_snake(snapshot).map(Input::Direction),
            GameId::AirHockey => find_ball(snapshot).map(|puck| Input::PointerAt {
                side: Side::Left,
                pos: glam::Vec2::new(puck.x.min(120.0), puck.y),
            }),
            GameId::Pong => {
                let ball = find_ball(snapshot)?;
                let paddle = snapshot.bodies.iter().find_map(|b| match b {
                    Body::Paddle {
                        side: Some(Side::Left),
                        rect,
                    } => Some(rect.center().y),
                    _ => None,
                })?;
                let motion = if ball.y < paddle - 10.0 {
                    Motion::Decrease
                } else if ball.y > paddle + 10.0 {
                    Motion::Increase
                } else {
                    Motion::Stop
                };
                Some(Input::Hold {
                    side: Side::Left,
                    motion,
                })
            }
            GameId::Breakout => find_ball(snapshot).map(|ball| Input::PointerAt {
                side: Side::Left,
                pos: ball,
            }),
        }
    }

    pub fn run() {
        env_logger::init();
        log::info!("Arcade core (native) starting...");

        let mut args = std::env::args().skip(1);
        let game = match args.next() {
            Some(name) => match GameId::from_str(&name) {
                Some(game) => game,
                None => {
                    eprintln!(
                        "Unknown game '{}'. Choose one of: {}",
                        name,
                        GameId::ALL.map(|g| g.as_str()).join(", ")
                    );
                    std::process::exit(2);
                }
            },
            None => GameId::Pong,
        };
        let seconds = args
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SECONDS);

        let mut arcade = Arcade::new(default_store());
        let session = arcade.switch_to(game);

        let frames = Rc::new(RefCell::new(0u64));
        let counter = Rc::clone(&frames);
        session.set_render_sink(move |frame: &Frame| {
            *counter.borrow_mut() += 1;
            if frame.snapshot.tick % 120 == 0 {
                log::debug!("tick {}: {:?}", frame.snapshot.tick, frame.snapshot.scoreboard);
            }
        });

        let result: Rc<RefCell<Option<TerminalSummary>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&result);
        session.set_terminal_listener(move |summary: &TerminalSummary| {
            *slot.borrow_mut() = Some(summary.clone());
        });

        let settings = Settings::load();
        session.start(settings);
        log::info!("Playing {} for up to {}s", game.display_name(), seconds);

        let limit = Duration::from_secs(seconds);
        let period = game.tick_period();
        let began = Instant::now();
        let mut last = began;
        while began.elapsed() < limit && result.borrow().is_none() {
            if session.phase() != Phase::Terminal {
                if let Some(input) = autopilot(&session.snapshot()) {
                    session.handle_input(input);
                }
            }
            let now = Instant::now();
            session.advance(now - last);
            last = now;
            thread::sleep(period / 2);
        }

        match result.borrow().as_ref() {
            Some(summary) => {
                println!("{}", summary.headline());
                log::info!("Cause: {:?}", summary.cause);
            }
            None => println!(
                "Time limit reached after {}ms: {:?}",
                as_millis_u64(began.elapsed()),
                session.snapshot().scoreboard
            ),
        }
        log::info!("{} frames presented", frames.borrow());
        arcade.close();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is WebArcade, this is just to satisfy the compiler
}
