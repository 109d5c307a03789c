//! Browser binding
//!
//! A thin `wasm_bindgen` facade over [`Arcade`]. The page owns the canvas,
//! the DOM controls and `requestAnimationFrame`; it forwards semantic inputs,
//! calls `advance` with the frame timestamp and reads frames back as JSON.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::arcade::Arcade;
use crate::persistence::default_store;
use crate::platform::frame_elapsed;
use crate::settings::Settings;
use crate::shell::TerminalSummary;
use crate::sim::{Direction, GameId, Input, InputEffect, Motion, Side};

fn init_logging() {
    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed by an earlier instance
    let _ = console_log::init_with_level(log::Level::Info);
}

fn side_of(player: u8) -> Side {
    if player == 2 { Side::Right } else { Side::Left }
}

#[wasm_bindgen]
pub struct WebArcade {
    arcade: Arcade,
    last_ms: Option<f64>,
    summary: Rc<RefCell<Option<TerminalSummary>>>,
}

#[wasm_bindgen]
impl WebArcade {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        init_logging();
        log::info!("Arcade core starting...");
        Self {
            arcade: Arcade::new(default_store()),
            last_ms: None,
            summary: Rc::new(RefCell::new(None)),
        }
    }

    /// Open `game` ("snake", "air-hockey", "pong", "breakout"); false if unknown
    pub fn switch_to(&mut self, game: &str) -> bool {
        let Some(id) = GameId::from_str(game) else {
            log::warn!("Unknown game: {}", game);
            return false;
        };
        let slot = Rc::clone(&self.summary);
        let session = self.arcade.switch_to(id);
        session.set_terminal_listener(move |s: &TerminalSummary| {
            *slot.borrow_mut() = Some(s.clone());
        });
        self.last_ms = None;
        true
    }

    /// Start the open game. `settings_json` may be empty to use stored settings.
    pub fn start(&mut self, settings_json: &str) {
        let settings = if settings_json.trim().is_empty() {
            Settings::load()
        } else {
            match serde_json::from_str::<Settings>(settings_json) {
                Ok(settings) => {
                    settings.save();
                    settings
                }
                Err(e) => {
                    log::warn!("Bad settings ({}), using stored settings", e);
                    Settings::load()
                }
            }
        };
        self.summary.borrow_mut().take();
        self.last_ms = None;
        if let Some(session) = self.arcade.session() {
            session.start(settings);
        }
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.arcade
            .session()
            .is_some_and(|s| s.handle_input(Input::TogglePause) == InputEffect::Recorded)
    }

    pub fn reset(&mut self) {
        if let Some(session) = self.arcade.session() {
            session.reset();
        }
    }

    pub fn stop(&mut self) {
        if let Some(session) = self.arcade.session() {
            session.stop();
        }
    }

    /// "up", "down", "left" or "right"
    pub fn direction(&mut self, dir: &str) {
        let dir = match dir {
            "up" => Direction::Up,
            "down" => Direction::Down,
            "left" => Direction::Left,
            "right" => Direction::Right,
            _ => return,
        };
        self.send(Input::Direction(dir));
    }

    /// Pointer position in field coordinates for player 1 or 2
    pub fn pointer(&mut self, player: u8, x: f32, y: f32) {
        self.send(Input::PointerAt {
            side: side_of(player),
            pos: Vec2::new(x, y),
        });
    }

    /// Held movement key: negative is up/left, positive is down/right, 0 released
    pub fn hold(&mut self, player: u8, motion: i32) {
        let motion = match motion.signum() {
            -1 => Motion::Decrease,
            1 => Motion::Increase,
            _ => Motion::Stop,
        };
        self.send(Input::Hold {
            side: side_of(player),
            motion,
        });
    }

    /// Feed a `requestAnimationFrame` timestamp; returns ticks simulated
    pub fn advance(&mut self, timestamp_ms: f64) -> u32 {
        let elapsed = frame_elapsed(self.last_ms, timestamp_ms);
        if timestamp_ms.is_finite() {
            self.last_ms = Some(timestamp_ms);
        }
        match self.arcade.session() {
            Some(session) => session.advance(elapsed),
            None => 0,
        }
    }

    /// Current frame as JSON (empty string when no game is open)
    pub fn frame_json(&mut self) -> String {
        let Some(session) = self.arcade.session() else {
            return String::new();
        };
        serde_json::to_string(&session.frame()).unwrap_or_else(|e| {
            log::error!("Frame encoding failed: {}", e);
            String::new()
        })
    }

    /// Terminal summary as JSON, once, after it has been delivered
    pub fn take_summary(&mut self) -> Option<String> {
        let summary = self.summary.borrow_mut().take()?;
        serde_json::to_string(&summary).ok()
    }
}

impl WebArcade {
    fn send(&mut self, input: Input) {
        if let Some(session) = self.arcade.session() {
            session.handle_input(input);
        }
    }
}

impl Default for WebArcade {
    fn default() -> Self {
        Self::new()
    }
}
