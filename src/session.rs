//! Session controller
//!
//! Owns one simulation, one clock and the terminal-notification timer, and
//! drives the lifecycle `Idle -> Active <-> Paused -> Terminal`. The host calls
//! [`SessionController::advance`] with elapsed wall time; the controller runs
//! the due ticks, pushes a frame to the render sink after each, and delivers
//! the terminal summary once its delay has passed.
//!
//! Every `start`, `reset` and `stop` bumps the session generation. Timers
//! scheduled under an older generation are dropped unfired.

use std::time::Duration;

use crate::persistence::HighScoreStore;
use crate::platform::{Clock, ClockState, Timers};
use crate::settings::Settings;
use crate::shell::{Frame, RenderSink, TerminalListener, TerminalSummary};
use crate::sim::{
    GameEvent, GameId, Input, InputEffect, Phase, Simulation, Snapshot, build_game,
};

pub struct SessionController {
    game: Box<dyn Simulation>,
    store: Box<dyn HighScoreStore>,
    settings: Settings,
    clock: Clock,
    timers: Timers<TerminalSummary>,
    phase: Phase,
    generation: u64,
    seed: u64,
    /// Session-local time, the sum of everything passed to `advance`
    now: Duration,
    /// Best score on record; None for versus games
    high_score: Option<u64>,
    terminal_raised: bool,
    events: Vec<GameEvent>,
    sink: Option<Box<dyn RenderSink>>,
    listener: Option<Box<dyn TerminalListener>>,
}

impl SessionController {
    /// Wrap `game`, loading its high score from `store` once.
    ///
    /// A failed load is logged and treated as 0.
    pub fn new(game: Box<dyn Simulation>, mut store: Box<dyn HighScoreStore>) -> Self {
        let id = game.id();
        let high_score = if id.is_versus() {
            None
        } else {
            match store.load_high_score(id) {
                Ok(score) => Some(score),
                Err(e) => {
                    log::warn!("Could not load {} high score: {}", id.display_name(), e);
                    Some(0)
                }
            }
        };

        Self {
            game,
            store,
            settings: Settings::default(),
            clock: Clock::new(),
            timers: Timers::new(),
            phase: Phase::Idle,
            generation: 0,
            seed: 0,
            now: Duration::ZERO,
            high_score,
            terminal_raised: false,
            events: Vec::new(),
            sink: None,
            listener: None,
        }
    }

    /// Controller for `game` with default tunables
    pub fn for_game(game: GameId, store: Box<dyn HighScoreStore>) -> Self {
        Self::new(build_game(game, 0), store)
    }

    pub fn set_render_sink(&mut self, sink: impl RenderSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn set_terminal_listener(&mut self, listener: impl TerminalListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn game_id(&self) -> GameId {
        self.game.id()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_score(&self) -> Option<u64> {
        self.high_score
    }

    /// Terminal summaries waiting for their delay to pass
    pub fn pending_notifications(&self) -> usize {
        self.timers.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }

    pub fn frame(&self) -> Frame {
        Frame {
            phase: self.phase,
            high_score: self.high_score,
            snapshot: self.game.snapshot(),
        }
    }

    /// Fully reinitialize with `settings` and start the clock.
    ///
    /// Starting over a running session restarts it; the clock is never
    /// doubled and any pending notification is cancelled.
    pub fn start(&mut self, settings: Settings) {
        self.settings = settings;
        self.seed = self.settings.seed.unwrap_or_else(rand::random);
        self.begin_generation();
        self.game.set_opponent(self.settings.opponent);
        self.game.reset(self.seed);
        self.phase = self.game.start_phase();
        self.clock.start(self.game.tick_period());
        log::info!(
            "{} started (seed {}, {})",
            self.game.id().display_name(),
            self.seed,
            self.settings.opponent.as_str()
        );
        self.present();
    }

    /// Returns false (and changes nothing) unless Active
    pub fn pause(&mut self) -> bool {
        if self.phase != Phase::Active {
            log::debug!("Ignoring pause while {:?}", self.phase);
            return false;
        }
        self.phase = Phase::Paused;
        self.clock.pause();
        log::info!("{} paused", self.game.id().display_name());
        self.present();
        true
    }

    /// Returns false (and changes nothing) unless Paused
    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            log::debug!("Ignoring resume while {:?}", self.phase);
            return false;
        }
        self.phase = Phase::Active;
        self.clock.resume();
        log::info!("{} resumed", self.game.id().display_name());
        self.present();
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            Phase::Active => self.pause(),
            Phase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Reinitialize entities and scores from the current seed, leaving the
    /// clock stopped until the next `start`
    pub fn reset(&mut self) {
        self.begin_generation();
        self.clock.stop();
        self.game.reset(self.seed);
        self.phase = Phase::Idle;
        log::debug!("{} reset", self.game.id().display_name());
        self.present();
    }

    /// Halt the clock and cancel pending notifications
    pub fn stop(&mut self) {
        self.begin_generation();
        self.clock.stop();
        if self.phase != Phase::Terminal {
            self.phase = Phase::Idle;
        }
        log::debug!("{} stopped", self.game.id().display_name());
    }

    /// Forward a semantic input; recorded intent is applied on the next tick
    pub fn handle_input(&mut self, input: Input) -> InputEffect {
        if input == Input::TogglePause {
            return if self.toggle_pause() {
                InputEffect::Recorded
            } else {
                InputEffect::Ignored
            };
        }
        if self.clock.state() == ClockState::Stopped {
            log::debug!("{} stopped, ignoring {:?}", self.game.id().display_name(), input);
            return InputEffect::Ignored;
        }

        let effect = self.game.handle_input(input, self.phase);
        if effect == InputEffect::Activate && self.phase == Phase::Idle && self.clock.is_running() {
            self.phase = Phase::Active;
            log::debug!("{} activated by first input", self.game.id().display_name());
        }
        effect
    }

    /// Feed elapsed wall time; runs due ticks and delivers due notifications.
    /// Returns how many ticks were simulated.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.now += elapsed;
        let due = self.clock.advance(elapsed);

        let mut ran = 0;
        for _ in 0..due {
            if !self.phase.accepts_ticks() {
                break;
            }
            self.tick();
            ran += 1;
        }

        for summary in self.timers.poll(self.now, self.generation) {
            log::info!("Notifying shell: {}", summary.headline());
            if let Some(listener) = self.listener.as_mut() {
                listener.on_terminal(&summary);
            }
        }
        ran
    }

    /// Stop the session and hand back the store
    pub fn shutdown(mut self) -> Box<dyn HighScoreStore> {
        self.stop();
        self.store
    }

    fn begin_generation(&mut self) {
        self.generation += 1;
        let dropped = self.timers.retain_generation(self.generation);
        if dropped > 0 {
            log::debug!("Cancelled {} pending notification(s)", dropped);
        }
        self.terminal_raised = false;
    }

    fn tick(&mut self) {
        self.events.clear();
        self.game.update(&mut self.events);
        for event in &self.events {
            log::trace!("{:?}", event);
        }
        if self.game.is_terminal() && !self.terminal_raised {
            self.finish();
        }
        self.present();
    }

    /// Enter Terminal: stop the clock, settle the high score and schedule the
    /// summary. Runs once per generation.
    fn finish(&mut self) {
        let Some(cause) = self.game.terminal_cause() else {
            return;
        };
        self.terminal_raised = true;
        self.phase = Phase::Terminal;
        self.clock.stop();

        let id = self.game.id();
        let mut new_high_score = false;
        if let (Some(best), Some(score)) = (self.high_score, self.game.score()) {
            if score > best {
                new_high_score = true;
                self.high_score = Some(score);
                if let Err(e) = self.store.save_high_score(id, score) {
                    log::warn!("Could not save {} high score: {}", id.display_name(), e);
                }
            }
        }

        let summary = TerminalSummary {
            game: id,
            players: self.settings.player_names(id),
            outcome: self.game.outcome(),
            cause,
            high_score: self.high_score,
            new_high_score,
        };
        log::info!("{} over: {}", id.display_name(), summary.headline());
        self.timers
            .schedule(self.now, self.settings.notify_delay(), self.generation, summary);
    }

    fn present(&mut self) {
        if self.sink.is_none() {
            return;
        }
        let frame = self.frame();
        if let Some(sink) = self.sink.as_mut() {
            sink.present(&frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::persistence::{MemoryStore, PersistenceError, UnavailableStore};
    use crate::settings::Opponent;
    use crate::sim::{
        AirHockey, Body, Breakout, BreakoutConfig, Direction, Outcome, PuckConfig, Side, Span,
        TerminalCause,
    };

    const TICK: Duration = Duration::from_millis(16);

    /// Store shared with the test so saves can be inspected after the fact
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl HighScoreStore for SharedStore {
        fn load_high_score(&mut self, game: GameId) -> Result<u64, PersistenceError> {
            self.0.borrow_mut().load_high_score(game)
        }

        fn save_high_score(&mut self, game: GameId, score: u64) -> Result<(), PersistenceError> {
            self.0.borrow_mut().save_high_score(game, score)
        }
    }

    fn listen(session: &mut SessionController) -> Rc<RefCell<Vec<TerminalSummary>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.set_terminal_listener(move |s: &TerminalSummary| sink.borrow_mut().push(s.clone()));
        seen
    }

    fn run_until_terminal(session: &mut SessionController, max_ticks: u32) {
        for _ in 0..max_ticks {
            session.advance(TICK);
            if session.phase() == Phase::Terminal {
                return;
            }
        }
        panic!("session never reached Terminal");
    }

    /// Puck goes straight into a goal mouth as tall as the field
    fn open_goal_hockey() -> AirHockey {
        let config = PuckConfig {
            goal_span: Span::new(0.0, 400.0),
            paddle_starts: [Vec2::new(150.0, -200.0), Vec2::new(450.0, -200.0)],
            tracking_gain: 0.0,
            tracking_span: Span::new(-500.0, 500.0),
            win_score: 1,
            ..PuckConfig::default()
        };
        AirHockey::new(config, 0)
    }

    /// Ball drops straight past the paddle without touching anything
    fn falling_breakout(lives: u8) -> Breakout {
        Breakout::new(BreakoutConfig {
            serve_pos: Vec2::new(100.0, 400.0),
            serve_vel: Vec2::new(0.0, 4.0),
            lives,
            ..BreakoutConfig::default()
        })
    }

    /// Ball breaks one bottom-row brick on its way up, then drops out
    fn one_brick_breakout() -> Breakout {
        Breakout::new(BreakoutConfig {
            serve_pos: Vec2::new(20.0, 200.0),
            serve_vel: Vec2::new(0.0, -4.0),
            lives: 1,
            ..BreakoutConfig::default()
        })
    }

    #[test]
    fn test_air_hockey_match_to_notification() {
        let mut session =
            SessionController::new(Box::new(open_goal_hockey()), Box::new(MemoryStore::new()));
        let seen = listen(&mut session);
        session.start(Settings::default().with_seed(9).with_names("Ada", ""));
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.high_score(), None);

        run_until_terminal(&mut session, 200);
        assert_eq!(session.clock_state(), ClockState::Stopped);
        assert!(seen.borrow().is_empty());
        assert_eq!(session.pending_notifications(), 1);

        session.advance(Duration::from_millis(600));
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        let summary = &seen[0];
        assert_eq!(summary.game, GameId::AirHockey);
        assert_eq!(summary.players, vec!["Ada", "Computer"]);
        assert!(matches!(summary.cause, TerminalCause::WinThreshold { .. }));
        match summary.outcome {
            Outcome::Winner { score, .. } => assert_eq!(score.player1 + score.player2, 1),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_notification_exactly_once() {
        let mut session =
            SessionController::new(Box::new(open_goal_hockey()), Box::new(MemoryStore::new()));
        let seen = listen(&mut session);
        session.start(Settings {
            notify_delay_ms: 0,
            ..Settings::default().with_seed(1)
        });
        run_until_terminal(&mut session, 200);
        for _ in 0..50 {
            session.advance(TICK);
        }
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_lives_exhausted_stops_clock() {
        let store = SharedStore::default();
        let mut session =
            SessionController::new(Box::new(falling_breakout(3)), Box::new(store.clone()));
        session.start(Settings::default());

        // Two lost balls leave play running with score and level intact
        for _ in 0..50 {
            session.advance(TICK);
        }
        assert_eq!(session.phase(), Phase::Active);
        match session.snapshot().scoreboard {
            crate::sim::Scoreboard::Solo { score, lives, level } => {
                assert_eq!(score, 0);
                assert_eq!(lives, Some(1));
                assert_eq!(level, Some(1));
            }
            other => panic!("unexpected scoreboard {:?}", other),
        }

        run_until_terminal(&mut session, 30);
        assert_eq!(session.clock_state(), ClockState::Stopped);
        assert_eq!(session.advance(Duration::from_secs(1)), 0);
        // A zero score never beats the stored zero
        assert_eq!(store.0.borrow().saves, 0);
    }

    #[test]
    fn test_new_high_score_is_saved() {
        let store = SharedStore(Rc::new(RefCell::new(MemoryStore::with_score(
            GameId::Breakout,
            5,
        ))));
        let mut session =
            SessionController::new(Box::new(one_brick_breakout()), Box::new(store.clone()));
        let seen = listen(&mut session);
        assert_eq!(session.high_score(), Some(5));
        session.start(Settings::default());
        run_until_terminal(&mut session, 200);
        session.advance(Duration::from_secs(1));

        assert_eq!(session.high_score(), Some(10));
        assert_eq!(store.0.borrow().saves, 1);
        let summary = &seen.borrow()[0];
        assert!(summary.new_high_score);
        assert_eq!(summary.high_score, Some(10));
        assert_eq!(summary.players, vec!["Player"]);
    }

    #[test]
    fn test_lower_score_keeps_record() {
        let store = SharedStore(Rc::new(RefCell::new(MemoryStore::with_score(
            GameId::Breakout,
            50,
        ))));
        let mut session =
            SessionController::new(Box::new(one_brick_breakout()), Box::new(store.clone()));
        let seen = listen(&mut session);
        session.start(Settings::default());
        run_until_terminal(&mut session, 200);
        session.advance(Duration::from_secs(1));

        assert_eq!(session.high_score(), Some(50));
        assert_eq!(store.0.borrow().saves, 0);
        assert!(!seen.borrow()[0].new_high_score);
    }

    #[test]
    fn test_unavailable_store_is_not_fatal() {
        let mut session =
            SessionController::new(Box::new(one_brick_breakout()), Box::new(UnavailableStore));
        let seen = listen(&mut session);
        assert_eq!(session.high_score(), Some(0));
        session.start(Settings::default());
        run_until_terminal(&mut session, 200);
        session.advance(Duration::from_secs(1));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(session.high_score(), Some(10));
    }

    #[test]
    fn test_reset_drops_pending_notification() {
        let mut session =
            SessionController::new(Box::new(open_goal_hockey()), Box::new(MemoryStore::new()));
        let seen = listen(&mut session);
        session.start(Settings::default().with_seed(3));
        run_until_terminal(&mut session, 200);
        let stale = session.generation();

        session.reset();
        assert!(session.generation() > stale);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.pending_notifications(), 0);
        session.advance(Duration::from_secs(2));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_restart_drops_pending_notification() {
        let mut session =
            SessionController::new(Box::new(open_goal_hockey()), Box::new(MemoryStore::new()));
        let seen = listen(&mut session);
        session.start(Settings::default().with_seed(3));
        run_until_terminal(&mut session, 200);
        session.start(Settings::default().with_seed(3));
        session.advance(Duration::from_millis(100));
        assert!(seen.borrow().is_empty());
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn test_reset_twice_equals_once() {
        let mut session = SessionController::for_game(GameId::Pong, Box::new(MemoryStore::new()));
        session.start(Settings::default().with_seed(21));
        for _ in 0..20 {
            session.advance(TICK);
        }
        session.reset();
        let once = session.frame();
        session.reset();
        assert_eq!(session.frame(), once);
        assert_eq!(session.clock_state(), ClockState::Stopped);
        assert_eq!(session.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_pause_and_resume_transitions() {
        let mut session =
            SessionController::for_game(GameId::AirHockey, Box::new(MemoryStore::new()));
        assert!(!session.pause());
        session.start(Settings::default().with_seed(4));
        assert!(!session.resume());
        assert!(session.pause());
        assert!(!session.pause());
        assert_eq!(session.phase(), Phase::Paused);

        let tick = session.snapshot().tick;
        assert_eq!(session.advance(Duration::from_millis(500)), 0);
        assert_eq!(session.snapshot().tick, tick);

        assert_eq!(session.handle_input(Input::TogglePause), InputEffect::Recorded);
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.advance(TICK), 1);
        assert_eq!(session.snapshot().tick, tick + 1);
    }

    #[test]
    fn test_snake_waits_for_first_direction() {
        let mut session = SessionController::for_game(GameId::Snake, Box::new(MemoryStore::new()));
        session.start(Settings::default().with_seed(8));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.pause());
        assert_eq!(session.advance(Duration::from_millis(400)), 0);

        assert_eq!(
            session.handle_input(Input::Direction(Direction::Right)),
            InputEffect::Activate
        );
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.advance(Duration::from_millis(200)), 1);
        let head = session.snapshot().bodies.iter().find_map(|b| match b {
            Body::SnakeCell { cell, head: true } => Some(*cell),
            _ => None,
        });
        assert_eq!(head, Some(glam::IVec2::new(11, 10)));
    }

    #[test]
    fn test_input_ignored_while_stopped() {
        let mut session = SessionController::for_game(GameId::Snake, Box::new(MemoryStore::new()));
        let right = Input::Direction(Direction::Right);
        assert_eq!(session.handle_input(right), InputEffect::Ignored);

        session.start(Settings::default().with_seed(8));
        session.reset();
        assert_eq!(session.clock_state(), ClockState::Stopped);
        assert_eq!(session.handle_input(right), InputEffect::Ignored);
        assert_eq!(session.phase(), Phase::Idle);

        session.start(Settings::default().with_seed(8));
        assert_eq!(session.advance(Duration::from_millis(400)), 0);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.handle_input(right), InputEffect::Activate);
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn test_frames_reach_sink() {
        let frames = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&frames);
        let mut session = SessionController::for_game(GameId::Pong, Box::new(MemoryStore::new()));
        session.set_render_sink(move |_: &Frame| *counter.borrow_mut() += 1);
        session.start(Settings::default().with_opponent(Opponent::TwoPlayer));
        session.advance(TICK * 3);
        // One frame from start, one per tick
        assert_eq!(*frames.borrow(), 4);
    }

    #[test]
    fn test_two_player_accepts_second_paddle() {
        let mut session = SessionController::for_game(GameId::Pong, Box::new(MemoryStore::new()));
        session.start(Settings::default().with_opponent(Opponent::TwoPlayer));
        assert_eq!(
            session.handle_input(Input::Hold {
                side: Side::Right,
                motion: crate::sim::Motion::Increase,
            }),
            InputEffect::Recorded
        );
    }
}
