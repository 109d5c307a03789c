//! Game switcher
//!
//! Holds at most one live session. Switching games stops the current session
//! (clock and pending notifications) before the next one is built, so two
//! clocks never run at once.

use crate::persistence::HighScoreStore;
use crate::session::SessionController;
use crate::sim::GameId;

pub struct Arcade {
    /// Parked here whenever no session is active
    store: Option<Box<dyn HighScoreStore>>,
    session: Option<SessionController>,
}

impl Arcade {
    pub fn new(store: Box<dyn HighScoreStore>) -> Self {
        Self {
            store: Some(store),
            session: None,
        }
    }

    /// Replace the current session with a fresh one for `game`.
    ///
    /// The new session is idle; call `start` on it to begin play.
    pub fn switch_to(&mut self, game: GameId) -> &mut SessionController {
        self.close();
        let store = match self.store.take() {
            Some(store) => store,
            None => {
                log::warn!("High score store missing, using an in-memory store");
                Box::new(crate::persistence::MemoryStore::new())
            }
        };
        log::info!("Switching to {}", game.display_name());
        self.session.insert(SessionController::for_game(game, store))
    }

    /// Stop and drop the current session, if any
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Closing {}", session.game_id().display_name());
            self.store = Some(session.shutdown());
        }
    }

    pub fn current(&self) -> Option<GameId> {
        self.session.as_ref().map(SessionController::game_id)
    }

    pub fn session(&mut self) -> Option<&mut SessionController> {
        self.session.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::persistence::MemoryStore;
    use crate::platform::ClockState;
    use crate::settings::Settings;
    use crate::sim::Phase;

    #[test]
    fn test_switch_stops_previous_session() {
        let mut arcade = Arcade::new(Box::new(MemoryStore::new()));
        assert_eq!(arcade.current(), None);

        let pong = arcade.switch_to(GameId::Pong);
        pong.start(Settings::default().with_seed(1));
        assert_eq!(pong.clock_state(), ClockState::Running);
        pong.advance(Duration::from_millis(100));

        let hockey = arcade.switch_to(GameId::AirHockey);
        assert_eq!(hockey.game_id(), GameId::AirHockey);
        assert_eq!(hockey.phase(), Phase::Idle);
        assert_eq!(hockey.clock_state(), ClockState::Stopped);
        assert_eq!(arcade.current(), Some(GameId::AirHockey));
    }

    #[test]
    fn test_store_survives_switches() {
        let mut arcade = Arcade::new(Box::new(MemoryStore::with_score(GameId::Snake, 70)));
        arcade.switch_to(GameId::Breakout);
        let snake = arcade.switch_to(GameId::Snake);
        assert_eq!(snake.high_score(), Some(70));

        arcade.close();
        assert_eq!(arcade.current(), None);
        assert!(arcade.session().is_none());
    }
}
