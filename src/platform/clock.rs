//! Fixed-step tick clock
//!
//! The host feeds elapsed wall time into [`Clock::advance`]; the clock answers
//! with how many whole ticks are due. Leftover time carries over to the next
//! call. A long stall is capped at `MAX_CATCH_UP_TICKS` and the remaining
//! backlog is dropped so a slow frame cannot snowball.

use std::time::Duration;

use crate::consts::MAX_CATCH_UP_TICKS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
    /// Paused; elapsed time is discarded until resumed
    Suspended,
}

#[derive(Debug, Clone)]
pub struct Clock {
    period: Duration,
    state: ClockState,
    accumulator: Duration,
    /// Ticks delivered since the last start
    ticks: u64,
    max_catch_up: u32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            period: Duration::ZERO,
            state: ClockState::Stopped,
            accumulator: Duration::ZERO,
            ticks: 0,
            max_catch_up: MAX_CATCH_UP_TICKS,
        }
    }

    /// Start ticking every `period`. A clock that is already running is
    /// restarted, never doubled.
    pub fn start(&mut self, period: Duration) {
        if self.state != ClockState::Stopped {
            log::debug!("Clock restarted while {:?}", self.state);
        }
        self.period = period;
        self.state = ClockState::Running;
        self.accumulator = Duration::ZERO;
        self.ticks = 0;
    }

    /// Returns false if the clock was not running
    pub fn pause(&mut self) -> bool {
        if self.state != ClockState::Running {
            return false;
        }
        self.state = ClockState::Suspended;
        true
    }

    /// Returns false if the clock was not suspended
    pub fn resume(&mut self) -> bool {
        if self.state != ClockState::Suspended {
            return false;
        }
        self.state = ClockState::Running;
        self.accumulator = Duration::ZERO;
        true
    }

    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.accumulator = Duration::ZERO;
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Feed `elapsed` wall time; returns the number of ticks now due
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.state != ClockState::Running || self.period.is_zero() {
            return 0;
        }
        self.accumulator += elapsed;

        let mut due = 0;
        while self.accumulator >= self.period && due < self.max_catch_up {
            self.accumulator -= self.period;
            due += 1;
        }
        if self.accumulator >= self.period {
            log::debug!(
                "Clock dropped {}ms of backlog",
                crate::as_millis_u64(self.accumulator)
            );
            self.accumulator = Duration::ZERO;
        }
        self.ticks += u64::from(due);
        due
    }
}

/// Wall time between two millisecond timestamps, as a host animation loop
/// reports them. The first frame, a clock that went backwards or a non-finite
/// timestamp all count as no time passing.
pub fn frame_elapsed(last_ms: Option<f64>, now_ms: f64) -> Duration {
    let Some(last_ms) = last_ms else {
        return Duration::ZERO;
    };
    let gap = now_ms - last_ms;
    if !gap.is_finite() || gap <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(gap / 1000.0).unwrap_or(Duration::ZERO)
}
