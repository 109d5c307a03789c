//! Platform abstraction layer
//!
//! Time only: the fixed-step clock that turns wall time into ticks, and the
//! generation-keyed timers used for deferred notifications. Storage backends
//! live in `persistence`.

pub mod clock;
pub mod timer;

pub use clock::{Clock, ClockState, frame_elapsed};
pub use timer::Timers;
