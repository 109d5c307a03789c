//! One-shot timers keyed by a session generation
//!
//! Every timer remembers the generation it was scheduled under. When polled,
//! a due timer whose generation is no longer live is dropped instead of fired,
//! so a reset or stop silently invalidates everything scheduled before it.

use std::time::Duration;

#[derive(Debug, Clone)]
struct Pending<T> {
    due: Duration,
    generation: u64,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct Timers<T> {
    pending: Vec<Pending<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `payload` once `after` has passed from `now`
    pub fn schedule(&mut self, now: Duration, after: Duration, generation: u64, payload: T) {
        self.pending.push(Pending {
            due: now + after,
            generation,
            payload,
        });
    }

    /// Drop every timer not scheduled under `live`
    pub fn retain_generation(&mut self, live: u64) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.generation == live);
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the payloads due at `now` for the `live` generation,
    /// in scheduling order. Due timers of other generations are discarded.
    pub fn poll(&mut self, now: Duration, live: u64) -> Vec<T> {
        let mut fired = Vec::new();
        let mut keep = Vec::with_capacity(self.pending.len());
        for p in self.pending.drain(..) {
            if p.due > now {
                keep.push(p);
            } else if p.generation == live {
                fired.push(p.payload);
            } else {
                log::debug!("Dropping stale timer (generation {}, live {})", p.generation, live);
            }
        }
        self.pending = keep;
        fired
    }
}
