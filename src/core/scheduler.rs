//! Tick-driven clock and delayed-continuation scheduler.
//!
//! Staged sequences (combat lead-in, per-enemy pacing, cooldowns, preparation
//! delays) are queued as `(due_tick, step)` pairs and drained once per
//! simulation step, so everything stays on the single game loop.

use super::constants::{TICKS_PER_SECOND, TICK_INTERVAL_MS};
use serde::{Deserialize, Serialize};

/// Fixed-step game clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    tick: u64,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_tick(tick: u64) -> Self {
        Self { tick }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Game time in seconds.
    pub fn now(&self) -> f64 {
        self.tick as f64 * TICK_INTERVAL_MS as f64 / 1000.0
    }

    pub fn delta_seconds(&self) -> f64 {
        TICK_INTERVAL_MS as f64 / 1000.0
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Tick at which something delayed by `seconds` becomes due (at least next tick).
    pub fn tick_after(&self, seconds: f64) -> u64 {
        self.tick + ticks_for(seconds).max(1)
    }
}

/// Whole ticks covering `seconds`, rounded up.
pub fn ticks_for(seconds: f64) -> u64 {
    if seconds <= 0.0 {
        return 0;
    }
    (seconds * TICKS_PER_SECOND as f64).ceil() as u64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Scheduled<T> {
    due: u64,
    seq: u64,
    step: T,
}

/// Queue of pending continuations keyed by the tick they resume on.
///
/// Steps due on the same tick come out in the order they were scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<T> {
    pending: Vec<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: u64, step: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled { due, seq, step });
    }

    /// Removes and returns every step due at or before `tick`, earliest first.
    pub fn drain_due(&mut self, tick: u64) -> Vec<T> {
        if !self.pending.iter().any(|s| s.due <= tick) {
            return Vec::new();
        }
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= tick);
        self.pending = rest;
        due.sort_by_key(|s| (s.due, s.seq));
        due.into_iter().map(|s| s.step).collect()
    }

    /// Drops every pending step matching `predicate`.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) {
        self.pending.retain(|s| !predicate(&s.step));
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|s| s.due).min()
    }
}
