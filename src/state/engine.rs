//! Elapsed-time engine
//!
//! Tracks how long a single timer has been running across any number of
//! start/pause segments. Elapsed time is always derived from a monotonic clock
//! snapshot at query time, never accumulated per refresh tick, so the value is
//! exact no matter how often (or how irregularly) the display samples it.

use std::time::Duration;
use tokio::time::Instant;

/// Source of monotonic instants for the engine
pub trait Clock {
    /// Current instant. Must never go backwards within a process.
    fn now(&self) -> Instant;
}

/// Default clock backed by `tokio::time::Instant`
///
/// Under a paused tokio runtime (tests) this follows the mocked clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Running/paused state of one timer
#[derive(Debug, Clone)]
pub struct ElapsedEngine<C: Clock = MonotonicClock> {
    clock: C,
    elapsed_at_last_pause: Duration,
    run_started_at: Option<Instant>,
}

impl ElapsedEngine<MonotonicClock> {
    /// Create a stopped engine with zero elapsed time
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock)
    }
}

impl Default for ElapsedEngine<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ElapsedEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            elapsed_at_last_pause: Duration::ZERO,
            run_started_at: None,
        }
    }

    /// Begin a run segment. No-op when already running.
    pub fn start(&mut self) {
        if self.run_started_at.is_none() {
            self.run_started_at = Some(self.clock.now());
        }
    }

    /// Close the current run segment, folding it into the accumulated time.
    /// No-op when not running.
    pub fn pause(&mut self) {
        if let Some(started) = self.run_started_at.take() {
            let now = self.clock.now();
            self.elapsed_at_last_pause += now.saturating_duration_since(started);
        }
    }

    /// Stop and set the accumulated time to `initial`
    pub fn reset(&mut self, initial: Duration) {
        self.run_started_at = None;
        self.elapsed_at_last_pause = initial;
    }

    /// Stop and zero out. Same contract as `reset(Duration::ZERO)`.
    pub fn stop(&mut self) {
        self.reset(Duration::ZERO);
    }

    pub fn is_running(&self) -> bool {
        self.run_started_at.is_some()
    }

    /// Elapsed time as of `now`. Pure query.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.run_started_at {
            Some(started) => self.elapsed_at_last_pause + now.saturating_duration_since(started),
            None => self.elapsed_at_last_pause,
        }
    }

    /// Elapsed time as of the engine clock's current instant
    pub fn elapsed_now(&self) -> Duration {
        self.elapsed(self.clock.now())
    }
}
