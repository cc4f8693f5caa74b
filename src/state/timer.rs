//! A configured timer: engine, display and countdown completion

use std::time::Duration;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::{
    error::TimerError,
    utils::format::format_time,
};
use super::{
    engine::{Clock, ElapsedEngine, MonotonicClock},
    settings::{TimerConfig, TimerKind},
};

/// Emitted once when a running countdown reaches its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub timer_id: String,
    pub name: String,
    pub audio_enabled: bool,
    pub audio_volume: f64,
}

/// Point-in-time rendering of a timer for clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    pub id: String,
    pub name: String,
    pub kind: TimerKind,
    /// `MM:SS`, `MM:SS.HH` or `HH:MM:SS` for clock timers
    pub display: String,
    pub elapsed_ms: u64,
    /// Countdown only
    pub remaining_ms: Option<u64>,
    /// Countdown progress in percent, 0 for other kinds
    pub progress: f64,
    pub running: bool,
    pub complete: bool,
    pub controls_enabled: bool,
    pub config: TimerConfig,
}

/// One timer as the presentation layer sees it
#[derive(Debug, Clone)]
pub struct TimerInstance<C: Clock = MonotonicClock> {
    config: TimerConfig,
    engine: ElapsedEngine<C>,
    /// Latched when a countdown completes, cleared by the next control action
    finished: bool,
}

impl TimerInstance<MonotonicClock> {
    pub fn new(config: TimerConfig) -> Self {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> TimerInstance<C> {
    pub fn with_clock(config: TimerConfig, clock: C) -> Self {
        Self {
            config,
            engine: ElapsedEngine::with_clock(clock),
            finished: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut TimerConfig {
        &mut self.config
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn ensure_controls(&self) -> Result<(), TimerError> {
        if self.config.kind.has_controls() {
            Ok(())
        } else {
            Err(TimerError::ControlsDisabled(self.config.id.clone()))
        }
    }

    pub fn start(&mut self) -> Result<(), TimerError> {
        self.ensure_controls()?;
        if !self.engine.is_running() {
            info!("Starting timer {}", self.config.id);
        }
        self.finished = false;
        self.engine.start();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        self.ensure_controls()?;
        if self.engine.is_running() {
            info!("Pausing timer {}", self.config.id);
        }
        self.engine.pause();
        Ok(())
    }

    /// Start when paused, pause when running
    pub fn toggle(&mut self) -> Result<(), TimerError> {
        if self.engine.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self, initial: Duration) -> Result<(), TimerError> {
        self.ensure_controls()?;
        info!("Resetting timer {} to {}ms", self.config.id, initial.as_millis());
        self.finished = false;
        self.engine.reset(initial);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), TimerError> {
        self.ensure_controls()?;
        info!("Stopping timer {}", self.config.id);
        self.finished = false;
        self.engine.stop();
        Ok(())
    }

    fn target(&self) -> Duration {
        Duration::from_millis(self.config.duration)
    }

    /// Check for countdown completion at the sampled instant
    ///
    /// Stops the engine and returns the event exactly once per run; later
    /// calls return `None` until the timer is started again.
    pub fn refresh(&mut self, now: Instant) -> Option<CompletionEvent> {
        if self.config.kind != TimerKind::Countdown || !self.engine.is_running() {
            return None;
        }

        let elapsed = self.engine.elapsed(now);
        if elapsed < self.target() {
            return None;
        }

        debug!(
            "Countdown {} reached {}ms at {}ms elapsed",
            self.config.id,
            self.config.duration,
            elapsed.as_millis()
        );
        info!("Countdown {} complete", self.config.id);
        self.engine.stop();
        self.finished = true;

        Some(CompletionEvent {
            timer_id: self.config.id.clone(),
            name: self.config.name.clone(),
            audio_enabled: self.config.audio_enabled,
            audio_volume: self.config.audio_volume,
        })
    }

    /// Render the timer as of `now`; `clock_time` is used by clock timers
    pub fn view(&self, now: Instant, clock_time: &str) -> TimerView {
        let elapsed_ms = self.engine.elapsed(now).as_millis() as u64;
        let config = &self.config;

        let (display, remaining_ms, progress, complete) = match config.kind {
            TimerKind::Countdown => {
                let reached = self.finished || elapsed_ms >= config.duration;
                let remaining = if self.finished {
                    0
                } else {
                    config.duration.saturating_sub(elapsed_ms)
                };
                let progress = if self.finished {
                    100.0
                } else if config.duration > 0 {
                    (elapsed_ms as f64 / config.duration as f64 * 100.0).min(100.0)
                } else {
                    0.0
                };
                (
                    format_time(remaining, config.show_hundredths),
                    Some(remaining),
                    progress,
                    reached,
                )
            }
            TimerKind::Countup => (format_time(elapsed_ms, config.show_hundredths), None, 0.0, false),
            TimerKind::Clock => (clock_time.to_string(), None, 0.0, false),
        };

        TimerView {
            id: config.id.clone(),
            name: config.name.clone(),
            kind: config.kind,
            display,
            elapsed_ms,
            remaining_ms,
            progress,
            running: self.engine.is_running(),
            complete,
            controls_enabled: config.kind.has_controls(),
            config: config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::time::{advance, Instant};

    use super::*;

    fn countdown(duration_ms: u64) -> TimerInstance {
        TimerInstance::new(TimerConfig::countdown("countdown-1", "Talk", duration_ms))
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_completes_exactly_once() {
        let mut timer = countdown(5_000);
        timer.start().unwrap();

        advance(Duration::from_millis(3_000)).await;
        let now = Instant::now();
        assert_eq!(timer.refresh(now), None);
        assert_eq!(timer.view(now, "").display, "00:02");

        advance(Duration::from_millis(2_000)).await;
        let now = Instant::now();
        let event = timer.refresh(now).expect("countdown should complete");
        assert_eq!(event.timer_id, "countdown-1");
        assert!(event.audio_enabled);

        assert_eq!(timer.refresh(now), None);
        advance(Duration::from_millis(500)).await;
        assert_eq!(timer.refresh(Instant::now()), None);

        let view = timer.view(Instant::now(), "");
        assert!(!view.running);
        assert!(view.complete);
        assert_eq!(view.elapsed_ms, 0);
        assert_eq!(view.display, "00:00");
        assert_eq!(view.progress, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn late_refresh_still_fires_once() {
        let mut timer = countdown(1_000);
        timer.start().unwrap();

        advance(Duration::from_millis(4_000)).await;
        assert!(timer.refresh(Instant::now()).is_some());
        assert!(timer.refresh(Instant::now()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_completion_runs_full_countdown() {
        let mut timer = countdown(1_000);
        timer.start().unwrap();
        advance(Duration::from_millis(1_000)).await;
        assert!(timer.refresh(Instant::now()).is_some());

        timer.start().unwrap();
        assert!(!timer.is_finished());
        advance(Duration::from_millis(400)).await;
        let view = timer.view(Instant::now(), "");
        assert_eq!(view.remaining_ms, Some(600));
        assert!(!view.complete);
        assert!(timer.refresh(Instant::now()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn paused_countdown_never_completes() {
        let mut timer = countdown(1_000);
        timer.start().unwrap();
        advance(Duration::from_millis(900)).await;
        timer.pause().unwrap();
        advance(Duration::from_millis(10_000)).await;

        assert!(timer.refresh(Instant::now()).is_none());
        assert_eq!(timer.view(Instant::now(), "").remaining_ms, Some(100));
    }

    #[tokio::test(start_paused = true)]
    async fn countup_shows_hundredths_when_configured() {
        let mut config = TimerConfig::countup("countup-1", "Q&A");
        config.show_hundredths = true;
        let mut timer = TimerInstance::new(config);
        timer.start().unwrap();
        advance(Duration::from_millis(125_340)).await;

        let view = timer.view(Instant::now(), "");
        assert_eq!(view.display, "02:05.34");
        assert_eq!(view.remaining_ms, None);
        assert!(timer.refresh(Instant::now()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_progress_is_capped() {
        let mut timer = countdown(2_000);
        timer.start().unwrap();
        advance(Duration::from_millis(500)).await;
        assert_eq!(timer.view(Instant::now(), "").progress, 25.0);

        advance(Duration::from_millis(5_000)).await;
        let view = timer.view(Instant::now(), "");
        assert_eq!(view.progress, 100.0);
        assert_eq!(view.display, "00:00");
        assert!(view.complete);
    }

    #[tokio::test(start_paused = true)]
    async fn clock_timer_rejects_controls() {
        let mut timer = TimerInstance::new(TimerConfig::clock("clock-1", "Time of Day"));

        assert_eq!(timer.start(), Err(TimerError::ControlsDisabled("clock-1".to_string())));
        assert!(timer.pause().is_err());
        assert!(timer.reset(Duration::ZERO).is_err());
        assert!(timer.stop().is_err());

        let view = timer.view(Instant::now(), "09:30:00");
        assert_eq!(view.display, "09:30:00");
        assert!(!view.controls_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_alternates_run_state() {
        let mut timer = countdown(10_000);
        timer.toggle().unwrap();
        assert!(timer.is_running());
        advance(Duration::from_millis(250)).await;
        timer.toggle().unwrap();
        assert!(!timer.is_running());
        assert_eq!(timer.view(Instant::now(), "").elapsed_ms, 250);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_clears_completion_latch() {
        let mut timer = countdown(100);
        timer.start().unwrap();
        advance(Duration::from_millis(100)).await;
        timer.refresh(Instant::now());
        assert!(timer.is_finished());

        timer.stop().unwrap();
        let view = timer.view(Instant::now(), "");
        assert!(!view.complete);
        assert_eq!(view.display, "00:00");
        assert_eq!(view.remaining_ms, Some(100));
    }
}
