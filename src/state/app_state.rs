//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant as StdInstant},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::{
    error::TimerError,
    utils::format::{current_time_of_day, format_uptime},
};
use super::{
    engine::{Clock, MonotonicClock},
    settings::{ConfigUpdate, Settings, SettingsStore},
    shortcut::Shortcut,
    timer::{CompletionEvent, TimerInstance, TimerView},
};

/// Everything a display needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub active_timer_id: String,
    pub dark_mode: bool,
    pub presentation_mode: bool,
    pub clock_time: String,
    pub timers: Vec<TimerView>,
}

#[derive(Debug, Clone)]
struct UiState {
    active_timer_id: String,
    dark_mode: bool,
    /// Fullscreen presentation; not persisted
    presentation_mode: bool,
}

/// Shared state behind the HTTP API and the background tasks
pub struct AppState {
    /// Timers in display order
    pub timers: Arc<Mutex<Vec<TimerInstance>>>,
    ui: Arc<Mutex<UiState>>,
    /// Latest time-of-day sample for clock timers
    pub clock_time: Arc<Mutex<String>>,
    store: Arc<dyn SettingsStore>,
    /// Server metadata
    pub start_time: StdInstant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Countdown completions, consumed by the notifier task
    pub completion_tx: broadcast::Sender<CompletionEvent>,
    /// Display frames published at refresh cadence
    pub display_tx: watch::Sender<DisplaySnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _display_rx: watch::Receiver<DisplaySnapshot>,
}

impl AppState {
    /// Build state from loaded settings; `store` receives every later change
    pub fn new(settings: Settings, store: Arc<dyn SettingsStore>, port: u16, host: String) -> Self {
        let (completion_tx, _) = broadcast::channel(16);

        let clock_time = current_time_of_day();
        let active_timer_id = settings
            .timers
            .first()
            .map(|timer| timer.id.clone())
            .unwrap_or_default();
        let ui = UiState {
            active_timer_id,
            dark_mode: settings.dark_mode,
            presentation_mode: false,
        };
        let timers: Vec<TimerInstance> = settings.timers.into_iter().map(TimerInstance::new).collect();

        let now = MonotonicClock.now();
        let initial = DisplaySnapshot {
            active_timer_id: ui.active_timer_id.clone(),
            dark_mode: ui.dark_mode,
            presentation_mode: ui.presentation_mode,
            clock_time: clock_time.clone(),
            timers: timers.iter().map(|timer| timer.view(now, &clock_time)).collect(),
        };
        let (display_tx, display_rx) = watch::channel(initial);

        Self {
            timers: Arc::new(Mutex::new(timers)),
            ui: Arc::new(Mutex::new(ui)),
            clock_time: Arc::new(Mutex::new(clock_time)),
            store,
            start_time: StdInstant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            completion_tx,
            display_tx,
            _display_rx: display_rx,
        }
    }

    fn record_action(&self, action: String) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action);
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn ui_state(&self) -> Result<UiState, TimerError> {
        Ok(self.ui.lock()?.clone())
    }

    /// Apply `action` to one timer and return its view afterwards
    fn with_timer<F>(&self, id: &str, action: &str, f: F) -> Result<TimerView, TimerError>
    where
        F: FnOnce(&mut TimerInstance) -> Result<(), TimerError>,
    {
        let clock_time = self.clock_time()?;
        let mut timers = self.timers.lock()?;
        let timer = timers
            .iter_mut()
            .find(|timer| timer.id() == id)
            .ok_or_else(|| TimerError::NotFound(id.to_string()))?;

        f(timer)?;
        let view = timer.view(MonotonicClock.now(), &clock_time);
        drop(timers); // Release the lock early

        self.record_action(format!("{} {}", action, id));
        Ok(view)
    }

    pub fn start_timer(&self, id: &str) -> Result<TimerView, TimerError> {
        self.with_timer(id, "start", |timer| timer.start())
    }

    pub fn pause_timer(&self, id: &str) -> Result<TimerView, TimerError> {
        self.with_timer(id, "pause", |timer| timer.pause())
    }

    pub fn toggle_timer(&self, id: &str) -> Result<TimerView, TimerError> {
        self.with_timer(id, "toggle", |timer| timer.toggle())
    }

    pub fn reset_timer(&self, id: &str, initial: Duration) -> Result<TimerView, TimerError> {
        self.with_timer(id, "reset", |timer| timer.reset(initial))
    }

    pub fn stop_timer(&self, id: &str) -> Result<TimerView, TimerError> {
        self.with_timer(id, "stop", |timer| timer.stop())
    }

    /// Edit a timer's configuration and save settings
    pub fn update_config(&self, id: &str, update: &ConfigUpdate) -> Result<TimerView, TimerError> {
        let view = self.with_timer(id, "config", |timer| timer.config_mut().apply(update))?;
        info!("Updated configuration of timer {}", id);
        self.persist();
        Ok(view)
    }

    pub fn timer_view(&self, id: &str) -> Result<TimerView, TimerError> {
        let clock_time = self.clock_time()?;
        let timers = self.timers.lock()?;
        timers
            .iter()
            .find(|timer| timer.id() == id)
            .map(|timer| timer.view(MonotonicClock.now(), &clock_time))
            .ok_or_else(|| TimerError::NotFound(id.to_string()))
    }

    pub fn timer_views(&self) -> Result<Vec<TimerView>, TimerError> {
        let clock_time = self.clock_time()?;
        let now = MonotonicClock.now();
        let timers = self.timers.lock()?;
        Ok(timers.iter().map(|timer| timer.view(now, &clock_time)).collect())
    }

    /// Select the timer that shortcuts act on
    pub fn set_active_timer(&self, id: &str) -> Result<(), TimerError> {
        let exists = self.timers.lock()?.iter().any(|timer| timer.id() == id);
        if !exists {
            return Err(TimerError::NotFound(id.to_string()));
        }

        self.ui.lock()?.active_timer_id = id.to_string();
        info!("Active timer set to {}", id);
        self.record_action(format!("select {}", id));
        Ok(())
    }

    pub fn active_timer_id(&self) -> Result<String, TimerError> {
        Ok(self.ui.lock()?.active_timer_id.clone())
    }

    /// Flip dark/light theme and save settings. Returns the new value.
    pub fn toggle_dark_mode(&self) -> Result<bool, TimerError> {
        let dark_mode = {
            let mut ui = self.ui.lock()?;
            ui.dark_mode = !ui.dark_mode;
            ui.dark_mode
        };

        info!("Theme set to {}", if dark_mode { "dark" } else { "light" });
        self.record_action("theme".to_string());
        self.persist();
        Ok(dark_mode)
    }

    pub fn dark_mode(&self) -> Result<bool, TimerError> {
        Ok(self.ui.lock()?.dark_mode)
    }

    /// Flip fullscreen presentation mode. Returns the new value.
    pub fn toggle_presentation_mode(&self) -> Result<bool, TimerError> {
        let enabled = !self.presentation_mode()?;
        self.set_presentation_mode(enabled)?;
        Ok(enabled)
    }

    pub fn set_presentation_mode(&self, enabled: bool) -> Result<(), TimerError> {
        self.ui.lock()?.presentation_mode = enabled;
        info!("Presentation mode {}", if enabled { "entered" } else { "left" });
        self.record_action("presentation".to_string());
        Ok(())
    }

    pub fn presentation_mode(&self) -> Result<bool, TimerError> {
        Ok(self.ui.lock()?.presentation_mode)
    }

    /// Apply a keyboard shortcut to the active timer and return its view
    pub fn handle_shortcut(&self, shortcut: Shortcut) -> Result<TimerView, TimerError> {
        let active = self.active_timer_id()?;
        debug!("Shortcut {:?} on timer {}", shortcut, active);

        if shortcut == Shortcut::Escape && self.presentation_mode()? {
            self.set_presentation_mode(false)?;
            return self.timer_view(&active);
        }

        self.with_timer(&active, "shortcut", |timer| {
            if !timer.config().kind.has_controls() {
                debug!("Ignoring {:?} on clock timer {}", shortcut, timer.id());
                return Ok(());
            }
            match shortcut {
                Shortcut::Space => timer.toggle(),
                Shortcut::Reset => timer.reset(Duration::ZERO),
                Shortcut::Escape => timer.stop(),
            }
        })
    }

    /// Sample every timer once: detect countdown completions, notify
    /// listeners and publish a display frame
    pub fn refresh(&self) -> Result<Vec<CompletionEvent>, TimerError> {
        let clock_time = self.clock_time()?;
        let now = MonotonicClock.now();

        let (completions, views) = {
            let mut timers = self.timers.lock()?;
            let completions: Vec<CompletionEvent> =
                timers.iter_mut().filter_map(|timer| timer.refresh(now)).collect();
            let views: Vec<TimerView> = timers.iter().map(|timer| timer.view(now, &clock_time)).collect();
            (completions, views)
        };

        for event in &completions {
            self.record_action(format!("complete {}", event.timer_id));
            // No receivers just means nobody is listening for audio cues
            if let Err(e) = self.completion_tx.send(event.clone()) {
                debug!("Completion of {} had no listeners: {}", event.timer_id, e);
            }
        }

        let snapshot = self.build_snapshot(clock_time, views)?;
        if let Err(e) = self.display_tx.send(snapshot) {
            warn!("Failed to publish display snapshot: {}", e);
        }

        Ok(completions)
    }

    /// Current frame without running completion detection
    pub fn snapshot(&self) -> Result<DisplaySnapshot, TimerError> {
        let views = self.timer_views()?;
        self.build_snapshot(self.clock_time()?, views)
    }

    fn build_snapshot(&self, clock_time: String, timers: Vec<TimerView>) -> Result<DisplaySnapshot, TimerError> {
        let ui = self.ui_state()?;
        Ok(DisplaySnapshot {
            active_timer_id: ui.active_timer_id,
            dark_mode: ui.dark_mode,
            presentation_mode: ui.presentation_mode,
            clock_time,
            timers,
        })
    }

    pub fn set_clock_time(&self, time: String) -> Result<(), TimerError> {
        *self.clock_time.lock()? = time;
        Ok(())
    }

    pub fn clock_time(&self) -> Result<String, TimerError> {
        Ok(self.clock_time.lock()?.clone())
    }

    /// Persistable settings as they stand now
    pub fn settings(&self) -> Result<Settings, TimerError> {
        let timers = self.timers
            .lock()?
            .iter()
            .map(|timer| timer.config().clone())
            .collect();
        Ok(Settings {
            timers,
            dark_mode: self.dark_mode()?,
        })
    }

    /// Best-effort save; failures are logged and otherwise ignored
    pub fn persist(&self) {
        let settings = match self.settings() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to collect settings for saving: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.save(&settings) {
            warn!("Failed to save settings: {}", e);
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::{sync::Arc, time::Duration};
    use tokio::time::advance;

    use super::*;
    use crate::state::settings::{MemoryStore, TimerConfig};

    fn state_with(settings: Settings) -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(settings, store.clone(), 0, "127.0.0.1".to_string());
        (state, store)
    }

    fn short_countdown() -> Settings {
        Settings {
            timers: vec![
                TimerConfig::countdown("talk", "Talk", 1_000),
                TimerConfig::clock("clock-1", "Time of Day"),
            ],
            dark_mode: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_broadcasts_completion_once() {
        let (state, _) = state_with(short_countdown());
        let mut completions = state.completion_tx.subscribe();

        state.start_timer("talk").unwrap();
        advance(Duration::from_millis(999)).await;
        assert!(state.refresh().unwrap().is_empty());

        advance(Duration::from_millis(1)).await;
        let fired = state.refresh().unwrap();
        assert_eq!(fired.len(), 1);
        assert!(state.refresh().unwrap().is_empty());

        let event = completions.try_recv().unwrap();
        assert_eq!(event.timer_id, "talk");
        assert!(completions.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_publishes_display_frame() {
        let (state, _) = state_with(short_countdown());
        let display = state.display_tx.subscribe();

        state.start_timer("talk").unwrap();
        advance(Duration::from_millis(250)).await;
        state.refresh().unwrap();

        let frame = display.borrow().clone();
        assert_eq!(frame.active_timer_id, "talk");
        assert_eq!(frame.timers[0].remaining_ms, Some(750));
        assert!(frame.timers[0].running);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_timer_is_not_found() {
        let (state, _) = state_with(short_countdown());
        assert_eq!(
            state.start_timer("nope").unwrap_err(),
            TimerError::NotFound("nope".to_string())
        );
        assert!(state.set_active_timer("nope").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn clock_timer_controls_are_rejected() {
        let (state, _) = state_with(short_countdown());
        assert!(matches!(
            state.start_timer("clock-1"),
            Err(TimerError::ControlsDisabled(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn theme_and_config_changes_are_saved() {
        let (state, store) = state_with(short_countdown());
        assert_eq!(store.saved(), None);

        assert!(state.toggle_dark_mode().unwrap());
        assert!(store.saved().unwrap().dark_mode);

        let update = ConfigUpdate {
            duration_minutes: Some(2),
            duration_seconds: Some(30),
            ..Default::default()
        };
        let view = state.update_config("talk", &update).unwrap();
        assert_eq!(view.config.duration, 150_000);
        assert_eq!(store.saved().unwrap().timers[0].duration, 150_000);
    }

    #[tokio::test(start_paused = true)]
    async fn run_state_survives_config_edit() {
        let (state, _) = state_with(short_countdown());
        state.start_timer("talk").unwrap();
        advance(Duration::from_millis(400)).await;

        let update = ConfigUpdate {
            show_hundredths: Some(true),
            ..Default::default()
        };
        let view = state.update_config("talk", &update).unwrap();
        assert!(view.running);
        assert_eq!(view.display, "00:00.60");
    }

    #[tokio::test(start_paused = true)]
    async fn space_toggles_and_escape_stops_active_timer() {
        let (state, _) = state_with(short_countdown());

        let view = state.handle_shortcut(Shortcut::Space).unwrap();
        assert!(view.running);
        advance(Duration::from_millis(300)).await;

        let view = state.handle_shortcut(Shortcut::Space).unwrap();
        assert!(!view.running);
        assert_eq!(view.elapsed_ms, 300);

        let view = state.handle_shortcut(Shortcut::Escape).unwrap();
        assert_eq!(view.elapsed_ms, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn escape_leaves_presentation_mode_before_stopping() {
        let (state, _) = state_with(short_countdown());
        state.start_timer("talk").unwrap();
        assert!(state.toggle_presentation_mode().unwrap());
        advance(Duration::from_millis(200)).await;

        let view = state.handle_shortcut(Shortcut::Escape).unwrap();
        assert!(!state.presentation_mode().unwrap());
        assert!(view.running);
        assert_eq!(view.elapsed_ms, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn shortcuts_are_ignored_on_clock_timer() {
        let (state, _) = state_with(short_countdown());
        state.set_active_timer("clock-1").unwrap();

        let view = state.handle_shortcut(Shortcut::Space).unwrap();
        assert!(!view.running);
        assert!(state.handle_shortcut(Shortcut::Reset).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn clock_timer_shows_latest_sample() {
        let (state, _) = state_with(short_countdown());
        state.set_clock_time("14:03:09".to_string()).unwrap();
        assert_eq!(state.timer_view("clock-1").unwrap().display, "14:03:09");
    }
}
