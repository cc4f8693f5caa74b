//! Persisted timer configuration and theme
//!
//! Only configuration survives restarts. Running state of a timer is never
//! written out.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::TimerError;

/// Which display a timer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Countdown,
    Countup,
    Clock,
}

impl TimerKind {
    /// Clock timers have no start/pause/reset/stop
    pub fn has_controls(&self) -> bool {
        !matches!(self, TimerKind::Clock)
    }
}

/// Configuration of a single timer, stored as camelCase JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TimerKind,
    pub name: String,
    /// Countdown target in milliseconds; unused by other kinds
    pub duration: u64,
    pub show_hundredths: bool,
    pub audio_enabled: bool,
    pub audio_volume: f64,
}

impl TimerConfig {
    pub fn countdown(id: &str, name: &str, duration: u64) -> Self {
        Self {
            id: id.to_string(),
            kind: TimerKind::Countdown,
            name: name.to_string(),
            duration,
            show_hundredths: false,
            audio_enabled: true,
            audio_volume: DEFAULT_VOLUME,
        }
    }

    pub fn countup(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: TimerKind::Countup,
            name: name.to_string(),
            duration: 0,
            show_hundredths: false,
            audio_enabled: true,
            audio_volume: DEFAULT_VOLUME,
        }
    }

    pub fn clock(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: TimerKind::Clock,
            name: name.to_string(),
            duration: 0,
            show_hundredths: false,
            audio_enabled: false,
            audio_volume: DEFAULT_VOLUME,
        }
    }

    /// Whole minutes of the countdown target (as shown in the duration editor)
    pub fn duration_minutes(&self) -> u64 {
        self.duration / 60_000
    }

    /// Remaining seconds of the countdown target after whole minutes
    pub fn duration_seconds(&self) -> u64 {
        (self.duration % 60_000) / 1000
    }

    /// Apply a partial edit, validating every field before touching any
    pub fn apply(&mut self, update: &ConfigUpdate) -> Result<(), TimerError> {
        let duration = match (update.duration_minutes, update.duration_seconds) {
            (None, None) => None,
            (minutes, seconds) => {
                let minutes = minutes.unwrap_or_else(|| self.duration_minutes());
                let seconds = seconds.unwrap_or_else(|| self.duration_seconds());
                Some(duration_from_parts(minutes, seconds)?)
            }
        };

        if let Some(volume) = update.audio_volume {
            if !(0.0..=1.0).contains(&volume) {
                return Err(TimerError::InvalidConfig(format!(
                    "audio volume must be between 0 and 1, got {}",
                    volume
                )));
            }
        }

        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(TimerError::InvalidConfig("name must not be empty".to_string()));
            }
        }

        if duration.is_some() && self.kind != TimerKind::Countdown {
            return Err(TimerError::InvalidConfig(format!(
                "only countdown timers have a duration, {} is a {:?} timer",
                self.id, self.kind
            )));
        }

        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(duration) = duration {
            self.duration = duration;
        }
        if let Some(show) = update.show_hundredths {
            self.show_hundredths = show;
        }
        if let Some(enabled) = update.audio_enabled {
            self.audio_enabled = enabled;
        }
        if let Some(volume) = update.audio_volume {
            self.audio_volume = volume;
        }
        Ok(())
    }
}

pub const DEFAULT_VOLUME: f64 = 0.7;

/// Largest value accepted by each of the minute and second fields
pub const MAX_DURATION_FIELD: u64 = 59;

/// Countdown target in milliseconds from minute and second fields (each 0..=59)
pub fn duration_from_parts(minutes: u64, seconds: u64) -> Result<u64, TimerError> {
    if minutes > MAX_DURATION_FIELD || seconds > MAX_DURATION_FIELD {
        return Err(TimerError::InvalidConfig(format!(
            "duration fields must be between 0 and {}, got {}m {}s",
            MAX_DURATION_FIELD, minutes, seconds
        )));
    }
    Ok((minutes * 60 + seconds) * 1000)
}

/// Partial configuration edit; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub name: Option<String>,
    pub duration_minutes: Option<u64>,
    pub duration_seconds: Option<u64>,
    pub show_hundredths: Option<bool>,
    pub audio_enabled: Option<bool>,
    pub audio_volume: Option<f64>,
}

/// Everything that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub timers: Vec<TimerConfig>,
    #[serde(default)]
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timers: vec![
                TimerConfig::countdown("countdown-1", "Countdown Timer", 5 * 60 * 1000),
                TimerConfig::countup("countup-1", "Countup Timer"),
                TimerConfig::clock("clock-1", "Time of Day"),
            ],
            dark_mode: false,
        }
    }
}

/// Load/save collaborator for settings
pub trait SettingsStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<Settings>, String>;
    fn save(&self, settings: &Settings) -> Result<(), String>;
}

/// Load settings, falling back to defaults when nothing usable is stored
pub fn load_or_default(store: &dyn SettingsStore) -> Settings {
    match store.load() {
        Ok(Some(settings)) if !settings.timers.is_empty() => settings,
        Ok(Some(_)) => {
            warn!("Stored settings contain no timers, using defaults");
            Settings::default()
        }
        Ok(None) => {
            debug!("No stored settings, using defaults");
            Settings::default()
        }
        Err(e) => {
            error!("Failed to load timer configurations: {}", e);
            Settings::default()
        }
    }
}

/// Settings stored as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Option<Settings>, String> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read {}: {}", self.path.display(), e))?;
        let settings = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid settings in {}: {}", self.path.display(), e))?;
        Ok(Some(settings))
    }

    fn save(&self, settings: &Settings) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
            }
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        fs::write(&self.path, json)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))?;

        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store, used where no file should be touched
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<Settings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved value
    pub fn saved(&self) -> Option<Settings> {
        self.saved.lock().ok().and_then(|saved| saved.clone())
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Settings>, String> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .map_err(|e| format!("Failed to lock memory store: {}", e))
    }

    fn save(&self, settings: &Settings) -> Result<(), String> {
        let mut saved = self.saved
            .lock()
            .map_err(|e| format!("Failed to lock memory store: {}", e))?;
        *saved = Some(settings.clone());
        Ok(())
    }
}
