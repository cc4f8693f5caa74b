//! State management module
//! 
//! This module contains the elapsed-time engine, timers built on it, persisted
//! settings and the shared application state.

pub mod engine;
pub mod settings;
pub mod shortcut;
pub mod timer;
pub mod app_state;

// Re-export main types
pub use engine::{Clock, ElapsedEngine, MonotonicClock};
pub use settings::{ConfigUpdate, JsonFileStore, MemoryStore, Settings, SettingsStore, TimerConfig, TimerKind};
pub use shortcut::Shortcut;
pub use timer::{CompletionEvent, TimerInstance, TimerView};
pub use app_state::{AppState, DisplaySnapshot};
