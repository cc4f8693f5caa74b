//! Errors surfaced by timer control and configuration

use std::{error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum TimerError {
    /// No timer with this id
    NotFound(String),
    /// Start/pause/reset/stop requested on a clock-of-day timer
    ControlsDisabled(String),
    /// Rejected configuration edit
    InvalidConfig(String),
    /// Malformed query string or request body
    InvalidRequest(String),
    /// Key with no shortcut bound to it
    UnknownShortcut(String),
    /// A state mutex was poisoned
    Lock(String),
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimerError::NotFound(id) => write!(f, "Timer not found: {}", id),
            TimerError::ControlsDisabled(id) => {
                write!(f, "Timer {} shows the time of day and has no controls", id)
            }
            TimerError::InvalidConfig(message) => write!(f, "Invalid configuration: {}", message),
            TimerError::InvalidRequest(message) => write!(f, "Invalid request: {}", message),
            TimerError::UnknownShortcut(key) => write!(f, "No shortcut bound to key: {}", key),
            TimerError::Lock(message) => write!(f, "Failed to lock state: {}", message),
        }
    }
}

impl error::Error for TimerError {}

impl<T> From<std::sync::PoisonError<T>> for TimerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        TimerError::Lock(e.to_string())
    }
}
