//! Stage Timer - A presentation timer service
//! 
//! This library provides countdown, count-up and time-of-day timers built on a
//! drift-free elapsed-time engine, with persisted configuration, an audio cue
//! on countdown completion and an HTTP API for presentation front ends.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, ElapsedEngine};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
