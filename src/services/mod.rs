//! External side effects
//! 
//! This module contains the audio cue played on countdown completion.

pub mod audio;

// Re-export main functions
pub use audio::*;
