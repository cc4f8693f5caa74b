//! Keyboard shortcuts acting on the active timer

use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::TimerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shortcut {
    /// Start or pause
    Space,
    /// Reset to zero
    Reset,
    /// Leave presentation mode, or stop when not presenting
    Escape,
}

impl FromStr for Shortcut {
    type Err = TimerError;

    /// Accepts key names as well as browser `KeyboardEvent.code` values
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key.trim().to_ascii_lowercase().as_str() {
            "space" => Ok(Shortcut::Space),
            "r" | "keyr" | "reset" => Ok(Shortcut::Reset),
            "escape" | "esc" => Ok(Shortcut::Escape),
            other => Err(TimerError::UnknownShortcut(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_names_and_codes() {
        assert_eq!("Space".parse::<Shortcut>(), Ok(Shortcut::Space));
        assert_eq!("KeyR".parse::<Shortcut>(), Ok(Shortcut::Reset));
        assert_eq!("r".parse::<Shortcut>(), Ok(Shortcut::Reset));
        assert_eq!("Escape".parse::<Shortcut>(), Ok(Shortcut::Escape));
        assert!("KeyQ".parse::<Shortcut>().is_err());
    }
}
