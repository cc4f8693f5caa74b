//! Configuration and CLI argument handling

use std::{env, path::PathBuf, time::Duration};
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "stage-timer")]
#[command(about = "A presentation timer with countdown, count-up and clock displays")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Settings file (defaults to ~/.config/stage-timer/settings.json)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Display refresh interval in milliseconds
    #[arg(short, long, default_value = "16", value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub refresh_ms: u64,

    /// Never play the completion cue, regardless of timer settings
    #[arg(long)]
    pub no_audio: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    /// Settings file to load from and save to
    pub fn settings_path(&self) -> PathBuf {
        match &self.settings {
            Some(path) => path.clone(),
            None => default_settings_path(),
        }
    }
}

fn default_settings_path() -> PathBuf {
    if let Some(home) = env::var_os("HOME") {
        PathBuf::from(home).join(".config").join("stage-timer").join("settings.json")
    } else {
        PathBuf::from("stage-timer-settings.json")
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::{path::PathBuf, time::Duration};

    use super::Config;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["stage-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.refresh_interval(), Duration::from_millis(16));
        assert_eq!(config.log_level(), "info");
        assert!(!config.no_audio);
    }

    #[test]
    fn explicit_settings_path_wins() {
        let config = Config::try_parse_from([
            "stage-timer",
            "--settings",
            "/tmp/talk.json",
            "--refresh-ms",
            "50",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.settings_path(), PathBuf::from("/tmp/talk.json"));
        assert_eq!(config.refresh_interval(), Duration::from_millis(50));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        assert!(Config::try_parse_from(["stage-timer", "--refresh-ms", "0"]).is_err());
    }
}
