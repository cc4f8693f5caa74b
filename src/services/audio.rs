//! Audio cue played when a countdown completes

use std::{io::Write, time::Duration};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Tone pitch of the completion cue
pub const CUE_FREQUENCY_HZ: u32 = 800;
/// Tone length of the completion cue
pub const CUE_DURATION: Duration = Duration::from_millis(500);
/// Volume 1.0 maps to this gain
const MAX_GAIN: f64 = 0.3;

/// Synthesized tone, faded out over its whole length
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    pub frequency_hz: u32,
    pub duration: Duration,
    pub gain: f64,
}

impl AudioCue {
    /// Cue for a timer volume in `0.0..=1.0`
    pub fn for_volume(volume: f64) -> Self {
        Self {
            frequency_hz: CUE_FREQUENCY_HZ,
            duration: CUE_DURATION,
            gain: volume.clamp(0.0, 1.0) * MAX_GAIN,
        }
    }

    /// Arguments for SoX `play` producing this tone
    pub fn sox_args(&self) -> Vec<String> {
        let seconds = format!("{:.3}", self.duration.as_secs_f64());
        vec![
            "-q".to_string(),
            "-n".to_string(),
            "synth".to_string(),
            seconds.clone(),
            "sine".to_string(),
            self.frequency_hz.to_string(),
            "vol".to_string(),
            format!("{:.3}", self.gain),
            "fade".to_string(),
            "l".to_string(),
            "0".to_string(),
            seconds.clone(),
            seconds,
        ]
    }
}

/// Play `cue` through SoX, falling back to the terminal bell
pub async fn play_notification(cue: &AudioCue) -> Result<(), String> {
    if cue.gain <= 0.0 {
        debug!("Audio cue muted (volume 0)");
        return Ok(());
    }

    debug!("Playing {}Hz cue at gain {:.3}", cue.frequency_hz, cue.gain);

    match Command::new("play").args(cue.sox_args()).output().await {
        Ok(output) if output.status.success() => {
            info!("Completion cue played");
            Ok(())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("play failed: {}, ringing terminal bell", stderr.trim());
            terminal_bell()
        }
        Err(e) => {
            debug!("Failed to execute play: {}, ringing terminal bell", e);
            terminal_bell()
        }
    }
}

fn terminal_bell() -> Result<(), String> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(b"\x07")
        .and_then(|_| stdout.flush())
        .map_err(|e| format!("Failed to ring terminal bell: {}", e))
}

/// Check whether SoX `play` can be executed
pub async fn check_audio_player_available() -> Result<(), String> {
    Command::new("play")
        .arg("--version")
        .output()
        .await
        .map_err(|_| "SoX `play` is not available, completion cues fall back to the terminal bell".to_string())?;

    info!("SoX play is available");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn volume_scales_gain() {
        let cue = AudioCue::for_volume(0.5);
        assert_eq!(cue.frequency_hz, 800);
        assert_eq!(cue.duration, Duration::from_millis(500));
        assert!((cue.gain - 0.15).abs() < 1e-9);
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(AudioCue::for_volume(3.0).gain, 0.3);
        assert_eq!(AudioCue::for_volume(-1.0).gain, 0.0);
    }

    #[test]
    fn sox_arguments_describe_tone() {
        let args = AudioCue::for_volume(0.7).sox_args();
        assert_eq!(
            args,
            vec!["-q", "-n", "synth", "0.500", "sine", "800", "vol", "0.210", "fade", "l", "0", "0.500", "0.500"]
        );
    }

    #[tokio::test]
    async fn muted_cue_does_nothing() {
        assert_eq!(play_notification(&AudioCue::for_volume(0.0)).await, Ok(()));
    }
}
