//! Countdown completion notifier task

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::{
    services::{play_notification, AudioCue},
    state::{AppState, CompletionEvent},
};

/// Play the audio cue for every completed countdown that has audio enabled
///
/// `audio_allowed` is the process-wide switch (`--no-audio` turns it off).
pub async fn completion_notifier_task(state: Arc<AppState>, audio_allowed: bool) {
    info!("Starting completion notifier task");

    let completions = state.completion_tx.subscribe();
    drop(state);
    notify_completions(completions, audio_allowed).await;
}

/// Both the timer's own setting and the process switch must allow audio
pub fn should_play(event: &CompletionEvent, audio_allowed: bool) -> bool {
    audio_allowed && event.audio_enabled
}

/// Consume completions until every sender is gone
pub async fn notify_completions(mut completions: broadcast::Receiver<CompletionEvent>, audio_allowed: bool) {
    loop {
        match completions.recv().await {
            Ok(event) => {
                info!("Countdown {} ({}) finished", event.timer_id, event.name);

                if !should_play(&event, audio_allowed) {
                    debug!("Audio cue disabled for {}", event.timer_id);
                    continue;
                }

                let cue = AudioCue::for_volume(event.audio_volume);
                tokio::spawn(async move {
                    if let Err(e) = play_notification(&cue).await {
                        warn!("Failed to play audio cue: {}", e);
                    }
                });
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Completion notifier lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Completion channel closed, stopping notifier");
                break;
            }
        }
    }
}
