//! Display refresh background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Drive `AppState::refresh` at display cadence
///
/// The cadence only bounds how late a countdown completion is noticed;
/// displayed times come from the clock, so skipped ticks lose nothing.
pub async fn display_refresh_task(state: Arc<AppState>, cadence: Duration) {
    info!("Starting display refresh task every {}ms", cadence.as_millis());

    let mut ticker = interval(cadence);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match state.refresh() {
            Ok(completions) => {
                for event in completions {
                    debug!("Refresh detected completion of {}", event.timer_id);
                }
            }
            Err(e) => {
                error!("Display refresh failed: {}", e);
            }
        }
    }
}
