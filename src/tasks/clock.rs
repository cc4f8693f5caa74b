//! Time-of-day background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{info, warn};

use crate::{state::AppState, utils::format::current_time_of_day};

/// Clock timers are refreshed at this fixed cadence
pub const CLOCK_CADENCE: Duration = Duration::from_secs(1);

/// Sample the local time of day for clock timers
pub async fn clock_task(state: Arc<AppState>) {
    info!("Starting clock task");

    let mut ticker = interval(CLOCK_CADENCE);

    loop {
        ticker.tick().await;

        if let Err(e) = state.set_clock_time(current_time_of_day()) {
            warn!("Failed to update clock time: {}", e);
        }
    }
}
