//! Stage Timer - A presentation timer service
//! 
//! This is the main entry point for the stage-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use stage_timer::{
    config::Config,
    state::{settings::load_or_default, AppState, JsonFileStore},
    api::create_router,
    services::check_audio_player_available,
    tasks::{clock_task, completion_notifier_task, display_refresh_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("stage_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting stage-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, refresh={}ms, audio={}",
          config.host, config.port, config.refresh_ms, !config.no_audio);

    // A missing player only degrades the cue to the terminal bell
    if !config.no_audio {
        if let Err(e) = check_audio_player_available().await {
            tracing::warn!("{}", e);
        }
    }

    // Load persisted settings
    let store = Arc::new(JsonFileStore::new(config.settings_path()));
    info!("Settings file: {}", store.path().display());
    let settings = load_or_default(store.as_ref());
    info!("Loaded {} timers", settings.timers.len());

    // Create application state
    let state = Arc::new(AppState::new(settings, store, config.port, config.host.clone()));

    // Start background tasks
    tokio::spawn(display_refresh_task(Arc::clone(&state), config.refresh_interval()));
    tokio::spawn(clock_task(Arc::clone(&state)));
    tokio::spawn(completion_notifier_task(Arc::clone(&state), !config.no_audio));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timers               - All timers");
    info!("  POST /timers/:id/<action>  - start, pause, toggle, reset, stop");
    info!("  PUT  /timers/:id/config    - Edit timer configuration");
    info!("  POST /shortcut/:key        - space, r, escape on the active timer");
    info!("  GET  /events               - Display frames (server-sent events)");
    info!("  GET  /status               - Current status");
    info!("  GET  /health               - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
