//! Menubar Countdown - A countdown timer that alerts when it reaches zero
//!
//! This is the main entry point for the menubar-countdown application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use menubar_countdown::{
    api::create_router,
    clock::SystemClock,
    config::Config,
    preferences::{JsonFilePreferences, PreferenceKey, Preferences},
    services::{Announcer, CommandBackend, DesktopNotifier, NotifierKind},
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("menubar_countdown={},tower_http=info", config.log_level()))
        .init();

    info!("Starting menubar-countdown v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}", config.host, config.port);

    let preferences = match config.preferences_path() {
        Some(path) => Preferences::new(Arc::new(JsonFilePreferences::load(path)?)),
        None => {
            warn!("Could not determine a preference file location, preferences will not persist");
            Preferences::in_memory()
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        Arc::new(SystemClock::new()),
        preferences.clone(),
    ));

    let backend = Arc::new(CommandBackend::new(config.sound(), config.speech()));
    state.add_observer(Arc::new(Announcer::new(backend, state.subscribe())))?;

    let notifier_kind = if config.no_desktop_notifications {
        NotifierKind::LogOnly
    } else {
        NotifierKind::NotifyRust
    };
    state.add_observer(Arc::new(DesktopNotifier::new(notifier_kind)))?;

    if let Some(seconds) = config.start {
        state.start(seconds)?;
    } else if preferences.bool(PreferenceKey::ShowStartDialogOnLaunch) {
        state.request_start_prompt()?;
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start                - Start a countdown (body: hours/minutes/seconds)");
    info!("  POST /stop                 - Stop the countdown");
    info!("  POST /pause                - Pause the countdown");
    info!("  POST /resume               - Resume a paused countdown");
    info!("  POST /dismiss              - Dismiss the expiration alert");
    info!("  POST /restart              - Restart from the stored setting");
    info!("  POST /notification-clicked - Acknowledge from the notification");
    info!("  POST /quit                 - Shut down");
    info!("  GET  /status               - Countdown status");
    info!("  GET  /preferences[/:key]   - Read preferences (PUT to change)");
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
        _ = state.shutdown_requested() => {
            info!("Quit requested");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
