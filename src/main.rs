//! Countdown Keeper - a persistent single-timer countdown service
//!
//! This is the main entry point for the countdown-keeper application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use countdown_keeper::{
    api::create_router,
    clock::{Clock, SystemClock},
    config::Config,
    engine::CountdownEngine,
    state::{AppState, JsonFileStore, StateStore},
    tasks::session_watch_task,
    utils::{lifecycle_signal_task, shutdown_signal},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_keeper={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-keeper v{}", env!("CARGO_PKG_VERSION"));
    let state_path = config.state_path();
    info!("Configuration: host={}, port={}, state={:?}, tick={}ms",
          config.host, config.port, state_path, config.tick_ms);

    // Open persisted state and build the engine around it
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(StateStore::new(
        Box::new(JsonFileStore::open(state_path)),
        Arc::clone(&clock),
    ));
    let engine = Arc::new(
        CountdownEngine::new(Arc::clone(&store), clock).with_tick_interval(config.tick_interval()),
    );

    // A countdown that was running before the restart keeps counting
    engine.restore();

    tokio::spawn(session_watch_task(Arc::clone(&store)));
    tokio::spawn(lifecycle_signal_task(Arc::clone(&engine)));

    let state = Arc::new(AppState::new(Arc::clone(&engine), config.port, config.host.clone()));
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /toggle               - Start or pause the countdown");
    info!("  POST /reset                - Reset and bank elapsed time");
    info!("  POST /total                - Set duration {{hours, minutes, seconds}}");
    info!("  POST /set-max              - Use remaining time as the new duration");
    info!("  POST /clear-today          - Clear today's total");
    info!("  POST /save                 - Persist live remaining time");
    info!("  POST /lifecycle/background - Save and auto-pause");
    info!("  POST /lifecycle/foreground - Report foreground return");
    info!("  GET  /status               - Current countdown state");
    info!("  GET  /health               - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Keep the wall-clock math consistent for the next start
    if let Err(e) = engine.save_current_state() {
        error!("Failed to save countdown state on shutdown: {}", e);
    }
    engine.shutdown();

    info!("Server shutdown complete");
    Ok(())
}
