//! Signal handling for graceful shutdown and job-control lifecycle

use std::sync::Arc;
use futures::stream::StreamExt;
use signal_hook::consts::{SIGCONT, SIGINT, SIGTERM, SIGTSTP};
use signal_hook_tokio::Signals;
use tracing::{error, info, warn};

use crate::engine::CountdownEngine;

/// Wait for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() {
    let mut signals = match Signals::new([SIGTERM, SIGINT]) {
        Ok(signals) => signals,
        Err(e) => {
            error!("Failed to install shutdown signal handler: {}", e);
            return std::future::pending().await;
        }
    };

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
}

/// Treat terminal job control as the host lifecycle.
///
/// SIGTSTP (Ctrl-Z) backgrounds the countdown: the live remaining time is
/// saved and the run auto-paused before the process actually stops.
/// SIGCONT brings it back to the foreground.
pub async fn lifecycle_signal_task(engine: Arc<CountdownEngine>) {
    let mut signals = match Signals::new([SIGTSTP, SIGCONT]) {
        Ok(signals) => signals,
        Err(e) => {
            error!("Failed to install lifecycle signal handler: {}", e);
            return;
        }
    };

    info!("Starting lifecycle signal task");

    while let Some(signal) = signals.next().await {
        match signal {
            SIGTSTP => {
                info!("Received SIGTSTP, moving countdown to background");
                if let Err(e) = engine.on_background() {
                    error!("Failed to background countdown: {}", e);
                }
                if let Err(e) = signal_hook::low_level::emulate_default_handler(SIGTSTP) {
                    warn!("Failed to stop process after SIGTSTP: {}", e);
                }
            }
            SIGCONT => {
                engine.on_foreground();
            }
            other => warn!("Unexpected lifecycle signal: {}", other),
        }
    }
}
