//! Session watch background task
//!
//! Follows the state stream and reports when the ongoing countdown
//! notification should appear or go away.

use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::state::{CountdownState, StateStore};

/// Coarse phase of the countdown session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
    Finished,
}

impl SessionPhase {
    pub fn of(state: &CountdownState) -> Self {
        if state.is_running {
            SessionPhase::Running
        } else if state.paused_time > 0 {
            SessionPhase::Paused
        } else if state.current_millis <= 0 {
            SessionPhase::Finished
        } else {
            SessionPhase::Idle
        }
    }

    /// Whether an ongoing notification belongs on screen in this phase
    pub fn shows_notification(self) -> bool {
        matches!(self, SessionPhase::Running | SessionPhase::Paused)
    }
}

/// Log session phase changes until the store is dropped
pub async fn session_watch_task(store: Arc<StateStore>) {
    info!("Starting session watch task");

    let mut phases = Box::pin(store.stream().map(|state| SessionPhase::of(&state)));
    drop(store);
    let mut last: Option<SessionPhase> = None;
    let mut notification_shown = false;

    while let Some(phase) = phases.next().await {
        if last == Some(phase) {
            continue;
        }
        debug!("Session phase changed: {:?} -> {:?}", last, phase);
        last = Some(phase);

        if phase.shows_notification() && !notification_shown {
            info!("Countdown session active, showing ongoing notification");
            notification_shown = true;
        } else if !phase.shows_notification()
            && notification_shown
            && phase == SessionPhase::Finished
        {
            info!("Countdown finished, dismissing ongoing notification");
            notification_shown = false;
        }
    }

    debug!("State stream closed, session watch exiting");
}
