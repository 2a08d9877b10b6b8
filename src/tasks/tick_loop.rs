//! Countdown tick loop background task

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, error, info, trace};

use crate::{
    clock::Clock,
    state::{CountdownState, StateStore},
};

/// Outcome of one pass over the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// `start_time` was anchored; count on the next pass without sleeping
    Anchored,
    /// Countdown continues with this many millis left
    Counting(i64),
    /// Countdown reached zero and banked this many seconds
    Completed(i64),
}

/// Handle to a running tick loop.
///
/// Cancelling sets a flag the loop checks under the store lock before
/// every write, so no write from the loop can land after `cancel` returns.
#[derive(Debug)]
pub struct TickHandle {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TickHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the tick loop on the current tokio runtime
pub fn spawn_tick_loop(
    store: Arc<StateStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
) -> TickHandle {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    let task = tokio::spawn(async move {
        tick_loop(store, clock, interval, flag).await;
    });

    TickHandle { cancelled, task }
}

async fn tick_loop(
    store: Arc<StateStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    cancelled: Arc<AtomicBool>,
) {
    debug!("Tick loop started");

    loop {
        let now = clock.now_millis();
        let today = clock.today();

        let step = store.update_if(|state| {
            if cancelled.load(Ordering::SeqCst) {
                return None;
            }
            advance(state, now, &today)
        });

        match step {
            Ok(Some(Tick::Anchored)) => continue,
            Ok(Some(Tick::Counting(remaining))) => {
                trace!("Countdown remaining: {}ms", remaining);
            }
            Ok(Some(Tick::Completed(banked))) => {
                info!("Countdown completed, banked {}s", banked);
                break;
            }
            Ok(None) => {
                debug!("Tick loop stopped");
                break;
            }
            Err(e) => {
                error!("Failed to persist countdown tick: {}", e);
                break;
            }
        }

        sleep(interval).await;
    }
}

/// Advance a running countdown to wall-clock time `now`.
///
/// Returns `None` when there is nothing to count, which ends the loop.
pub fn advance(state: &mut CountdownState, now: i64, today: &str) -> Option<Tick> {
    if !state.is_running || state.current_millis <= 0 {
        return None;
    }

    if state.start_time == 0 {
        // 0 means unanchored, so never store it as an anchor
        state.start_time = (now - state.paused_time).max(1);
        return Some(Tick::Anchored);
    }

    let total_millis = state.total_millis();
    let remaining = total_millis - (now - state.start_time);

    if remaining <= 0 {
        // Completion banks the full duration. This departs from the per-step
        // rule of banking total minus the last persisted remaining time, which
        // drops the final sub-tick slice and usually banks one second short.
        state.current_millis = 0;
        let banked = state.bank_session(today);
        state.is_running = false;
        state.start_time = 0;
        state.paused_time = 0;
        return Some(Tick::Completed(banked));
    }

    state.current_millis = remaining.min(total_millis);
    Some(Tick::Counting(state.current_millis))
}
