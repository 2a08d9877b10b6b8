//! Countdown engine: transition verbs and tick-loop ownership
//!
//! Every verb runs under the engine's ticker lock and cancels the running
//! tick loop before it mutates state, so at most one loop is ever alive and
//! a stale tick can never overwrite a newer transition. Verbs that may start
//! ticking must be called from inside a tokio runtime.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use futures::{Stream, StreamExt};
use tracing::{debug, info};

use crate::{
    clock::Clock,
    state::{
        countdown_state::MAX_TOTAL_SECONDS, CountdownState, CountdownView, StateStore, StoreError,
    },
    tasks::{spawn_tick_loop, TickHandle},
    utils::time::to_total_seconds,
};

/// Pause between tick loop passes
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Drives the single countdown held by a `StateStore`
pub struct CountdownEngine {
    store: Arc<StateStore>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    ticker: Mutex<Option<TickHandle>>,
}

impl CountdownEngine {
    pub fn new(store: Arc<StateStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            tick_interval: DEFAULT_TICK_INTERVAL,
            ticker: Mutex::new(None),
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn state(&self) -> CountdownState {
        self.store.current()
    }

    pub fn view(&self) -> CountdownView {
        CountdownView::from(&self.store.current())
    }

    /// Stream of display projections, starting with the current one
    pub fn view_stream(&self) -> impl Stream<Item = CountdownView> + Send + 'static {
        self.store
            .stream()
            .map(|state| CountdownView::from(&state))
    }

    /// Whether a tick loop is currently alive
    pub fn is_ticking(&self) -> bool {
        self.ticker()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn ticker(&self) -> MutexGuard<'_, Option<TickHandle>> {
        self.ticker.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn cancel_ticking(ticker: &mut Option<TickHandle>) {
        if let Some(handle) = ticker.take() {
            handle.cancel();
            debug!("Cancelled tick loop");
        }
    }

    fn launch_ticking(&self, ticker: &mut Option<TickHandle>) {
        *ticker = Some(spawn_tick_loop(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.tick_interval,
        ));
    }

    /// Resume ticking for a countdown that was running when the process stopped.
    ///
    /// Returns whether a tick loop was launched.
    pub fn restore(&self) -> bool {
        let mut ticker = self.ticker();
        if ticker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let state = self.store.current();
        if state.is_running && state.current_millis > 0 {
            info!(
                "Restoring running countdown with {}ms left at last save",
                state.current_millis
            );
            self.launch_ticking(&mut ticker);
            return true;
        }
        false
    }

    /// Start a paused or idle countdown, or pause a running one
    pub fn toggle_countdown(&self) -> Result<CountdownState, StoreError> {
        let mut ticker = self.ticker();
        Self::cancel_ticking(&mut ticker);

        let started = self.store.update_if(|state| {
            if state.current_millis <= 0 {
                return None;
            }
            if state.is_running {
                state.pause(false);
                Some(false)
            } else {
                state.start();
                Some(true)
            }
        })?;

        match started {
            Some(true) => {
                info!("Countdown started");
                self.launch_ticking(&mut ticker);
            }
            Some(false) => info!("Countdown paused"),
            None => debug!("Toggle ignored, no time left"),
        }

        Ok(self.store.current())
    }

    /// Bank the elapsed part of the session and refill to the full duration
    pub fn reset_countdown(&self) -> Result<CountdownState, StoreError> {
        let mut ticker = self.ticker();
        Self::cancel_ticking(&mut ticker);

        let today = self.clock.today();
        let mut banked = 0;
        let state = self.store.update(|state| {
            banked = state.bank_session(&today);
            state.rewind();
        })?;

        info!("Countdown reset, banked {}s", banked);
        Ok(state)
    }

    /// Retarget to `hours:minutes:seconds`
    pub fn set_new_total_time(
        &self,
        hours: i64,
        minutes: i64,
        seconds: i64,
    ) -> Result<CountdownState, StoreError> {
        match to_total_seconds(hours, minutes, seconds) {
            Some(total_seconds) => self.set_new_total_seconds(total_seconds),
            None => {
                debug!("Ignoring out-of-range duration {}h {}m {}s", hours, minutes, seconds);
                Ok(self.store.current())
            }
        }
    }

    /// Retarget to a new duration, banking the elapsed part of any session.
    ///
    /// Non-positive durations and ones too long to count in millis are ignored.
    pub fn set_new_total_seconds(&self, total_seconds: i64) -> Result<CountdownState, StoreError> {
        if !(1..=MAX_TOTAL_SECONDS).contains(&total_seconds) {
            debug!("Ignoring out-of-range duration {}s", total_seconds);
            return Ok(self.store.current());
        }

        let mut ticker = self.ticker();
        Self::cancel_ticking(&mut ticker);

        let today = self.clock.today();
        let mut banked = 0;
        let state = self.store.update(|state| {
            banked = state.bank_session(&today);
            state.total_seconds = total_seconds;
            state.rewind();
        })?;

        info!("Countdown set to {}s, banked {}s", total_seconds, banked);
        Ok(state)
    }

    /// Make the remaining time the new full duration of a running countdown.
    ///
    /// Nothing is banked; the tick loop keeps running and re-anchors.
    pub fn set_current_as_max(&self) -> Result<CountdownState, StoreError> {
        let _ticker = self.ticker();

        let rebased = self.store.update_if(|state| {
            if !state.is_running || state.current_millis <= 0 {
                return None;
            }
            let new_total = state.current_millis / 1000;
            if new_total < 1 {
                return None;
            }
            state.total_seconds = new_total;
            state.current_millis = new_total * 1000;
            state.start_time = 0;
            state.paused_time = 0;
            Some(new_total)
        })?;

        match rebased {
            Some(total) => info!("Remaining time is the new maximum: {}s", total),
            None => debug!("Set-current-as-max ignored, countdown not running"),
        }

        Ok(self.store.current())
    }

    /// Pause on behalf of the environment, flagging the pause as automatic
    pub fn auto_pause(&self) -> Result<CountdownState, StoreError> {
        let mut ticker = self.ticker();
        Self::cancel_ticking(&mut ticker);

        let paused = self.store.update_if(|state| {
            if !state.is_running {
                return None;
            }
            state.pause(true);
            Some(())
        })?;

        if paused.is_some() {
            info!("Countdown auto-paused");
        }
        Ok(self.store.current())
    }

    /// The host is going to the background
    pub fn on_background(&self) -> Result<CountdownState, StoreError> {
        self.save_current_state()?;
        self.auto_pause()
    }

    /// The host is back in the foreground.
    ///
    /// Nothing resumes by itself; the return value tells the caller whether
    /// the last pause was automatic.
    pub fn on_foreground(&self) -> bool {
        let auto_paused = self.store.current().auto_paused;
        info!("Back in foreground (auto-paused: {})", auto_paused);
        auto_paused
    }

    /// Write the wall-clock remaining time of a running countdown to storage
    pub fn save_current_state(&self) -> Result<CountdownState, StoreError> {
        let now = self.clock.now_millis();

        let saved = self.store.update_if(|state| {
            if !state.is_running || state.start_time <= 0 {
                return None;
            }
            let total_millis = state.total_millis();
            let remaining = total_millis - (now - state.start_time);
            if remaining <= 0 {
                return None;
            }
            state.current_millis = remaining.min(total_millis);
            Some(state.current_millis)
        })?;

        if let Some(remaining) = saved {
            debug!("Saved running countdown with {}ms left", remaining);
        }
        Ok(self.store.current())
    }

    /// Add `delta_seconds` to today's completed total
    pub fn add_completed_time(&self, delta_seconds: i64) -> Result<CountdownState, StoreError> {
        if delta_seconds <= 0 {
            return Ok(self.store.current());
        }

        let today = self.clock.today();
        let state = self
            .store
            .update(|state| state.add_completed_time(delta_seconds, &today))?;

        debug!("Added {}s to today's total", delta_seconds);
        Ok(state)
    }

    /// Soft clear: today's displayed total reads zero, the accumulator is kept
    pub fn clear_today_completed_time(&self) -> Result<CountdownState, StoreError> {
        let now = self.clock.now_millis();
        let today = self.clock.today();
        let state = self.store.update(|state| state.clear_today(now, &today))?;

        info!(
            "Cleared today's total (offset {}s)",
            state.today_time_offset
        );
        Ok(state)
    }

    /// Stop ticking without touching the stored state
    pub fn shutdown(&self) {
        let mut ticker = self.ticker();
        Self::cancel_ticking(&mut ticker);
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        let ticker = self.ticker.get_mut().unwrap_or_else(|e| e.into_inner());
        Self::cancel_ticking(ticker);
    }
}
