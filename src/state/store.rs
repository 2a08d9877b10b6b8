//! Countdown state store: persistence, atomic updates and change notification

use std::sync::{Arc, Mutex, MutexGuard};

use futures::{stream, Stream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{
    countdown_state::{DEFAULT_TOTAL_SECONDS, MAX_TOTAL_SECONDS},
    persistence::{KeyValueStore, StoreError, Value},
    CountdownState,
};
use crate::clock::Clock;

const KEY_TOTAL_SECONDS: &str = "total_seconds";
const KEY_CURRENT_MILLIS: &str = "current_millis";
const KEY_IS_RUNNING: &str = "is_running";
const KEY_START_TIME: &str = "start_time";
const KEY_PAUSED_TIME: &str = "paused_time";
const KEY_TODAY_COMPLETED_SECONDS: &str = "today_completed_seconds";
const KEY_LAST_DATE: &str = "last_date";
const KEY_LAST_CLEAR_TIME: &str = "last_clear_time";
const KEY_TODAY_TIME_OFFSET: &str = "today_time_offset";
const KEY_AUTO_PAUSED: &str = "auto_paused";

struct Inner {
    backend: Box<dyn KeyValueStore>,
    state: CountdownState,
}

/// Owner of the single persisted `CountdownState`.
///
/// Every mutation goes through `update`/`update_if`, which hold one lock
/// across read, modify, persist and publish.
pub struct StateStore {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    state_tx: watch::Sender<CountdownState>,
}

impl StateStore {
    /// Build a store over `backend`, loading whatever it already holds
    pub fn new(backend: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let state = read_state(&*backend, &clock.today());
        info!(
            "Loaded countdown state: total={}s, current={}ms, running={}",
            state.total_seconds, state.current_millis, state.is_running
        );
        let (state_tx, _) = watch::channel(state.clone());

        Self {
            inner: Mutex::new(Inner { backend, state }),
            clock,
            state_tx,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    /// Read the persisted record, zeroing today's total if it is from another day.
    ///
    /// The rollover is an in-memory projection; it reaches the backend with
    /// the next save.
    pub fn load(&self) -> Result<CountdownState, StoreError> {
        let inner = self.lock()?;
        Ok(read_state(&*inner.backend, &self.clock.today()))
    }

    /// Latest published snapshot
    pub fn current(&self) -> CountdownState {
        self.state_tx.borrow().clone()
    }

    /// Persist every field, then publish to subscribers
    pub fn save(&self, state: CountdownState) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        self.commit(&mut inner, state)
    }

    fn commit(&self, inner: &mut Inner, state: CountdownState) -> Result<(), StoreError> {
        write_state(&mut *inner.backend, &state);
        inner.backend.commit()?;
        debug!(
            "Saved countdown state: total={}s, current={}ms, running={}",
            state.total_seconds, state.current_millis, state.is_running
        );
        inner.state = state.clone();
        self.state_tx.send_replace(state);
        Ok(())
    }

    /// Apply `updater` to the current state and save the result
    pub fn update<F>(&self, updater: F) -> Result<CountdownState, StoreError>
    where
        F: FnOnce(&mut CountdownState),
    {
        let mut inner = self.lock()?;
        let mut working = inner.state.clone();
        working.roll_over(&self.clock.today());
        updater(&mut working);
        self.commit(&mut inner, working.clone())?;
        Ok(working)
    }

    /// Conditional read-modify-write.
    ///
    /// The closure sees a working copy of the current state. Returning
    /// `Some` saves that copy and publishes it; `None` discards it.
    pub fn update_if<F, R>(&self, updater: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&mut CountdownState) -> Option<R>,
    {
        let mut inner = self.lock()?;
        let mut working = inner.state.clone();
        working.roll_over(&self.clock.today());

        match updater(&mut working) {
            Some(result) => {
                self.commit(&mut inner, working)?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    /// Receiver that always holds the latest state
    pub fn subscribe(&self) -> watch::Receiver<CountdownState> {
        self.state_tx.subscribe()
    }

    /// Stream that yields the current state, then every later one
    pub fn stream(&self) -> impl Stream<Item = CountdownState> + Send + 'static {
        let rx = self.subscribe();
        stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let state = rx.borrow_and_update().clone();
            Some((state, (rx, false)))
        })
    }
}

fn read_state(backend: &dyn KeyValueStore, today: &str) -> CountdownState {
    let mut total_seconds = backend.get_i64(KEY_TOTAL_SECONDS, DEFAULT_TOTAL_SECONDS);
    if !(1..=MAX_TOTAL_SECONDS).contains(&total_seconds) {
        warn!(
            "Stored total of {}s is out of range, using {}s",
            total_seconds, DEFAULT_TOTAL_SECONDS
        );
        total_seconds = DEFAULT_TOTAL_SECONDS;
    }
    let total_millis = total_seconds * 1000;

    let mut state = CountdownState {
        total_seconds,
        current_millis: backend
            .get_i64(KEY_CURRENT_MILLIS, total_millis)
            .clamp(0, total_millis),
        is_running: backend.get_bool(KEY_IS_RUNNING, false),
        start_time: backend.get_i64(KEY_START_TIME, 0),
        paused_time: backend.get_i64(KEY_PAUSED_TIME, 0).clamp(0, total_millis),
        today_completed_seconds: backend.get_i64(KEY_TODAY_COMPLETED_SECONDS, 0),
        last_date: backend.get_string(KEY_LAST_DATE, ""),
        last_clear_time: backend.get_i64(KEY_LAST_CLEAR_TIME, 0),
        today_time_offset: backend.get_i64(KEY_TODAY_TIME_OFFSET, 0),
        auto_paused: backend.get_bool(KEY_AUTO_PAUSED, false),
    };
    if state.roll_over(today) {
        info!("New day since {}, today's total starts at zero", state.last_date);
    }
    state
}

fn write_state(backend: &mut dyn KeyValueStore, state: &CountdownState) {
    backend.set(KEY_TOTAL_SECONDS, Value::Int(state.total_seconds));
    backend.set(KEY_CURRENT_MILLIS, Value::Int(state.current_millis));
    backend.set(KEY_IS_RUNNING, Value::Bool(state.is_running));
    backend.set(KEY_START_TIME, Value::Int(state.start_time));
    backend.set(KEY_PAUSED_TIME, Value::Int(state.paused_time));
    backend.set(KEY_TODAY_COMPLETED_SECONDS, Value::Int(state.today_completed_seconds));
    backend.set(KEY_LAST_DATE, Value::Text(state.last_date.clone()));
    backend.set(KEY_LAST_CLEAR_TIME, Value::Int(state.last_clear_time));
    backend.set(KEY_TODAY_TIME_OFFSET, Value::Int(state.today_time_offset));
    backend.set(KEY_AUTO_PAUSED, Value::Bool(state.auto_paused));
}
