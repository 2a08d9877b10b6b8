//! Persisted countdown record and its pure transitions

use serde::{Deserialize, Serialize};

/// Default countdown duration for a fresh install
pub const DEFAULT_TOTAL_SECONDS: i64 = 60;

/// Largest duration whose millisecond form still fits in an `i64`
pub const MAX_TOTAL_SECONDS: i64 = i64::MAX / 1000;

/// The single durable countdown record.
///
/// Timestamps are milliseconds since the Unix epoch; `start_time == 0`
/// means the current run has not been anchored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub total_seconds: i64,
    pub current_millis: i64,
    pub is_running: bool,
    pub start_time: i64,
    /// Elapsed millis banked at the last pause, used to re-anchor on resume
    pub paused_time: i64,
    pub today_completed_seconds: i64,
    pub last_date: String,
    pub last_clear_time: i64,
    pub today_time_offset: i64,
    /// Set when the environment, not the user, paused the run
    pub auto_paused: bool,
}

impl CountdownState {
    /// Create a state for a countdown of `total_seconds`, full and idle
    pub fn new(total_seconds: i64) -> Self {
        Self {
            total_seconds,
            current_millis: total_seconds * 1000,
            is_running: false,
            start_time: 0,
            paused_time: 0,
            today_completed_seconds: 0,
            last_date: String::new(),
            last_clear_time: 0,
            today_time_offset: 0,
            auto_paused: false,
        }
    }

    pub fn total_millis(&self) -> i64 {
        self.total_seconds * 1000
    }

    /// A session is active while running or holding banked pause time
    pub fn session_active(&self) -> bool {
        self.is_running || self.paused_time > 0
    }

    /// Whole seconds consumed in the current session
    pub fn session_elapsed_seconds(&self) -> i64 {
        (self.total_millis() - self.current_millis) / 1000
    }

    /// Elapsed seconds of the live session, or 0 when none is active
    pub fn live_session_elapsed_seconds(&self) -> i64 {
        if self.session_active() {
            self.session_elapsed_seconds()
        } else {
            0
        }
    }

    /// Today's total as shown to the user, net of the soft-clear offset
    pub fn today_display_seconds(&self) -> i64 {
        self.today_completed_seconds
            .saturating_add(self.live_session_elapsed_seconds())
            .saturating_sub(self.today_time_offset)
            .max(0)
    }

    /// Zero today's accumulator in memory when it belongs to another day.
    ///
    /// `last_date` is left untouched; it is rewritten by the next banking.
    /// The soft-clear offset is not reset here either.
    pub fn roll_over(&mut self, today: &str) -> bool {
        if self.last_date != today && self.today_completed_seconds != 0 {
            self.today_completed_seconds = 0;
            return true;
        }
        false
    }

    /// Bank `delta_seconds` into today's accumulator
    pub fn add_completed_time(&mut self, delta_seconds: i64, today: &str) {
        if self.last_date != today {
            self.today_completed_seconds = 0;
        }
        self.today_completed_seconds = self.today_completed_seconds.saturating_add(delta_seconds);
        self.last_date = today.to_string();
    }

    /// Bank the elapsed part of an active session, returning what was banked
    pub fn bank_session(&mut self, today: &str) -> i64 {
        if !self.session_active() {
            return 0;
        }
        let elapsed = self.session_elapsed_seconds();
        if elapsed > 0 {
            self.add_completed_time(elapsed, today);
            elapsed
        } else {
            0
        }
    }

    /// Stop the run and remember how much of it has elapsed
    pub fn pause(&mut self, automatic: bool) {
        self.is_running = false;
        self.paused_time = self.total_millis() - self.current_millis;
        self.start_time = 0;
        self.auto_paused = automatic;
    }

    /// Mark as running; the tick loop anchors `start_time` on its first pass
    pub fn start(&mut self) {
        self.is_running = true;
        self.start_time = 0;
        self.auto_paused = false;
    }

    /// Refill to `total_seconds` and drop any run in progress
    pub fn rewind(&mut self) {
        self.current_millis = self.total_millis();
        self.is_running = false;
        self.start_time = 0;
        self.paused_time = 0;
    }

    /// Soft clear: hide today's total without discarding the accumulator
    pub fn clear_today(&mut self, now_millis: i64, today: &str) {
        self.today_time_offset = self
            .today_completed_seconds
            .saturating_add(self.live_session_elapsed_seconds());
        self.last_clear_time = now_millis;
        self.last_date = today.to_string();
    }
}

impl Default for CountdownState {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_SECONDS)
    }
}
