//! Wall-clock access for the countdown engine

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::{DateTime, Local, Utc};

/// Source of wall-clock time and the current calendar day
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;

    /// Current calendar date as `YYYY-MM-DD`
    fn today(&self) -> String;
}

/// Clock backed by the operating system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }
}

/// Manually driven clock, shared between clones.
///
/// The calendar date is derived from the current millis in UTC so that
/// day rollover can be exercised deterministically.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    /// Start at midnight UTC of the given `YYYY-MM-DD` date plus an offset
    pub fn at_date(date: &str, offset_millis: i64) -> Option<Self> {
        let day = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let midnight = day.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis();
        Some(Self::new(midnight + offset_millis))
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }

    fn today(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.now_millis())
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}
