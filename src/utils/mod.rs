//! Utility functions module
//!
//! Signal handling and time formatting helpers.

pub mod signals;
pub mod time;

// Re-export main functions
pub use signals::{lifecycle_signal_task, shutdown_signal};
pub use time::{calculate_progress, format_time, from_total_seconds, to_total_seconds};
