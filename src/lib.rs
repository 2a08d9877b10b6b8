//! Countdown Keeper - a persistent single-timer countdown service
//!
//! This library provides the countdown state engine: a persisted state
//! record with atomic updates and change notification, a wall-clock based
//! tick loop, pause/resume/reset/retarget transitions and a running total
//! of countdown time completed today.

pub mod api;
pub mod clock;
pub mod config;
pub mod engine;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use engine::CountdownEngine;
pub use state::{AppState, CountdownState, CountdownView, JsonFileStore, MemoryStore, StateStore};
pub use utils::signals::shutdown_signal;
