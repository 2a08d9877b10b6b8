//! Background tasks module
//!
//! Tasks that run alongside the HTTP server: the countdown tick loop and
//! the session watcher.

pub mod session_watch;
pub mod tick_loop;

// Re-export main functions
pub use session_watch::{session_watch_task, SessionPhase};
pub use tick_loop::{spawn_tick_loop, Tick, TickHandle};
