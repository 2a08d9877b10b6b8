//! State management module
//!
//! The persisted countdown record, the store that owns it, and the
//! projections derived from it.

pub mod app_state;
pub mod countdown_state;
pub mod persistence;
pub mod store;
pub mod view_state;

// Re-export main types
pub use app_state::AppState;
pub use countdown_state::CountdownState;
pub use persistence::{JsonFileStore, KeyValueStore, MemoryStore, StoreError, Value};
pub use store::StateStore;
pub use view_state::CountdownView;
