//! Display-facing projection of the countdown state

use serde::{Deserialize, Serialize};

use super::CountdownState;
use crate::utils::time::{calculate_progress, format_time};

/// What a presentation layer needs to draw the countdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownView {
    pub total_seconds: i64,
    pub current_seconds: i64,
    pub current_millis: i64,
    pub is_running: bool,
    pub progress: f32,
    pub formatted_time: String,
    pub today_total_seconds: i64,
    pub formatted_today_total: String,
    /// The duration picker is offered unless a session is running or paused
    pub show_time_picker: bool,
    pub was_auto_paused: bool,
}

impl From<&CountdownState> for CountdownView {
    fn from(state: &CountdownState) -> Self {
        let current_seconds = state.current_millis / 1000;
        let today_total_seconds = state.today_display_seconds();

        Self {
            total_seconds: state.total_seconds,
            current_seconds,
            current_millis: state.current_millis,
            is_running: state.is_running,
            progress: calculate_progress(state.current_millis, state.total_millis()),
            formatted_time: format_time(current_seconds),
            today_total_seconds,
            formatted_today_total: format_time(today_total_seconds),
            show_time_picker: !state.session_active(),
            was_auto_paused: state.auto_paused,
        }
    }
}
