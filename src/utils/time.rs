//! Time formatting and conversion helpers

/// Format seconds as `HH:MM:SS`, or `MM:SS` under an hour
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let remaining_seconds = seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, remaining_seconds)
    } else {
        format!("{:02}:{:02}", minutes, remaining_seconds)
    }
}

/// Fraction of the countdown still remaining, 0 for an empty total
pub fn calculate_progress(current_millis: i64, total_millis: i64) -> f32 {
    if total_millis > 0 {
        current_millis as f32 / total_millis as f32
    } else {
        0.0
    }
}

/// `None` when the sum does not fit in an `i64`
pub fn to_total_seconds(hours: i64, minutes: i64, seconds: i64) -> Option<i64> {
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Split seconds into `(hours, minutes, seconds)`
pub fn from_total_seconds(total_seconds: i64) -> (i64, i64, i64) {
    (
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60,
    )
}
