//! Relative-time and duration formatting for display.

use crate::models::ProcData;

/// Shown when the last processing time cannot be determined.
pub const UNKNOWN: &str = "unknown";

const SECOND_MS: i64 = 1_000;
const DAYS_PER_MONTH: f64 = 30.44;
const DAYS_PER_YEAR: f64 = 365.25;

/// Relative time between two epoch-millisecond instants, e.g. `3h ago`.
///
/// Instants in the future read as `0s ago`.
pub fn time_ago(then_ms: i64, now_ms: i64) -> String {
    let seconds = now_ms.saturating_sub(then_ms).max(0) / SECOND_MS;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let weeks = days / 7;

    if seconds < 60 {
        return format!("{}s ago", seconds);
    }
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    if days < 7 {
        return format!("{}d ago", days);
    }
    if weeks < 5 {
        return format!("{}w ago", weeks);
    }

    let months = (days as f64 / DAYS_PER_MONTH).floor() as i64;
    if months < 12 {
        return format!("{}mo ago", months);
    }
    let years = (days as f64 / DAYS_PER_YEAR).floor() as i64;
    format!("{}y ago", years)
}

/// Game length as `m:ss`, rounded to the nearest second.
pub fn format_duration(length_ms: i64) -> String {
    let total_seconds = (length_ms.max(0) as f64 / SECOND_MS as f64).round() as i64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// "Last updated" label from the processing metadata, or `unknown`.
pub fn last_updated(proc_data: Option<&ProcData>, now_ms: i64) -> String {
    match proc_data {
        Some(data) => time_ago(data.last_process_ms(), now_ms),
        None => UNKNOWN.to_string(),
    }
}
