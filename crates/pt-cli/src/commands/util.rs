//! Shared formatting for CLI commands.

use chrono::Duration;

/// Formats a playback duration, read as seconds.
///
/// Returns "Xh Ym Zs", "Ym Zs" or "Zs". Negative durations render as "0s";
/// values beyond what a [`Duration`] can hold render as raw seconds.
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "0s".to_string();
    }
    let Some(duration) = Duration::try_seconds(seconds) else {
        return format!("{seconds}s");
    };
    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;
    let secs = duration.num_seconds() % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes >= 1 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Generates a 10-character bar of `value` relative to `max`.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max <= 0 || value <= 0 {
        return "░".repeat(10);
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}
