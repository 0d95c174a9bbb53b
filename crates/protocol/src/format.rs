//! Human-readable formatting for sizes, rates, and ETAs.
//!
//! The size tiers intentionally mirror the web front end: whole bytes below
//! a kilobyte, rounded kilobytes below a megabyte, then one decimal place.

const KB: f64 = 1024.0;
const MB: f64 = 1024.0 * 1024.0;
const GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Formats a byte count for display.
pub fn format_bytes(bytes: u64) -> String {
    let value = bytes as f64;
    if value < KB {
        format!("{bytes} B")
    } else if value < MB {
        format!("{} KB", (value / KB).round() as u64)
    } else if value < GB {
        format!("{:.1} MB", value / MB)
    } else {
        format!("{:.1} GB", value / GB)
    }
}

/// Formats a transfer rate as megabytes per second.
pub fn format_rate(bytes_per_second: f64) -> String {
    format!("{:.1} MB/s", bytes_per_second / MB)
}

/// Formats an ETA as `m:ss`, or `h:mm:ss` past an hour.
///
/// `None` means the rate is not yet known and renders as `--:--`.
pub fn format_eta(eta_seconds: Option<f64>) -> String {
    let Some(seconds) = eta_seconds else {
        return "--:--".to_string();
    };
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
