//! Human-readable sizes, speeds and durations for the status line.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats a byte count on a 1024-based ladder with one decimal.
///
/// Zero is special-cased to `"0 B"`.
pub fn format_bytes(bytes: u64) -> String {
    format_scaled(bytes as f64)
}

/// Formats a transfer rate, or an empty string when the rate is unknown.
pub fn format_speed(bytes_per_sec: Option<f64>) -> String {
    match bytes_per_sec {
        Some(speed) if speed > 0.0 => format!("{}/s", format_scaled(speed)),
        _ => String::new(),
    }
}

/// `MM:SS` below one hour, `H:MM:SS` above.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

fn format_scaled(value: f64) -> String {
    if value <= 0.0 {
        return "0 B".to_string();
    }

    let mut value = value;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} TB")
}
