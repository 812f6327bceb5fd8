//! Compact human-readable durations (`1y2d3h4m5s`).

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const YEAR: u64 = 365 * DAY;

/// Render a number of seconds as years, days, hours, minutes, and seconds.
///
/// Once a duration spans years, anything finer than days is dropped.
/// Negative or zero input renders as `0s`.
pub fn elapsed(seconds: f64) -> String {
    let mut rest = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };

    let years = rest / YEAR;
    rest %= YEAR;
    let days = rest / DAY;
    rest %= DAY;
    let hours = rest / HOUR;
    rest %= HOUR;
    let minutes = rest / MINUTE;
    let secs = rest % MINUTE;

    let mut out = String::new();
    if years > 0 {
        out.push_str(&format!("{}y", years));
    }
    if days > 0 {
        out.push_str(&format!("{}d", days));
    }
    if years > 0 {
        return out;
    }
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if secs > 0 || out.is_empty() {
        out.push_str(&format!("{}s", secs));
    }
    out
}
