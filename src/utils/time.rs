//! Time parsing and formatting utilities

use std::time::Duration;

/// Convert `HH`, `MM`, `SS`, `cc` clock components into a duration.
///
/// Returns `None` when the components do not fit in a `Duration`.
pub fn clock_to_duration(
    hours: u64,
    minutes: u64,
    seconds: u64,
    centiseconds: u64,
) -> Option<Duration> {
    let whole = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    Duration::from_secs(whole).checked_add(Duration::from_millis(centiseconds.checked_mul(10)?))
}

/// Parse a fractional-seconds string such as `"12.345000"`.
///
/// Parsed digit by digit so the value is exact to the nanosecond. Returns
/// `None` for anything that is not a plain non-negative decimal.
pub fn parse_fractional_seconds(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }

    let seconds: u64 = whole.parse().ok()?;
    let nanos = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0u32, |acc, digit| acc * 10 + u32::from(digit - b'0'));

    Some(Duration::new(seconds, nanos))
}

/// Format a remaining-time estimate compactly: `42s`, `3m7s`, `1h5m`
pub fn format_eta(duration: Duration) -> String {
    let total = duration.as_secs();
    if total < 60 {
        format!("{}s", total)
    } else if total < 3600 {
        format!("{}m{}s", total / 60, total % 60)
    } else {
        format!("{}h{}m", total / 3600, (total % 3600) / 60)
    }
}

/// Format a duration as `HH:MM:SS`
pub fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
