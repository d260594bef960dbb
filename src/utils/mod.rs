//! Common utilities and helpers

pub mod logging;
pub mod path;
pub mod time;

/// Format a byte count with binary units, e.g. `1.5 MB`
pub fn format_bytes(bytes: u64) -> String {
    format_scaled(bytes, 1024, "KMGTPE", "B")
}

/// Format a bit rate with decimal units, e.g. `192.0 kbps`
pub fn format_bitrate(bits_per_second: u64) -> String {
    format_scaled(bits_per_second, 1000, "kMGTPE", "bps")
}

fn format_scaled(value: u64, unit: u64, prefixes: &str, suffix: &str) -> String {
    if value < unit {
        return format!("{} {}", value, suffix);
    }

    let mut divisor = unit;
    let mut exponent = 0;
    let mut remaining = value / unit;
    while remaining >= unit && exponent + 1 < prefixes.len() {
        divisor *= unit;
        exponent += 1;
        remaining /= unit;
    }

    let prefix = prefixes.chars().nth(exponent).unwrap_or('?');
    format!("{:.1} {}{}", value as f64 / divisor as f64, prefix, suffix)
}

/// Descriptive name for an audio channel count
pub fn channel_layout(channels: u32) -> String {
    match channels {
        1 => "Mono".to_string(),
        2 => "Stereo".to_string(),
        3 => "2.1".to_string(),
        4 => "4.0 (Quad)".to_string(),
        5 => "5.0".to_string(),
        6 => "5.1 Surround".to_string(),
        7 => "6.1 Surround".to_string(),
        8 => "7.1 Surround".to_string(),
        n => format!("{} channels", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_bitrate() {
        assert_eq!(format_bitrate(999), "999 bps");
        assert_eq!(format_bitrate(192_000), "192.0 kbps");
        assert_eq!(format_bitrate(4_500_000), "4.5 Mbps");
    }

    #[test]
    fn test_channel_layout() {
        assert_eq!(channel_layout(2), "Stereo");
        assert_eq!(channel_layout(6), "5.1 Surround");
        assert_eq!(channel_layout(12), "12 channels");
    }
}
