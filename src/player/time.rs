//! Duration and size display helpers.

/// Format seconds as `m:ss`, or `h:mm:ss` from one hour up.
///
/// Fractions are truncated, never rounded: `65.9` → `"1:05"`.
/// Negative and non-finite inputs display as `"0:00"`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Parse an exported duration (`"h:mm:ss"`, `"mm:ss"` or `"ss"`) into seconds.
///
/// Missing, empty or malformed values yield `0`.
pub fn parse_duration(text: Option<&str>) -> f64 {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return 0.0;
    };
    let parts: Option<Vec<f64>> = text
        .split(':')
        .map(|p| p.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect();
    match parts.as_deref() {
        Some([h, m, s]) => h * 3600.0 + m * 60.0 + s,
        Some([m, s]) => m * 60.0 + s,
        Some([s]) => *s,
        _ => 0.0,
    }
}

/// Size in megabytes with one decimal, from an exported byte count.
///
/// Leading digits are used (`"5000 bytes"` reads as 5000); text without
/// any yields `None`.
pub fn file_size_mb(size: &str) -> Option<String> {
    let trimmed = size.trim_start();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let bytes: u64 = trimmed[..digits_end].parse().ok()?;
    Some(format!("{:.1}", bytes as f64 / 1_048_576.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_under_a_minute() {
        assert_eq!(format_time(5.0), "0:05");
    }

    #[test]
    fn format_minutes_and_seconds() {
        assert_eq!(format_time(65.0), "1:05");
    }

    #[test]
    fn format_zero() {
        assert_eq!(format_time(0.0), "0:00");
    }

    #[test]
    fn format_hours() {
        assert_eq!(format_time(3661.0), "1:01:01");
    }

    #[test]
    fn format_truncates_fractions() {
        assert_eq!(format_time(65.9), "1:05");
    }

    #[test]
    fn format_degenerate_inputs() {
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }

    #[test]
    fn parse_missing_and_empty() {
        assert_eq!(parse_duration(None), 0.0);
        assert_eq!(parse_duration(Some("")), 0.0);
    }

    #[test]
    fn parse_hours_minutes_seconds() {
        assert_eq!(parse_duration(Some("1:30:00")), 5400.0);
    }

    #[test]
    fn parse_minutes_seconds() {
        assert_eq!(parse_duration(Some("45:30")), 2730.0);
    }

    #[test]
    fn parse_seconds_only() {
        assert_eq!(parse_duration(Some("90")), 90.0);
    }

    #[test]
    fn parse_malformed() {
        assert_eq!(parse_duration(Some("abc")), 0.0);
        assert_eq!(parse_duration(Some("1:xx")), 0.0);
        assert_eq!(parse_duration(Some("1:2:3:4")), 0.0);
    }

    #[test]
    fn size_in_megabytes() {
        assert_eq!(file_size_mb("52428800").as_deref(), Some("50.0"));
        assert_eq!(file_size_mb("1572864 bytes").as_deref(), Some("1.5"));
        assert_eq!(file_size_mb("unknown"), None);
        assert_eq!(file_size_mb(""), None);
    }
}
