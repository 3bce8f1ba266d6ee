//! Shared formatting utilities used by both CLI and TUI

use chrono::{Local, TimeZone};

/// Display format for job timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Truncate a string to a maximum length (in characters), adding "..." at the end if truncated.
///
/// This function is Unicode-safe and counts characters, not bytes.
///
/// # Examples
/// ```
/// use batchmon::formatting::truncate_string;
/// assert_eq!(truncate_string("hello", 10), "hello");
/// assert_eq!(truncate_string("hello world", 8), "hello...");
/// assert_eq!(truncate_string("ab", 2), "ab");
/// ```
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an epoch-milliseconds timestamp in local time as `YYYY-MM-DD HH:MM:SS`.
///
/// Out-of-range values render as `-`.
#[must_use]
pub fn format_epoch_millis(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

/// Format an optional epoch-milliseconds timestamp, `-` when absent
#[must_use]
pub fn format_optional_epoch_millis(millis: Option<i64>) -> String {
    millis.map_or_else(|| "-".to_string(), format_epoch_millis)
}

/// Format duration as HH:MM:SS or D-HH:MM:SS (timestamp style).
///
/// # Examples
/// ```
/// use batchmon::formatting::format_duration_hms;
/// assert_eq!(format_duration_hms(3661), "01:01:01");
/// assert_eq!(format_duration_hms(90061), "1-01:01:01");
/// ```
#[must_use]
pub fn format_duration_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours >= 24 {
        let days = hours / 24;
        let remaining_hours = hours % 24;
        format!("{}-{:02}:{:02}:{:02}", days, remaining_hours, minutes, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }
}

/// Format duration in verbose human-readable style (e.g., "2d 3h", "5h 30m").
///
/// Shows at most 2 time units for readability. Used in CLI displays.
///
/// # Examples
/// ```
/// use batchmon::formatting::format_duration_human;
/// assert_eq!(format_duration_human(0), "0s");
/// assert_eq!(format_duration_human(3660), "1h 1m");
/// ```
#[must_use]
pub fn format_duration_human(seconds: u64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }

    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        if hours > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{}d", days)
        }
    } else if hours > 0 {
        if minutes > 0 {
            format!("{}h {}m", hours, minutes)
        } else {
            format!("{}h", hours)
        }
    } else if minutes > 0 {
        if secs > 0 {
            format!("{}m {}s", minutes, secs)
        } else {
            format!("{}m", minutes)
        }
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 3), "abc");
        assert_eq!(truncate_string("abcd", 3), "abc");
        assert_eq!(truncate_string("abcdefgh", 6), "abc...");
    }

    #[test]
    fn test_truncate_string_unicode() {
        let long_chinese = "\u{4e2d}\u{6587}\u{6d4b}\u{8bd5}\u{5b57}\u{7b26}";
        assert_eq!(truncate_string(long_chinese, 5), "\u{4e2d}\u{6587}...");

        let emoji = "\u{1F600}\u{1F601}\u{1F602}";
        assert_eq!(truncate_string(emoji, 3), emoji);
    }

    #[test]
    fn test_format_epoch_millis_matches_local_time() {
        let millis = 1_700_000_000_123;
        let expected = Local
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap()
            .format(TIMESTAMP_FORMAT)
            .to_string();
        assert_eq!(format_epoch_millis(millis), expected);
        assert_eq!(format_epoch_millis(millis).len(), 19);
    }

    #[test]
    fn test_format_optional_epoch_millis() {
        assert_eq!(format_optional_epoch_millis(None), "-");
        assert_ne!(format_optional_epoch_millis(Some(0)), "-");
    }

    #[test]
    fn test_format_duration_hms() {
        assert_eq!(format_duration_hms(0), "00:00:00");
        assert_eq!(format_duration_hms(61), "00:01:01");
        assert_eq!(format_duration_hms(86400), "1-00:00:00");
    }

    #[test]
    fn test_format_duration_human() {
        assert_eq!(format_duration_human(45), "45s");
        assert_eq!(format_duration_human(65), "1m 5s");
        assert_eq!(format_duration_human(3600), "1h");
        assert_eq!(format_duration_human(90000), "1d 1h");
    }
}
