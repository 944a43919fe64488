//! Small helpers for timestamps, logging and markup.
//!
//! - Lenient timestamp parsing shared by every source
//! - String truncation for log previews
//! - HTML stripping for feed summaries

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::Html;

/// Offset-carrying layouts tried after RFC 3339 and RFC 2822.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%a, %d %b %Y %H:%M:%S %z",
];

/// Layouts without an offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a provider timestamp leniently.
///
/// Accepts RFC 3339 (`2024-03-01T10:00:00Z`), RFC 2822 (`Fri, 01 Mar 2024
/// 10:00:00 GMT`), a few common offset/naive layouts, and bare dates
/// (`2024-03-01`, midnight UTC). Returns `None` when nothing matches; callers
/// decide the fallback.
///
/// # Examples
///
/// ```ignore
/// assert!(parse_timestamp("2024-01-01").is_some());
/// assert!(parse_timestamp("not a date").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Visible text of an HTML fragment with whitespace normalized.
///
/// Tags are removed and character references decoded, so
/// `<p>AT&amp;T &#8212; up</p>` becomes `AT&T — up`. A bare `<` that does
/// not open a tag stays as text.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_and_offsets() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:00:00+0000"), Some(expected));
    }

    #[test]
    fn test_parse_rfc2822() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(
            parse_timestamp("Fri, 01 Mar 2024 10:00:00 GMT"),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp("Fri, 01 Mar 2024 10:00:00 +0000"),
            Some(expected)
        );
    }

    #[test]
    fn test_parse_naive_and_date_only() {
        assert_eq!(
            parse_timestamp("2024-03-01 10:00:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2024-03-01T10:00:00.250"),
            Some(
                Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
                    + chrono::Duration::milliseconds(250)
            )
        );
        assert_eq!(
            parse_timestamp(" 2024-02-01 "),
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("last tuesday"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let s = "ééééé";
        let result = truncate_for_log(s, 3);
        assert!(result.starts_with('é'));
        assert!(result.contains("…(+8 bytes)"));
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Markets <b>rally</b>\n after  vote</p>"),
            "Markets rally after vote"
        );
        assert_eq!(strip_html("plain"), "plain");
    }

    #[test]
    fn test_strip_html_decodes_entities() {
        assert_eq!(
            strip_html("<p>AT&amp;T shares rise &#8212; analysts&#8217; view</p>"),
            "AT&T shares rise \u{2014} analysts\u{2019} view"
        );
    }

    #[test]
    fn test_strip_html_keeps_text_after_bare_less_than() {
        assert_eq!(
            strip_html("Rates < 5% expected by markets this year"),
            "Rates < 5% expected by markets this year"
        );
    }
}
