use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses a leak-site timestamp into a UTC instant.
/// Naive timestamps are taken to be UTC already.
pub fn parse_timestamp(timestamp_str: &str) -> Option<DateTime<Utc>> {
    let s = timestamp_str.trim();
    if s.is_empty() {
        return None;
    }

    // ISO 8601 with explicit zone (e.g. "2024-03-01T10:30:00Z" or "...+02:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // API style, with or without microseconds (e.g. "2024-03-01 10:30:00.123456")
    for fmt in NAIVE_FORMATS {
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive_dt.and_utc());
        }
    }

    dateparser::parse_with_timezone(s, &Utc).ok()
}

/// Stable text form of an instant, used as part of the store's dedup key.
pub fn canonical_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Renders an offset as "UTC+3", "UTC-5", "UTC+0".
pub fn format_offset(offset: i32) -> String {
    format!("UTC{:+}", offset)
}

/// Horizontal bar scaled so that `max` fills `width` cells.
pub fn render_bar(count: u64, max: u64, width: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let cells = ((count as f64 / max as f64) * width as f64).round() as usize;
    "#".repeat(cells.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_parse_timestamp_empty() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
    }

    #[test]
    fn test_parse_timestamp_rfc3339_with_z() {
        let dt = parse_timestamp("2024-12-16T10:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 12, 16, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rfc3339_with_offset_is_normalised() {
        let dt = parse_timestamp("2024-12-16T10:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
    }

    #[test]
    fn test_parse_timestamp_api_format_with_micros() {
        let dt = parse_timestamp("2024-03-01 23:05:09.123456").unwrap();
        assert_eq!(dt.hour(), 23);
        assert_eq!(dt.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_parse_timestamp_api_format_without_micros() {
        let dt = parse_timestamp("2024-03-01 09:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_iso_without_zone() {
        let dt = parse_timestamp("2024-03-01T17:45:00").unwrap();
        assert_eq!(dt.hour(), 17);
    }

    #[test]
    fn test_parse_timestamp_unix_seconds_fallback() {
        let dt = parse_timestamp("1700000000").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap());
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert_eq!(parse_timestamp("not-a-timestamp"), None);
    }

    #[test]
    fn test_canonical_timestamp_is_stable_across_input_forms() {
        let a = parse_timestamp("2024-03-01 10:00:00").unwrap();
        let b = parse_timestamp("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(canonical_timestamp(&a), canonical_timestamp(&b));
        assert_eq!(canonical_timestamp(&a), "2024-03-01T10:00:00Z");
    }

    #[test]
    fn test_canonical_timestamp_round_trips() {
        let dt = parse_timestamp("2024-03-01 10:00:00.250").unwrap();
        assert_eq!(parse_timestamp(&canonical_timestamp(&dt)), Some(dt));
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(3), "UTC+3");
        assert_eq!(format_offset(-5), "UTC-5");
        assert_eq!(format_offset(0), "UTC+0");
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(0, 10, 20), "");
        assert_eq!(render_bar(10, 10, 20), "#".repeat(20));
        assert_eq!(render_bar(5, 10, 20), "#".repeat(10));
        assert_eq!(render_bar(1, 1000, 20), "#");
    }
}
