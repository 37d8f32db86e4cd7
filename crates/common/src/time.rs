use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Journal timestamps are wall-clock local time, like the bot that writes them.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn to_storage(ts: &NaiveDateTime) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// Accepts the ISO-8601 variants found in journals: `T` or space separator,
/// optional fractional seconds, optional UTC offset (dropped), or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_isoformat_with_micros() {
        let ts = parse_timestamp("2025-01-02T10:11:12.123456").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-01-02 10:11:12");
    }

    #[test]
    fn parses_sqlite_current_timestamp() {
        assert_eq!(
            parse_timestamp("2025-01-02 10:11:12"),
            Some(ymd_hms(2025, 1, 2, 10, 11, 12))
        );
    }

    #[test]
    fn keeps_local_wall_clock_of_offset_timestamps() {
        assert_eq!(
            parse_timestamp("2025-01-02T10:11:12+09:00"),
            Some(ymd_hms(2025, 1, 2, 10, 11, 12))
        );
    }

    #[test]
    fn parses_bare_date_and_rejects_garbage() {
        assert_eq!(parse_timestamp("2025-01-02"), Some(ymd_hms(2025, 1, 2, 0, 0, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn storage_format_round_trips() {
        let ts = ymd_hms(2024, 12, 31, 23, 59, 59);
        assert_eq!(to_storage(&ts), "2024-12-31T23:59:59.000000");
        assert_eq!(parse_timestamp(&to_storage(&ts)), Some(ts));
    }
}
