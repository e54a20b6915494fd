//! Time normalization helpers
//!
//! Every upstream reports time differently: Codeforces and LeetCode send
//! epoch seconds, CodeChef sends ISO-8601 strings, and AtCoder encodes a
//! Japan Standard Time wall-clock reading in a link. These helpers reduce all
//! of them to UTC epoch seconds and whole minutes.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

use crate::utils::error::ParseError;

/// Offset of Japan Standard Time from UTC, in seconds
pub const JST_OFFSET_SECS: i32 = 9 * 60 * 60;

/// Convert a duration in seconds to whole minutes, rounding down
pub fn seconds_to_minutes(seconds: i64) -> i64 {
    seconds.div_euclid(60)
}

/// Parse a compact JST date-time into UTC epoch seconds
///
/// Accepts `YYYYMMDDTHHMM` (as found in AtCoder's time links) and the bare
/// twelve-digit form `YYYYMMDDHHMM`.
pub fn parse_compact_jst(raw: &str) -> Result<i64, ParseError> {
    let digits: String = raw.trim().chars().filter(|c| *c != 'T').collect();
    if digits.len() != 12 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidCompactDateTime(raw.to_string()));
    }

    let naive = NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M")
        .map_err(|_| ParseError::InvalidCompactDateTime(raw.to_string()))?;

    let jst = FixedOffset::east_opt(JST_OFFSET_SECS)
        .ok_or_else(|| ParseError::InvalidCompactDateTime(raw.to_string()))?;

    jst.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| ParseError::InvalidCompactDateTime(raw.to_string()))
}

/// Parse an `H:MM` or `HH:MM` duration into minutes
///
/// Hours may exceed two digits for long-running contests (`240:00`).
pub fn parse_hhmm_minutes(raw: &str) -> Result<i64, ParseError> {
    let invalid = || ParseError::InvalidDuration(raw.to_string());

    let (hours, minutes) = raw.trim().split_once(':').ok_or_else(invalid)?;
    if hours.is_empty() || minutes.len() != 2 {
        return Err(invalid());
    }

    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    if hours < 0 || !(0..60).contains(&minutes) {
        return Err(invalid());
    }

    hours
        .checked_mul(60)
        .and_then(|m| m.checked_add(minutes))
        .ok_or_else(invalid)
}

/// Parse an ISO-8601 date-time into UTC epoch seconds
///
/// Values without an offset are read as UTC.
pub fn parse_iso_to_epoch(raw: &str) -> Result<i64, ParseError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().timestamp())
        .ok_or_else(|| ParseError::InvalidIsoDateTime(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    #[test]
    fn test_compact_jst_is_nine_hours_ahead() {
        let expected = utc(2024, 1, 1, 3, 0);
        assert_eq!(parse_compact_jst("202401011200").unwrap(), expected);
        assert_eq!(parse_compact_jst("20240101T1200").unwrap(), expected);
    }

    #[test]
    fn test_compact_jst_crosses_midnight() {
        // 08:00 JST on Jan 1st is still Dec 31st in UTC
        assert_eq!(
            parse_compact_jst("20240101T0800").unwrap(),
            utc(2023, 12, 31, 23, 0)
        );
    }

    #[test]
    fn test_compact_jst_rejects_garbage() {
        assert!(parse_compact_jst("2024-01-01").is_err());
        assert!(parse_compact_jst("20241301T1200").is_err());
        assert!(parse_compact_jst("").is_err());
    }

    #[test]
    fn test_hhmm_minutes() {
        assert_eq!(parse_hhmm_minutes("02:30").unwrap(), 150);
        assert_eq!(parse_hhmm_minutes("1:40").unwrap(), 100);
        assert_eq!(parse_hhmm_minutes(" 240:00 ").unwrap(), 14400);
    }

    #[test]
    fn test_hhmm_rejects_bad_input() {
        assert!(parse_hhmm_minutes("90").is_err());
        assert!(parse_hhmm_minutes("1:5").is_err());
        assert!(parse_hhmm_minutes("1:75").is_err());
        assert!(parse_hhmm_minutes(":30").is_err());
    }

    #[test]
    fn test_hhmm_overflow_is_error() {
        assert_eq!(
            parse_hhmm_minutes("999999999999999999:00"),
            Err(ParseError::InvalidDuration(String::from("999999999999999999:00")))
        );
        assert!(parse_hhmm_minutes("99999999999999999999:00").is_err());
    }

    #[test]
    fn test_iso_with_offset() {
        assert_eq!(
            parse_iso_to_epoch("2024-01-03T20:00:00+05:30").unwrap(),
            utc(2024, 1, 3, 14, 30)
        );
        assert_eq!(
            parse_iso_to_epoch("2024-01-03T14:30:00Z").unwrap(),
            utc(2024, 1, 3, 14, 30)
        );
    }

    #[test]
    fn test_iso_without_offset_is_utc() {
        assert_eq!(
            parse_iso_to_epoch("2024-01-03T14:30:00").unwrap(),
            utc(2024, 1, 3, 14, 30)
        );
    }

    #[test]
    fn test_iso_rejects_garbage() {
        assert!(parse_iso_to_epoch("tomorrow").is_err());
    }

    #[test]
    fn test_seconds_to_minutes_floors() {
        assert_eq!(seconds_to_minutes(7200), 120);
        assert_eq!(seconds_to_minutes(7259), 120);
        assert_eq!(seconds_to_minutes(0), 0);
    }
}
