//! Parsing of time-of-day and calendar date strings crossing the API boundary.
//!
//! Times travel as `HH:MM` 24-hour strings and dates as ISO `YYYY-MM-DD`.
//! Parsing is strict: malformed input is an error. The lenient fallback used by
//! older clients is opt-in through [`TimeParsePolicy::Lenient`].

use crate::errors::{Error, Result};
use chrono::{NaiveDate, NaiveTime, Timelike};
use tracing::warn;

/// What to do with a time string that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeParsePolicy {
    /// Reject with [`Error::InvalidTimeFormat`]
    #[default]
    Strict,
    /// Substitute the given time and log a warning
    Lenient {
        /// Replacement for unparseable input
        fallback: NaiveTime,
    },
}

/// Parses a time of day.
///
/// Accepts `H:MM`, `HH:MM`, `HH:MM:SS`, and the French `9h30` / `9h` forms.
/// Seconds are dropped: the engine works at minute resolution.
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    let invalid = || Error::InvalidTimeFormat {
        value: value.to_string(),
    };
    let trimmed = value.trim();

    let (hours, rest) = trimmed
        .split_once(':')
        .or_else(|| trimmed.split_once(['h', 'H']))
        .ok_or_else(invalid)?;

    let minutes = match rest.split_once(':') {
        Some((minutes, seconds)) => {
            if seconds.len() != 2 || !seconds.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            minutes
        }
        None if rest.is_empty() && !trimmed.contains(':') => "00",
        None => rest,
    };

    let is_number = |s: &str, max_len: usize| {
        !s.is_empty() && s.len() <= max_len && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !is_number(hours, 2) || !is_number(minutes, 2) || minutes.len() != 2 {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

/// Parses a time according to `policy`.
pub fn normalize_time(value: &str, policy: TimeParsePolicy) -> Result<NaiveTime> {
    match (parse_time(value), policy) {
        (Ok(time), _) => Ok(time),
        (Err(_), TimeParsePolicy::Lenient { fallback }) => {
            warn!(
                "Unparseable time '{}', falling back to {}",
                value,
                format_time(fallback)
            );
            Ok(fallback)
        }
        (Err(e), TimeParsePolicy::Strict) => Err(e),
    }
}

/// Formats a time as `HH:MM`.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Minutes elapsed since midnight.
#[must_use]
pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_time_accepted_forms() {
        assert_eq!(parse_time("09:00").unwrap(), hm(9, 0));
        assert_eq!(parse_time("9:05").unwrap(), hm(9, 5));
        assert_eq!(parse_time("14:30:59").unwrap(), hm(14, 30));
        assert_eq!(parse_time(" 23:59 ").unwrap(), hm(23, 59));
        assert_eq!(parse_time("9h30").unwrap(), hm(9, 30));
        assert_eq!(parse_time("14h").unwrap(), hm(14, 0));
        assert_eq!(parse_time("00:00").unwrap(), hm(0, 0));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        for bad in [
            "", "9", "ab:cd", "24:00", "12:60", "12:5", "123:00", "12:00:6", "12:", "-1:00",
            "12:00pm",
        ] {
            let err = parse_time(bad).unwrap_err();
            assert!(
                matches!(err, Error::InvalidTimeFormat { .. }),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_format_time_pads() {
        assert_eq!(format_time(hm(9, 5)), "09:05");
        assert_eq!(format_time(parse_time("7h").unwrap()), "07:00");
    }

    #[test]
    fn test_normalize_strict_fails() {
        let result = normalize_time("noon", TimeParsePolicy::Strict);
        assert!(matches!(result, Err(Error::InvalidTimeFormat { .. })));
    }

    #[test]
    fn test_normalize_lenient_falls_back() {
        let policy = TimeParsePolicy::Lenient { fallback: hm(9, 0) };
        assert_eq!(normalize_time("noon", policy).unwrap(), hm(9, 0));
        assert_eq!(normalize_time("10:15", policy).unwrap(), hm(10, 15));
    }

    #[test]
    fn test_minutes_since_midnight() {
        assert_eq!(minutes_since_midnight(hm(0, 0)), 0);
        assert_eq!(minutes_since_midnight(hm(9, 30)), 570);
        assert_eq!(minutes_since_midnight(hm(23, 59)), 1439);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(matches!(
            parse_date("2023-02-29"),
            Err(Error::InvalidDate { .. })
        ));
        assert!(matches!(parse_date("01/02/2024"), Err(Error::InvalidDate { .. })));
        assert!(matches!(parse_date(""), Err(Error::InvalidDate { .. })));
    }
}
