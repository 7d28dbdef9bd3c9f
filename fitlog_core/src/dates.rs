//! Parsing of user-supplied text into dates, durations and limits.
//!
//! Dates without an offset are taken as UTC. A bare calendar date means
//! midnight UTC at the start of that day.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse a date or timestamp
///
/// Accepts RFC 3339, `YYYY-MM-DD`, and naive `YYYY-MM-DD[T ]HH:MM[:SS]`.
/// Returns `None` for anything else, including blank input.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Render a date the way results present it: `Thu Jan 05 2023`
pub fn display_date(date: &DateTime<Utc>) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Parse a duration as a floating-point number of minutes
///
/// Returns `None` for non-numeric or non-finite input.
pub fn parse_duration(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse a result limit
///
/// Non-negative integers are taken as-is; non-negative decimals are
/// truncated toward zero. Negative or non-numeric input yields `None`.
pub fn parse_limit(input: &str) -> Option<usize> {
    let input = input.trim();
    if let Ok(limit) = input.parse::<usize>() {
        return Some(limit);
    }

    let value = input.parse::<f64>().ok().filter(|v| v.is_finite())?;
    if value < 0.0 {
        return None;
    }
    // Saturates for values beyond usize::MAX
    Some(value.trunc() as usize)
}
