//! Tolerant parsing of the date and time-of-day cells found in the inputs.
//!
//! Every function returns `None` instead of an error: a value that cannot be
//! read is treated as missing and handled by the cleaning rules.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a time of day written as `HH:MM:SS` or `HH:MM`.
///
/// # Examples
///
/// ```
/// use salary_per_hour::calculation::parse_time_of_day;
/// use chrono::NaiveTime;
///
/// assert_eq!(parse_time_of_day("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
/// assert_eq!(parse_time_of_day("25:00:00"), None);
/// assert_eq!(parse_time_of_day(""), None);
/// ```
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

/// Parses a calendar date written as `YYYY-MM-DD`, ignoring a trailing time part.
///
/// # Examples
///
/// ```
/// use salary_per_hour::calculation::parse_calendar_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(parse_calendar_date("2024-01-10"), NaiveDate::from_ymd_opt(2024, 1, 10));
/// assert_eq!(
///     parse_calendar_date("2024-01-10 00:00:00"),
///     NaiveDate::from_ymd_opt(2024, 1, 10)
/// );
/// assert_eq!(parse_calendar_date("not a date"), None);
/// ```
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(|datetime| datetime.date())
    })
}
