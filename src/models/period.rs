//! Calendar period model.
//!
//! A [`Period`] is a (year, month) pair used to bucket attendance and to
//! compare it against an employee's join and resign months. It is a structured,
//! totally ordered value so that comparisons never depend on how the parts
//! would look when concatenated as text.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month identified by its year and month number (1-12).
///
/// Ordering is chronological: by year first, then by month.
///
/// # Example
///
/// ```
/// use salary_per_hour::models::Period;
/// use chrono::NaiveDate;
///
/// let jan = Period::from_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
/// let nov = Period::new(2023, 11);
/// assert!(nov < jan);
/// assert_eq!(jan.to_string(), "2024-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    /// The calendar year.
    pub year: i32,
    /// The month number, 1 through 12.
    pub month: u32,
}

impl Period {
    /// Creates a period from its parts.
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Returns the period a date falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
