//! Timesheet models.
//!
//! This module defines the raw attendance event read from the timesheet source
//! and the cleaned per employee-month aggregate produced from it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Period;

/// A single attendance event as it arrives from the timesheet source.
///
/// Date and times are kept as the raw text so that unparseable or blank values
/// can be judged by the attendance cleaner instead of failing ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTimesheetRecord {
    /// Identifier of the employee who punched in.
    pub employee_id: i64,
    /// The attendance date (expected `YYYY-MM-DD`).
    pub date: String,
    /// Check-in time of day, if recorded.
    pub checkin: Option<String>,
    /// Check-out time of day, if recorded.
    pub checkout: Option<String>,
}

impl RawTimesheetRecord {
    /// Convenience constructor for complete events.
    ///
    /// # Example
    ///
    /// ```
    /// use salary_per_hour::models::RawTimesheetRecord;
    ///
    /// let record = RawTimesheetRecord::new(1, "2024-01-10", "09:00:00", "17:00:00");
    /// assert_eq!(record.checkin.as_deref(), Some("09:00:00"));
    /// ```
    pub fn new(employee_id: i64, date: &str, checkin: &str, checkout: &str) -> Self {
        Self {
            employee_id,
            date: date.to_string(),
            checkin: Some(checkin.to_string()),
            checkout: Some(checkout.to_string()),
        }
    }
}

/// Total worked hours for one employee in one month.
///
/// Unique per (employee_id, period) within a cleaned set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedAttendance {
    /// The employee the hours belong to.
    pub employee_id: i64,
    /// The month the events fell in.
    pub period: Period,
    /// Sum of event durations in hours; never negative.
    pub total_hours: Decimal,
}
