//! Attendance cleaning.
//!
//! Turns raw timesheet events into total worked hours per employee-month.
//! A single invalid punch voids the whole employee-month: its hours are
//! never partially counted.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::{CleanedAttendance, Period, RawTimesheetRecord};

use super::parse::{parse_calendar_date, parse_time_of_day};

const SECONDS_PER_HOUR: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);

/// The result of cleaning a timesheet extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceCleaningResult {
    /// One row per surviving (employee, month), ordered by employee then month.
    pub attendance: Vec<CleanedAttendance>,
    /// Events with a missing checkin, a missing checkout or checkin after checkout.
    pub invalid_records: usize,
    /// Distinct (employee, month) keys voided by at least one invalid event.
    pub voided_keys: usize,
    /// Events whose date could not be read; they belong to no month.
    pub undated_records: usize,
}

/// Cleans raw timesheet events into per employee-month worked hours.
///
/// Steps, in order:
/// 1. Parse checkin and checkout; unreadable values count as missing
/// 2. Derive the month from the event date
/// 3. Mark the event invalid if a time is missing or checkin is after checkout
/// 4. Void every (employee, month) that holds an invalid event
/// 5. Sum the remaining durations per (employee, month)
///
/// Events with an unreadable date cannot be attributed to a month and are
/// dropped on their own without voiding anything else.
///
/// # Examples
///
/// ```
/// use salary_per_hour::calculation::clean_timesheets;
/// use salary_per_hour::models::{Period, RawTimesheetRecord};
/// use rust_decimal::Decimal;
///
/// let result = clean_timesheets(&[
///     RawTimesheetRecord::new(1, "2024-01-10", "09:00:00", "17:00:00"),
///     RawTimesheetRecord::new(1, "2024-01-11", "09:00:00", "12:30:00"),
/// ]);
/// assert_eq!(result.attendance.len(), 1);
/// assert_eq!(result.attendance[0].period, Period::new(2024, 1));
/// assert_eq!(result.attendance[0].total_hours, Decimal::new(115, 1));
/// ```
pub fn clean_timesheets(records: &[RawTimesheetRecord]) -> AttendanceCleaningResult {
    let mut totals: BTreeMap<(i64, Period), Decimal> = BTreeMap::new();
    let mut voided: BTreeSet<(i64, Period)> = BTreeSet::new();
    let mut invalid_records = 0;
    let mut undated_records = 0;

    for record in records {
        let Some(period) = parse_calendar_date(&record.date).map(Period::from_date) else {
            undated_records += 1;
            debug!(
                employee_id = record.employee_id,
                date = %record.date,
                "timesheet event has no readable date"
            );
            continue;
        };

        match event_hours(record) {
            Some(hours) => {
                *totals.entry((record.employee_id, period)).or_default() += hours;
            }
            None => {
                invalid_records += 1;
                voided.insert((record.employee_id, period));
            }
        }
    }

    for (employee_id, period) in &voided {
        if totals.remove(&(*employee_id, *period)).is_some() {
            debug!(
                employee_id,
                period = %period,
                "employee-month voided by invalid timesheet event"
            );
        }
    }

    let attendance: Vec<CleanedAttendance> = totals
        .into_iter()
        .map(|((employee_id, period), total_hours)| CleanedAttendance {
            employee_id,
            period,
            total_hours,
        })
        .collect();

    info!(
        input_rows = records.len(),
        output_rows = attendance.len(),
        invalid_records,
        voided_keys = voided.len(),
        undated_records,
        "timesheets cleaned"
    );

    AttendanceCleaningResult {
        attendance,
        invalid_records,
        voided_keys: voided.len(),
        undated_records,
    }
}

/// Returns the worked hours of a valid event, or `None` if the event is invalid.
fn event_hours(record: &RawTimesheetRecord) -> Option<Decimal> {
    let checkin = record.checkin.as_deref().and_then(parse_time_of_day)?;
    let checkout = record.checkout.as_deref().and_then(parse_time_of_day)?;
    if checkin > checkout {
        return None;
    }
    let seconds = (checkout - checkin).num_seconds();
    Some(Decimal::from(seconds) / SECONDS_PER_HOUR)
}
