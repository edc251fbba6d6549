//! Transformation logic for the salary-per-hour pipeline.
//!
//! This module contains the attendance cleaner, the roster cleaner and the
//! reconciler that turns their outputs into branch-month salary per hour.
//! All functions here are pure: they never fail and perform no I/O.

mod attendance;
mod parse;
mod reconcile;
mod roster;

pub use attendance::{AttendanceCleaningResult, clean_timesheets};
pub use parse::{parse_calendar_date, parse_time_of_day};
pub use reconcile::{
    ReconciliationResult, ReconciliationWarning, SALARY_PER_HOUR_SCALE,
    UNREPRESENTABLE_WARNING, ZERO_HOURS_WARNING, reconcile,
};
pub use roster::{RosterCleaningResult, clean_employees};
