//! Core data models for the salary-per-hour pipeline.
//!
//! This module contains the raw input rows, their cleaned forms and the
//! reconciled metric written to the destination table.

mod employee;
mod metric;
mod period;
mod timesheet;

pub use employee::{CleanedEmployee, RawEmployeeRecord};
pub use metric::{MetricKey, ReconciledMetric};
pub use period::Period;
pub use timesheet::{CleanedAttendance, RawTimesheetRecord};
