//! Employee roster models.
//!
//! This module defines the raw roster row and the cleaned employee record
//! the reconciler joins attendance against.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Period;

/// An employee row as it arrives from the roster source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEmployeeRecord {
    /// Identifier of the employee.
    pub employee_id: i64,
    /// The branch the employee belongs to.
    pub branch_id: i32,
    /// Raw join date text, if present.
    pub join_date: Option<String>,
    /// Raw resign date text, if present.
    pub resign_date: Option<String>,
    /// Monthly salary.
    pub salary: Decimal,
}

/// A roster entry with an unambiguous identity and parsed periods.
///
/// A `None` join or resign period means the source date was blank or
/// unparseable; no boundary exclusion applies for that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedEmployee {
    /// Identifier of the employee, unique within a cleaned set.
    pub employee_id: i64,
    /// The branch the employee belongs to.
    pub branch_id: i32,
    /// Month the employee joined.
    pub join_period: Option<Period>,
    /// Month the employee resigned.
    pub resign_period: Option<Period>,
    /// Monthly salary.
    pub salary: Decimal,
}

impl CleanedEmployee {
    /// Returns true if `period` is the employee's join or resign month.
    ///
    /// Those months are presumed partial and never count toward
    /// salary-per-hour.
    ///
    /// # Examples
    ///
    /// ```
    /// use salary_per_hour::models::{CleanedEmployee, Period};
    /// use rust_decimal::Decimal;
    ///
    /// let employee = CleanedEmployee {
    ///     employee_id: 1,
    ///     branch_id: 5,
    ///     join_period: Some(Period::new(2024, 1)),
    ///     resign_period: None,
    ///     salary: Decimal::new(8000, 0),
    /// };
    /// assert!(employee.is_boundary_period(Period::new(2024, 1)));
    /// assert!(!employee.is_boundary_period(Period::new(2024, 2)));
    /// ```
    pub fn is_boundary_period(&self, period: Period) -> bool {
        self.join_period == Some(period) || self.resign_period == Some(period)
    }
}
