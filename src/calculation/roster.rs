//! Roster cleaning.
//!
//! Resolves join and resign dates to months and drops every employee whose
//! identity is ambiguous.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::models::{CleanedEmployee, Period, RawEmployeeRecord};

use super::parse::parse_calendar_date;

/// The result of cleaning a roster extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterCleaningResult {
    /// Employees with a unique identifier, in input order.
    pub employees: Vec<CleanedEmployee>,
    /// Identifiers that occurred more than once and were dropped, ascending.
    pub duplicate_ids: Vec<i64>,
}

/// Cleans raw roster rows into employees with unambiguous identities.
///
/// Every row whose `employee_id` occurs more than once in the input is
/// removed, all occurrences included. Join and resign dates are reduced to
/// their month; a blank or unreadable date becomes `None`, which means no
/// boundary exclusion applies on that side (a missing resign date reads as
/// "still employed").
///
/// # Examples
///
/// ```
/// use salary_per_hour::calculation::clean_employees;
/// use salary_per_hour::models::{Period, RawEmployeeRecord};
/// use rust_decimal::Decimal;
///
/// let raw = RawEmployeeRecord {
///     employee_id: 1,
///     branch_id: 5,
///     join_date: Some("2023-06-01".to_string()),
///     resign_date: None,
///     salary: Decimal::new(8000, 0),
/// };
/// let result = clean_employees(&[raw.clone(), RawEmployeeRecord { employee_id: 2, ..raw }]);
/// assert_eq!(result.employees.len(), 2);
/// assert_eq!(result.employees[0].join_period, Some(Period::new(2023, 6)));
/// assert_eq!(result.employees[0].resign_period, None);
/// ```
pub fn clean_employees(records: &[RawEmployeeRecord]) -> RosterCleaningResult {
    let mut occurrences: HashMap<i64, usize> = HashMap::new();
    for record in records {
        *occurrences.entry(record.employee_id).or_default() += 1;
    }

    let mut duplicate_ids: Vec<i64> = occurrences
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(employee_id, _)| *employee_id)
        .collect();
    duplicate_ids.sort_unstable();

    let employees: Vec<CleanedEmployee> = records
        .iter()
        .filter(|record| occurrences.get(&record.employee_id) == Some(&1))
        .map(|record| CleanedEmployee {
            employee_id: record.employee_id,
            branch_id: record.branch_id,
            join_period: to_period(record.join_date.as_deref()),
            resign_period: to_period(record.resign_date.as_deref()),
            salary: record.salary,
        })
        .collect();

    if !duplicate_ids.is_empty() {
        warn!(
            count = duplicate_ids.len(),
            employee_ids = ?duplicate_ids,
            "dropping employees with duplicate identifiers"
        );
    }

    info!(
        input_rows = records.len(),
        output_rows = employees.len(),
        "employees cleaned"
    );

    RosterCleaningResult {
        employees,
        duplicate_ids,
    }
}

fn to_period(value: Option<&str>) -> Option<Period> {
    value.and_then(parse_calendar_date).map(Period::from_date)
}
