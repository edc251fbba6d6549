//! Reconciliation of cleaned attendance against the cleaned roster.
//!
//! This module joins worked hours to employees, drops join and resign months,
//! aggregates to branch-month and derives salary per hour. Salaries and hours
//! are summed separately before dividing; averaging per-employee ratios would
//! give a different number.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{CleanedAttendance, CleanedEmployee, MetricKey, ReconciledMetric};

/// Number of fractional digits kept in salary per hour.
pub const SALARY_PER_HOUR_SCALE: u32 = 4;

/// Warning code for a branch-month whose surviving hours sum to zero.
pub const ZERO_HOURS_WARNING: &str = "zero_hours";

/// Warning code for a branch-month whose sums or ratio do not fit in a decimal.
pub const UNREPRESENTABLE_WARNING: &str = "unrepresentable_ratio";

/// A branch-month that produced no metric.
///
/// The row is left out of the output instead of carrying an infinite or
/// undefined value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// The branch-month that was skipped.
    pub key: MetricKey,
    /// A human-readable description of the warning.
    pub message: String,
}

/// The result of reconciling attendance with the roster.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconciliationResult {
    /// One metric per branch-month, ordered by period then branch.
    pub metrics: Vec<ReconciledMetric>,
    /// Attendance rows with no matching employee.
    pub unmatched_rows: usize,
    /// Attendance rows dropped because they fell in a join or resign month.
    pub boundary_rows: usize,
    /// Branch-months skipped because no ratio could be computed.
    pub warnings: Vec<ReconciliationWarning>,
}

#[derive(Debug, Default)]
struct BranchTotals {
    salary: Decimal,
    hours: Decimal,
    overflowed: bool,
}

impl BranchTotals {
    fn add(&mut self, salary: Decimal, hours: Decimal) {
        match (self.salary.checked_add(salary), self.hours.checked_add(hours)) {
            (Some(salary), Some(hours)) => {
                self.salary = salary;
                self.hours = hours;
            }
            _ => self.overflowed = true,
        }
    }

    fn describe(&self) -> String {
        if self.overflowed {
            "salary or hour sum exceeds the decimal range".to_string()
        } else {
            format!(
                "salary {} over {} hours",
                self.salary.normalize(),
                self.hours.normalize()
            )
        }
    }
}

/// Reconciles cleaned attendance with cleaned employees into branch-month metrics.
///
/// Steps, in order:
/// 1. Inner join attendance to employees on `employee_id`
/// 2. Drop rows whose month is the employee's join or resign month
/// 3. Group by (year, month, branch) summing salary and hours independently
/// 4. Divide and round to [`SALARY_PER_HOUR_SCALE`] places, half to even
///
/// A group with zero hours, or whose sums or ratio overflow a decimal, is
/// reported as a [`ReconciliationWarning`] and produces no metric. The output is deterministic for a given input.
///
/// # Examples
///
/// ```
/// use salary_per_hour::calculation::reconcile;
/// use salary_per_hour::models::{CleanedAttendance, CleanedEmployee, Period};
/// use rust_decimal::Decimal;
///
/// let attendance = vec![CleanedAttendance {
///     employee_id: 1,
///     period: Period::new(2024, 1),
///     total_hours: Decimal::new(8, 0),
/// }];
/// let employees = vec![CleanedEmployee {
///     employee_id: 1,
///     branch_id: 5,
///     join_period: Some(Period::new(2023, 6)),
///     resign_period: None,
///     salary: Decimal::new(8000, 0),
/// }];
///
/// let result = reconcile(&attendance, &employees);
/// assert_eq!(result.metrics[0].salary_per_hour, Decimal::new(1000, 0));
/// ```
pub fn reconcile(
    attendance: &[CleanedAttendance],
    employees: &[CleanedEmployee],
) -> ReconciliationResult {
    let roster: HashMap<i64, &CleanedEmployee> = employees
        .iter()
        .map(|employee| (employee.employee_id, employee))
        .collect();

    let mut groups: BTreeMap<MetricKey, BranchTotals> = BTreeMap::new();
    let mut unmatched_rows = 0;
    let mut boundary_rows = 0;

    for row in attendance {
        let Some(employee) = roster.get(&row.employee_id) else {
            unmatched_rows += 1;
            continue;
        };

        if employee.is_boundary_period(row.period) {
            boundary_rows += 1;
            debug!(
                employee_id = row.employee_id,
                period = %row.period,
                "excluding join/resign month"
            );
            continue;
        }

        let totals = groups
            .entry(MetricKey {
                period: row.period,
                branch_id: employee.branch_id,
            })
            .or_default();
        totals.add(employee.salary, row.total_hours);
    }

    let mut metrics = Vec::with_capacity(groups.len());
    let mut warnings = Vec::new();

    for (key, totals) in groups {
        match salary_per_hour(&totals) {
            Ok(value) => metrics.push(ReconciledMetric::new(key, value)),
            Err(warning) => {
                let warning = ReconciliationWarning {
                    code: warning.to_string(),
                    key,
                    message: format!(
                        "branch {} in {} skipped: {}",
                        key.branch_id,
                        key.period,
                        totals.describe()
                    ),
                };
                warn!(code = %warning.code, "{}", warning.message);
                warnings.push(warning);
            }
        }
    }

    info!(
        input_rows = attendance.len(),
        output_rows = metrics.len(),
        unmatched_rows,
        boundary_rows,
        skipped_groups = warnings.len(),
        "attendance reconciled with roster"
    );

    ReconciliationResult {
        metrics,
        unmatched_rows,
        boundary_rows,
        warnings,
    }
}

fn salary_per_hour(totals: &BranchTotals) -> Result<Decimal, &'static str> {
    if totals.overflowed {
        return Err(UNREPRESENTABLE_WARNING);
    }
    if totals.hours.is_zero() {
        return Err(ZERO_HOURS_WARNING);
    }
    totals
        .salary
        .checked_div(totals.hours)
        .map(|ratio| ratio.round_dp(SALARY_PER_HOUR_SCALE))
        .ok_or(UNREPRESENTABLE_WARNING)
}
