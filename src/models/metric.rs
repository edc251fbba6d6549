//! Reconciled metric models.
//!
//! This module contains the [`ReconciledMetric`] row written to the
//! destination table and the [`MetricKey`] that identifies it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Period;

/// Identity of a destination row: one per branch per month.
///
/// Ordering is by period first, then branch, which is also the order
/// metrics are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    /// The month the metric covers.
    pub period: Period,
    /// The branch the metric covers.
    pub branch_id: i32,
}

/// Salary per worked hour for one branch in one month.
///
/// # Example
///
/// ```
/// use salary_per_hour::models::{MetricKey, Period, ReconciledMetric};
/// use rust_decimal::Decimal;
///
/// let metric = ReconciledMetric {
///     year: 2024,
///     month: 1,
///     branch_id: 5,
///     salary_per_hour: Decimal::new(10000000, 4),
/// };
/// assert_eq!(
///     metric.key(),
///     MetricKey { period: Period::new(2024, 1), branch_id: 5 }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledMetric {
    /// The calendar year.
    pub year: i32,
    /// The month number, 1 through 12.
    pub month: u32,
    /// The branch identifier.
    pub branch_id: i32,
    /// Total salary over total worked hours, rounded to 4 decimal places.
    pub salary_per_hour: Decimal,
}

impl ReconciledMetric {
    /// Builds a metric row for a key.
    pub fn new(key: MetricKey, salary_per_hour: Decimal) -> Self {
        Self {
            year: key.period.year,
            month: key.period.month,
            branch_id: key.branch_id,
            salary_per_hour,
        }
    }

    /// Returns the period this metric covers.
    pub fn period(&self) -> Period {
        Period::new(self.year, self.month)
    }

    /// Returns the destination key of this metric.
    pub fn key(&self) -> MetricKey {
        MetricKey {
            period: self.period(),
            branch_id: self.branch_id,
        }
    }
}
