//! The serializable summary of a pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::ReconciliationWarning;
use crate::config::UpsertStrategy;
use crate::models::ReconciledMetric;
use crate::storage::LoadSummary;

/// What happened to the destination table in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Metrics were written.
    Written(LoadSummary),
    /// Reconciliation produced no metrics and the policy was to skip.
    SkippedEmpty,
    /// No store was given; nothing was written.
    DryRun,
}

/// Row counts for each stage of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    /// Raw timesheet events read.
    pub timesheet_rows: usize,
    /// Timesheet rows dropped at ingestion because the identifier was unreadable.
    #[serde(default)]
    pub unreadable_timesheet_rows: usize,
    /// Events with a missing or inverted checkin/checkout.
    pub invalid_timesheet_rows: usize,
    /// Employee-months voided by invalid events.
    pub voided_employee_months: usize,
    /// Events whose date could not be read.
    pub undated_timesheet_rows: usize,
    /// Employee-months with worked hours after cleaning.
    pub attendance_rows: usize,
    /// Raw roster rows read.
    pub employee_rows: usize,
    /// Roster rows dropped at ingestion because an identifier, branch or
    /// salary was unreadable.
    #[serde(default)]
    pub unreadable_employee_rows: usize,
    /// Employees kept after removing duplicate identifiers.
    pub roster_rows: usize,
    /// Attendance rows with no matching employee.
    pub unmatched_attendance_rows: usize,
    /// Attendance rows in a join or resign month.
    pub boundary_rows: usize,
    /// Branch-month metrics produced.
    pub metric_rows: usize,
}

/// The complete record of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Unique identifier of the run, also attached to its log span.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// The strategy configured for the load.
    pub strategy: UpsertStrategy,
    /// Per-stage counts.
    pub counts: StageCounts,
    /// Employee identifiers dropped as duplicates.
    pub duplicate_employee_ids: Vec<i64>,
    /// Branch-months skipped during reconciliation.
    pub warnings: Vec<ReconciliationWarning>,
    /// The computed metrics, ordered by year, month and branch.
    pub metrics: Vec<ReconciledMetric>,
    /// What was done to the destination.
    pub load: LoadOutcome,
}
