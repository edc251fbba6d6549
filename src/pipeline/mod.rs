//! Orchestration of a complete pipeline run.
//!
//! [`Pipeline`] chains the cleaners, the reconciler and the upserter. Any
//! stage failure fails the run and nothing downstream of it is executed.

mod report;

use chrono::Utc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::calculation::{
    AttendanceCleaningResult, ReconciliationResult, RosterCleaningResult, clean_employees,
    clean_timesheets, reconcile,
};
use crate::config::{EmptyResultPolicy, PipelineConfig, UpsertStrategy};
use crate::error::{PipelineError, PipelineResult};
use crate::input::{EMPLOYEES_SOURCE, InputRows, TIMESHEETS_SOURCE};
use crate::models::{RawEmployeeRecord, RawTimesheetRecord};
use crate::storage::{MetricStore, load_metrics};

pub use report::{LoadOutcome, PipelineReport, StageCounts};

/// Output of the transformation stages, before anything is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    /// Result of cleaning the timesheets.
    pub attendance: AttendanceCleaningResult,
    /// Result of cleaning the roster.
    pub roster: RosterCleaningResult,
    /// Result of reconciling the two.
    pub reconciliation: ReconciliationResult,
}

impl Transformation {
    fn counts(&self, timesheet_rows: usize, employee_rows: usize) -> StageCounts {
        StageCounts {
            timesheet_rows,
            unreadable_timesheet_rows: 0,
            invalid_timesheet_rows: self.attendance.invalid_records,
            voided_employee_months: self.attendance.voided_keys,
            undated_timesheet_rows: self.attendance.undated_records,
            attendance_rows: self.attendance.attendance.len(),
            employee_rows,
            unreadable_employee_rows: 0,
            roster_rows: self.roster.employees.len(),
            unmatched_attendance_rows: self.reconciliation.unmatched_rows,
            boundary_rows: self.reconciliation.boundary_rows,
            metric_rows: self.reconciliation.metrics.len(),
        }
    }
}

/// Runs the salary-per-hour pipeline with a fixed load policy.
///
/// # Example
///
/// ```
/// use salary_per_hour::config::{EmptyResultPolicy, UpsertStrategy};
/// use salary_per_hour::models::{RawEmployeeRecord, RawTimesheetRecord};
/// use salary_per_hour::pipeline::Pipeline;
/// use rust_decimal::Decimal;
///
/// let pipeline = Pipeline::new(UpsertStrategy::Merge, EmptyResultPolicy::Skip);
/// let transformation = pipeline
///     .transform(
///         &[RawTimesheetRecord::new(1, "2024-01-10", "09:00:00", "17:00:00")],
///         &[RawEmployeeRecord {
///             employee_id: 1,
///             branch_id: 5,
///             join_date: Some("2023-06-01".to_string()),
///             resign_date: None,
///             salary: Decimal::new(8000, 0),
///         }],
///     )
///     .unwrap();
/// assert_eq!(
///     transformation.reconciliation.metrics[0].salary_per_hour,
///     Decimal::new(1000, 0)
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
    strategy: UpsertStrategy,
    on_empty_result: EmptyResultPolicy,
}

impl Pipeline {
    /// Creates a pipeline that loads with `strategy`.
    pub fn new(strategy: UpsertStrategy, on_empty_result: EmptyResultPolicy) -> Self {
        Self {
            strategy,
            on_empty_result,
        }
    }

    /// Creates a pipeline from the loaded configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.destination.strategy, config.on_empty_result)
    }

    /// Returns the configured upsert strategy.
    pub fn strategy(&self) -> UpsertStrategy {
        self.strategy
    }

    /// Cleans both inputs and reconciles them.
    ///
    /// Fails with [`PipelineError::InputEmpty`] if either input has no rows,
    /// checking the timesheets first. Data-quality problems never fail.
    pub fn transform(
        &self,
        timesheets: &[RawTimesheetRecord],
        employees: &[RawEmployeeRecord],
    ) -> PipelineResult<Transformation> {
        ensure_not_empty(TIMESHEETS_SOURCE, timesheets.len())?;
        let attendance = clean_timesheets(timesheets);

        ensure_not_empty(EMPLOYEES_SOURCE, employees.len())?;
        let roster = clean_employees(employees);

        let reconciliation = reconcile(&attendance.attendance, &roster.employees);

        Ok(Transformation {
            attendance,
            roster,
            reconciliation,
        })
    }

    /// Writes the reconciled metrics to `store`, honouring the empty-result policy.
    pub async fn load(
        &self,
        store: &dyn MetricStore,
        transformation: &Transformation,
    ) -> PipelineResult<LoadOutcome> {
        let metrics = &transformation.reconciliation.metrics;
        if metrics.is_empty() && self.on_empty_result == EmptyResultPolicy::Skip {
            warn!(
                table = store.table(),
                "reconciliation produced no metrics; destination left untouched"
            );
            return Ok(LoadOutcome::SkippedEmpty);
        }

        let summary = load_metrics(store, metrics, self.strategy).await?;
        Ok(LoadOutcome::Written(summary))
    }

    /// Runs every stage and returns the run's report.
    ///
    /// With `store` set to `None` the metrics are computed but nothing is
    /// written.
    pub async fn run(
        &self,
        timesheets: &[RawTimesheetRecord],
        employees: &[RawEmployeeRecord],
        store: Option<&dyn MetricStore>,
    ) -> PipelineResult<PipelineReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", run_id = %run_id, strategy = %self.strategy);

        async move {
            let started_at = Utc::now();
            info!("pipeline run started");

            let transformation = self
                .transform(timesheets, employees)
                .inspect_err(|e| error!(stage = "transform", error = %e, "pipeline run failed"))?;

            let load = match store {
                Some(store) => self
                    .load(store, &transformation)
                    .await
                    .inspect_err(|e| error!(stage = "load", error = %e, "pipeline run failed"))?,
                None => {
                    info!("dry run; destination not written");
                    LoadOutcome::DryRun
                }
            };

            let counts = transformation.counts(timesheets.len(), employees.len());
            info!(metric_rows = counts.metric_rows, "pipeline run finished");

            Ok::<_, PipelineError>(PipelineReport {
                run_id,
                started_at,
                finished_at: Utc::now(),
                strategy: self.strategy,
                counts,
                duplicate_employee_ids: transformation.roster.duplicate_ids,
                warnings: transformation.reconciliation.warnings,
                metrics: transformation.reconciliation.metrics,
                load,
            })
        }
        .instrument(span)
        .await
    }

    /// Runs every stage over rows read from CSV, recording the rows the
    /// readers dropped in the report counts.
    pub async fn run_inputs(
        &self,
        timesheets: &InputRows<RawTimesheetRecord>,
        employees: &InputRows<RawEmployeeRecord>,
        store: Option<&dyn MetricStore>,
    ) -> PipelineResult<PipelineReport> {
        let mut report = self
            .run(&timesheets.records, &employees.records, store)
            .await?;
        report.counts.unreadable_timesheet_rows = timesheets.unreadable_lines.len();
        report.counts.unreadable_employee_rows = employees.unreadable_lines.len();
        Ok(report)
    }
}

fn ensure_not_empty(source_name: &str, rows: usize) -> PipelineResult<()> {
    if rows == 0 {
        return Err(PipelineError::InputEmpty {
            source_name: source_name.to_string(),
        });
    }
    Ok(())
}
