//! End-to-end tests for the salary-per-hour pipeline.
//!
//! This test suite drives CSV text through ingestion, cleaning,
//! reconciliation and loading into an in-memory destination:
//! - Reference scenarios (single employee, join-month exclusion)
//! - Invalid punches voiding a whole employee-month
//! - Duplicate roster identities
//! - Merge and replace load semantics across repeated runs
//! - Error cases

use rust_decimal::Decimal;
use std::str::FromStr;

use salary_per_hour::config::{EmptyResultPolicy, UpsertStrategy};
use salary_per_hour::error::PipelineError;
use salary_per_hour::input::{read_employees, read_timesheets};
use salary_per_hour::models::ReconciledMetric;
use salary_per_hour::pipeline::{LoadOutcome, Pipeline, PipelineReport};
use salary_per_hour::storage::{InMemoryMetricStore, MetricStore};

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn metric(year: i32, month: u32, branch_id: i32, value: &str) -> ReconciledMetric {
    ReconciledMetric {
        year,
        month,
        branch_id,
        salary_per_hour: decimal(value),
    }
}

async fn run_csv(
    timesheets_csv: &str,
    employees_csv: &str,
    strategy: UpsertStrategy,
    store: &InMemoryMetricStore,
) -> Result<PipelineReport, PipelineError> {
    let timesheets = read_timesheets(timesheets_csv.as_bytes())?;
    let employees = read_employees(employees_csv.as_bytes())?;
    Pipeline::new(strategy, EmptyResultPolicy::Skip)
        .run_inputs(&timesheets, &employees, Some(store))
        .await
}

fn store() -> InMemoryMetricStore {
    InMemoryMetricStore::new("mart.salary_per_hour")
}

const TIMESHEET_HEADER: &str = "timesheet_id,employee_id,date,checkin,checkout\n";
const EMPLOYEE_HEADER: &str = "employe_id,branch_id,salary,join_date,resign_date\n";

// =============================================================================
// Reference scenarios
// =============================================================================

#[tokio::test]
async fn test_single_employee_eight_hours() {
    let timesheets = format!("{TIMESHEET_HEADER}1,1,2024-01-10,09:00:00,17:00:00\n");
    let employees = format!("{EMPLOYEE_HEADER}1,5,8000,2023-06-01,\n");
    let store = store();

    let report = run_csv(&timesheets, &employees, UpsertStrategy::Merge, &store)
        .await
        .unwrap();

    assert_eq!(report.metrics, vec![metric(2024, 1, 5, "1000")]);
    assert_eq!(
        store.fetch_all().await.unwrap(),
        vec![metric(2024, 1, 5, "1000.0")]
    );
}

#[tokio::test]
async fn test_join_month_contribution_excluded() {
    let timesheets = format!("{TIMESHEET_HEADER}1,1,2024-01-10,09:00:00,17:00:00\n");
    let employees = format!("{EMPLOYEE_HEADER}1,5,8000,2024-01-15,\n");
    let store = store();

    let report = run_csv(&timesheets, &employees, UpsertStrategy::Merge, &store)
        .await
        .unwrap();

    assert!(report.metrics.is_empty());
    assert_eq!(report.counts.boundary_rows, 1);
    assert_eq!(report.load, LoadOutcome::SkippedEmpty);
}

#[tokio::test]
async fn test_branch_month_aggregation() {
    let timesheets = format!(
        "{TIMESHEET_HEADER}\
         1,1,2024-02-05,09:00:00,17:00:00\n\
         2,1,2024-02-06,09:00:00,17:00:00\n\
         3,2,2024-02-05,08:00:00,12:00:00\n\
         4,3,2024-02-05,09:00:00,19:00:00\n\
         5,4,2024-03-01,09:00:00,17:00:00\n"
    );
    let employees = format!(
        "{EMPLOYEE_HEADER}\
         1,10,6000,2020-01-01,\n\
         2,10,3000,2020-01-01,\n\
         3,20,5000,2021-05-10,2024-06-30\n\
         4,20,4000,2024-03-01,\n"
    );
    let store = store();

    let report = run_csv(&timesheets, &employees, UpsertStrategy::Merge, &store)
        .await
        .unwrap();

    // Branch 10: (6000 + 3000) / (16 + 4) = 450. Branch 20: employee 4 joined in March.
    assert_eq!(
        report.metrics,
        vec![metric(2024, 2, 10, "450"), metric(2024, 2, 20, "500")]
    );
    assert_eq!(report.counts.boundary_rows, 1);
}

// =============================================================================
// Cleaning rules
// =============================================================================

#[tokio::test]
async fn test_inverted_punch_voids_employee_month() {
    let timesheets = format!(
        "{TIMESHEET_HEADER}\
         1,1,2024-01-10,09:00:00,17:00:00\n\
         2,1,2024-01-11,17:00:00,09:00:00\n\
         3,1,2024-02-12,09:00:00,17:00:00\n"
    );
    let employees = format!("{EMPLOYEE_HEADER}1,5,8000,2023-06-01,\n");
    let store = store();

    let report = run_csv(&timesheets, &employees, UpsertStrategy::Merge, &store)
        .await
        .unwrap();

    assert_eq!(report.metrics, vec![metric(2024, 2, 5, "1000")]);
    assert_eq!(report.counts.invalid_timesheet_rows, 1);
    assert_eq!(report.counts.voided_employee_months, 1);
}

#[tokio::test]
async fn test_blank_and_garbled_times_void_month() {
    let timesheets = format!(
        "{TIMESHEET_HEADER}\
         1,1,2024-01-10,,17:00:00\n\
         2,1,2024-01-11,09:00:00,17:00:00\n\
         3,2,2024-01-10,09:00:00,late\n\
         4,2,2024-01-11,09:00:00,17:00:00\n\
         5,3,2024-01-10,09:00:00,17:00:00\n"
    );
    let employees = format!(
        "{EMPLOYEE_HEADER}\
         1,5,8000,2023-06-01,\n\
         2,5,8000,2023-06-01,\n\
         3,5,4000,2023-06-01,\n"
    );
    let store = store();

    let report = run_csv(&timesheets, &employees, UpsertStrategy::Merge, &store)
        .await
        .unwrap();

    assert_eq!(report.metrics, vec![metric(2024, 1, 5, "500")]);
    assert_eq!(report.counts.attendance_rows, 1);
}

#[tokio::test]
async fn test_duplicate_employee_dropped_entirely() {
    let timesheets = format!(
        "{TIMESHEET_HEADER}\
         1,1,2024-01-10,09:00:00,17:00:00\n\
         2,2,2024-01-10,09:00:00,17:00:00\n"
    );
    let employees = format!(
        "{EMPLOYEE_HEADER}\
         1,5,8000,2023-06-01,\n\
         1,6,9000,2023-07-01,\n\
         2,5,4000,2023-06-01,\n"
    );
    let store = store();

    let report = run_csv(&timesheets, &employees, UpsertStrategy::Merge, &store)
        .await
        .unwrap();

    assert_eq!(report.duplicate_employee_ids, vec![1]);
    assert_eq!(report.counts.roster_rows, 1);
    assert_eq!(report.metrics, vec![metric(2024, 1, 5, "500")]);
}

#[tokio::test]
async fn test_unreadable_rows_are_dropped_without_failing_run() {
    let timesheets = format!(
        "{TIMESHEET_HEADER}\
         1,1,2024-01-10,09:00:00,17:00:00\n\
         2,,2024-01-10,09:00:00,17:00:00\n\
         3,2,2024-01-10,09:00:00,17:00:00\n"
    );
    let employees = format!(
        "{EMPLOYEE_HEADER}\
         1,5,8000,2023-06-01,\n\
         2,5,,2023-06-01,\n"
    );
    let store = store();

    let report = run_csv(&timesheets, &employees, UpsertStrategy::Merge, &store)
        .await
        .unwrap();

    assert_eq!(report.metrics, vec![metric(2024, 1, 5, "1000")]);
    assert_eq!(report.counts.unreadable_timesheet_rows, 1);
    assert_eq!(report.counts.unreadable_employee_rows, 1);
    assert_eq!(report.counts.unmatched_attendance_rows, 1);
}

#[tokio::test]
async fn test_zero_hour_branch_is_warned_not_loaded() {
    let timesheets = format!(
        "{TIMESHEET_HEADER}\
         1,1,2024-01-10,09:00:00,09:00:00\n\
         2,2,2024-01-10,09:00:00,17:00:00\n"
    );
    let employees = format!(
        "{EMPLOYEE_HEADER}\
         1,5,8000,2023-06-01,\n\
         2,6,8000,2023-06-01,\n"
    );
    let store = store();

    let report = run_csv(&timesheets, &employees, UpsertStrategy::Merge, &store)
        .await
        .unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].key.branch_id, 5);
    assert_eq!(
        store.fetch_all().await.unwrap(),
        vec![metric(2024, 1, 6, "1000")]
    );
}

// =============================================================================
// Load strategies
// =============================================================================

#[tokio::test]
async fn test_merge_twice_leaves_one_row_per_key() {
    let timesheets = format!(
        "{TIMESHEET_HEADER}\
         1,1,2024-01-10,09:00:00,17:00:00\n\
         2,2,2024-01-10,09:00:00,13:00:00\n"
    );
    let employees = format!(
        "{EMPLOYEE_HEADER}\
         1,5,8000,2023-06-01,\n\
         2,6,8000,2023-06-01,\n"
    );
    let store = store();

    run_csv(&timesheets, &employees, UpsertStrategy::Merge, &store)
        .await
        .unwrap();
    let after_first = store.fetch_all().await.unwrap();
    let second = run_csv(&timesheets, &employees, UpsertStrategy::Merge, &store)
        .await
        .unwrap();

    assert_eq!(store.fetch_all().await.unwrap(), after_first);
    assert_eq!(after_first.len(), 2);
    match second.load {
        LoadOutcome::Written(summary) => {
            assert_eq!(summary.inserted, 0);
            assert_eq!(summary.updated, 2);
        }
        other => panic!("Expected Written, got {:?}", other),
    }
}

#[tokio::test]
async fn test_merge_keeps_stale_keys_from_previous_runs() {
    let employees = format!("{EMPLOYEE_HEADER}1,5,8000,2023-06-01,\n");
    let store = store();

    run_csv(
        &format!("{TIMESHEET_HEADER}1,1,2024-01-10,09:00:00,17:00:00\n"),
        &employees,
        UpsertStrategy::Merge,
        &store,
    )
    .await
    .unwrap();
    run_csv(
        &format!("{TIMESHEET_HEADER}1,1,2024-02-10,09:00:00,13:00:00\n"),
        &employees,
        UpsertStrategy::Merge,
        &store,
    )
    .await
    .unwrap();

    assert_eq!(
        store.fetch_all().await.unwrap(),
        vec![metric(2024, 1, 5, "1000"), metric(2024, 2, 5, "2000")]
    );
}

#[tokio::test]
async fn test_replace_mirrors_latest_run() {
    let employees = format!("{EMPLOYEE_HEADER}1,5,8000,2023-06-01,\n");
    let store = store();

    run_csv(
        &format!("{TIMESHEET_HEADER}1,1,2024-01-10,09:00:00,17:00:00\n"),
        &employees,
        UpsertStrategy::Replace,
        &store,
    )
    .await
    .unwrap();
    let report = run_csv(
        &format!("{TIMESHEET_HEADER}1,1,2024-02-10,09:00:00,13:00:00\n"),
        &employees,
        UpsertStrategy::Replace,
        &store,
    )
    .await
    .unwrap();

    let rows = store.fetch_all().await.unwrap();
    assert_eq!(rows.len(), report.metrics.len());
    assert_eq!(rows, vec![metric(2024, 2, 5, "2000")]);
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_header_only_timesheets_is_input_empty() {
    let employees = format!("{EMPLOYEE_HEADER}1,5,8000,2023-06-01,\n");
    let store = store();

    let result = run_csv(TIMESHEET_HEADER, &employees, UpsertStrategy::Merge, &store).await;

    assert!(matches!(
        result,
        Err(PipelineError::InputEmpty { source_name }) if source_name == "timesheets"
    ));
}

#[tokio::test]
async fn test_missing_salary_column_is_structural_error() {
    let timesheets = format!("{TIMESHEET_HEADER}1,1,2024-01-10,09:00:00,17:00:00\n");
    let store = store();

    let result = run_csv(
        &timesheets,
        "employee_id,branch_id,join_date,resign_date\n1,5,2023-06-01,\n",
        UpsertStrategy::Merge,
        &store,
    )
    .await;

    assert!(matches!(
        result,
        Err(PipelineError::MissingColumn { column, .. }) if column == "salary"
    ));
}

#[tokio::test]
async fn test_failed_replace_keeps_previous_table() {
    let previous = vec![metric(2023, 12, 5, "900")];
    let store = store().with_rows(previous.clone()).failing_on("replace");

    let result = run_csv(
        &format!("{TIMESHEET_HEADER}1,1,2024-01-10,09:00:00,17:00:00\n"),
        &format!("{EMPLOYEE_HEADER}1,5,8000,2023-06-01,\n"),
        UpsertStrategy::Replace,
        &store,
    )
    .await;

    assert!(matches!(result, Err(PipelineError::Persistence { .. })));
    assert_eq!(store.fetch_all().await.unwrap(), previous);
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let store = store();
    let report = run_csv(
        &format!("{TIMESHEET_HEADER}1,1,2024-01-10,09:00:00,17:00:00\n"),
        &format!("{EMPLOYEE_HEADER}1,5,8000,2023-06-01,\n"),
        UpsertStrategy::Merge,
        &store,
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["strategy"], "merge");
    assert_eq!(json["load"]["status"], "written");
    assert_eq!(json["load"]["inserted"], 1);
    assert_eq!(json["metrics"][0]["salary_per_hour"], "1000");
    assert_eq!(json["counts"]["timesheet_rows"], 1);
}
