//! CSV ingestion for the two pipeline inputs.
//!
//! The readers check the header row for the required columns and map each
//! data row onto a raw record. Date and time cells are passed through as
//! text so the cleaners can apply their missing-value rules. A row whose
//! identifier, branch or salary cannot be read is dropped and its line is
//! recorded; only a missing column fails the read.

mod columns;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::models::{RawEmployeeRecord, RawTimesheetRecord};

use columns::{Column, ColumnIndex};

/// Logical name of the timesheet input used in errors and logs.
pub const TIMESHEETS_SOURCE: &str = "timesheets";

/// Logical name of the roster input used in errors and logs.
pub const EMPLOYEES_SOURCE: &str = "employees";

const TIMESHEET_COLUMNS: [Column; 4] = [
    Column::new("employee_id"),
    Column::new("date"),
    Column::new("checkin"),
    Column::new("checkout"),
];

// Older roster exports spell the identifier column "employe_id".
const EMPLOYEE_COLUMNS: [Column; 5] = [
    Column::with_aliases("employee_id", &["employe_id"]),
    Column::new("branch_id"),
    Column::new("join_date"),
    Column::new("resign_date"),
    Column::new("salary"),
];

/// Rows read from one input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRows<T> {
    /// Rows that mapped onto a raw record, in file order.
    pub records: Vec<T>,
    /// One-based line numbers (header included) of rows that were dropped
    /// because an identifier, branch or salary could not be read.
    pub unreadable_lines: Vec<u64>,
}

impl<T> Default for InputRows<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            unreadable_lines: Vec::new(),
        }
    }
}

impl<T> InputRows<T> {
    fn push(&mut self, index: &ColumnIndex, row: &StringRecord, parsed: Result<T, String>) {
        match parsed {
            Ok(record) => self.records.push(record),
            Err(reason) => {
                let line = row.position().map(|p| p.line()).unwrap_or(0);
                warn!(
                    source = index.source_name(),
                    line,
                    reason = %reason,
                    "unreadable row dropped"
                );
                self.unreadable_lines.push(line);
            }
        }
    }
}

/// Reads timesheet events from CSV.
///
/// Rows with a blank or non-integer `employee_id` are dropped and listed in
/// [`InputRows::unreadable_lines`].
///
/// # Errors
///
/// - [`PipelineError::MissingColumn`] if a required header is absent
/// - [`PipelineError::InputRead`] if the CSV itself cannot be decoded
///
/// # Example
///
/// ```
/// use salary_per_hour::input::read_timesheets;
///
/// let csv = "employee_id,date,checkin,checkout\n1,2024-01-10,09:00:00,\n,2024-01-10,,\n";
/// let rows = read_timesheets(csv.as_bytes()).unwrap();
/// assert_eq!(rows.records[0].checkout, None);
/// assert_eq!(rows.unreadable_lines, vec![3]);
/// ```
pub fn read_timesheets<R: Read>(reader: R) -> PipelineResult<InputRows<RawTimesheetRecord>> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| read_error(TIMESHEETS_SOURCE, e))?
        .clone();
    let index = ColumnIndex::resolve(TIMESHEETS_SOURCE, &headers, &TIMESHEET_COLUMNS)?;

    let mut rows = InputRows::default();
    for row in reader.into_records() {
        let row = row.map_err(|e| read_error(TIMESHEETS_SOURCE, e))?;
        let parsed = index
            .parse_cell(&row, 0, "employee_id")
            .map(|employee_id| RawTimesheetRecord {
                employee_id,
                date: index.cell(&row, 1).to_string(),
                checkin: index.optional_cell(&row, 2),
                checkout: index.optional_cell(&row, 3),
            });
        rows.push(&index, &row, parsed);
    }
    Ok(rows)
}

/// Reads roster rows from CSV.
///
/// Accepts `employe_id` as the identifier header as well as `employee_id`.
/// Rows whose identifier, branch or salary is blank or not numeric are
/// dropped and listed in [`InputRows::unreadable_lines`].
///
/// # Errors
///
/// - [`PipelineError::MissingColumn`] if a required header is absent
/// - [`PipelineError::InputRead`] if the CSV itself cannot be decoded
pub fn read_employees<R: Read>(reader: R) -> PipelineResult<InputRows<RawEmployeeRecord>> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| read_error(EMPLOYEES_SOURCE, e))?
        .clone();
    let index = ColumnIndex::resolve(EMPLOYEES_SOURCE, &headers, &EMPLOYEE_COLUMNS)?;

    let mut rows = InputRows::default();
    for row in reader.into_records() {
        let row = row.map_err(|e| read_error(EMPLOYEES_SOURCE, e))?;
        let parsed = parse_employee(&index, &row);
        rows.push(&index, &row, parsed);
    }
    Ok(rows)
}

fn parse_employee(index: &ColumnIndex, row: &StringRecord) -> Result<RawEmployeeRecord, String> {
    Ok(RawEmployeeRecord {
        employee_id: index.parse_cell(row, 0, "employee_id")?,
        branch_id: index.parse_cell(row, 1, "branch_id")?,
        join_date: index.optional_cell(row, 2),
        resign_date: index.optional_cell(row, 3),
        salary: index.parse_cell::<Decimal>(row, 4, "salary")?,
    })
}

/// Reads the timesheet CSV at `path`.
pub fn read_timesheets_file<P: AsRef<Path>>(
    path: P,
) -> PipelineResult<InputRows<RawTimesheetRecord>> {
    let rows = read_timesheets(open(TIMESHEETS_SOURCE, path.as_ref())?)?;
    info!(
        source = TIMESHEETS_SOURCE,
        path = %path.as_ref().display(),
        rows = rows.records.len(),
        unreadable = rows.unreadable_lines.len(),
        "input read"
    );
    Ok(rows)
}

/// Reads the roster CSV at `path`.
pub fn read_employees_file<P: AsRef<Path>>(
    path: P,
) -> PipelineResult<InputRows<RawEmployeeRecord>> {
    let rows = read_employees(open(EMPLOYEES_SOURCE, path.as_ref())?)?;
    info!(
        source = EMPLOYEES_SOURCE,
        path = %path.as_ref().display(),
        rows = rows.records.len(),
        unreadable = rows.unreadable_lines.len(),
        "input read"
    );
    Ok(rows)
}

// Short rows are read as blank cells rather than rejected.
fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader)
}

fn open(source_name: &str, path: &Path) -> PipelineResult<File> {
    File::open(path).map_err(|e| PipelineError::InputRead {
        source_name: source_name.to_string(),
        message: format!("{}: {}", path.display(), e),
    })
}

fn read_error(source_name: &str, error: csv::Error) -> PipelineError {
    PipelineError::InputRead {
        source_name: source_name.to_string(),
        message: error.to_string(),
    }
}
