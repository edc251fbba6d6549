//! Error types for the salary-per-hour pipeline.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure that aborts a pipeline run. Data-quality problems in the
//! input rows are not errors: the cleaners exclude those rows deterministically.

use thiserror::Error;

/// The main error type for the salary-per-hour pipeline.
///
/// Every stage returns this error type so the orchestrator can treat any
/// failure as a failed run without inspecting where it came from.
///
/// # Example
///
/// ```
/// use salary_per_hour::error::PipelineError;
///
/// let error = PipelineError::InputEmpty {
///     source_name: "timesheets".to_string(),
/// };
/// assert_eq!(error.to_string(), "Input 'timesheets' has no rows");
/// ```
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value was present but unusable.
    #[error("Invalid configuration field '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// An input source could not be opened or read.
    #[error("Failed to read input '{source_name}': {message}")]
    InputRead {
        /// Logical name of the input (e.g. "timesheets").
        source_name: String,
        /// The underlying I/O or CSV error.
        message: String,
    },

    /// A required input source has zero rows.
    #[error("Input '{source_name}' has no rows")]
    InputEmpty {
        /// Logical name of the input.
        source_name: String,
    },

    /// A required column is missing from an input source.
    #[error("Input '{source_name}' is missing required column '{column}'")]
    MissingColumn {
        /// Logical name of the input.
        source_name: String,
        /// The column that was expected.
        column: String,
    },

    /// Creating, reading or writing the destination table failed.
    #[error("Persistence error during {operation} on {table}: {message}")]
    Persistence {
        /// The operation that failed (e.g. "merge", "create table").
        operation: String,
        /// Qualified destination table name.
        table: String,
        /// The underlying database error.
        message: String,
    },
}

/// A type alias for Results that return PipelineError.
pub type PipelineResult<T> = Result<T, PipelineError>;
