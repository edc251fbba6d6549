//! Configuration types for the salary-per-hour pipeline.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the destination table is brought in line with a run's metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStrategy {
    /// Update rows whose key exists, insert the rest; keys from earlier runs
    /// that are absent now are left untouched.
    #[default]
    Merge,
    /// Discard every existing row and write the current set in one transaction.
    Replace,
}

impl fmt::Display for UpsertStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertStrategy::Merge => write!(f, "merge"),
            UpsertStrategy::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for UpsertStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" => Ok(UpsertStrategy::Merge),
            "replace" => Ok(UpsertStrategy::Replace),
            other => Err(format!(
                "unknown upsert strategy '{}', expected 'merge' or 'replace'",
                other
            )),
        }
    }
}

/// What to do when reconciliation yields no metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// Leave the destination untouched and report a warning.
    #[default]
    Skip,
    /// Load anyway; under replace this empties the table.
    Write,
}

/// PostgreSQL connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Password; may instead come from the environment.
    #[serde(default)]
    pub password: Option<String>,
    /// Database name.
    pub database: String,
}

fn default_port() -> u16 {
    5432
}

/// Location of the destination table and how to write it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Schema holding the table.
    pub schema: String,
    /// Table name.
    pub table: String,
    /// Upsert strategy.
    #[serde(default)]
    pub strategy: UpsertStrategy,
}

impl DestinationConfig {
    /// Returns `schema.table`.
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

/// Paths of the two CSV inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Timesheet events.
    pub timesheets: PathBuf,
    /// Employee roster.
    pub employees: PathBuf,
}

/// The complete pipeline configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Connection parameters.
    pub database: DatabaseConfig,
    /// Destination table.
    pub destination: DestinationConfig,
    /// Input files.
    pub inputs: InputConfig,
    /// Behaviour when there is nothing to load.
    #[serde(default)]
    pub on_empty_result: EmptyResultPolicy,
}
