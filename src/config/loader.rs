//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the pipeline
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

use super::types::{DatabaseConfig, DestinationConfig, InputConfig, PipelineConfig};

/// Environment variable consulted when the file carries no database password.
pub const PASSWORD_ENV_VAR: &str = "SALARY_PER_HOUR_DB_PASSWORD";

/// Loads, validates and provides access to the pipeline configuration.
///
/// # File Format
///
/// ```text
/// database:
///   host: localhost
///   port: 5432
///   user: etl
///   password: secret        # optional, see PASSWORD_ENV_VAR
///   database: warehouse
/// destination:
///   schema: mart
///   table: salary_per_hour
///   strategy: merge         # or replace
/// inputs:
///   timesheets: data/timesheets.csv
///   employees: data/employees.csv
/// on_empty_result: skip     # or write
/// ```
///
/// # Example
///
/// ```no_run
/// use salary_per_hour::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./pipeline.yaml").unwrap();
/// println!("Loading into {}", loader.destination().qualified_table());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PipelineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the YAML file at `path`.
    ///
    /// Returns an error if:
    /// - The file is missing or unreadable
    /// - The file contains invalid YAML or misses a required field
    /// - The schema or table name is not a plain SQL identifier
    pub fn load<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PipelineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml_str(&content).map_err(|e| match e {
            PipelineError::ConfigParseError { message, .. } => {
                PipelineError::ConfigParseError {
                    path: path_str,
                    message,
                }
            }
            other => other,
        })
    }

    /// Parses and validates configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> PipelineResult<Self> {
        let mut config: PipelineConfig =
            serde_yaml::from_str(content).map_err(|e| PipelineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;

        if config.database.password.is_none() {
            config.database.password = std::env::var(PASSWORD_ENV_VAR).ok();
        }

        Self::from_config(config)
    }

    /// Validates an already-built configuration.
    pub fn from_config(config: PipelineConfig) -> PipelineResult<Self> {
        validate_identifier("destination.schema", &config.destination.schema)?;
        validate_identifier("destination.table", &config.destination.table)?;
        Ok(Self { config })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PipelineConfig {
        self.config
    }

    /// Returns the database connection parameters.
    pub fn database(&self) -> &DatabaseConfig {
        &self.config.database
    }

    /// Returns the destination table settings.
    pub fn destination(&self) -> &DestinationConfig {
        &self.config.destination
    }

    /// Returns the input file paths.
    pub fn inputs(&self) -> &InputConfig {
        &self.config.inputs
    }
}

/// Schema and table names are interpolated into SQL, so only plain
/// identifiers are accepted.
fn validate_identifier(field: &str, value: &str) -> PipelineResult<()> {
    let mut chars = value.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(PipelineError::InvalidConfig {
            field: field.to_string(),
            message: format!("'{}' is not a plain SQL identifier", value),
        })
    }
}
