//! Configuration loading and management for the salary-per-hour pipeline.
//!
//! This module loads the YAML configuration naming the database connection,
//! the destination table, the upsert strategy and the input files.
//!
//! # Example
//!
//! ```no_run
//! use salary_per_hour::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./pipeline.yaml").unwrap();
//! println!("Strategy: {}", config.destination().strategy);
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, PASSWORD_ENV_VAR};
pub use types::{
    DatabaseConfig, DestinationConfig, EmptyResultPolicy, InputConfig, PipelineConfig,
    UpsertStrategy,
};
