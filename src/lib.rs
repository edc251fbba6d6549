//! Monthly salary-per-hour per branch.
//!
//! This crate cleans an employee roster and a timesheet extract, reconciles
//! them into a salary-per-hour metric per branch and month, and keeps a
//! PostgreSQL destination table in sync with the result.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod pipeline;
pub mod storage;
