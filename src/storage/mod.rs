//! Persistence of reconciled metrics into the destination table.
//!
//! [`MetricStore`] is the seam between the pipeline and the storage engine.
//! [`load_metrics`] applies the configured [`UpsertStrategy`] on top of it.
//!
//! [`UpsertStrategy`]: crate::config::UpsertStrategy

mod memory;
mod postgres;
mod upsert;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;
use crate::models::ReconciledMetric;

pub use memory::InMemoryMetricStore;
pub use postgres::PostgresMetricStore;
pub use upsert::{LoadSummary, load_metrics};

/// What a single merge did to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// No row had the key; one was inserted.
    Inserted,
    /// A row with the key existed and its value was overwritten.
    Updated,
}

/// A destination table for branch-month metrics.
///
/// Implementations must make each call atomic: a failed `merge_metric` or
/// `replace_all` leaves the table as it was before the call.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Qualified name of the destination, for logs and errors.
    fn table(&self) -> &str;

    /// Creates the destination table if it does not exist. Idempotent.
    async fn ensure_table(&self) -> PipelineResult<()>;

    /// Updates the row with the metric's key, or inserts one if none exists.
    async fn merge_metric(&self, metric: &ReconciledMetric) -> PipelineResult<MergeOutcome>;

    /// Replaces the whole table content with `metrics` in one transaction.
    ///
    /// Returns the number of rows written.
    async fn replace_all(&self, metrics: &[ReconciledMetric]) -> PipelineResult<u64>;

    /// Returns every row, ordered by year, month and branch.
    async fn fetch_all(&self) -> PipelineResult<Vec<ReconciledMetric>>;
}
