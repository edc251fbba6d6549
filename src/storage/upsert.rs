//! Strategy dispatch for loading metrics into a [`MetricStore`].

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::UpsertStrategy;
use crate::error::PipelineResult;
use crate::models::ReconciledMetric;

use super::{MergeOutcome, MetricStore};

/// Counts of what a load did to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// The strategy that was applied.
    pub strategy: UpsertStrategy,
    /// Rows inserted for keys that were not present (merge).
    pub inserted: u64,
    /// Rows overwritten in place (merge).
    pub updated: u64,
    /// Rows written after discarding the previous content (replace).
    pub replaced: u64,
}

impl LoadSummary {
    fn new(strategy: UpsertStrategy) -> Self {
        Self {
            strategy,
            inserted: 0,
            updated: 0,
            replaced: 0,
        }
    }
}

/// Synchronizes the destination with `metrics` using `strategy`.
///
/// The table is created first if needed. Under [`UpsertStrategy::Merge`]
/// each metric is merged in its own transaction, so a failure part way
/// through leaves earlier rows applied and the failing row untouched. Under
/// [`UpsertStrategy::Replace`] the whole set is written in one transaction.
///
/// Either way the destination ends up with exactly one row per metric key.
///
/// # Example
///
/// ```
/// use salary_per_hour::config::UpsertStrategy;
/// use salary_per_hour::models::ReconciledMetric;
/// use salary_per_hour::storage::{InMemoryMetricStore, load_metrics};
/// use rust_decimal::Decimal;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let store = InMemoryMetricStore::new("mart.salary_per_hour");
/// let metrics = vec![ReconciledMetric {
///     year: 2024,
///     month: 1,
///     branch_id: 5,
///     salary_per_hour: Decimal::new(1000, 0),
/// }];
///
/// let summary = runtime
///     .block_on(load_metrics(&store, &metrics, UpsertStrategy::Merge))
///     .unwrap();
/// assert_eq!(summary.inserted, 1);
/// ```
pub async fn load_metrics(
    store: &dyn MetricStore,
    metrics: &[ReconciledMetric],
    strategy: UpsertStrategy,
) -> PipelineResult<LoadSummary> {
    store.ensure_table().await?;
    info!(table = store.table(), "destination table ready");

    let mut summary = LoadSummary::new(strategy);
    match strategy {
        UpsertStrategy::Merge => {
            for metric in metrics {
                match store.merge_metric(metric).await? {
                    MergeOutcome::Inserted => summary.inserted += 1,
                    MergeOutcome::Updated => summary.updated += 1,
                }
            }
        }
        UpsertStrategy::Replace => {
            summary.replaced = store.replace_all(metrics).await?;
        }
    }

    info!(
        table = store.table(),
        strategy = %strategy,
        inserted = summary.inserted,
        updated = summary.updated,
        replaced = summary.replaced,
        "metrics loaded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::storage::InMemoryMetricStore;
    use rust_decimal::Decimal;

    fn metric(month: u32, branch_id: i32, value: i64) -> ReconciledMetric {
        ReconciledMetric {
            year: 2024,
            month,
            branch_id,
            salary_per_hour: Decimal::new(value, 0),
        }
    }

    #[tokio::test]
    async fn test_merge_inserts_then_updates() {
        let store = InMemoryMetricStore::new("mart.salary_per_hour");

        let first = load_metrics(&store, &[metric(1, 5, 1000)], UpsertStrategy::Merge)
            .await
            .unwrap();
        let second = load_metrics(
            &store,
            &[metric(1, 5, 1200), metric(2, 5, 900)],
            UpsertStrategy::Merge,
        )
        .await
        .unwrap();

        assert_eq!((first.inserted, first.updated), (1, 0));
        assert_eq!((second.inserted, second.updated), (1, 1));
        assert_eq!(
            store.fetch_all().await.unwrap(),
            vec![metric(1, 5, 1200), metric(2, 5, 900)]
        );
    }

    #[tokio::test]
    async fn test_merge_keeps_keys_absent_from_run() {
        let store = InMemoryMetricStore::new("mart.salary_per_hour");

        load_metrics(&store, &[metric(1, 5, 1000)], UpsertStrategy::Merge)
            .await
            .unwrap();
        load_metrics(&store, &[metric(1, 6, 800)], UpsertStrategy::Merge)
            .await
            .unwrap();

        assert_eq!(store.fetch_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_replace_discards_previous_rows() {
        let store = InMemoryMetricStore::new("mart.salary_per_hour");

        load_metrics(
            &store,
            &[metric(1, 5, 1000), metric(1, 6, 800)],
            UpsertStrategy::Replace,
        )
        .await
        .unwrap();
        let summary = load_metrics(&store, &[metric(2, 5, 900)], UpsertStrategy::Replace)
            .await
            .unwrap();

        assert_eq!(summary.replaced, 1);
        assert_eq!(store.fetch_all().await.unwrap(), vec![metric(2, 5, 900)]);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let store = InMemoryMetricStore::new("mart.sph").failing_on("replace");

        let result = load_metrics(&store, &[metric(1, 5, 1000)], UpsertStrategy::Replace).await;

        assert!(matches!(result, Err(PipelineError::Persistence { .. })));
    }
}
