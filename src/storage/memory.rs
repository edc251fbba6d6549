//! In-process [`MetricStore`] used for dry runs and tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{PipelineError, PipelineResult};
use crate::models::ReconciledMetric;

use super::{MergeOutcome, MetricStore};

/// A destination table held in memory.
///
/// Mirrors the PostgreSQL store's contract: the table must be created with
/// [`MetricStore::ensure_table`] before use, and every call is atomic.
#[derive(Debug)]
pub struct InMemoryMetricStore {
    table: String,
    rows: Mutex<Option<Vec<ReconciledMetric>>>,
    failing_operation: Option<&'static str>,
}

impl InMemoryMetricStore {
    /// Creates a store whose table does not exist yet.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            rows: Mutex::new(None),
            failing_operation: None,
        }
    }

    /// Makes every call of `operation` fail with a persistence error.
    ///
    /// Operations are named `"create table"`, `"merge"`, `"replace"` and `"fetch"`.
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.failing_operation = Some(operation);
        self
    }

    /// Seeds the table with existing rows, creating it.
    pub fn with_rows(self, rows: Vec<ReconciledMetric>) -> Self {
        Self {
            rows: Mutex::new(Some(rows)),
            ..self
        }
    }

    fn with_table<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Vec<ReconciledMetric>) -> T,
    ) -> PipelineResult<T> {
        self.check_failure(operation)?;
        let mut guard = self.lock(operation)?;
        match guard.as_mut() {
            Some(rows) => Ok(f(rows)),
            None => Err(self.error(operation, "relation does not exist")),
        }
    }

    fn lock(
        &self,
        operation: &str,
    ) -> PipelineResult<std::sync::MutexGuard<'_, Option<Vec<ReconciledMetric>>>> {
        self.rows
            .lock()
            .map_err(|_| self.error(operation, "store lock poisoned"))
    }

    fn check_failure(&self, operation: &str) -> PipelineResult<()> {
        match self.failing_operation {
            Some(failing) if failing == operation => {
                Err(self.error(operation, "injected failure"))
            }
            _ => Ok(()),
        }
    }

    fn error(&self, operation: &str, message: &str) -> PipelineError {
        PipelineError::Persistence {
            operation: operation.to_string(),
            table: self.table.clone(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl MetricStore for InMemoryMetricStore {
    fn table(&self) -> &str {
        &self.table
    }

    async fn ensure_table(&self) -> PipelineResult<()> {
        self.check_failure("create table")?;
        self.lock("create table")?.get_or_insert_with(Vec::new);
        Ok(())
    }

    async fn merge_metric(&self, metric: &ReconciledMetric) -> PipelineResult<MergeOutcome> {
        self.with_table("merge", |rows| {
            match rows.iter_mut().find(|row| row.key() == metric.key()) {
                Some(existing) => {
                    existing.salary_per_hour = metric.salary_per_hour;
                    MergeOutcome::Updated
                }
                None => {
                    rows.push(metric.clone());
                    MergeOutcome::Inserted
                }
            }
        })
    }

    async fn replace_all(&self, metrics: &[ReconciledMetric]) -> PipelineResult<u64> {
        self.with_table("replace", |rows| {
            *rows = metrics.to_vec();
            rows.len() as u64
        })
    }

    async fn fetch_all(&self) -> PipelineResult<Vec<ReconciledMetric>> {
        self.with_table("fetch", |rows| {
            let mut rows = rows.clone();
            rows.sort_by_key(ReconciledMetric::key);
            rows
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn metric(branch_id: i32, value: i64) -> ReconciledMetric {
        ReconciledMetric {
            year: 2024,
            month: 1,
            branch_id,
            salary_per_hour: Decimal::new(value, 0),
        }
    }

    #[tokio::test]
    async fn test_table_must_exist_before_writes() {
        let store = InMemoryMetricStore::new("mart.sph");

        let result = store.merge_metric(&metric(1, 10)).await;

        match result {
            Err(PipelineError::Persistence { operation, table, .. }) => {
                assert_eq!(operation, "merge");
                assert_eq!(table, "mart.sph");
            }
            other => panic!("Expected Persistence error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ensure_table_is_idempotent() {
        let store = InMemoryMetricStore::new("mart.sph").with_rows(vec![metric(1, 10)]);

        store.ensure_table().await.unwrap();
        store.ensure_table().await.unwrap();

        assert_eq!(store.fetch_all().await.unwrap(), vec![metric(1, 10)]);
    }

    #[tokio::test]
    async fn test_fetch_all_is_sorted_by_key() {
        let store =
            InMemoryMetricStore::new("mart.sph").with_rows(vec![metric(9, 1), metric(2, 1)]);

        let rows = store.fetch_all().await.unwrap();

        assert_eq!(rows[0].branch_id, 2);
        assert_eq!(rows[1].branch_id, 9);
    }

    #[tokio::test]
    async fn test_failed_replace_leaves_rows_intact() {
        let store = InMemoryMetricStore::new("mart.sph")
            .with_rows(vec![metric(1, 10)])
            .failing_on("replace");

        assert!(store.replace_all(&[metric(2, 20)]).await.is_err());
        assert_eq!(store.fetch_all().await.unwrap(), vec![metric(1, 10)]);
    }
}
