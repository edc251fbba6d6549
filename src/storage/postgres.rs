//! PostgreSQL [`MetricStore`] over `tokio-postgres`.
//!
//! One connection is opened per run and closed when the store is dropped.
//! Every write runs in a transaction that first takes an advisory lock keyed
//! on the table name, so two runs never interleave a lookup and an insert on
//! the same destination.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls, Transaction};
use tracing::{debug, error, instrument};

use crate::config::{DatabaseConfig, DestinationConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::models::ReconciledMetric;

use super::{MergeOutcome, MetricStore};

/// PostgreSQL implementation of [`MetricStore`].
pub struct PostgresMetricStore {
    client: Mutex<Client>,
    table: String,
}

impl PostgresMetricStore {
    /// Opens a connection and binds it to the destination table.
    ///
    /// The connection task is spawned on the current Tokio runtime and ends
    /// when the store is dropped.
    pub async fn connect(
        database: &DatabaseConfig,
        destination: &DestinationConfig,
    ) -> PipelineResult<Self> {
        let table = destination.qualified_table();

        let mut config = tokio_postgres::Config::new();
        config
            .host(&database.host)
            .port(database.port)
            .user(&database.user)
            .dbname(&database.database)
            .application_name("salary-per-hour");
        if let Some(password) = &database.password {
            config.password(password);
        }

        let (client, connection) = config
            .connect(NoTls)
            .await
            .map_err(|e| persistence("connect", &table, e))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        debug!(
            host = %database.host,
            port = database.port,
            table = %table,
            "postgreSQL connection established"
        );

        Ok(Self {
            client: Mutex::new(client),
            table,
        })
    }

    async fn lock_table(&self, tx: &Transaction<'_>, operation: &str) -> PipelineResult<()> {
        tx.execute("SELECT pg_advisory_xact_lock(hashtext($1))", &[&self.table])
            .await
            .map_err(|e| persistence(operation, &self.table, e))?;
        Ok(())
    }

    fn bad_row(&self, column: &str, value: Decimal) -> PipelineError {
        PipelineError::Persistence {
            operation: "fetch".to_string(),
            table: self.table.clone(),
            message: format!("{} value {} is out of range", column, value),
        }
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (year, month, branch_id, salary_per_hour) VALUES ($1, $2, $3, $4)",
            self.table
        )
    }
}

#[async_trait]
impl MetricStore for PostgresMetricStore {
    fn table(&self) -> &str {
        &self.table
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn ensure_table(&self) -> PipelineResult<()> {
        let client = self.client.lock().await;
        client
            .execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        year numeric,
                        month numeric,
                        branch_id integer,
                        salary_per_hour numeric(18,4)
                    )",
                    self.table
                ),
                &[],
            )
            .await
            .map_err(|e| persistence("create table", &self.table, e))?;

        debug!("destination table created or already exists");
        Ok(())
    }

    #[instrument(
        skip(self, metric),
        fields(
            table = %self.table,
            year = metric.year,
            month = metric.month,
            branch_id = metric.branch_id
        )
    )]
    async fn merge_metric(&self, metric: &ReconciledMetric) -> PipelineResult<MergeOutcome> {
        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| persistence("merge", &self.table, e))?;
        self.lock_table(&tx, "merge").await?;

        let year = Decimal::from(metric.year);
        let month = Decimal::from(metric.month);

        let existing = tx
            .query_opt(
                &format!(
                    "SELECT 1 FROM {} WHERE year = $1 AND month = $2 AND branch_id = $3 LIMIT 1",
                    self.table
                ),
                &[&year, &month, &metric.branch_id],
            )
            .await
            .map_err(|e| persistence("merge", &self.table, e))?;

        let outcome = if existing.is_some() {
            tx.execute(
                &format!(
                    "UPDATE {} SET salary_per_hour = $4
                     WHERE year = $1 AND month = $2 AND branch_id = $3",
                    self.table
                ),
                &[&year, &month, &metric.branch_id, &metric.salary_per_hour],
            )
            .await
            .map_err(|e| persistence("merge", &self.table, e))?;
            MergeOutcome::Updated
        } else {
            tx.execute(
                &self.insert_sql(),
                &[&year, &month, &metric.branch_id, &metric.salary_per_hour],
            )
            .await
            .map_err(|e| persistence("merge", &self.table, e))?;
            MergeOutcome::Inserted
        };

        tx.commit()
            .await
            .map_err(|e| persistence("merge", &self.table, e))?;

        debug!(?outcome, "metric merged");
        Ok(outcome)
    }

    #[instrument(skip(self, metrics), fields(table = %self.table, rows = metrics.len()))]
    async fn replace_all(&self, metrics: &[ReconciledMetric]) -> PipelineResult<u64> {
        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| persistence("replace", &self.table, e))?;
        self.lock_table(&tx, "replace").await?;

        let discarded = tx
            .execute(&format!("DELETE FROM {}", self.table), &[])
            .await
            .map_err(|e| persistence("replace", &self.table, e))?;

        let insert = tx
            .prepare(&self.insert_sql())
            .await
            .map_err(|e| persistence("replace", &self.table, e))?;

        let mut written = 0;
        for metric in metrics {
            written += tx
                .execute(
                    &insert,
                    &[
                        &Decimal::from(metric.year),
                        &Decimal::from(metric.month),
                        &metric.branch_id,
                        &metric.salary_per_hour,
                    ],
                )
                .await
                .map_err(|e| persistence("replace", &self.table, e))?;
        }

        // Nothing above is visible to other sessions until this succeeds.
        tx.commit()
            .await
            .map_err(|e| persistence("replace", &self.table, e))?;

        debug!(discarded, written, "destination replaced");
        Ok(written)
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn fetch_all(&self) -> PipelineResult<Vec<ReconciledMetric>> {
        let client = self.client.lock().await;
        let rows = client
            .query(
                &format!(
                    "SELECT year, month, branch_id, salary_per_hour FROM {}
                     ORDER BY year, month, branch_id",
                    self.table
                ),
                &[],
            )
            .await
            .map_err(|e| persistence("fetch", &self.table, e))?;

        rows.iter()
            .map(|row| {
                let column = |index: usize| -> PipelineResult<Decimal> {
                    row.try_get(index)
                        .map_err(|e| persistence("fetch", &self.table, e))
                };
                let year = column(0)?;
                let month = column(1)?;
                Ok(ReconciledMetric {
                    year: year.to_i32().ok_or_else(|| self.bad_row("year", year))?,
                    month: month.to_u32().ok_or_else(|| self.bad_row("month", month))?,
                    branch_id: row
                        .try_get(2)
                        .map_err(|e| persistence("fetch", &self.table, e))?,
                    salary_per_hour: column(3)?,
                })
            })
            .collect()
    }
}

fn persistence(operation: &str, table: &str, e: tokio_postgres::Error) -> PipelineError {
    PipelineError::Persistence {
        operation: operation.to_string(),
        table: table.to_string(),
        message: e.to_string(),
    }
}
