use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salary_per_hour::config::{ConfigLoader, UpsertStrategy};
use salary_per_hour::input::{read_employees_file, read_timesheets_file};
use salary_per_hour::pipeline::{LoadOutcome, Pipeline};
use salary_per_hour::storage::{MetricStore, PostgresMetricStore};

/// Computes monthly salary per hour per branch and loads it into PostgreSQL.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the pipeline configuration file.
    #[arg(short, long, default_value = "pipeline.yaml")]
    config: PathBuf,

    /// Override the configured upsert strategy (merge or replace).
    #[arg(long)]
    strategy: Option<UpsertStrategy>,

    /// Compute the metrics without connecting to the database. The
    /// configuration must still contain a complete `database` section.
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    report_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ConfigLoader::load(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?
        .into_config();
    if let Some(strategy) = args.strategy {
        config.destination.strategy = strategy;
    }

    let timesheets = read_timesheets_file(&config.inputs.timesheets)?;
    let employees = read_employees_file(&config.inputs.employees)?;

    let pipeline = Pipeline::from_config(&config);
    let store = if args.dry_run {
        None
    } else {
        Some(PostgresMetricStore::connect(&config.database, &config.destination).await?)
    };

    let report = pipeline
        .run_inputs(
            &timesheets,
            &employees,
            store.as_ref().map(|s| s as &dyn MetricStore),
        )
        .await
        .context("salary-per-hour pipeline failed")?;

    if args.report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match &report.load {
        LoadOutcome::Written(summary) => info!(
            run_id = %report.run_id,
            table = %config.destination.qualified_table(),
            inserted = summary.inserted,
            updated = summary.updated,
            replaced = summary.replaced,
            "load complete"
        ),
        LoadOutcome::SkippedEmpty => info!(run_id = %report.run_id, "nothing to load"),
        LoadOutcome::DryRun => info!(
            run_id = %report.run_id,
            metric_rows = report.metrics.len(),
            "dry run complete"
        ),
    }

    Ok(())
}
