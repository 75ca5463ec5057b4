use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::sync::watch;

mod config;
mod db;
mod error;
mod ingest;
mod models;

use config::Config;
use db::Repository;
use ingest::{ConsoleProgress, IngestionDriver};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().context("loading configuration")?;

    // Optional positional CSV path overrides the configured one
    let csv_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.csv_path));

    let input = File::open(&csv_path)
        .with_context(|| format!("opening {}", csv_path.display()))?;

    config.ensure_db_dir()?;
    let repository = Repository::open(&config.db_path)
        .await
        .with_context(|| format!("opening database {}", config.db_path))?;

    // Ctrl-C stops the run between rows
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let result = {
        let mut driver =
            IngestionDriver::new(&repository, ConsoleProgress, config.ingest_options())?;
        driver.run(BufReader::new(input), &cancel_rx).await
    };

    let mut report = match result {
        Ok(report) => report,
        Err(e) => {
            repository.close().await.ok();
            return Err(e).context("ingestion failed");
        }
    };
    report.table_counts = repository.table_counts().await?;
    repository.close().await?;

    if let Some(path) = &config.report_path {
        report
            .write_json(Path::new(path))
            .with_context(|| format!("writing report to {path}"))?;
    }

    if report.cancelled {
        println!(
            "Cancelled after {} rows ({} written, {} failed)",
            report.rows_read, report.rows_written, report.rows_failed
        );
    } else {
        println!(
            "Finished populating database: {} rows written, {} failed",
            report.rows_written, report.rows_failed
        );
    }

    Ok(())
}
