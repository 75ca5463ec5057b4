use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::db::Store;
use crate::error::{AppError, Result};

use super::columns::check_header;
use super::expand::RecordExpander;
use super::lookup::LookupCache;
use super::progress::ProgressObserver;
use super::report::{FailureStage, RowFailure, RunReport};
use super::seed::DimensionSeeder;
use super::writer::{RowWriter, WritePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Seeding,
    Streaming,
    Finished,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub write_policy: WritePolicy,
    pub progress_interval: u64,
    pub milestone_interval: u64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            write_policy: WritePolicy::default(),
            progress_interval: 10,
            milestone_interval: 1000,
        }
    }
}

/// Owns the row loop: seeds the dimension tables, then streams the CSV one
/// row at a time. All writes for a row finish before the next row is read.
pub struct IngestionDriver<'s, S: Store + ?Sized, O: ProgressObserver> {
    store: &'s S,
    expander: RecordExpander,
    writer: RowWriter,
    cache: LookupCache,
    observer: O,
    options: IngestOptions,
    state: RunState,
}

impl<'s, S: Store + ?Sized, O: ProgressObserver> IngestionDriver<'s, S, O> {
    pub fn new(store: &'s S, observer: O, options: IngestOptions) -> Result<Self> {
        Ok(Self {
            store,
            expander: RecordExpander::new()?,
            writer: RowWriter::new(options.write_policy),
            cache: LookupCache::new(),
            observer,
            options,
            state: RunState::NotStarted,
        })
    }

    #[allow(dead_code)]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs seeding and streaming to completion. `cancel` is checked between
    /// rows; a cancelled run still returns its report.
    pub async fn run<R: Read>(
        &mut self,
        input: R,
        cancel: &watch::Receiver<bool>,
    ) -> Result<RunReport> {
        let mut report = RunReport::start();

        self.state = RunState::Seeding;
        info!("seeding dimension tables");
        report.seeded = match DimensionSeeder::seed_all(self.store).await {
            Ok(outcomes) => outcomes,
            Err(e) => return Err(self.fail(e)),
        };

        self.state = RunState::Streaming;
        info!(policy = ?self.writer.policy(), "streaming rows");
        if let Err(e) = self.stream(input, cancel, &mut report).await {
            return Err(self.fail(e));
        }

        report.finish();
        self.state = RunState::Finished;
        info!(
            rows_read = report.rows_read,
            rows_written = report.rows_written,
            rows_failed = report.rows_failed,
            cancelled = report.cancelled,
            "ingestion finished"
        );
        Ok(report)
    }

    fn fail(&mut self, err: AppError) -> AppError {
        error!(state = ?self.state, error = %err, "ingestion failed");
        self.state = RunState::Failed;
        err
    }

    async fn stream<R: Read>(
        &mut self,
        input: R,
        cancel: &watch::Receiver<bool>,
        report: &mut RunReport,
    ) -> Result<()> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);
        check_header(reader.headers()?.len())?;

        let mut record = StringRecord::new();
        let mut row: u64 = 0;
        loop {
            if *cancel.borrow() {
                warn!(rows = row, "ingestion cancelled");
                report.cancelled = true;
                break;
            }

            match reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    row += 1;
                    report.rows_read += 1;
                    self.process(row, &record, report).await?;
                }
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    row += 1;
                    report.rows_read += 1;
                    self.record_failure(report, row, FailureStage::Read, e.to_string());
                }
            }

            self.notify(row);
        }
        Ok(())
    }

    async fn process(&mut self, row: u64, record: &StringRecord, report: &mut RunReport) -> Result<()> {
        let expanded = match self.expander.expand(record, &mut self.cache, self.store).await {
            Ok(expanded) => expanded,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                let stage = match e {
                    AppError::RowFormat(_) => FailureStage::Parse,
                    _ => FailureStage::Lookup,
                };
                self.record_failure(report, row, stage, e.to_string());
                return Ok(());
            }
        };

        let outcome = match self.writer.write(self.store, &expanded).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(row, error = %e, "row write aborted the run");
                return Err(e);
            }
        };

        report.writes_failed += outcome.failures.len() as u64;
        if outcome.is_complete() {
            debug!(row, writes = outcome.written, "row written");
            report.rows_written += 1;
            return Ok(());
        }

        report.rows_failed += 1;
        for failure in &outcome.failures {
            let failure = RowFailure {
                row,
                stage: FailureStage::Write,
                message: format!("{}: {}", failure.intent, failure.message),
            };
            self.observer.on_row_failed(&failure);
            report.failures.push(failure);
        }
        Ok(())
    }

    fn record_failure(&mut self, report: &mut RunReport, row: u64, stage: FailureStage, message: String) {
        warn!(row, stage = ?stage, %message, "skipping row");
        let failure = RowFailure {
            row,
            stage,
            message,
        };
        self.observer.on_row_failed(&failure);
        report.rows_failed += 1;
        report.failures.push(failure);
    }

    fn notify(&mut self, row: u64) {
        if self.options.progress_interval > 0 && row % self.options.progress_interval == 0 {
            self.observer.on_progress(row);
        }
        if self.options.milestone_interval > 0 && row % self.options.milestone_interval == 0 {
            self.observer.on_milestone(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::Weekday;

    use super::*;
    use crate::db::{Repository, Statement};
    use crate::error::SchemaError;
    use crate::ingest::testing::{csv_input, FailingStore, RowFixture};
    use crate::models::Category;

    #[derive(Default)]
    struct Recorder {
        progress: Vec<u64>,
        milestones: Vec<u64>,
        failed_rows: Vec<u64>,
    }

    impl ProgressObserver for Recorder {
        fn on_progress(&mut self, rows: u64) {
            self.progress.push(rows);
        }

        fn on_milestone(&mut self, rows: u64) {
            self.milestones.push(rows);
        }

        fn on_row_failed(&mut self, failure: &RowFailure) {
            self.failed_rows.push(failure.row);
        }
    }

    fn not_cancelled() -> watch::Receiver<bool> {
        watch::channel(false).1
    }

    async fn run_input<S: Store + ?Sized>(
        store: &S,
        input: String,
        options: IngestOptions,
    ) -> (Result<RunReport>, RunState, Recorder) {
        let mut driver = IngestionDriver::new(store, Recorder::default(), options).unwrap();
        let result = driver.run(Cursor::new(input), &not_cancelled()).await;
        let state = driver.state();
        let IngestionDriver { observer, .. } = driver;
        (result, state, observer)
    }

    #[tokio::test]
    async fn loads_one_article_end_to_end() {
        let repo = Repository::open_in_memory().await.unwrap();
        let row = RowFixture::new()
            .category(Category::Entertainment)
            .day(Weekday::Wed)
            .set("shares", "1200");

        let (result, state, _) = run_input(&repo, csv_input(&[row]), IngestOptions::default()).await;
        let report = result.unwrap();

        assert_eq!(state, RunState::Finished);
        assert_eq!(report.rows_read, 1);
        assert_eq!(report.rows_written, 1);
        assert_eq!(report.rows_failed, 0);

        let category = repo
            .query_rows(Statement::new(
                "SELECT a.shares, c.name FROM article a JOIN category c ON c.id = a.category_id",
            ))
            .await
            .unwrap();
        assert_eq!(category, vec![(1200, "Entertainment".to_string())]);

        let day = repo
            .query_rows(Statement::new(
                "SELECT a.shares, d.name FROM article a JOIN day d ON d.id = a.day_id",
            ))
            .await
            .unwrap();
        assert_eq!(day, vec![(1200, "Wednesday".to_string())]);

        let shares = repo
            .query_rows(Statement::new(
                "SELECT CAST(n_shares AS INTEGER), rank || '/' || classification FROM share ORDER BY id",
            ))
            .await
            .unwrap();
        let expected: Vec<(i64, String)> = [
            "worst/minimum",
            "worst/maximum",
            "worst/average",
            "best/minimum",
            "best/maximum",
            "best/average",
            "average/minimum",
            "average/maximum",
            "average/average",
        ]
        .iter()
        .zip(19..)
        .map(|(label, offset)| (offset, label.to_string()))
        .collect();
        assert_eq!(shares, expected);
    }

    #[tokio::test]
    async fn rerunning_keeps_dimension_ids_stable() {
        let repo = Repository::open_in_memory().await.unwrap();
        let dimensions = "SELECT id, name FROM day UNION ALL SELECT id, name FROM category ORDER BY 2";

        let (first, _, _) = run_input(&repo, csv_input(&[]), IngestOptions::default()).await;
        first.unwrap();
        let before = repo.query_rows(Statement::new(dimensions)).await.unwrap();

        let (second, _, _) = run_input(&repo, csv_input(&[]), IngestOptions::default()).await;
        let second = second.unwrap();
        let after = repo.query_rows(Statement::new(dimensions)).await.unwrap();

        assert_eq!(before.len(), 13);
        assert_eq!(before, after);
        assert!(second.seeded.iter().all(|s| s.inserted == 0));
    }

    #[tokio::test]
    async fn reports_progress_and_milestones() {
        let repo = Repository::open_in_memory().await.unwrap();
        let rows: Vec<RowFixture> = (0..25).map(|_| RowFixture::new()).collect();
        let options = IngestOptions {
            progress_interval: 10,
            milestone_interval: 20,
            ..IngestOptions::default()
        };

        let (result, _, recorder) = run_input(&repo, csv_input(&rows), options).await;

        assert_eq!(result.unwrap().rows_written, 25);
        assert_eq!(recorder.progress, vec![10, 20]);
        assert_eq!(recorder.milestones, vec![20]);
        assert_eq!(repo.count_rows("article").await.unwrap(), 25);
        assert_eq!(repo.count_rows("polarity").await.unwrap(), 150);
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let repo = Repository::open_in_memory().await.unwrap();
        let mut input = csv_input(&[RowFixture::new()]);
        input.push_str(&RowFixture::new().set("num_hrefs", "n/a").line());
        input.push_str("\nhttp://mashable.com/short, 1.0, 2.0\n");
        input.push_str(&RowFixture::new().line());
        input.push('\n');

        let (result, state, recorder) = run_input(&repo, input, IngestOptions::default()).await;
        let report = result.unwrap();

        assert_eq!(state, RunState::Finished);
        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_written, 2);
        assert_eq!(report.rows_failed, 2);
        assert_eq!(recorder.failed_rows, vec![2, 3]);
        assert!(report.failures[0].message.contains("num_hrefs"));
        assert!(report.failures.iter().all(|f| f.stage == FailureStage::Parse));
        assert_eq!(repo.count_rows("article").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn empty_one_hot_groups_store_the_unresolved_id() {
        let repo = Repository::open_in_memory().await.unwrap();

        let (result, state, _) =
            run_input(&repo, csv_input(&[RowFixture::new()]), IngestOptions::default()).await;
        let report = result.unwrap();

        assert_eq!(state, RunState::Finished);
        assert_eq!(report.rows_written, 1);
        assert!(report.failures.is_empty());
        let ids = repo
            .query_rows(Statement::new(
                "SELECT category_id, CAST(day_id AS TEXT) FROM article",
            ))
            .await
            .unwrap();
        assert_eq!(ids, vec![(0, "0".to_string())]);
        assert_eq!(repo.count_rows("polarity").await.unwrap(), 6);
    }

    #[tokio::test]
    async fn non_finite_value_fails_at_parse_stage() {
        let repo = Repository::open_in_memory().await.unwrap();
        let input = csv_input(&[RowFixture::new().set("num_imgs", "NaN"), RowFixture::new()]);

        let (result, _, _) = run_input(&repo, input, IngestOptions::default()).await;
        let report = result.unwrap();

        assert_eq!(report.rows_written, 1);
        assert_eq!(report.rows_failed, 1);
        assert_eq!(report.failures[0].stage, FailureStage::Parse);
        assert!(report.failures[0].message.contains("num_imgs"));
        assert_eq!(repo.count_rows("digital_media").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn undecodable_record_is_counted_as_read() {
        let repo = Repository::open_in_memory().await.unwrap();
        let mut input = csv_input(&[RowFixture::new()]).into_bytes();
        let mut bad = RowFixture::new().line().into_bytes();
        bad[0] = 0xFF;
        input.extend_from_slice(&bad);
        input.push(b'\n');
        input.extend_from_slice(RowFixture::new().line().as_bytes());
        input.push(b'\n');
        let mut driver =
            IngestionDriver::new(&repo, Recorder::default(), IngestOptions::default()).unwrap();

        let report = driver
            .run(Cursor::new(input), &not_cancelled())
            .await
            .unwrap();

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_written, 2);
        assert_eq!(report.rows_failed, 1);
        assert_eq!(report.failures[0].row, 2);
        assert_eq!(report.failures[0].stage, FailureStage::Read);
        assert_eq!(report.rows_read, report.rows_written + report.rows_failed);
    }

    #[tokio::test]
    async fn lookup_failure_is_reported_separately_from_parse_errors() {
        let repo = Repository::open_in_memory().await.unwrap();
        let store = FailingStore::new(repo, "SELECT id, name FROM category", |_| true);
        let input = csv_input(&[
            RowFixture::new().category(Category::World),
            RowFixture::new().set("num_hrefs", "n/a"),
        ]);

        let (result, state, _) = run_input(&store, input, IngestOptions::default()).await;
        let report = result.unwrap();

        assert_eq!(state, RunState::Finished);
        assert_eq!(report.rows_failed, 2);
        let stages: Vec<FailureStage> = report.failures.iter().map(|f| f.stage).collect();
        assert_eq!(stages, vec![FailureStage::Lookup, FailureStage::Parse]);
    }

    #[tokio::test]
    async fn header_width_mismatch_fails_the_run() {
        let repo = Repository::open_in_memory().await.unwrap();
        let input = "url, timedelta, shares\nhttp://x, 1, 2\n".to_string();

        let (result, state, _) = run_input(&repo, input, IngestOptions::default()).await;

        assert!(matches!(
            result,
            Err(AppError::Schema(SchemaError::ColumnCount { expected: 61, found: 3 }))
        ));
        assert_eq!(state, RunState::Failed);
        assert_eq!(repo.count_rows("article").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_write_is_recorded_and_run_continues() {
        let repo = Repository::open_in_memory().await.unwrap();
        let store = FailingStore::new(repo, "INSERT INTO digital_media", |_| true);
        let input = csv_input(&[RowFixture::new(), RowFixture::new()]);

        let (result, state, _) = run_input(&store, input, IngestOptions::default()).await;
        let report = result.unwrap();

        assert_eq!(state, RunState::Finished);
        assert_eq!(report.rows_failed, 2);
        assert_eq!(report.writes_failed, 2);
        assert_eq!(report.failures[0].stage, FailureStage::Write);
        assert!(report.failures[0].message.starts_with("insert digital_media"));
        let articles = store
            .query_scalar(Statement::new("SELECT COUNT(*) FROM article"))
            .await
            .unwrap();
        assert_eq!(articles, 0);
    }

    #[tokio::test]
    async fn abort_run_policy_stops_at_the_first_failure() {
        let repo = Repository::open_in_memory().await.unwrap();
        let store = FailingStore::new(repo, "INSERT INTO polarity", |_| true);
        let input = csv_input(&[RowFixture::new(), RowFixture::new()]);
        let options = IngestOptions {
            write_policy: WritePolicy::AbortRun,
            ..IngestOptions::default()
        };

        let (result, state, _) = run_input(&store, input, options).await;

        assert!(matches!(result, Err(AppError::Write { .. })));
        assert_eq!(state, RunState::Failed);
    }

    #[tokio::test]
    async fn connection_loss_during_seeding_is_fatal() {
        let repo = Repository::open_in_memory().await.unwrap();
        let store = FailingStore::new(repo, "INSERT INTO day", |_| true).fatal();

        let (result, state, _) =
            run_input(&store, csv_input(&[RowFixture::new()]), IngestOptions::default()).await;

        assert!(result.unwrap_err().is_fatal());
        assert_eq!(state, RunState::Failed);
    }

    #[tokio::test]
    async fn cancellation_is_checked_between_rows() {
        let repo = Repository::open_in_memory().await.unwrap();
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let mut driver =
            IngestionDriver::new(&repo, Recorder::default(), IngestOptions::default()).unwrap();

        let report = driver
            .run(Cursor::new(csv_input(&[RowFixture::new()])), &rx)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.rows_read, 0);
        assert_eq!(driver.state(), RunState::Finished);
        assert_eq!(repo.count_rows("day").await.unwrap(), 7);
        assert_eq!(repo.count_rows("article").await.unwrap(), 0);
    }
}
