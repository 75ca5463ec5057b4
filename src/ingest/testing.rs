//! Fixtures and store wrappers shared by the ingest tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Weekday;
use csv::StringRecord;

use crate::db::{Repository, Statement, Store};
use crate::error::{AppError, Result};
use crate::models::Category;

use super::columns::{field_offset, CATEGORY_GROUP, COLUMNS, DAY_GROUP};

/// A well-formed data row. Every numeric field holds its own offset, one-hot
/// groups are all zero.
pub struct RowFixture {
    fields: Vec<String>,
}

impl RowFixture {
    pub fn new() -> Self {
        let flags: Vec<&str> = CATEGORY_GROUP
            .iter()
            .map(|(_, c)| *c)
            .chain(DAY_GROUP.iter().map(|(_, c)| *c))
            .chain(["is_weekend"])
            .collect();

        let fields = COLUMNS
            .iter()
            .enumerate()
            .map(|(offset, name)| match *name {
                "url" => "http://mashable.com/2013/01/07/amazon-instant-video-browser/".to_string(),
                n if flags.contains(&n) => "0.0".to_string(),
                _ => offset.to_string(),
            })
            .collect();
        Self { fields }
    }

    pub fn set(mut self, name: &str, value: &str) -> Self {
        let offset = field_offset(name).unwrap();
        self.fields[offset] = value.to_string();
        self
    }

    pub fn category(self, category: Category) -> Self {
        let (_, column) = CATEGORY_GROUP.iter().find(|(c, _)| *c == category).unwrap();
        self.set(column, "1.0")
    }

    pub fn day(self, day: Weekday) -> Self {
        let (_, column) = DAY_GROUP.iter().find(|(d, _)| *d == day).unwrap();
        self.set(column, "1.0")
    }

    pub fn record(&self) -> StringRecord {
        StringRecord::from(self.fields.clone())
    }

    pub fn line(&self) -> String {
        self.fields.join(", ")
    }
}

/// Header line followed by the given rows, as read from disk.
pub fn csv_input(rows: &[RowFixture]) -> String {
    let mut input = COLUMNS.join(", ");
    input.push('\n');
    for row in rows {
        input.push_str(&row.line());
        input.push('\n');
    }
    input
}

/// Counts hydration queries.
pub struct CountingStore {
    inner: Repository,
    query_rows_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Repository) -> Self {
        Self {
            inner,
            query_rows_calls: AtomicUsize::new(0),
        }
    }

    pub fn query_rows_calls(&self) -> usize {
        self.query_rows_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for CountingStore {
    async fn execute(&self, statement: Statement) -> Result<i64> {
        self.inner.execute(statement).await
    }

    async fn query_scalar(&self, statement: Statement) -> Result<i64> {
        self.inner.query_scalar(statement).await
    }

    async fn query_rows(&self, statement: Statement) -> Result<Vec<(i64, String)>> {
        self.query_rows_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.query_rows(statement).await
    }
}

/// Fails any statement that starts with `prefix` and matches `when`.
pub struct FailingStore {
    inner: Repository,
    prefix: &'static str,
    when: fn(&Statement) -> bool,
    fatal: bool,
}

impl FailingStore {
    pub fn new(inner: Repository, prefix: &'static str, when: fn(&Statement) -> bool) -> Self {
        Self {
            inner,
            prefix,
            when,
            fatal: false,
        }
    }

    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    fn fails(&self, statement: &Statement) -> bool {
        statement.sql.starts_with(self.prefix) && (self.when)(statement)
    }

    fn injected(&self) -> AppError {
        if self.fatal {
            AppError::Connection("connection reset".into())
        } else {
            AppError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
                Some("injected failure".into()),
            ))
        }
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn execute(&self, statement: Statement) -> Result<i64> {
        if self.fails(&statement) {
            return Err(self.injected());
        }
        self.inner.execute(statement).await
    }

    async fn query_scalar(&self, statement: Statement) -> Result<i64> {
        if self.fails(&statement) {
            return Err(self.injected());
        }
        self.inner.query_scalar(statement).await
    }

    async fn query_rows(&self, statement: Statement) -> Result<Vec<(i64, String)>> {
        if self.fails(&statement) {
            return Err(self.injected());
        }
        self.inner.query_rows(statement).await
    }
}
