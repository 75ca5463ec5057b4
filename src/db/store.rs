use std::fmt;

use async_trait::async_trait;

use crate::error::Result;

/// A value bound to a positional `?N` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Integer(i64::from(v))
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

/// SQL text plus its bound parameters. Field values never end up in `sql`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// `INSERT INTO table (a, b, c) VALUES (?1, ?2, ?3)` for the given columns.
    pub fn insert(table: &str, columns: &[&str]) -> Self {
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            columns.join(", ")
        ))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} params]", self.sql, self.params.len())
    }
}

/// The storage backend as seen by the ingestion core.
#[async_trait]
pub trait Store: Send + Sync {
    /// Runs a write and returns the id generated for the inserted row.
    async fn execute(&self, statement: Statement) -> Result<i64>;

    async fn query_scalar(&self, statement: Statement) -> Result<i64>;

    /// Runs a two-column `(id, name)` select.
    async fn query_rows(&self, statement: Statement) -> Result<Vec<(i64, String)>>;
}
