use async_trait::async_trait;
use rusqlite::types::ToSqlOutput;
use rusqlite::{params_from_iter, ToSql};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};

use super::schema::{SCHEMA, TABLES};
use super::store::{SqlValue, Statement, Store};

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Integer(v) => ToSqlOutput::from(*v),
            SqlValue::Real(v) => ToSqlOutput::from(*v),
            SqlValue::Text(v) => ToSqlOutput::from(v.as_str()),
        })
    }
}

/// SQLite-backed [`Store`]. One connection, owned for the duration of a run.
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .await
            .map_err(|e| AppError::Connection(format!("cannot open {db_path}: {e}")))?;
        Self::init(conn).await
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            // Bundled SQLite enforces foreign keys by default; unresolved
            // dimensions are stored as id 0, which has no parent row.
            conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| AppError::Connection(e.to_string()))
    }

    pub async fn count_rows(&self, table: &'static str) -> Result<i64> {
        if !TABLES.contains(&table) {
            return Err(AppError::Config(format!("unknown table `{table}`")));
        }
        self.query_scalar(Statement::new(format!("SELECT COUNT(*) FROM {table}")))
            .await
    }

    /// Row counts for every table, parents first.
    pub async fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        let mut counts = Vec::with_capacity(TABLES.len());
        for table in TABLES {
            counts.push((table, self.count_rows(table).await?));
        }
        Ok(counts)
    }
}

#[async_trait]
impl Store for Repository {
    async fn execute(&self, statement: Statement) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(&statement.sql, params_from_iter(statement.params.iter()))?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    async fn query_scalar(&self, statement: Statement) -> Result<i64> {
        let value = self
            .conn
            .call(move |conn| {
                let value: i64 = conn.query_row(
                    &statement.sql,
                    params_from_iter(statement.params.iter()),
                    |row| row.get(0),
                )?;
                Ok(value)
            })
            .await?;
        Ok(value)
    }

    async fn query_rows(&self, statement: Statement) -> Result<Vec<(i64, String)>> {
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&statement.sql)?;
                let rows = stmt
                    .query_map(params_from_iter(statement.params.iter()), |row| {
                        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }
}
