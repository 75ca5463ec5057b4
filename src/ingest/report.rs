use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

use super::seed::SeedOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Read,
    Parse,
    /// Loading a dimension table into the lookup cache failed.
    Lookup,
    Write,
}

/// One skipped or partially written row, kept for post-run auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub row: u64,
    pub stage: FailureStage,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub seeded: Vec<SeedOutcome>,
    pub rows_read: u64,
    pub rows_written: u64,
    pub rows_failed: u64,
    pub writes_failed: u64,
    pub cancelled: bool,
    pub failures: Vec<RowFailure>,
    pub table_counts: Vec<(&'static str, i64)>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            seeded: Vec::new(),
            rows_read: 0,
            rows_written: 0,
            rows_failed: 0,
            writes_failed: 0,
            cancelled: false,
            failures: Vec::new(),
            table_counts: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
