use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::{Statement, Store};
use crate::error::{AppError, Result};
use crate::models::EntityKind;

use super::expand::ExpandedRow;

const SAVEPOINT: &str = "SAVEPOINT row_write";
const RELEASE: &str = "RELEASE SAVEPOINT row_write";
const ROLLBACK: &str = "ROLLBACK TO SAVEPOINT row_write";

/// What happens to a row when one of its inserts fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Keep going; records depending on a failed insert are skipped.
    #[serde(rename = "continue")]
    ContinueOnError,
    /// Roll the whole row back and move on to the next one.
    #[default]
    AbortRow,
    /// Roll the row back and stop the run.
    AbortRun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    pub intent: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowWrite {
    pub article_id: Option<i64>,
    pub language_id: Option<i64>,
    pub written: usize,
    pub skipped: usize,
    pub rolled_back: bool,
    pub failures: Vec<WriteFailure>,
}

impl RowWrite {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0 && !self.rolled_back
    }

    fn id_of(&self, kind: EntityKind) -> Option<i64> {
        match kind {
            EntityKind::Article => self.article_id,
            EntityKind::Language => self.language_id,
            _ => None,
        }
    }

    fn record_id(&mut self, kind: EntityKind, id: i64) {
        match kind {
            EntityKind::Article => self.article_id = Some(id),
            EntityKind::Language => self.language_id = Some(id),
            _ => {}
        }
    }
}

/// Issues the inserts of one expanded row, carrying generated ids forward.
pub struct RowWriter {
    policy: WritePolicy,
}

impl RowWriter {
    pub fn new(policy: WritePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    pub async fn write<S: Store + ?Sized>(&self, store: &S, row: &ExpandedRow) -> Result<RowWrite> {
        let atomic = self.policy != WritePolicy::ContinueOnError;
        if atomic {
            store.execute(Statement::new(SAVEPOINT)).await?;
        }

        let mut outcome = RowWrite::default();
        for write in row.writes() {
            let kind = write.kind();
            let parent_id = match kind.parent() {
                None => 0,
                Some(parent) => match outcome.id_of(parent) {
                    Some(id) => id,
                    None => {
                        warn!(intent = %write.intent(), "parent insert failed, skipping");
                        outcome.skipped += 1;
                        continue;
                    }
                },
            };

            match store.execute(write.statement(parent_id)).await {
                Ok(id) => {
                    outcome.written += 1;
                    outcome.record_id(kind, id);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    let intent = write.intent();
                    warn!(intent = %intent, error = %e, "insert failed");
                    outcome.failures.push(WriteFailure {
                        intent: intent.clone(),
                        message: e.to_string(),
                    });

                    if atomic {
                        store.execute(Statement::new(ROLLBACK)).await?;
                        store.execute(Statement::new(RELEASE)).await?;
                        outcome.rolled_back = true;
                        outcome.written = 0;
                        outcome.article_id = None;
                        outcome.language_id = None;

                        if self.policy == WritePolicy::AbortRun {
                            return Err(AppError::Write {
                                intent,
                                source: Box::new(e),
                            });
                        }
                        return Ok(outcome);
                    }
                }
            }
        }

        if atomic {
            store.execute(Statement::new(RELEASE)).await?;
        }
        Ok(outcome)
    }
}
