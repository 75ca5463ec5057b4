use serde::Serialize;
use tracing::{info, warn};

use crate::db::{SqlValue, Statement, Store};
use crate::error::Result;
use crate::models::{day_name, is_weekend, Category, Classification, Rank, WEEK};

/// One vocabulary entry plus any extra columns it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedValue {
    pub label: &'static str,
    pub attributes: Vec<(&'static str, SqlValue)>,
}

impl SeedValue {
    fn plain(label: &'static str) -> Self {
        Self {
            label,
            attributes: Vec::new(),
        }
    }
}

/// A static dimension table and the values it must contain.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionTable {
    pub table: &'static str,
    pub column: &'static str,
    pub values: Vec<SeedValue>,
}

impl DimensionTable {
    pub fn days() -> Self {
        Self {
            table: "day",
            column: "name",
            values: WEEK
                .iter()
                .map(|day| SeedValue {
                    label: day_name(*day),
                    attributes: vec![("is_weekend", SqlValue::from(is_weekend(*day)))],
                })
                .collect(),
        }
    }

    pub fn categories() -> Self {
        Self {
            table: "category",
            column: "name",
            values: Category::ALL
                .iter()
                .map(|c| SeedValue::plain(c.name()))
                .collect(),
        }
    }

    pub fn ranks() -> Self {
        Self {
            table: "rank",
            column: "description",
            values: Rank::ALL.iter().map(|r| SeedValue::plain(r.label())).collect(),
        }
    }

    pub fn classifications() -> Self {
        Self {
            table: "classification",
            column: "description",
            values: Classification::ALL
                .iter()
                .map(|c| SeedValue::plain(c.label()))
                .collect(),
        }
    }

    pub fn all() -> [Self; 4] {
        [
            Self::days(),
            Self::categories(),
            Self::ranks(),
            Self::classifications(),
        ]
    }

    fn exists_statement(&self, value: &SeedValue) -> Statement {
        Statement::new(format!(
            "SELECT COUNT(1) FROM {} WHERE {} = ?1",
            self.table, self.column
        ))
        .bind(value.label)
    }

    fn insert_statement(&self, value: &SeedValue) -> Statement {
        let mut columns = vec![self.column];
        columns.extend(value.attributes.iter().map(|(column, _)| *column));

        let mut stmt = Statement::insert(self.table, &columns).bind(value.label);
        for (_, attribute) in &value.attributes {
            stmt = stmt.bind(attribute.clone());
        }
        stmt
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    pub table: &'static str,
    pub inserted: usize,
    pub existing: usize,
    pub failed: usize,
}

pub struct DimensionSeeder;

impl DimensionSeeder {
    /// Inserts every value of `dimension` that is not there yet.
    ///
    /// A failed check or insert is logged and skipped; only connection
    /// failures abort the seeding.
    pub async fn seed<S: Store + ?Sized>(
        store: &S,
        dimension: &DimensionTable,
    ) -> Result<SeedOutcome> {
        let mut outcome = SeedOutcome {
            table: dimension.table,
            ..Default::default()
        };

        for value in &dimension.values {
            let present = match store.query_scalar(dimension.exists_statement(value)).await {
                Ok(count) => count > 0,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(table = dimension.table, value = value.label, error = %e, "existence check failed, skipping");
                    outcome.failed += 1;
                    continue;
                }
            };

            if present {
                outcome.existing += 1;
                continue;
            }

            match store.execute(dimension.insert_statement(value)).await {
                Ok(_) => outcome.inserted += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(table = dimension.table, value = value.label, error = %e, "seed insert failed, skipping");
                    outcome.failed += 1;
                }
            }
        }

        info!(
            table = outcome.table,
            inserted = outcome.inserted,
            existing = outcome.existing,
            failed = outcome.failed,
            "seeded dimension table"
        );
        Ok(outcome)
    }

    pub async fn seed_all<S: Store + ?Sized>(store: &S) -> Result<Vec<SeedOutcome>> {
        let mut outcomes = Vec::with_capacity(4);
        for dimension in DimensionTable::all() {
            outcomes.push(Self::seed(store, &dimension).await?);
        }
        Ok(outcomes)
    }
}
