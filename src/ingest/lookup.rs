use std::collections::HashMap;

use tracing::{debug, warn};

use crate::db::{Statement, Store};
use crate::error::Result;
use crate::models::Dimension;

/// Id written for a dimension value that could not be resolved.
pub const UNRESOLVED_ID: i64 = 0;

/// Name to id mapping for the day and category tables.
///
/// Each dimension is loaded from storage in full the first time it is asked
/// for and never reloaded; the tables are static once seeding is done.
#[derive(Debug, Default)]
pub struct LookupCache {
    tables: HashMap<Dimension, HashMap<String, i64>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve<S: Store + ?Sized>(
        &mut self,
        store: &S,
        dimension: Dimension,
        name: &str,
    ) -> Result<i64> {
        if !self.tables.contains_key(&dimension) {
            let entries = Self::hydrate(store, dimension).await?;
            self.tables.insert(dimension, entries);
        }

        match self.tables.get(&dimension).and_then(|t| t.get(name)) {
            Some(id) => Ok(*id),
            None => {
                warn!(
                    table = dimension.table(),
                    value = name,
                    "dimension value not found, using unresolved id"
                );
                Ok(UNRESOLVED_ID)
            }
        }
    }

    #[cfg(test)]
    pub fn is_hydrated(&self, dimension: Dimension) -> bool {
        self.tables.contains_key(&dimension)
    }

    async fn hydrate<S: Store + ?Sized>(
        store: &S,
        dimension: Dimension,
    ) -> Result<HashMap<String, i64>> {
        let rows = store
            .query_rows(Statement::new(dimension.lookup_sql()))
            .await?;

        let mut entries = HashMap::with_capacity(rows.len());
        for (id, name) in rows {
            entries.entry(name).or_insert(id);
        }
        debug!(
            table = dimension.table(),
            entries = entries.len(),
            "hydrated lookup cache"
        );
        Ok(entries)
    }
}
