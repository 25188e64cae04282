use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::{check_table_name, JobStore};
use crate::domain::CanonicalJobRecord;
use crate::error::{PipelineError, Result};

#[derive(Default)]
struct Table {
    ids: HashSet<String>,
    rows: Vec<CanonicalJobRecord>,
}

/// In-memory store for tests and dry runs
#[derive(Clone, Default)]
pub struct InMemoryJobStore {
    tables: Arc<Mutex<HashMap<String, Table>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Table>>> {
        self.tables
            .lock()
            .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))
    }

    /// Copy of everything stored in `table`, in insertion order
    pub fn rows(&self, table: &str) -> Result<Vec<CanonicalJobRecord>> {
        let tables = self.lock()?;
        Ok(tables.get(table).map(|t| t.rows.clone()).unwrap_or_default())
    }
}

impl JobStore for InMemoryJobStore {
    fn filter_new(&self, table: &str, records: Vec<CanonicalJobRecord>) -> Result<Vec<CanonicalJobRecord>> {
        check_table_name(table)?;
        let tables = self.lock()?;
        let Some(existing) = tables.get(table) else {
            return Ok(records);
        };
        Ok(records
            .into_iter()
            .filter(|r| !existing.ids.contains(&r.job_id))
            .collect())
    }

    fn insert(&self, table: &str, records: &[CanonicalJobRecord]) -> Result<usize> {
        check_table_name(table)?;
        let mut tables = self.lock()?;
        let entry = tables.entry(table.to_string()).or_default();

        let mut inserted = 0;
        for record in records {
            if entry.ids.insert(record.job_id.clone()) {
                entry.rows.push(record.clone());
                inserted += 1;
            }
        }
        debug!("Inserted {} rows into in-memory table {}", inserted, table);
        Ok(inserted)
    }

    fn count(&self, table: &str) -> Result<usize> {
        let tables = self.lock()?;
        Ok(tables.get(table).map(|t| t.rows.len()).unwrap_or(0))
    }
}
