//! Persistence of transformed batches
//!
//! A store keeps one table per source (`<source>_transformed`) plus the shared
//! `jobs` table every source is merged into. `job_id` is the key everywhere:
//! records already stored are filtered out before insert.

mod in_memory;
mod sqlite;

pub use in_memory::InMemoryJobStore;
pub use sqlite::SqliteJobStore;

use tracing::info;

use crate::domain::CanonicalJobRecord;
use crate::error::{PipelineError, Result};
use crate::metrics::StoreMetrics;
use crate::sources::SourceId;

/// Shared table all sources are merged into
pub const COMBINED_TABLE: &str = "jobs";

pub trait JobStore {
    /// Records whose `job_id` is not in `table` yet, in input order
    fn filter_new(&self, table: &str, records: Vec<CanonicalJobRecord>) -> Result<Vec<CanonicalJobRecord>>;

    /// Append records, ignoring any whose `job_id` is already stored.
    /// Returns the number of rows actually written.
    fn insert(&self, table: &str, records: &[CanonicalJobRecord]) -> Result<usize>;

    fn count(&self, table: &str) -> Result<usize>;
}

/// Table names are interpolated into SQL, so only plain identifiers are accepted
pub(crate) fn check_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PipelineError::InvalidTable(table.to_string()))
    }
}

/// Dedup a batch against the store and append what is new
pub fn persist(store: &dyn JobStore, source: SourceId, records: Vec<CanonicalJobRecord>) -> Result<usize> {
    persist_into(store, &source.table_name(), records)
}

/// Merge transformed batches into the shared table, in the order given
pub fn persist_combined(store: &dyn JobStore, records: Vec<CanonicalJobRecord>) -> Result<usize> {
    persist_into(store, COMBINED_TABLE, records)
}

fn persist_into(store: &dyn JobStore, table: &str, records: Vec<CanonicalJobRecord>) -> Result<usize> {
    let offered = records.len();
    let fresh = store.filter_new(table, records)?;
    let inserted = store.insert(table, &fresh)?;

    StoreMetrics::record_insert(table, inserted, offered - inserted);
    info!(
        "💾 {}: {} new of {} offered ({} already stored)",
        table,
        inserted,
        offered,
        offered - inserted
    );
    Ok(inserted)
}
