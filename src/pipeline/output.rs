use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::{CanonicalJobRecord, CANONICAL_COLUMNS};
use crate::error::Result;
use crate::metrics::StoreMetrics;
use crate::sources::SourceId;

/// Write records as CSV in the canonical column order. Missing values are empty cells.
pub fn write_csv<W: Write>(writer: W, records: &[CanonicalJobRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CANONICAL_COLUMNS)?;
    for record in records {
        csv.write_record(record.to_row())?;
    }
    csv.flush()?;
    Ok(())
}

/// Export a source's batch to `<dir>/<source>_transformed.csv`
pub fn export_batch(dir: &Path, source: SourceId, records: &[CanonicalJobRecord]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", source.table_name()));
    write_csv(File::create(&path)?, records)?;

    StoreMetrics::record_export(records.len());
    info!("📄 Wrote {} rows to {}", records.len(), path.display());
    Ok(path)
}
