use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::domain::RawJobRecord;
use crate::error::Result;
use crate::sources::SourceId;

/// Read one extractor dump: a JSON array of objects.
pub fn read_raw_batch<P: AsRef<Path>>(path: P) -> Result<Vec<RawJobRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let batch: Vec<RawJobRecord> = serde_json::from_str(&content)?;
    debug!("Read {} raw records from {}", batch.len(), path.display());
    Ok(batch)
}

/// Find `<source>.json` dumps in a directory. Files for unknown sources are skipped.
pub fn discover_inputs<P: AsRef<Path>>(dir: P) -> Result<Vec<(SourceId, PathBuf)>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match stem.parse::<SourceId>() {
            Ok(source) => inputs.push((source, path)),
            Err(_) => warn!("Skipping {}: not a known source", path.display()),
        }
    }
    inputs.sort_by_key(|(source, _)| source.as_str());
    Ok(inputs)
}
