//! # Persistence Module
//!
//! Output artifacts (the pricing CSV and the missing-ingredients JSON) are always
//! rewritten whole. Writes go to a temporary file in the destination directory
//! which is then renamed over the target, so readers see either the old or the
//! new file and never a half-written one.

use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::costing_errors::{CostingError, CostingResult};

fn persistence_error(path: &Path, message: impl ToString) -> CostingError {
    let error = CostingError::Persistence {
        path: path.to_path_buf(),
        message: message.to_string(),
    };
    warn!("{}", error);
    error
}

/// Atomically replace `path` with `contents`
pub fn write_atomic(path: &Path, contents: &[u8]) -> CostingResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| persistence_error(path, e))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| persistence_error(path, e))?;
    temp.write_all(contents)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| persistence_error(path, e))?;
    temp.persist(path).map_err(|e| persistence_error(path, e.error))?;

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Serialize `value` as pretty JSON and atomically replace `path`
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> CostingResult<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| persistence_error(path, e))?;
    write_atomic(path, &json)
}

/// Serialize rows as CSV (with header) and atomically replace `path`
pub fn write_csv_atomic<T: Serialize>(path: &Path, rows: &[T]) -> CostingResult<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(|e| persistence_error(path, e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| persistence_error(path, e.error()))?;
    write_atomic(path, &bytes)
}
