//! Cleaned-row cache.
//!
//! After cleaning, the surviving rows are written back with the original
//! header so later runs can skip the raw file. The cache is a pure speed-up:
//! re-cleaning it yields exactly the same rows in the same order.
//!
//! The value bounds used for the filter are stored in a JSON sidecar
//! (`<cache>.bounds.json`). A cache is only reused under the same bounds.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{Observation, ValueBounds};
use crate::error::AppError;

/// Sidecar path holding the bounds a cache was written with.
pub fn bounds_sidecar_path(cache: &Path) -> PathBuf {
    let mut name = OsString::from(cache.as_os_str());
    name.push(".bounds.json");
    PathBuf::from(name)
}

/// Bounds recorded next to `cache`, if the sidecar exists and parses.
pub fn read_cache_bounds(cache: &Path) -> Option<ValueBounds> {
    let path = bounds_sidecar_path(cache);
    let file = File::open(&path).ok()?;
    match serde_json::from_reader(file) {
        Ok(bounds) => Some(bounds),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "unreadable cache sidecar");
            None
        }
    }
}

/// Whether `cache` exists and was filtered with exactly `bounds`.
pub fn cache_matches(cache: &Path, bounds: &ValueBounds) -> bool {
    cache.is_file() && read_cache_bounds(cache).as_ref() == Some(bounds)
}

/// Write `header` plus the verbatim record of every observation, then the
/// bounds sidecar.
pub fn write_cache(
    path: &Path,
    header: &StringRecord,
    observations: &[Observation],
    bounds: &ValueBounds,
) -> Result<(), AppError> {
    // The sidecar is written last; a cache without one is never read.
    let sidecar = bounds_sidecar_path(path);
    if sidecar.exists() {
        std::fs::remove_file(&sidecar)
            .map_err(|e| AppError::input(format!("Failed to remove '{}': {e}", sidecar.display())))?;
    }

    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create cache '{}': {e}", path.display())))?;

    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);

    writer
        .write_record(header)
        .map_err(|e| AppError::input(format!("Failed to write cache header: {e}")))?;
    for obs in observations {
        writer
            .write_record(&obs.record)
            .map_err(|e| AppError::input(format!("Failed to write cache row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush cache '{}': {e}", path.display())))?;
    drop(writer);

    let file = File::create(&sidecar)
        .map_err(|e| AppError::input(format!("Failed to create '{}': {e}", sidecar.display())))?;
    serde_json::to_writer_pretty(file, bounds)
        .map_err(|e| AppError::input(format!("Failed to write '{}': {e}", sidecar.display())))?;

    info!(path = %path.display(), rows = observations.len(), "cache written");
    Ok(())
}
