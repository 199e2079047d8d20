//! CSV ingest.
//!
//! This module turns the raw degree-day CSV (or the cleaned cache file) into
//! typed `Observation`s.
//!
//! Design goals:
//! - **Positional schema**: station = col 0, value = col 2, cumulative = col 3, date = col 5
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Verbatim records** so the cache reproduces rows exactly
//! - **Separation of concerns**: no outlier bounds or grouping here

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{
    AnalysisConfig, COL_CUMULATIVE, COL_DATE, COL_STATION, COL_VALUE, DateKey, MIN_COLUMNS, Observation, StationId,
};
use crate::error::AppError;
use crate::io::cache::cache_matches;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub station: Option<String>,
    pub message: String,
}

/// Where the rows were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Raw,
    Cache,
}

/// Ingest output: header + parsed observations (file order) + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub source: PathBuf,
    pub source_kind: SourceKind,
    pub header: StringRecord,
    pub observations: Vec<Observation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Pick the cache when it exists and was written under the same value
/// bounds (unless disabled or refreshing), else the raw input.
pub fn resolve_source(config: &AnalysisConfig) -> (PathBuf, SourceKind) {
    match &config.cache_path {
        Some(cache) if !config.refresh_cache && cache_matches(cache, &config.rules.bounds) => {
            (cache.clone(), SourceKind::Cache)
        }
        Some(cache) if !config.refresh_cache && cache.is_file() => {
            info!(path = %cache.display(), "cache was written under other bounds; rebuilding");
            (config.input_path.clone(), SourceKind::Raw)
        }
        _ => (config.input_path.clone(), SourceKind::Raw),
    }
}

/// Load whichever source `resolve_source` picks.
pub fn load_observations(config: &AnalysisConfig) -> Result<IngestedData, AppError> {
    let (path, kind) = resolve_source(config);
    match kind {
        SourceKind::Cache => info!(path = %path.display(), "reading cleaned cache"),
        SourceKind::Raw => info!(path = %path.display(), "reading raw input"),
    }
    read_csv(&path, kind)
}

/// Read and parse one CSV file.
///
/// The file handle is owned by the reader and released when this returns,
/// on success and on every error path.
pub fn read_csv(path: &Path, source_kind: SourceKind) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(file);

    let header = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    if header.len() < MIN_COLUMNS {
        return Err(AppError::input(format!(
            "CSV '{}' has {} columns; at least {MIN_COLUMNS} are required.",
            path.display(),
            header.len()
        )));
    }

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines, and the header occupies line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    station: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(record) {
            Ok(obs) => observations.push(obs),
            Err((station, message)) => {
                debug!(line, station = station.as_deref().unwrap_or("-"), %message, "skipping row");
                row_errors.push(RowError { line, station, message });
            }
        }
    }

    info!(
        rows_read,
        parsed = observations.len(),
        row_errors = row_errors.len(),
        "ingest finished"
    );

    Ok(IngestedData {
        source: path.to_path_buf(),
        source_kind,
        header,
        observations,
        row_errors,
        rows_read,
    })
}

/// Parse one record. On failure returns the station id (when known) and a message.
pub fn parse_row(record: StringRecord) -> Result<Observation, (Option<String>, String)> {
    if record.len() < MIN_COLUMNS {
        return Err((
            record.get(COL_STATION).map(|s| s.trim().to_string()),
            format!("Expected at least {MIN_COLUMNS} columns, found {}.", record.len()),
        ));
    }

    let station = get_required(&record, COL_STATION, "station").map_err(|e| (None, e))?.to_string();
    let with_station = |e: String| (Some(station.clone()), e);

    let date = get_required(&record, COL_DATE, "date").map_err(with_station)?.to_string();
    let value = parse_f64(&record, COL_VALUE, "degree-day value").map_err(with_station)?;
    let cumulative = parse_f64(&record, COL_CUMULATIVE, "cumulative value").map_err(with_station)?;

    Ok(Observation {
        station: StationId::new(station),
        date: DateKey::new(date),
        value,
        cumulative,
        record,
    })
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}` (column {idx})"))
}

fn parse_f64(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = get_required(record, idx, name)?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid {name} '{raw}' (not a number)."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite {name} '{raw}'."));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::cache::bounds_sidecar_path;

    fn rec(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn parse_row_reads_positional_columns() {
        let obs = parse_row(rec(&["S1", "x", "5.5", "105.5", "y", "2020-01-01"])).unwrap();
        assert_eq!(obs.station.as_str(), "S1");
        assert_eq!(obs.date.as_str(), "2020-01-01");
        assert_eq!(obs.value, 5.5);
        assert_eq!(obs.cumulative, 105.5);
    }

    #[test]
    fn malformed_value_is_a_row_error() {
        let (station, msg) = parse_row(rec(&["S1", "x", "n/a", "1", "y", "2020-01-01"])).unwrap_err();
        assert_eq!(station.as_deref(), Some("S1"));
        assert!(msg.contains("not a number"));
    }

    #[test]
    fn short_row_is_a_row_error() {
        let (station, _) = parse_row(rec(&["S1", "x", "5"])).unwrap_err();
        assert_eq!(station.as_deref(), Some("S1"));
    }

    #[test]
    fn read_csv_skips_bad_rows_and_keeps_going() {
        let path = std::env::temp_dir().join(format!("dd_ingest_{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "station,name,value,cum,unit,date\n\
             S1,a,5,5,dd,2020-01-01\n\
             S1,a,abc,5,dd,2020-01-02\n\
             S2,b,7,7,dd,2020-01-01\n",
        )
        .unwrap();

        let data = read_csv(&path, SourceKind::Raw).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(data.rows_read, 3);
        assert_eq!(data.observations.len(), 2);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 3);
        assert_eq!(data.header.get(5), Some("date"));
    }

    #[test]
    fn missing_input_is_fatal() {
        let err = read_csv(Path::new("/definitely/not/here.csv"), SourceKind::Raw).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn cache_is_preferred_when_present() {
        let cache = std::env::temp_dir().join(format!("dd_resolve_{}.csv", std::process::id()));
        let sidecar = bounds_sidecar_path(&cache);
        std::fs::write(&cache, "a,b,c,d,e,f\n").unwrap();
        std::fs::write(&sidecar, r#"{"min": 1.0, "max": 27.0}"#).unwrap();

        let mut config = AnalysisConfig::new("raw.csv");
        config.cache_path = Some(cache.clone());
        let default_bounds = resolve_source(&config).1;

        config.rules.bounds.max = 25.0;
        let other_bounds = resolve_source(&config).1;

        config.rules.bounds.max = 27.0;
        config.refresh_cache = true;
        let refreshed = resolve_source(&config);

        std::fs::remove_file(&cache).ok();
        std::fs::remove_file(&sidecar).ok();

        assert_eq!(default_bounds, SourceKind::Cache);
        assert_eq!(other_bounds, SourceKind::Raw);
        assert_eq!(refreshed, (PathBuf::from("raw.csv"), SourceKind::Raw));
    }
}
