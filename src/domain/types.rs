//! Shared domain types.
//!
//! Station ids and dates are newtypes so the two indexes can't be mixed up,
//! and both order deterministically inside `BTreeMap`s.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lowest accepted degree-day value (inclusive).
pub const DEFAULT_MIN_VALUE: f64 = 1.0;
/// Highest accepted degree-day value (inclusive).
pub const DEFAULT_MAX_VALUE: f64 = 27.0;
/// Date buckets with fewer distinct stations than this are pruned.
pub const DEFAULT_MIN_STATIONS_PER_DATE: usize = 18;
/// Stations need at least this many observations to get a mean.
pub const DEFAULT_MIN_STATION_OBSERVATIONS: usize = 10_000;
/// Observation count every station total is extrapolated to.
pub const DEFAULT_REFERENCE_COUNT: usize = 10_640;

/// Column positions in the input CSV.
pub const COL_STATION: usize = 0;
pub const COL_VALUE: usize = 2;
pub const COL_CUMULATIVE: usize = 3;
pub const COL_DATE: usize = 5;
/// Rows shorter than this cannot carry every required column.
pub const MIN_COLUMNS: usize = COL_DATE + 1;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Observation date as it appears in the file.
///
/// The source format is sortable, so ordering is plain string ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    pub fn new(date: impl Into<String>) -> Self {
        Self(date.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric x-position for charts.
    ///
    /// Calendar dates map to days since the common era; purely numeric keys
    /// (e.g. `20200101`) are used as-is.
    pub fn chart_x(&self) -> Option<f64> {
        const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];
        let s = self.0.trim();
        for fmt in FMTS {
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return Some(d.num_days_from_ce() as f64);
            }
        }
        s.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DateKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One parsed CSV row.
///
/// `record` keeps the original fields so the cache file reproduces the row
/// exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub station: StationId,
    pub date: DateKey,
    pub value: f64,
    pub cumulative: f64,
    pub record: StringRecord,
}

/// One entry of a station's series, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    pub date: DateKey,
    pub value: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationSeries {
    pub entries: Vec<SeriesEntry>,
}

impl StationSeries {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cumulative value of the last entry in file order.
    pub fn last_cumulative(&self) -> Option<f64> {
        self.entries.last().map(|e| e.cumulative)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.value)
    }
}

/// All `(station, value)` pairs reported on one date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateBucket {
    pub entries: Vec<(StationId, f64)>,
}

impl DateBucket {
    pub fn distinct_stations(&self) -> usize {
        let mut ids: Vec<&StationId> = self.entries.iter().map(|(s, _)| s).collect();
        ids.sort();
        ids.dedup();
        ids.len()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }
}

/// Inclusive range of accepted degree-day values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueBounds {
    pub min: f64,
    pub max: f64,
}

impl ValueBounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for ValueBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_VALUE,
            max: DEFAULT_MAX_VALUE,
        }
    }
}

/// Filtering and threshold rules applied by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub bounds: ValueBounds,
    pub min_stations_per_date: usize,
    pub min_station_observations: usize,
    pub reference_count: usize,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            bounds: ValueBounds::default(),
            min_stations_per_date: DEFAULT_MIN_STATIONS_PER_DATE,
            min_station_observations: DEFAULT_MIN_STATION_OBSERVATIONS,
            reference_count: DEFAULT_REFERENCE_COUNT,
        }
    }
}

impl RuleSet {
    pub fn validate(&self) -> Result<(), AppError> {
        let ValueBounds { min, max } = self.bounds;
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(AppError::input(format!(
                "Invalid value bounds [{min}, {max}]: need finite bounds with min < max."
            )));
        }
        if self.min_stations_per_date == 0 {
            return Err(AppError::input("--min-stations-per-date must be > 0."));
        }
        if self.min_station_observations == 0 {
            return Err(AppError::input("--min-station-observations must be > 0."));
        }
        if self.reference_count == 0 {
            return Err(AppError::input("--reference-count must be > 0."));
        }
        Ok(())
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    /// `None` disables both reading and writing the cache.
    pub cache_path: Option<PathBuf>,
    /// Ignore an existing cache and rebuild it from the raw input.
    pub refresh_cache: bool,
    pub rules: RuleSet,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_json: Option<PathBuf>,
    pub export_normalized: Option<PathBuf>,
}

impl AnalysisConfig {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            cache_path: None,
            refresh_cache: false,
            rules: RuleSet::default(),
            plot: false,
            plot_width: 100,
            plot_height: 25,
            export_json: None,
            export_normalized: None,
        }
    }

    /// Check the rules, and that the cache can never overwrite the input.
    pub fn validate(&self) -> Result<(), AppError> {
        self.rules.validate()?;
        if let Some(cache) = &self.cache_path {
            if same_file(cache, &self.input_path) {
                return Err(AppError::input(format!(
                    "Cache path '{}' is the input file; pick another --cache or use --no-cache.",
                    cache.display()
                )));
            }
        }
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let b = ValueBounds::default();
        assert!(b.contains(1.0));
        assert!(b.contains(27.0));
        assert!(!b.contains(0.99));
        assert!(!b.contains(27.01));
    }

    #[test]
    fn rules_reject_inverted_bounds() {
        let rules = RuleSet {
            bounds: ValueBounds { min: 5.0, max: 5.0 },
            ..RuleSet::default()
        };
        assert_eq!(rules.validate().unwrap_err().exit_code(), 2);
        assert!(RuleSet::default().validate().is_ok());
    }

    #[test]
    fn cache_path_must_differ_from_input() {
        let mut config = AnalysisConfig::new("data/in.csv");
        config.cache_path = Some(PathBuf::from("data/in.csv"));
        assert_eq!(config.validate().unwrap_err().exit_code(), 2);

        config.cache_path = Some(PathBuf::from("data/cache.csv"));
        assert!(config.validate().is_ok());
        config.cache_path = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn date_key_chart_x() {
        let a = DateKey::from("2020-01-01").chart_x().unwrap();
        let b = DateKey::from("2020-01-02").chart_x().unwrap();
        assert!((b - a - 1.0).abs() < 1e-12);
        assert_eq!(DateKey::from("20200101").chart_x(), Some(20_200_101.0));
        assert_eq!(DateKey::from("jan 1st").chart_x(), None);
    }

    #[test]
    fn bucket_counts_distinct_stations() {
        let bucket = DateBucket {
            entries: vec![
                (StationId::from("A"), 1.0),
                (StationId::from("B"), 2.0),
                (StationId::from("A"), 3.0),
            ],
        };
        assert_eq!(bucket.distinct_stations(), 2);
    }
}
