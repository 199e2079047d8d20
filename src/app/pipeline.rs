//! Shared analysis pipeline used by both the CLI report and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load (cache or raw) -> clean/index -> cache -> station means -> country mean
//! -> inference -> normalization
//!
//! Each stage receives the previous stage's output and returns a new value.

use serde::Serialize;
use tracing::warn;

use crate::analysis::{
    CleanedData, CountryStats, HypothesisReport, NormalizedTotal, StationStats, clean_and_index, country_means,
    hypothesis_report, normalize_totals, station_means,
};
use crate::domain::{AnalysisConfig, RuleSet};
use crate::error::AppError;
use crate::io::cache::write_cache;
use crate::io::ingest::{IngestedData, SourceKind, load_observations};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub cleaned: CleanedData,
    pub stations: StationStats,
    pub country: CountryStats,
    pub hypothesis: HypothesisReport,
    pub normalized: Vec<NormalizedTotal>,
}

/// Row/date bookkeeping for the report header and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub rows_read: usize,
    pub row_errors: usize,
    pub outliers_dropped: usize,
    pub rows_kept: usize,
    pub stations_indexed: usize,
    pub stations_qualifying: usize,
    pub dates_retained: usize,
    pub dates_pruned: usize,
}

impl RunOutput {
    pub fn counters(&self) -> RunCounters {
        RunCounters {
            rows_read: self.ingest.rows_read,
            row_errors: self.ingest.row_errors.len(),
            outliers_dropped: self.cleaned.outliers_dropped,
            rows_kept: self.cleaned.observations.len(),
            stations_indexed: self.cleaned.stations.len(),
            stations_qualifying: self.stations.means.len(),
            dates_retained: self.cleaned.dates.len(),
            dates_pruned: self.cleaned.dates_pruned,
        }
    }
}

/// Load, clean and cache.
///
/// A failed cache write is logged and otherwise ignored; the cache only saves
/// time on the next run.
pub fn load_and_clean(config: &AnalysisConfig) -> Result<(IngestedData, CleanedData), AppError> {
    config.validate()?;
    let ingest = load_observations(config)?;
    let cleaned = clean_and_index(&ingest.observations, &config.rules);

    if let (Some(cache), SourceKind::Raw) = (&config.cache_path, ingest.source_kind) {
        if let Err(err) = write_cache(cache, &ingest.header, &cleaned.observations, &config.rules.bounds) {
            warn!(%err, "cache not written");
        }
    }

    Ok((ingest, cleaned))
}

/// Execute the full pipeline against the configured input.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let (ingest, cleaned) = load_and_clean(config)?;
    analyze(ingest, cleaned, &config.rules)
}

/// Run the statistics stages over already-cleaned data.
pub fn analyze(ingest: IngestedData, cleaned: CleanedData, rules: &RuleSet) -> Result<RunOutput, AppError> {
    let stations = station_means(&cleaned.stations, rules.min_station_observations)?;
    let country = country_means(&cleaned.dates)?;
    let hypothesis = hypothesis_report(&stations.mean_values(), country.mean)?;
    let normalized = normalize_totals(&stations.means, &cleaned.stations, rules.reference_count);

    Ok(RunOutput {
        ingest,
        cleaned,
        stations,
        country,
        hypothesis,
        normalized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GenerateConfig, generate_dataset, write_dataset};
    use crate::domain::ValueBounds;
    use chrono::NaiveDate;

    fn small_rules() -> RuleSet {
        RuleSet {
            bounds: ValueBounds::default(),
            min_stations_per_date: 3,
            min_station_observations: 150,
            reference_count: 365,
        }
    }

    #[test]
    fn end_to_end_on_synthetic_data_then_from_cache() {
        let dir = std::env::temp_dir();
        let raw = dir.join(format!("dd_pipeline_raw_{}.csv", std::process::id()));
        let cache = dir.join(format!("dd_pipeline_cache_{}.csv", std::process::id()));
        std::fs::remove_file(&cache).ok();

        let data = generate_dataset(&GenerateConfig {
            stations: 6,
            days: 365,
            start: NaiveDate::from_ymd_opt(2019, 7, 1).unwrap(),
            seed: 11,
            noise_sd: 1.5,
            max_start_offset: 60,
            outlier_prob: 0.03,
            malformed_prob: 0.01,
        })
        .unwrap();
        write_dataset(&raw, &data).unwrap();

        let mut config = AnalysisConfig::new(&raw);
        config.cache_path = Some(cache.clone());
        config.rules = small_rules();

        let first = run_analysis(&config).unwrap();
        assert_eq!(first.ingest.source_kind, SourceKind::Raw);
        assert!(cache.is_file());

        let counters = first.counters();
        assert_eq!(counters.rows_read, data.rows.len());
        assert!(counters.row_errors > 0);
        assert!(counters.outliers_dropped > 0);
        assert_eq!(counters.rows_kept + counters.outliers_dropped + counters.row_errors, counters.rows_read);
        for m in &first.stations.means {
            assert!(m.count >= 150);
            assert!(m.mean >= 1.0 && m.mean <= 27.0);
        }
        for bucket in first.cleaned.dates.values() {
            assert!(bucket.distinct_stations() >= 3);
        }
        assert!(first.hypothesis.interval.lower <= first.hypothesis.mean);
        assert!(first.hypothesis.interval.upper >= first.hypothesis.mean);

        let second = run_analysis(&config).unwrap();
        std::fs::remove_file(&raw).ok();
        std::fs::remove_file(&cache).ok();

        assert_eq!(second.ingest.source_kind, SourceKind::Cache);
        assert!(second.ingest.row_errors.is_empty());
        assert_eq!(second.cleaned.observations, first.cleaned.observations);
        assert_eq!(second.stations.means, first.stations.means);
        assert_eq!(second.normalized, first.normalized);
        std::fs::remove_file(crate::io::cache::bounds_sidecar_path(&cache)).ok();
    }

    #[test]
    fn changed_bounds_do_not_reuse_the_cache() {
        let dir = std::env::temp_dir();
        let raw = dir.join(format!("dd_bounds_raw_{}.csv", std::process::id()));
        let cache = dir.join(format!("dd_bounds_cache_{}.csv", std::process::id()));
        std::fs::remove_file(&cache).ok();
        std::fs::write(
            &raw,
            "station,name,value,cum,unit,date\n\
             S1,a,0.5,0.5,dd,2020-01-01\n\
             S1,a,5,5.5,dd,2020-01-02\n\
             S1,a,26,31.5,dd,2020-01-03\n",
        )
        .unwrap();

        let mut config = AnalysisConfig::new(&raw);
        config.cache_path = Some(cache.clone());
        let (_, canonical) = load_and_clean(&config).unwrap();

        let narrow = ValueBounds { min: 0.0, max: 25.0 };
        config.rules.bounds = narrow;
        let (ingest, cached_run) = load_and_clean(&config).unwrap();
        let (again, _) = load_and_clean(&config).unwrap();

        let mut uncached = AnalysisConfig::new(&raw);
        uncached.rules.bounds = narrow;
        let (_, fresh) = load_and_clean(&uncached).unwrap();

        std::fs::remove_file(&raw).ok();
        std::fs::remove_file(&cache).ok();
        std::fs::remove_file(crate::io::cache::bounds_sidecar_path(&cache)).ok();

        let values = |obs: &[crate::domain::Observation]| obs.iter().map(|o| o.value).collect::<Vec<_>>();
        assert_eq!(values(&canonical.observations), vec![5.0, 26.0]);
        assert_eq!(ingest.source_kind, SourceKind::Raw);
        assert_eq!(cached_run.observations, fresh.observations);
        assert_eq!(values(&fresh.observations), vec![0.5, 5.0]);
        assert_eq!(again.source_kind, SourceKind::Cache);
    }

    #[test]
    fn cache_on_top_of_input_is_rejected() {
        let mut config = AnalysisConfig::new("/not/read.csv");
        config.cache_path = Some(std::path::PathBuf::from("/not/read.csv"));
        assert_eq!(load_and_clean(&config).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn invalid_rules_fail_before_reading() {
        let mut config = AnalysisConfig::new("/not/read.csv");
        config.rules.bounds = ValueBounds { min: 10.0, max: 1.0 };
        assert_eq!(run_analysis(&config).unwrap_err().exit_code(), 2);
    }
}
