//! Cleaning and indexing pass.
//!
//! One linear scan over the parsed observations:
//! 1. drop values outside the configured bounds
//! 2. append survivors to the station index and the date index
//! 3. prune date buckets with too few distinct stations
//!
//! The result is built once and only borrowed afterwards.

use std::collections::BTreeMap;

use tracing::info;

use crate::domain::{DateBucket, DateKey, Observation, RuleSet, SeriesEntry, StationId, StationSeries};

#[derive(Debug, Clone, Default)]
pub struct CleanedData {
    /// Observations inside the bounds, in file order. This is what the cache holds.
    pub observations: Vec<Observation>,
    pub stations: BTreeMap<StationId, StationSeries>,
    /// Only buckets that survived pruning.
    pub dates: BTreeMap<DateKey, DateBucket>,
    pub outliers_dropped: usize,
    pub dates_pruned: usize,
}

pub fn clean_and_index(observations: &[Observation], rules: &RuleSet) -> CleanedData {
    let mut kept = Vec::with_capacity(observations.len());
    let mut stations: BTreeMap<StationId, StationSeries> = BTreeMap::new();
    let mut dates: BTreeMap<DateKey, DateBucket> = BTreeMap::new();
    let mut outliers_dropped = 0usize;

    for obs in observations {
        if !rules.bounds.contains(obs.value) {
            outliers_dropped += 1;
            continue;
        }

        stations.entry(obs.station.clone()).or_default().entries.push(SeriesEntry {
            date: obs.date.clone(),
            value: obs.value,
            cumulative: obs.cumulative,
        });
        dates
            .entry(obs.date.clone())
            .or_default()
            .entries
            .push((obs.station.clone(), obs.value));

        kept.push(obs.clone());
    }

    let (dates, dates_pruned) = prune_dates(dates, rules.min_stations_per_date);

    info!(
        kept = kept.len(),
        outliers_dropped,
        stations = stations.len(),
        dates = dates.len(),
        dates_pruned,
        "cleaning finished"
    );

    CleanedData {
        observations: kept,
        stations,
        dates,
        outliers_dropped,
        dates_pruned,
    }
}

/// Keep only buckets with at least `min_stations` distinct stations.
///
/// Returns the surviving buckets and how many were removed.
pub fn prune_dates(
    dates: BTreeMap<DateKey, DateBucket>,
    min_stations: usize,
) -> (BTreeMap<DateKey, DateBucket>, usize) {
    let before = dates.len();
    let kept: BTreeMap<DateKey, DateBucket> = dates
        .into_iter()
        .filter(|(_, bucket)| bucket.distinct_stations() >= min_stations)
        .collect();
    let pruned = before - kept.len();
    (kept, pruned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::StringRecord;

    fn obs(station: &str, date: &str, value: f64, cumulative: f64) -> Observation {
        Observation {
            station: StationId::from(station),
            date: DateKey::from(date),
            value,
            cumulative,
            record: StringRecord::from(vec![
                station.to_string(),
                String::new(),
                value.to_string(),
                cumulative.to_string(),
                String::new(),
                date.to_string(),
            ]),
        }
    }

    fn rules_with_min_stations(min: usize) -> RuleSet {
        RuleSet {
            min_stations_per_date: min,
            ..RuleSet::default()
        }
    }

    #[test]
    fn out_of_bounds_row_is_absent_from_both_indexes() {
        let rows = vec![obs("S1", "2020-01-01", 5.0, 5.0), obs("S1", "2020-01-02", 30.0, 35.0)];
        let cleaned = clean_and_index(&rows, &rules_with_min_stations(1));

        assert_eq!(cleaned.outliers_dropped, 1);
        assert_eq!(cleaned.observations.len(), 1);
        let s1 = &cleaned.stations[&StationId::from("S1")];
        assert_eq!(s1.len(), 1);
        assert_eq!(s1.entries[0].date.as_str(), "2020-01-01");
        assert!(!cleaned.dates.contains_key(&DateKey::from("2020-01-02")));
    }

    #[test]
    fn lower_bound_drops_small_values() {
        let rows = vec![obs("S1", "d1", 0.0, 0.0), obs("S1", "d2", 0.5, 0.5), obs("S1", "d3", 1.0, 1.5)];
        let cleaned = clean_and_index(&rows, &rules_with_min_stations(1));
        assert_eq!(cleaned.outliers_dropped, 2);
        assert_eq!(cleaned.stations[&StationId::from("S1")].len(), 1);
    }

    #[test]
    fn seventeen_stations_pruned_eighteen_kept() {
        let mut rows = Vec::new();
        for i in 0..17 {
            rows.push(obs(&format!("S{i}"), "2020-03-01", 5.0, 5.0));
        }
        for i in 0..18 {
            rows.push(obs(&format!("S{i}"), "2020-03-02", 5.0, 10.0));
        }

        let cleaned = clean_and_index(&rows, &RuleSet::default());
        assert!(!cleaned.dates.contains_key(&DateKey::from("2020-03-01")));
        assert!(cleaned.dates.contains_key(&DateKey::from("2020-03-02")));
        assert_eq!(cleaned.dates_pruned, 1);
        for bucket in cleaned.dates.values() {
            assert!(bucket.distinct_stations() >= 18);
        }
        // Station series still include rows from pruned dates.
        assert_eq!(cleaned.stations[&StationId::from("S0")].len(), 2);
    }

    #[test]
    fn duplicate_station_rows_do_not_count_twice() {
        let mut rows = Vec::new();
        for i in 0..17 {
            rows.push(obs(&format!("S{i}"), "d", 5.0, 5.0));
        }
        rows.push(obs("S0", "d", 6.0, 11.0));
        let cleaned = clean_and_index(&rows, &RuleSet::default());
        assert!(cleaned.dates.is_empty());
    }

    #[test]
    fn station_series_keep_file_order() {
        let rows = vec![
            obs("S1", "2020-01-03", 3.0, 3.0),
            obs("S1", "2020-01-01", 1.0, 4.0),
            obs("S1", "2020-01-02", 2.0, 6.0),
        ];
        let cleaned = clean_and_index(&rows, &rules_with_min_stations(1));
        let dates: Vec<&str> = cleaned.stations[&StationId::from("S1")]
            .entries
            .iter()
            .map(|e| e.date.as_str())
            .collect();
        assert_eq!(dates, ["2020-01-03", "2020-01-01", "2020-01-02"]);
        assert_eq!(cleaned.stations[&StationId::from("S1")].last_cumulative(), Some(6.0));
    }
}
