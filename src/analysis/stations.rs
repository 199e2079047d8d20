//! Per-station mean degree-day value.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::domain::{StationId, StationSeries};
use crate::error::AppError;
use crate::math::mean;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMean {
    pub station: StationId,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationStats {
    /// Ordered by station id.
    pub means: Vec<StationMean>,
    pub highest: StationMean,
    pub lowest: StationMean,
    /// Stations left out for having too few observations.
    pub excluded: usize,
}

impl StationStats {
    pub fn mean_values(&self) -> Vec<f64> {
        self.means.iter().map(|m| m.mean).collect()
    }
}

/// Mean of every station with at least `min_observations` entries.
///
/// The threshold check runs before the mean, so no empty series is averaged.
pub fn station_means(
    stations: &BTreeMap<StationId, StationSeries>,
    min_observations: usize,
) -> Result<StationStats, AppError> {
    let mut means = Vec::new();
    let mut excluded = 0usize;

    for (station, series) in stations {
        if series.len() < min_observations.max(1) {
            excluded += 1;
            continue;
        }
        let values: Vec<f64> = series.values().collect();
        let Some(m) = mean(&values) else {
            excluded += 1;
            continue;
        };
        means.push(StationMean {
            station: station.clone(),
            mean: m,
            count: series.len(),
        });
    }

    let (Some(highest), Some(lowest)) = (
        means.iter().max_by(|a, b| a.mean.total_cmp(&b.mean)).cloned(),
        means.iter().min_by(|a, b| a.mean.total_cmp(&b.mean)).cloned(),
    ) else {
        return Err(AppError::insufficient_data(format!(
            "No station has at least {min_observations} observations after cleaning."
        )));
    };

    info!(qualifying = means.len(), excluded, "station means computed");

    Ok(StationStats {
        means,
        highest,
        lowest,
        excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateKey, SeriesEntry};

    fn series(values: &[f64]) -> StationSeries {
        let mut cumulative = 0.0;
        StationSeries {
            entries: values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    cumulative += v;
                    SeriesEntry {
                        date: DateKey::new(format!("d{i:05}")),
                        value: v,
                        cumulative,
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn only_stations_over_threshold_are_averaged() {
        let mut stations = BTreeMap::new();
        stations.insert(StationId::from("A"), series(&[2.0, 4.0, 6.0]));
        stations.insert(StationId::from("B"), series(&[10.0, 10.0]));
        stations.insert(StationId::from("C"), series(&[1.0, 1.0, 1.0, 5.0]));

        let stats = station_means(&stations, 3).unwrap();
        assert_eq!(stats.excluded, 1);
        assert_eq!(stats.means.len(), 2);
        for m in &stats.means {
            assert!(m.count >= 3);
        }
        assert_eq!(stats.highest.station.as_str(), "A");
        assert!((stats.highest.mean - 4.0).abs() < 1e-12);
        assert_eq!(stats.lowest.station.as_str(), "C");
        assert!((stats.lowest.mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn default_threshold_excludes_short_stations() {
        let mut stations = BTreeMap::new();
        stations.insert(StationId::from("long"), series(&vec![3.0; 10_000]));
        stations.insert(StationId::from("short"), series(&vec![3.0; 9_999]));

        let stats = station_means(&stations, 10_000).unwrap();
        assert_eq!(stats.means.len(), 1);
        assert_eq!(stats.means[0].station.as_str(), "long");
    }

    #[test]
    fn no_qualifying_station_is_an_error() {
        let mut stations = BTreeMap::new();
        stations.insert(StationId::from("A"), series(&[1.0]));
        let err = station_means(&stations, 2).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
