//! National daily mean: average across stations per date, then across dates.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::domain::{DateBucket, DateKey};
use crate::error::AppError;
use crate::math::{mean, quartiles, sample_std_dev};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMean {
    pub date: DateKey,
    pub mean: f64,
    pub stations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryStats {
    /// One entry per retained date, in date order.
    pub daily: Vec<DailyMean>,
    /// Grand mean across dates: the national reference value.
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub quartiles: Option<[f64; 3]>,
}

impl CountryStats {
    pub fn daily_values(&self) -> Vec<f64> {
        self.daily.iter().map(|d| d.mean).collect()
    }
}

/// Expects buckets already pruned by the indexing pass.
pub fn country_means(dates: &BTreeMap<DateKey, DateBucket>) -> Result<CountryStats, AppError> {
    let daily: Vec<DailyMean> = dates
        .iter()
        .filter_map(|(date, bucket)| {
            let values: Vec<f64> = bucket.values().collect();
            mean(&values).map(|m| DailyMean {
                date: date.clone(),
                mean: m,
                stations: bucket.distinct_stations(),
            })
        })
        .collect();

    let values: Vec<f64> = daily.iter().map(|d| d.mean).collect();
    let grand = mean(&values).ok_or_else(|| {
        AppError::insufficient_data("No date has enough reporting stations to compute a country mean.")
    })?;

    info!(dates = daily.len(), country_mean = grand, "country mean computed");

    Ok(CountryStats {
        std_dev: sample_std_dev(&values),
        quartiles: quartiles(&values),
        daily,
        mean: grand,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;

    fn bucket(values: &[f64]) -> DateBucket {
        DateBucket {
            entries: values
                .iter()
                .enumerate()
                .map(|(i, &v)| (StationId::new(format!("S{i}")), v))
                .collect(),
        }
    }

    #[test]
    fn grand_mean_is_mean_of_daily_means() {
        let mut dates = BTreeMap::new();
        dates.insert(DateKey::from("2020-01-02"), bucket(&[4.0, 6.0]));
        dates.insert(DateKey::from("2020-01-01"), bucket(&[1.0, 2.0, 3.0, 6.0]));

        let stats = country_means(&dates).unwrap();
        assert_eq!(stats.daily.len(), 2);
        assert_eq!(stats.daily[0].date.as_str(), "2020-01-01");
        assert!((stats.daily[0].mean - 3.0).abs() < 1e-12);
        assert_eq!(stats.daily[0].stations, 4);
        assert!((stats.daily[1].mean - 5.0).abs() < 1e-12);
        assert!((stats.mean - 4.0).abs() < 1e-12);
        assert!((stats.std_dev.unwrap() - 2f64.sqrt()).abs() < 1e-12);
        assert!(stats.quartiles.is_some());
    }

    #[test]
    fn single_date_has_no_spread() {
        let mut dates = BTreeMap::new();
        dates.insert(DateKey::from("d"), bucket(&[2.0, 4.0]));
        let stats = country_means(&dates).unwrap();
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert!(stats.std_dev.is_none());
        assert!(stats.quartiles.is_none());
    }

    #[test]
    fn empty_index_is_an_error() {
        let err = country_means(&BTreeMap::new()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
