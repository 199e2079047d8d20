//! Synthetic degree-day dataset generation.
//!
//! Produces a CSV in the input schema with a seasonal heating curve, Gaussian
//! daily noise, staggered station start dates (so station lengths differ) and
//! a small share of outliers and malformed values for the cleaner to catch.
//! Output is fully determined by the seed.

use std::f64::consts::PI;
use std::fs::File;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use csv::StringRecord;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::error::AppError;

/// Indoor base temperature for heating degree-days (°C).
const BASE_TEMP: f64 = 17.0;
/// Annual mean outdoor temperature (°C).
const MEAN_TEMP: f64 = 8.5;
/// Half the summer/winter swing (°C).
const TEMP_AMPLITUDE: f64 = 8.0;
/// Day of year where the seasonal curve crosses the annual mean going up.
const SPRING_PHASE_DAY: f64 = 110.0;

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub stations: usize,
    pub days: usize,
    pub start: NaiveDate,
    pub seed: u64,
    /// Daily temperature noise (°C standard deviation).
    pub noise_sd: f64,
    /// Latest possible start offset (days) for a station.
    pub max_start_offset: usize,
    pub outlier_prob: f64,
    pub malformed_prob: f64,
}

#[derive(Debug, Clone)]
pub struct GeneratedData {
    pub header: StringRecord,
    pub rows: Vec<StringRecord>,
}

pub fn generate_dataset(config: &GenerateConfig) -> Result<GeneratedData, AppError> {
    if config.stations == 0 || config.days == 0 {
        return Err(AppError::input("Station count and day count must be > 0."));
    }
    if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
        return Err(AppError::input("Noise standard deviation must be finite and >= 0."));
    }
    if !(0.0..1.0).contains(&config.outlier_prob)
        || !(0.0..1.0).contains(&config.malformed_prob)
        || config.outlier_prob + config.malformed_prob >= 1.0
    {
        return Err(AppError::input("Invalid outlier/malformed probability settings."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::internal(format!("Noise distribution error: {e}")))?;

    let header = StringRecord::from(vec!["station", "station_name", "degree_days", "accumulated", "season", "date"]);
    let mut rows = Vec::new();

    for s in 0..config.stations {
        let station = format!("{:05}", 6000 + s * 10);
        let name = format!("Station {}", s + 1);
        // Local climate offset so station means differ.
        let offset = rng.gen_range(-1.5..1.5);
        let start_offset = if config.max_start_offset == 0 {
            0
        } else {
            rng.gen_range(0..=config.max_start_offset.min(config.days - 1))
        };

        let mut cumulative = 0.0;
        for day in start_offset..config.days {
            let date = config.start + Duration::days(day as i64);
            let doy = f64::from(date.ordinal());
            let temp = MEAN_TEMP + offset + TEMP_AMPLITUDE * (2.0 * PI * (doy - SPRING_PHASE_DAY) / 365.25).sin()
                + noise.sample(&mut rng);
            let mut value = (BASE_TEMP - temp).max(0.0);

            let roll: f64 = rng.r#gen();
            let value_field = if roll < config.malformed_prob {
                "n/a".to_string()
            } else {
                if roll < config.malformed_prob + config.outlier_prob {
                    value = if rng.gen_bool(0.5) { 0.0 } else { rng.gen_range(30.0..60.0) };
                }
                cumulative += value;
                format!("{value:.1}")
            };

            rows.push(StringRecord::from(vec![
                station.clone(),
                name.clone(),
                value_field,
                format!("{cumulative:.1}"),
                date.year().to_string(),
                date.format("%Y-%m-%d").to_string(),
            ]));
        }
    }

    Ok(GeneratedData { header, rows })
}

pub fn write_dataset(path: &Path, data: &GeneratedData) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(&data.header)
        .map_err(|e| AppError::input(format!("Failed to write header: {e}")))?;
    for row in &data.rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::input(format!("Failed to write row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush '{}': {e}", path.display())))?;

    info!(path = %path.display(), rows = data.rows.len(), "synthetic dataset written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> GenerateConfig {
        GenerateConfig {
            stations: 4,
            days: 50,
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            seed,
            noise_sd: 2.0,
            max_start_offset: 10,
            outlier_prob: 0.05,
            malformed_prob: 0.02,
        }
    }

    #[test]
    fn same_seed_same_rows() {
        let a = generate_dataset(&config(7)).unwrap();
        let b = generate_dataset(&config(7)).unwrap();
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.header.len(), 6);
    }

    #[test]
    fn rows_follow_input_schema() {
        let data = generate_dataset(&config(1)).unwrap();
        assert!(data.rows.len() >= 4 * 40 && data.rows.len() <= 4 * 50);
        for row in &data.rows {
            assert_eq!(row.len(), 6);
            assert!(row[3].parse::<f64>().is_ok());
            assert!(NaiveDate::parse_from_str(&row[5], "%Y-%m-%d").is_ok());
        }
    }

    #[test]
    fn invalid_probabilities_rejected() {
        let mut c = config(1);
        c.outlier_prob = 0.7;
        c.malformed_prob = 0.4;
        assert_eq!(generate_dataset(&c).unwrap_err().exit_code(), 2);
    }
}
