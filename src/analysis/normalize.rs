//! Extrapolate station totals to a common observation count.
//!
//! Stations have unequal record lengths, so their last cumulative values
//! aren't directly comparable. Each total is shifted by
//! `(reference - count) * mean`, i.e. the missing (or surplus) days are
//! filled at the station's own mean daily rate.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::stations::StationMean;
use crate::domain::{StationId, StationSeries};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTotal {
    #[serde(rename = "station_id")]
    pub station: StationId,
    pub count: usize,
    pub mean: f64,
    pub last_cumulative: f64,
    pub normalized_total: f64,
}

pub fn normalized_total(last_cumulative: f64, count: usize, reference_count: usize, mean: f64) -> f64 {
    last_cumulative + (reference_count as f64 - count as f64) * mean
}

/// Normalize every station in `means`, sorted ascending by total (ties by id).
pub fn normalize_totals(
    means: &[StationMean],
    stations: &BTreeMap<StationId, StationSeries>,
    reference_count: usize,
) -> Vec<NormalizedTotal> {
    let mut out: Vec<NormalizedTotal> = means
        .iter()
        .filter_map(|m| {
            let last = stations.get(&m.station)?.last_cumulative()?;
            Some(NormalizedTotal {
                station: m.station.clone(),
                count: m.count,
                mean: m.mean,
                last_cumulative: last,
                normalized_total: normalized_total(last, m.count, reference_count, m.mean),
            })
        })
        .collect();

    out.sort_by(|a, b| {
        a.normalized_total
            .total_cmp(&b.normalized_total)
            .then_with(|| a.station.cmp(&b.station))
    });
    out
}
