//! Chart data preparation shared by the ASCII renderer and the TUI.
//!
//! Everything here is pure: series, bins and box statistics are computed from
//! a finished `RunOutput` and handed to whichever backend draws them.

use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::math::{min_max, quartiles};

/// Label used for the extra bar that shows the mean of all station means.
pub const AVERAGE_LABEL: &str = "average";

/// Default histogram bin count.
pub const DEFAULT_BINS: usize = 10;

/// One named line series.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Five-number summary with Tukey whiskers (1.5 × IQR).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_lo: f64,
    pub whisker_hi: f64,
    pub outliers: Vec<f64>,
}

/// Accumulated value over time, one series per qualifying station.
///
/// Entries whose date has no numeric chart position are skipped.
pub fn cumulative_series(run: &RunOutput) -> Vec<LineSeries> {
    run.stations
        .means
        .iter()
        .filter_map(|m| {
            let series = run.cleaned.stations.get(&m.station)?;
            let points: Vec<(f64, f64)> = series
                .entries
                .iter()
                .filter_map(|e| e.date.chart_x().map(|x| (x, e.cumulative)))
                .collect();
            Some(LineSeries {
                label: m.station.to_string(),
                points,
            })
        })
        .filter(|s| !s.points.is_empty())
        .collect()
}

/// Station means as `(label, value)` bars, plus the overall average bar.
pub fn station_mean_bars(run: &RunOutput) -> Vec<(String, f64)> {
    let mut bars: Vec<(String, f64)> = run
        .stations
        .means
        .iter()
        .map(|m| (m.station.to_string(), m.mean))
        .collect();
    bars.push((AVERAGE_LABEL.to_string(), run.hypothesis.mean));
    bars
}

/// Normalized totals as `(label, value)` bars, ascending.
pub fn normalized_bars(run: &RunOutput) -> Vec<(String, f64)> {
    run.normalized
        .iter()
        .map(|n| (n.station.to_string(), n.normalized_total))
        .collect()
}

/// Equal-width bins over the finite values.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let Some((lo, hi)) = min_max(values) else {
        return Vec::new();
    };
    let bins = bins.max(1);
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lo: lo + i as f64 * width,
            hi: lo + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for &v in values.iter().filter(|v| v.is_finite()) {
        // The top edge belongs to the last bin.
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let [q1, median, q3] = quartiles(values)?;
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let inside: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v >= lo_fence && *v <= hi_fence)
        .collect();
    let (whisker_lo, whisker_hi) = min_max(&inside).unwrap_or((q1, q3));
    let mut outliers: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();
    outliers.sort_by(|a, b| a.total_cmp(b));

    Some(BoxStats {
        q1,
        median,
        q3,
        whisker_lo,
        whisker_hi,
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_cover_all_values() {
        let v = [1.0, 1.5, 2.0, 2.5, 3.0];
        let bins = histogram_bins(&v, 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count + bins[1].count, 5);
        assert_eq!(bins[1].count, 3);
        assert!((bins[1].hi - 3.0).abs() < 1e-12);
    }

    #[test]
    fn constant_values_get_a_unit_wide_range() {
        let bins = histogram_bins(&[4.0, 4.0], 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!((bins[0].lo - 3.5).abs() < 1e-12);
        assert!(histogram_bins(&[], 4).is_empty());
    }

    #[test]
    fn box_stats_flags_outliers() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0];
        let b = box_stats(&v).unwrap();
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.whisker_hi, 8.0);
        assert_eq!(b.whisker_lo, 1.0);
        assert!((b.median - 5.0).abs() < 1e-12);
    }
}
