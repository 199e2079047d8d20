//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized

use crate::analysis::{CountryStats, HypothesisReport, NormalizedTotal, StationStats};
use crate::app::pipeline::{RunCounters, RunOutput};
use crate::domain::AnalysisConfig;
use crate::io::ingest::{RowError, SourceKind};
use crate::math::NormalityTest;

/// How many row errors to print before summarizing the rest.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// Format the full console report.
pub fn format_run_summary(run: &RunOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== dd - Degree-day station analysis ===\n");
    let source = match run.ingest.source_kind {
        SourceKind::Raw => "raw",
        SourceKind::Cache => "cache",
    };
    out.push_str(&format!("Source: {} ({source})\n", run.ingest.source.display()));
    let rules = &config.rules;
    out.push_str(&format!(
        "Rules: value in [{}, {}] | >= {} stations/date | >= {} obs/station | reference count {}\n",
        rules.bounds.min,
        rules.bounds.max,
        rules.min_stations_per_date,
        rules.min_station_observations,
        rules.reference_count,
    ));
    out.push_str(&format_counters(&run.counters()));
    out.push_str(&format_row_errors(&run.ingest.row_errors));

    out.push('\n');
    out.push_str(&format_station_stats(&run.stations));
    out.push('\n');
    out.push_str(&format_hypothesis(&run.hypothesis));
    out.push('\n');
    out.push_str(&format_country(&run.country));
    out.push('\n');
    out.push_str(&format_normalized(&run.normalized, rules.reference_count));

    out
}

pub fn format_counters(c: &RunCounters) -> String {
    format!(
        "Rows: read={} | errors={} | outliers={} | kept={}\n\
         Stations: indexed={} | qualifying={} | Dates: retained={} | pruned={}\n",
        c.rows_read,
        c.row_errors,
        c.outliers_dropped,
        c.rows_kept,
        c.stations_indexed,
        c.stations_qualifying,
        c.dates_retained,
        c.dates_pruned,
    )
}

pub fn format_row_errors(errors: &[RowError]) -> String {
    let mut out = String::new();
    for e in errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!(
            "  line {} [{}]: {}\n",
            e.line,
            e.station.as_deref().unwrap_or("-"),
            e.message
        ));
    }
    if errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!("  ... and {} more skipped rows\n", errors.len() - MAX_ROW_ERRORS_SHOWN));
    }
    out
}

pub fn format_station_stats(stats: &StationStats) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Station means (n={}, excluded={}):\n",
        stats.means.len(),
        stats.excluded
    ));
    out.push_str(&format!(
        "- highest: {} {:.4} ({} obs)\n",
        stats.highest.station, stats.highest.mean, stats.highest.count
    ));
    out.push_str(&format!(
        "- lowest : {} {:.4} ({} obs)\n",
        stats.lowest.station, stats.lowest.mean, stats.lowest.count
    ));
    out
}

pub fn format_hypothesis(h: &HypothesisReport) -> String {
    let mut out = String::new();
    out.push_str("Inference over station means:\n");
    out.push_str(&format!("- quartiles: {}\n", fmt_vec(&h.quartiles)));
    out.push_str(&format!(
        "- mean={:.4} | std dev={:.4} | std err={:.4}\n",
        h.mean, h.std_dev, h.std_error
    ));
    out.push_str(&format!(
        "- {:.0}% CI: [{:.4}, {:.4}]\n",
        h.interval.level * 100.0,
        h.interval.lower,
        h.interval.upper
    ));
    let t = &h.t_test;
    out.push_str(&format!(
        "- t-test vs country mean {:.4}: t={:.4} df={} p={:.4} | critical ±{:.4} -> {}\n",
        t.reference,
        t.statistic,
        t.df,
        t.p_value,
        t.critical_value,
        if t.reject_null { "reject H0" } else { "retain H0" }
    ));
    out.push_str(&format!("- normality: {}\n", fmt_normality(h.normality.as_ref())));
    out
}

pub fn format_country(c: &CountryStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("Country daily means (dates={}):\n", c.daily.len()));
    out.push_str(&format!("- country mean: {:.4}\n", c.mean));
    out.push_str(&format!("- std dev: {}\n", fmt_opt(c.std_dev)));
    out.push_str(&format!(
        "- quartiles: {}\n",
        c.quartiles.map(|q| fmt_vec(&q)).unwrap_or_else(|| "-".to_string())
    ));
    out
}

/// Normalized totals table, ascending.
pub fn format_normalized(rows: &[NormalizedTotal], reference_count: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Normalized totals (reference count {reference_count}):\n"));
    out.push_str(
        format!(
            "{:<16} {:>8} {:>10} {:>14} {:>14}\n",
            "station", "count", "mean", "last_cum", "normalized"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<16} {:-<8} {:-<10} {:-<14} {:-<14}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<16} {:>8} {:>10.4} {:>14.1} {:>14.1}\n",
                truncate(r.station.as_str(), 16),
                r.count,
                r.mean,
                r.last_cumulative,
                r.normalized_total,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn fmt_normality(n: Option<&NormalityTest>) -> String {
    match n {
        Some(n) => format!(
            "K²={:.4} (z_skew={:.3}, z_kurt={:.3}) p={:.4}",
            n.statistic, n.skew_z, n.kurtosis_z, n.p_value
        ),
        None => "n/a (needs at least 8 non-constant values)".to_string(),
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.4}"),
        _ => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
