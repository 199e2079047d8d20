//! Exports: normalized totals as CSV, the full analysis summary as JSON.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::analysis::{CountryStats, HypothesisReport, NormalizedTotal, StationStats};
use crate::app::pipeline::{RunCounters, RunOutput};
use crate::domain::RuleSet;
use crate::error::AppError;

/// Write normalized station totals to CSV (header from the field names).
pub fn write_normalized_csv(path: &Path, totals: &[NormalizedTotal]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    for row in totals {
        writer
            .serialize(row)
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Portable summary of a run.
#[derive(Debug, Serialize)]
pub struct ReportFile<'a> {
    pub tool: &'static str,
    pub source: String,
    pub rules: &'a RuleSet,
    pub counters: RunCounters,
    pub stations: &'a StationStats,
    pub country: &'a CountryStats,
    pub hypothesis: &'a HypothesisReport,
    pub normalized: &'a [NormalizedTotal],
}

impl<'a> ReportFile<'a> {
    pub fn new(run: &'a RunOutput, rules: &'a RuleSet) -> Self {
        Self {
            tool: "dd",
            source: run.ingest.source.display().to_string(),
            rules,
            counters: run.counters(),
            stations: &run.stations,
            country: &run.country,
            hypothesis: &run.hypothesis,
            normalized: &run.normalized,
        }
    }
}

/// Write the run summary as pretty JSON.
pub fn write_report_json(path: &Path, run: &RunOutput, rules: &RuleSet) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &ReportFile::new(run, rules))
        .map_err(|e| AppError::input(format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;

    #[test]
    fn normalized_csv_has_named_columns() {
        let path = std::env::temp_dir().join(format!("dd_export_{}.csv", std::process::id()));
        let totals = vec![NormalizedTotal {
            station: StationId::from("06030"),
            count: 10_000,
            mean: 2.0,
            last_cumulative: 500.0,
            normalized_total: 1780.0,
        }];
        write_normalized_csv(&path, &totals).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("station_id,count,mean,last_cumulative,normalized_total"));
        assert_eq!(lines.next(), Some("06030,10000,2.0,500.0,1780.0"));
    }
}
