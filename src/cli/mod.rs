//! Command-line parsing for the degree-day station analysis.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the statistics code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{
    DEFAULT_MAX_VALUE, DEFAULT_MIN_STATION_OBSERVATIONS, DEFAULT_MIN_STATIONS_PER_DATE,
    DEFAULT_MIN_VALUE, DEFAULT_REFERENCE_COUNT,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dd", version, about = "Degree-day station analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clean the input, compute station/country statistics, and print the report.
    Report(AnalysisArgs),
    /// Clean the input and write the cache file only.
    Clean(AnalysisArgs),
    /// Browse the report charts in an interactive terminal viewer.
    Tui(AnalysisArgs),
    /// Write a synthetic dataset in the input schema.
    Generate(GenerateArgs),
}

/// Common options for every command that reads degree-day data.
#[derive(Debug, Parser, Clone)]
pub struct AnalysisArgs {
    /// Raw input CSV.
    #[arg(short = 'i', long, env = "DD_INPUT", default_value = "GRADDAGE_TAL.csv")]
    pub input: PathBuf,

    /// Cleaned cache CSV, read in preference to the raw input when present.
    #[arg(long, env = "DD_CACHE", default_value = "cleanedCVS.csv")]
    pub cache: PathBuf,

    /// Never read or write the cache.
    #[arg(long, conflicts_with = "refresh_cache")]
    pub no_cache: bool,

    /// Ignore an existing cache and rebuild it from the raw input.
    #[arg(long)]
    pub refresh_cache: bool,

    /// Smallest accepted degree-day value (inclusive).
    #[arg(long, default_value_t = DEFAULT_MIN_VALUE)]
    pub min_value: f64,

    /// Largest accepted degree-day value (inclusive).
    #[arg(long, default_value_t = DEFAULT_MAX_VALUE)]
    pub max_value: f64,

    /// Dates reported by fewer distinct stations are dropped.
    #[arg(long, default_value_t = DEFAULT_MIN_STATIONS_PER_DATE)]
    pub min_stations_per_date: usize,

    /// Stations with fewer observations are left out of the station means.
    #[arg(long, default_value_t = DEFAULT_MIN_STATION_OBSERVATIONS)]
    pub min_station_observations: usize,

    /// Observation count that normalized totals are scaled to.
    #[arg(long, default_value_t = DEFAULT_REFERENCE_COUNT)]
    pub reference_count: usize,

    /// Render ASCII charts after the report (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the full analysis summary to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export the normalized totals table to CSV.
    #[arg(long = "export-normalized", value_name = "CSV")]
    pub export_normalized: Option<PathBuf>,
}

/// Options for the synthetic dataset generator.
#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// Output CSV.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of stations.
    #[arg(long, default_value_t = 20)]
    pub stations: usize,

    /// Number of days per station.
    #[arg(long, default_value_t = 730)]
    pub days: usize,

    /// First calendar day (YYYY-MM-DD).
    #[arg(long, default_value = "2020-01-01")]
    pub start: NaiveDate,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the daily noise.
    #[arg(long, default_value_t = 1.5)]
    pub noise_sd: f64,

    /// Stations start reporting up to this many days late.
    #[arg(long, default_value_t = 30)]
    pub max_start_offset: usize,

    /// Probability that a row carries an out-of-range value.
    #[arg(long, default_value_t = 0.01)]
    pub outlier_prob: f64,

    /// Probability that a row carries a non-numeric value.
    #[arg(long, default_value_t = 0.002)]
    pub malformed_prob: f64,
}
