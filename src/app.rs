//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads, cleans and caches the degree-day rows
//! - runs the station/country statistics
//! - prints reports/charts
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{AnalysisArgs, Command, GenerateArgs};
use crate::data::GenerateConfig;
use crate::domain::{AnalysisConfig, RuleSet, ValueBounds};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `dd` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `dd` and `dd --input x.csv` to behave like `dd report ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The viewer owns the terminal; only warnings may reach stderr there.
    let default_level = if matches!(cli.command, Command::Tui(_)) { "warn" } else { "info" };
    crate::logging::init(default_level);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Clean(args) => handle_clean(args),
        Command::Tui(args) => handle_tui(args),
        Command::Generate(args) => handle_generate(args),
    }
}

fn handle_report(args: AnalysisArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args);
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    if config.plot {
        let charts = crate::plot::render_report_charts(&run, config.plot_width, config.plot_height);
        println!("{charts}");
    }

    // Optional exports.
    if let Some(path) = &config.export_json {
        crate::io::write_report_json(path, &run, &config.rules)?;
    }
    if let Some(path) = &config.export_normalized {
        crate::io::write_normalized_csv(path, &run.normalized)?;
    }

    Ok(())
}

fn handle_clean(args: AnalysisArgs) -> Result<(), AppError> {
    if args.no_cache {
        return Err(AppError::input("`dd clean` writes the cache; drop --no-cache."));
    }
    let mut config = analysis_config_from_args(&args);
    // Cleaning always starts from the raw input.
    config.refresh_cache = true;

    let (ingest, cleaned) = pipeline::load_and_clean(&config)?;
    let kept = cleaned.observations.len();

    println!(
        "rows read: {} | row errors: {} | outliers dropped: {} | rows kept: {kept}",
        ingest.rows_read,
        ingest.row_errors.len(),
        cleaned.outliers_dropped,
    );
    println!(
        "stations: {} | dates retained: {} | dates pruned: {}",
        cleaned.stations.len(),
        cleaned.dates.len(),
        cleaned.dates_pruned,
    );
    print!("{}", crate::report::format_row_errors(&ingest.row_errors));
    if let Some(cache) = &config.cache_path {
        println!("cache: {}", cache.display());
    }
    Ok(())
}

fn handle_tui(args: AnalysisArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args);
    crate::tui::run(config)
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = generate_config_from_args(&args);
    let data = crate::data::generate_dataset(&config)?;
    crate::data::write_dataset(&args.out, &data)?;
    info!(stations = config.stations, days = config.days, seed = config.seed, "generation done");
    println!("wrote {} rows to {}", data.rows.len(), args.out.display());
    Ok(())
}

pub fn analysis_config_from_args(args: &AnalysisArgs) -> AnalysisConfig {
    let cache_path = if args.no_cache { None } else { Some(args.cache.clone()) };

    AnalysisConfig {
        input_path: args.input.clone(),
        cache_path,
        refresh_cache: args.refresh_cache,
        rules: RuleSet {
            bounds: ValueBounds {
                min: args.min_value,
                max: args.max_value,
            },
            min_stations_per_date: args.min_stations_per_date,
            min_station_observations: args.min_station_observations,
            reference_count: args.reference_count,
        },
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_json: args.export_json.clone(),
        export_normalized: args.export_normalized.clone(),
    }
}

pub fn generate_config_from_args(args: &GenerateArgs) -> GenerateConfig {
    GenerateConfig {
        stations: args.stations,
        days: args.days,
        start: args.start,
        seed: args.seed,
        noise_sd: args.noise_sd,
        max_start_offset: args.max_start_offset,
        outlier_prob: args.outlier_prob,
        malformed_prob: args.malformed_prob,
    }
}

/// Rewrite argv so `dd` defaults to `dd report`.
///
/// Rules:
/// - `dd`                      -> `dd report`
/// - `dd --input x.csv ...`    -> `dd report --input x.csv ...`
/// - `dd --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "clean" | "tui" | "generate");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_report() {
        assert_eq!(rewrite_args(argv(&["dd"])), argv(&["dd", "report"]));
        assert_eq!(
            rewrite_args(argv(&["dd", "--no-plot"])),
            argv(&["dd", "report", "--no-plot"])
        );
        assert_eq!(rewrite_args(argv(&["dd", "tui"])), argv(&["dd", "tui"]));
        assert_eq!(rewrite_args(argv(&["dd", "--help"])), argv(&["dd", "--help"]));
    }

    #[test]
    fn config_from_args_maps_rules_and_cache() {
        let cli = Cli::try_parse_from([
            "dd",
            "report",
            "--input",
            "in.csv",
            "--no-cache",
            "--no-plot",
            "--min-value",
            "2",
            "--reference-count",
            "365",
        ])
        .unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        let config = analysis_config_from_args(&args);
        assert_eq!(config.input_path, std::path::PathBuf::from("in.csv"));
        assert!(config.cache_path.is_none());
        assert!(!config.plot);
        assert_eq!(config.rules.bounds.min, 2.0);
        assert_eq!(config.rules.bounds.max, 27.0);
        assert_eq!(config.rules.reference_count, 365);
    }
}
