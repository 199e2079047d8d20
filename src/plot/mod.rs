//! Charts for the console report.
//!
//! `series` prepares chart data from a run; `ascii` draws it on a character
//! grid. The TUI reuses `series` and draws with Plotters instead.

pub mod ascii;
pub mod series;

pub use ascii::*;
pub use series::*;

use crate::app::pipeline::RunOutput;

/// All report charts, in the order they are printed.
pub fn render_report_charts(run: &RunOutput, width: usize, height: usize) -> String {
    let mut out = String::new();

    out.push_str(&render_line_chart(
        "Accumulated degree-days by station",
        &cumulative_series(run),
        width,
        height,
    ));
    out.push('\n');

    let bins = histogram_bins(&run.country.daily_values(), DEFAULT_BINS);
    out.push_str(&render_histogram("Country daily means", &bins, width, height / 2));
    out.push('\n');

    if let Some(stats) = box_stats(&run.stations.mean_values()) {
        out.push_str(&render_box_plot("Station means", &stats, width));
        out.push('\n');
    }

    out.push_str(&render_hbar("Station mean degree-days", &station_mean_bars(run), width));
    out.push('\n');
    out.push_str(&render_hbar("Normalized totals", &normalized_bars(run), width));

    out
}
