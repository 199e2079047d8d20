//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Charts:
//! - line chart: one glyph per series (`a`, `b`, ...), legend underneath
//! - histogram: vertical `#` columns
//! - box plot: horizontal `|---[===|===]---|` with `o` for outliers
//! - horizontal bars: one labelled `=` bar per row

use crate::plot::series::{BoxStats, HistogramBin, LineSeries};

const SERIES_GLYPHS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Render several line series on a shared grid.
pub fn render_line_chart(title: &str, series: &[LineSeries], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some(((x_min, x_max), (y_min, y_max))) = series_ranges(series) else {
        return format!("{title}: no data\n");
    };
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for (i, s) in series.iter().enumerate() {
        let ch = SERIES_GLYPHS[i % SERIES_GLYPHS.len()] as char;
        let mut prev = None;
        for &(x, y) in &s.points {
            let gx = map_x(x, x_min, x_max, width);
            let gy = map_y(y, y_min, y_max, height);
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, gx, gy, ch);
            } else {
                grid[gy][gx] = ch;
            }
            prev = Some((gx, gy));
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{title}: x=[{x_min:.1}, {x_max:.1}] | y=[{y_min:.1}, {y_max:.1}]\n"
    ));
    push_grid(&mut out, grid);

    let legend: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}={}", SERIES_GLYPHS[i % SERIES_GLYPHS.len()] as char, s.label))
        .collect();
    if !legend.is_empty() {
        out.push_str(&format!("legend: {}\n", legend.join(" ")));
    }
    out
}

/// Vertical histogram; columns are spread evenly over `width`.
pub fn render_histogram(title: &str, bins: &[HistogramBin], width: usize, height: usize) -> String {
    let height = height.max(3);
    let Some(max_count) = bins.iter().map(|b| b.count).max().filter(|&c| c > 0) else {
        return format!("{title}: no data\n");
    };
    let col_width = (width.max(bins.len()) / bins.len()).max(1);

    let mut grid = vec![vec![' '; col_width * bins.len()]; height];
    for (i, bin) in bins.iter().enumerate() {
        let filled = ((bin.count as f64 / max_count as f64) * height as f64).round() as usize;
        for row in 0..filled.min(height) {
            let y = height - 1 - row;
            // Leave a one-column gap between bars when there's room.
            let bar = if col_width > 1 { col_width - 1 } else { 1 };
            for x in i * col_width..i * col_width + bar {
                grid[y][x] = '#';
            }
        }
    }

    let lo = bins.first().map(|b| b.lo).unwrap_or(0.0);
    let hi = bins.last().map(|b| b.hi).unwrap_or(0.0);
    let mut out = String::new();
    out.push_str(&format!("{title}: x=[{lo:.2}, {hi:.2}] | max count={max_count}\n"));
    push_grid(&mut out, grid);
    out
}

/// Horizontal box plot on one line, scaled to `width`.
pub fn render_box_plot(title: &str, stats: &BoxStats, width: usize) -> String {
    let width = width.max(10);
    let lo = stats.outliers.first().copied().unwrap_or(stats.whisker_lo).min(stats.whisker_lo);
    let hi = stats.outliers.last().copied().unwrap_or(stats.whisker_hi).max(stats.whisker_hi);
    let (lo, hi) = if hi > lo { (lo, hi) } else { pad_range(lo, hi, 0.05) };

    let mut row = vec![' '; width];
    let wl = map_x(stats.whisker_lo, lo, hi, width);
    let wh = map_x(stats.whisker_hi, lo, hi, width);
    let b1 = map_x(stats.q1, lo, hi, width);
    let b3 = map_x(stats.q3, lo, hi, width);
    let md = map_x(stats.median, lo, hi, width);

    for cell in row.iter_mut().take(wh + 1).skip(wl) {
        *cell = '-';
    }
    for cell in row.iter_mut().take(b3 + 1).skip(b1) {
        *cell = '=';
    }
    row[wl] = '|';
    row[wh] = '|';
    row[b1] = '[';
    row[b3] = ']';
    row[md] = '|';
    for &o in &stats.outliers {
        row[map_x(o, lo, hi, width)] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{title}: q1={:.3} median={:.3} q3={:.3} whiskers=[{:.3}, {:.3}] outliers={}\n",
        stats.q1,
        stats.median,
        stats.q3,
        stats.whisker_lo,
        stats.whisker_hi,
        stats.outliers.len()
    ));
    out.push_str(&row.into_iter().collect::<String>());
    out.push('\n');
    out.push_str(&format!("{lo:<.3}{:>pad$.3}\n", hi, pad = width.saturating_sub(format!("{lo:.3}").len())));
    out
}

/// One bar per `(label, value)`. Bars start at zero (or at the minimum when
/// values are negative).
pub fn render_hbar(title: &str, bars: &[(String, f64)], width: usize) -> String {
    if bars.is_empty() {
        return format!("{title}: no data\n");
    }
    let label_width = bars.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0).min(20);
    let bar_width = width.saturating_sub(label_width + 14).max(5);

    let lo = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min);
    let hi = bars.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let span = if hi > lo { hi - lo } else { 1.0 };

    let mut out = String::new();
    out.push_str(&format!("{title}:\n"));
    for (label, v) in bars {
        let len = (((v - lo) / span) * bar_width as f64).round() as usize;
        let label: String = label.chars().take(label_width).collect();
        out.push_str(
            format!(
                "{label:<label_width$} |{:<bar_width$} {v:.3}\n",
                "=".repeat(len.min(bar_width))
            )
            .as_str(),
        );
    }
    out
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
}

type Range = (f64, f64);

fn series_ranges(series: &[LineSeries]) -> Option<(Range, Range)> {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for &(px, py) in series.iter().flat_map(|s| s.points.iter()) {
        x = (x.0.min(px), x.1.max(px));
        y = (y.0.min(py), y.1.max(py));
    }
    if !(x.0.is_finite() && x.1.is_finite() && y.0.is_finite() && y.1.is_finite()) {
        return None;
    }
    let x = if x.1 > x.0 { x } else { pad_range(x.0, x.1, 0.5) };
    let y = if y.1 > y.0 { y } else { pad_range(y.0, y.1, 0.5) };
    Some((x, y))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12).max(if span == 0.0 { 0.5 } else { 0.0 });
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
