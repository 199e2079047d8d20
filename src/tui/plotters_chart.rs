//! Plotters-powered chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`. One widget covers every chart the viewer
//! offers; the data is prepared outside the render call.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TuiColor, Style},
    widgets::Widget,
};

use crate::plot::series::{BoxStats, HistogramBin, LineSeries as SeriesData};

/// What to draw.
#[derive(Clone, Copy)]
pub enum ChartKind<'a> {
    Lines(&'a [SeriesData]),
    Histogram(&'a [HistogramBin]),
    Box(&'a BoxStats),
    /// Horizontal bars, first entry at the bottom.
    Bars(&'a [(String, f64)]),
}

pub struct DdPlottersChart<'a> {
    pub kind: ChartKind<'a>,
    pub x_label: &'a str,
    pub y_label: &'a str,
}

/// High-contrast palette for terminal readability.
const PALETTE: [RGBColor; 6] = [
    RGBColor(0, 255, 255),
    RGBColor(255, 255, 0),
    RGBColor(0, 255, 0),
    RGBColor(255, 0, 255),
    RGBColor(255, 128, 0),
    RGBColor(128, 160, 255),
];

fn palette(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

impl<'a> Widget for DdPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TuiColor::Yellow),
            );
            return;
        }

        let Some((x_bounds, y_bounds)) = bounds(self.kind) else {
            buf.set_string(area.x, area.y, "No data for this chart.", Style::default().fg(TuiColor::Yellow));
            return;
        };
        let [x0, x1] = x_bounds;
        let [y0, y1] = y_bounds;
        let kind = self.kind;
        let x_label = self.x_label;
        let y_label = self.y_label;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            let bar_labels: Vec<String> = match kind {
                ChartKind::Bars(bars) => bars.iter().map(|(l, _)| l.clone()).collect(),
                _ => Vec::new(),
            };
            let y_fmt = |v: &f64| -> String {
                if bar_labels.is_empty() {
                    format!("{v:.1}")
                } else {
                    let idx = v.floor();
                    if idx >= 0.0 && (idx as usize) < bar_labels.len() {
                        bar_labels[idx as usize].clone()
                    } else {
                        String::new()
                    }
                }
            };

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(x_label)
                .y_desc(y_label)
                .x_labels(5)
                .y_labels(if bar_labels.is_empty() { 5 } else { bar_labels.len().min(20) })
                .x_label_formatter(&|v| format!("{v:.1}"))
                .y_label_formatter(&y_fmt)
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            match kind {
                ChartKind::Lines(series) => {
                    for (i, s) in series.iter().enumerate() {
                        let color = palette(i);
                        chart.draw_series(LineSeries::new(s.points.iter().copied(), &color))?;
                    }
                }
                ChartKind::Histogram(bins) => {
                    let color = palette(0);
                    chart.draw_series(
                        bins.iter()
                            .map(|b| Rectangle::new([(b.lo, 0.0), (b.hi, b.count as f64)], color.filled())),
                    )?;
                }
                ChartKind::Box(stats) => {
                    let box_color = palette(0);
                    let median_color = palette(1);
                    chart.draw_series(std::iter::once(Rectangle::new(
                        [(stats.q1, 0.3), (stats.q3, 0.7)],
                        &box_color,
                    )))?;
                    chart.draw_series(
                        [
                            vec![(stats.median, 0.3), (stats.median, 0.7)],
                            vec![(stats.whisker_lo, 0.5), (stats.q1, 0.5)],
                            vec![(stats.q3, 0.5), (stats.whisker_hi, 0.5)],
                            vec![(stats.whisker_lo, 0.4), (stats.whisker_lo, 0.6)],
                            vec![(stats.whisker_hi, 0.4), (stats.whisker_hi, 0.6)],
                        ]
                        .into_iter()
                        .enumerate()
                        .map(|(i, pts)| PathElement::new(pts, if i == 0 { &median_color } else { &box_color })),
                    )?;
                    chart.draw_series(stats.outliers.iter().map(|&o| Pixel::new((o, 0.5), RED)))?;
                }
                ChartKind::Bars(bars) => {
                    let base = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min);
                    chart.draw_series(bars.iter().enumerate().map(|(i, (_, v))| {
                        let y = i as f64;
                        Rectangle::new([(base, y + 0.15), (*v, y + 0.85)], palette(i).filled())
                    }))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// X/Y bounds for a chart, padded so nothing sits on the frame.
fn bounds(kind: ChartKind<'_>) -> Option<([f64; 2], [f64; 2])> {
    let (x, y) = match kind {
        ChartKind::Lines(series) => {
            let mut x = [f64::INFINITY, f64::NEG_INFINITY];
            let mut y = [f64::INFINITY, f64::NEG_INFINITY];
            for &(px, py) in series.iter().flat_map(|s| s.points.iter()) {
                x = [x[0].min(px), x[1].max(px)];
                y = [y[0].min(py), y[1].max(py)];
            }
            (x, pad(y))
        }
        ChartKind::Histogram(bins) => {
            let max = bins.iter().map(|b| b.count).max()? as f64;
            ([bins.first()?.lo, bins.last()?.hi], [0.0, max * 1.05 + 1e-9])
        }
        ChartKind::Box(stats) => {
            let lo = stats.outliers.iter().copied().fold(stats.whisker_lo, f64::min);
            let hi = stats.outliers.iter().copied().fold(stats.whisker_hi, f64::max);
            (pad([lo, hi]), [0.0, 1.0])
        }
        ChartKind::Bars(bars) => {
            let lo = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min);
            let hi = bars.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
            ([lo, hi * 1.05], [0.0, bars.len() as f64])
        }
    };

    let ok = x.iter().chain(y.iter()).all(|v| v.is_finite()) && x[1] > x[0] && y[1] > y[0];
    ok.then_some((x, y))
}

fn pad(range: [f64; 2]) -> [f64; 2] {
    let span = (range[1] - range[0]).abs();
    let p = if span > 0.0 { span * 0.05 } else { 0.5 };
    [range[0] - p, range[1] + p]
}
