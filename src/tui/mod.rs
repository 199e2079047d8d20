//! Ratatui-based terminal UI.
//!
//! The viewer runs the analysis once, then lets the user flip between the
//! report charts (accumulated values, daily-mean histogram, station-mean box
//! plot, station-mean bars, normalized totals) drawn with Plotters.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
};

use crate::app::pipeline::{RunOutput, run_analysis};
use crate::domain::AnalysisConfig;
use crate::error::AppError;
use crate::plot::{
    BoxStats, DEFAULT_BINS, HistogramBin, LineSeries, box_stats, cumulative_series, histogram_bins,
    normalized_bars, station_mean_bars,
};

mod plotters_chart;

use plotters_chart::{ChartKind, DdPlottersChart};

/// Start the TUI.
///
/// The first analysis runs before the terminal is taken over, so input errors
/// print normally.
pub fn run(config: AnalysisConfig) -> Result<(), AppError> {
    let run = run_analysis(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::internal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, run);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::internal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::internal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Accumulated,
    Histogram,
    BoxPlot,
    StationMeans,
    Normalized,
}

impl View {
    const ALL: [View; 5] = [
        View::Accumulated,
        View::Histogram,
        View::BoxPlot,
        View::StationMeans,
        View::Normalized,
    ];

    fn title(self) -> &'static str {
        match self {
            View::Accumulated => "Accumulated",
            View::Histogram => "Daily means",
            View::BoxPlot => "Station box plot",
            View::StationMeans => "Station means",
            View::Normalized => "Normalized totals",
        }
    }

    fn axis_labels(self) -> (&'static str, &'static str) {
        match self {
            View::Accumulated => ("day", "accumulated"),
            View::Histogram => ("daily country mean", "dates"),
            View::BoxPlot => ("station mean", ""),
            View::StationMeans => ("mean degree-days", "station"),
            View::Normalized => ("normalized total", "station"),
        }
    }

    fn index(self) -> usize {
        View::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    fn prev(self) -> Self {
        View::ALL[(self.index() + View::ALL.len() - 1) % View::ALL.len()]
    }
}

/// Chart data derived from one run.
struct ChartData {
    lines: Vec<LineSeries>,
    bins: Vec<HistogramBin>,
    box_stats: Option<BoxStats>,
    mean_bars: Vec<(String, f64)>,
    normalized_bars: Vec<(String, f64)>,
}

impl ChartData {
    fn from_run(run: &RunOutput) -> Self {
        Self {
            lines: cumulative_series(run),
            bins: histogram_bins(&run.country.daily_values(), DEFAULT_BINS),
            box_stats: box_stats(&run.stations.mean_values()),
            mean_bars: station_mean_bars(run),
            normalized_bars: normalized_bars(run),
        }
    }
}

struct App {
    config: AnalysisConfig,
    view: View,
    status: String,
    run: RunOutput,
    charts: ChartData,
}

impl App {
    fn new(config: AnalysisConfig, run: RunOutput) -> Self {
        let charts = ChartData::from_run(&run);
        let status = format!("source: {}", run.ingest.source.display());
        Self {
            config,
            view: View::Accumulated,
            status,
            run,
            charts,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::internal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::internal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::internal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right | KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Left | KeyCode::BackTab => self.view = self.view.prev(),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.view = View::ALL[idx];
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    /// Re-run the analysis; failures stay in the status line.
    fn reload(&mut self) {
        match run_analysis(&self.config) {
            Ok(run) => {
                self.charts = ChartData::from_run(&run);
                self.status = format!("reloaded from {}", run.ingest.source.display());
                self.run = run;
            }
            Err(err) => {
                self.status = format!("reload failed: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        self.draw_chart(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let c = self.run.counters();
        let h = &self.run.hypothesis;

        let lines = vec![
            Line::from(vec![
                Span::styled("dd", Style::default().fg(Color::Cyan)),
                Span::raw(" - degree-day station charts"),
            ]),
            Line::from(Span::styled(
                format!(
                    "rows kept: {} | stations: {} qualifying of {} | dates: {} (pruned {})",
                    c.rows_kept, c.stations_qualifying, c.stations_indexed, c.dates_retained, c.dates_pruned,
                ),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                format!(
                    "station mean: {:.3} | country mean: {:.3} | t={:.3} p={:.4}",
                    h.mean, self.run.country.mean, h.t_test.statistic, h.t_test.p_value,
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = View::ALL
            .iter()
            .enumerate()
            .map(|(i, v)| Line::from(format!("{} {}", i + 1, v.title())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(self.view.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let kind = match self.view {
            View::Accumulated => ChartKind::Lines(&self.charts.lines),
            View::Histogram => ChartKind::Histogram(&self.charts.bins),
            View::BoxPlot => match &self.charts.box_stats {
                Some(stats) => ChartKind::Box(stats),
                None => {
                    let msg = Paragraph::new("Not enough station means for a box plot.")
                        .style(Style::default().fg(Color::Yellow));
                    frame.render_widget(msg, inner);
                    return;
                }
            },
            View::StationMeans => ChartKind::Bars(&self.charts.mean_bars),
            View::Normalized => ChartKind::Bars(&self.charts.normalized_bars),
        };

        let (x_label, y_label) = self.view.axis_labels();
        let widget = DdPlottersChart {
            kind,
            x_label,
            y_label,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ or 1-5 switch chart  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
