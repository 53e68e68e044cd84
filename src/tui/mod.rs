//! Ratatui-based terminal UI.
//!
//! The TUI is the dashboard proper: a Forecast view (history + forecast chart,
//! settings, per-city bars) and a Components view (trend/weekly/yearly
//! panels), both reading the session's latest forecast outcome.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{BarChart, Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{run_forecast_with_ingest, RunOutput};
use crate::cli::ForecastArgs;
use crate::domain::{ForecastConfig, HarmonicModel, ModelSpec};
use crate::error::{AppError, ErrorKind};
use crate::io::ingest::IngestedData;
use crate::math::day_index;
use crate::session::SessionState;

mod plotters_chart;

use plotters_chart::SeriesChart;

/// Interval widths the `←`/`→` keys cycle through.
const INTERVAL_CHOICES: [f64; 5] = [0.5, 0.8, 0.9, 0.95, 0.99];

/// Start the TUI.
pub fn run(args: ForecastArgs) -> Result<(), AppError> {
    // Resolve the CSV (flag or picker) and ingest before touching the
    // terminal state, so input errors print on the normal screen.
    let config = crate::app::forecast_config_from_args(&args)?;
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(ErrorKind::Internal, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(ErrorKind::Internal, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(
                ErrorKind::Internal,
                format!("Failed to enter alternate screen: {e}"),
            ));
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
    Forecast,
    Components,
}

struct App {
    config: ForecastConfig,
    view: View,
    selected_field: usize,
    status: String,
    ingest: IngestedData,
    run: Option<RunOutput>,
    session: SessionState<HarmonicModel>,
}

impl App {
    fn new(config: ForecastConfig) -> Result<Self, AppError> {
        let ingest = crate::io::ingest::load_aqi_csv(&config)?;
        let mut app = Self {
            config,
            view: View::Forecast,
            selected_field: 0,
            status: "Fitting...".to_string(),
            ingest,
            run: None,
            session: SessionState::new(),
        };
        app.refit();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(ErrorKind::Internal, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(ErrorKind::Internal, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read()
                .map_err(|e| AppError::new(ErrorKind::Internal, format!("Event read error: {e}")))?
            {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
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

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Tab => {
                self.view = match self.view {
                    View::Forecast => View::Components,
                    View::Components => View::Forecast,
                };
            }
            KeyCode::Char('1') => self.view = View::Forecast,
            KeyCode::Char('2') => self.view = View::Components,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < 2 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('r') => {
                match crate::io::ingest::load_aqi_csv(&self.config) {
                    Ok(ingest) => {
                        self.ingest = ingest;
                        self.refit();
                        self.status = format!(
                            "Reloaded {} ({} rows).",
                            self.config.csv_path.display(),
                            self.ingest.rows_used
                        );
                    }
                    Err(err) => {
                        self.status = format!("Reload failed: {err}");
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(run) = &self.run {
                    match crate::debug::write_debug_bundle(run, &self.config) {
                        Ok(path) => {
                            self.status = format!("Wrote debug bundle: {}", path.display());
                        }
                        Err(err) => {
                            self.status = format!("Debug write failed: {err}");
                        }
                    }
                } else {
                    self.status = "No completed run to dump.".to_string();
                }
            }
            _ => {}
        }

        Ok(false)
    }

    fn adjust_field(&mut self, delta: i64) {
        match self.selected_field {
            0 => {
                let next = self.config.horizon as i64 + delta * 5;
                self.config.horizon = next.clamp(1, 365) as usize;
                self.refit();
                self.status = format!("horizon: {}d", self.config.horizon);
            }
            1 => {
                self.config.interval_width = cycle_interval(self.config.interval_width, delta);
                self.refit();
                self.status = format!("interval: {:.0}%", self.config.interval_width * 100.0);
            }
            2 => {
                self.config.model_spec = if delta >= 0 {
                    next_model_spec(self.config.model_spec)
                } else {
                    prev_model_spec(self.config.model_spec)
                };
                self.refit();
                self.status = format!("model: {:?}", self.config.model_spec);
            }
            _ => {}
        }
    }

    /// Re-run fit + forecast on the current ingest.
    ///
    /// A failed fit leaves the previous outcome in place (stale-until-
    /// overwritten) and surfaces the error on the status line.
    fn refit(&mut self) {
        match run_forecast_with_ingest(&self.config, self.ingest.clone()) {
            Ok(run) => {
                self.session
                    .store(run.forecast.clone(), run.selection.best.model.clone());
                self.status = format!(
                    "Fitted {} (rmse={:.2}).",
                    run.selection.best.model.display_name, run.selection.best.quality.rmse
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.status = format!("Fit failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.view {
            View::Forecast => self.draw_forecast_view(frame, chunks[1]),
            View::Components => self.draw_components_view(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("aqid", Style::default().fg(Color::Cyan)),
            Span::raw(" — AQI forecast dashboard"),
            Span::styled(
                match self.view {
                    View::Forecast => "  [1] Forecast",
                    View::Components => "  [2] Components",
                },
                Style::default().fg(Color::Yellow),
            ),
        ]));

        let dropped = self.ingest.rows_read - self.ingest.rows_used;
        lines.push(Line::from(Span::styled(
            format!(
                "file: {} | rows: {} used / {} dropped | span: {} → {}",
                self.config.csv_path.display(),
                self.ingest.rows_used,
                dropped,
                self.ingest.stats.first_date,
                self.ingest.stats.last_date,
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            lines.push(Line::from(Span::styled(
                format!(
                    "model: {} | horizon: {}d | interval: {:.0}% | rmse={:.3} bic={:.2}",
                    run.selection.best.model.display_name,
                    self.config.horizon,
                    self.config.interval_width * 100.0,
                    run.selection.best.quality.rmse,
                    run.selection.best.quality.bic,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_forecast_view(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);

        self.draw_forecast_chart(frame, chunks[0]);

        if self.ingest.city_means.is_empty() {
            self.draw_settings(frame, chunks[1]);
        } else {
            let bottom = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(chunks[1]);
            self.draw_settings(frame, bottom[0]);
            self.draw_city_bars(frame, bottom[1]);
        }
    }

    fn draw_forecast_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("AQI Forecast").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new(self.status.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let series = forecast_series(run);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = SeriesChart {
            line: &series.yhat,
            lower: &series.lower,
            upper: &series.upper,
            points: &series.observed,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "day",
            y_label: "aqi".to_string(),
            fmt_x: fmt_axis_day,
            fmt_y: fmt_axis_aqi,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(
                frame,
                inner,
                chart_rect,
                insets,
                series.x_bounds,
                series.y_bounds,
                run.ingest.stats.first_date,
            );
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Horizon: {}d", self.config.horizon)),
            ListItem::new(format!(
                "Interval: {:.0}%",
                self.config.interval_width * 100.0
            )),
            ListItem::new(format!("Model: {:?}", self.config.model_spec)),
            ListItem::new(format!("Days fitted: {}", self.ingest.stats.n_days)),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_city_bars(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        // One bar per city, capped to what fits; means are positive AQI
        // levels, so the u64 rounding BarChart needs is lossless enough.
        let capacity = (area.width.saturating_sub(2) / 8).max(1) as usize;
        let data: Vec<(&str, u64)> = self
            .ingest
            .city_means
            .iter()
            .take(capacity)
            .map(|cm| (cm.city.as_str(), cm.mean.round().max(0.0) as u64))
            .collect();

        let bars = BarChart::default()
            .block(
                Block::default()
                    .title("Avg AQI by city")
                    .borders(Borders::ALL),
            )
            .data(&data)
            .bar_width(7)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

        frame.render_widget(bars, area);
    }

    fn draw_components_view(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        // The components view reads the session, not the run: before the
        // first successful forecast it must warn, not crash.
        let outcome = match self.session.get() {
            Ok(outcome) => outcome,
            Err(err) => {
                let msg = Paragraph::new(format!("⚠ {err}"))
                    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                    .alignment(Alignment::Center)
                    .block(Block::default().title("Components").borders(Borders::ALL));
                frame.render_widget(msg, area);
                return;
            }
        };

        let Some(run) = &self.run else {
            return;
        };
        let components = &run.components;
        let model = &outcome.model;

        let constraints =
            vec![Constraint::Ratio(1, panel_count(model) as u32); panel_count(model)];
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut idx = 0;

        // Trend panel is always present.
        let trend: Vec<(f64, f64)> = components
            .dates
            .iter()
            .zip(components.trend.iter())
            .map(|(&d, &v)| (day_index(run.ingest.stats.first_date, d), v))
            .collect();
        self.draw_component_panel(frame, chunks[idx], "Trend", "day", &trend);
        idx += 1;

        if components.has_weekly() {
            let weekly: Vec<(f64, f64)> = components
                .weekly
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v))
                .collect();
            self.draw_component_panel(frame, chunks[idx], "Weekly (Mon..Sun)", "weekday", &weekly);
            idx += 1;
        }

        if components.has_yearly() {
            let yearly: Vec<(f64, f64)> = components
                .yearly
                .iter()
                .enumerate()
                .map(|(i, &v)| ((i + 1) as f64, v))
                .collect();
            self.draw_component_panel(frame, chunks[idx], "Yearly (Jan..Dec)", "month", &yearly);
        }
    }

    fn draw_component_panel(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        title: &str,
        x_label: &'static str,
        series: &[(f64, f64)],
    ) {
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if series.len() < 2 {
            return;
        }

        let x_bounds = [series[0].0, series[series.len() - 1].0];
        let y_bounds = padded_bounds(series.iter().map(|&(_, y)| y));

        let widget = SeriesChart {
            line: series,
            lower: &[],
            upper: &[],
            points: &[],
            x_bounds,
            y_bounds,
            x_label,
            y_label: "effect".to_string(),
            fmt_x: fmt_axis_day,
            fmt_y: fmt_axis_aqi,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/1/2 view  ↑/↓ select  ←/→ adjust  r reload  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Number of component panels for the fitted model (trend + enabled blocks).
fn panel_count(model: &HarmonicModel) -> usize {
    1 + usize::from(model.kind.includes_weekly()) + usize::from(model.kind.includes_yearly())
}

/// Chart-ready series for the forecast view.
struct ForecastSeries {
    observed: Vec<(f64, f64)>,
    yhat: Vec<(f64, f64)>,
    lower: Vec<(f64, f64)>,
    upper: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn forecast_series(run: &RunOutput) -> ForecastSeries {
    let origin = run.ingest.stats.first_date;

    let observed: Vec<(f64, f64)> = run
        .ingest
        .daily
        .iter()
        .map(|p| (day_index(origin, p.date), p.value))
        .collect();
    let yhat: Vec<(f64, f64)> = run
        .forecast
        .rows
        .iter()
        .map(|r| (day_index(origin, r.date), r.yhat))
        .collect();
    let lower: Vec<(f64, f64)> = run
        .forecast
        .rows
        .iter()
        .map(|r| (day_index(origin, r.date), r.yhat_lower))
        .collect();
    let upper: Vec<(f64, f64)> = run
        .forecast
        .rows
        .iter()
        .map(|r| (day_index(origin, r.date), r.yhat_upper))
        .collect();

    let x_max = yhat.last().map(|&(x, _)| x).unwrap_or(1.0).max(1.0);
    let y_bounds = padded_bounds(
        observed
            .iter()
            .map(|&(_, y)| y)
            .chain(lower.iter().map(|&(_, y)| y))
            .chain(upper.iter().map(|&(_, y)| y)),
    );

    ForecastSeries {
        observed,
        yhat,
        lower,
        upper,
        x_bounds: [0.0, x_max],
        y_bounds,
    }
}

fn padded_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((max - min).abs() * 0.05).max(0.5);
    [min - pad, max + pad]
}

fn cycle_interval(current: f64, delta: i64) -> f64 {
    let idx = INTERVAL_CHOICES
        .iter()
        .position(|&w| (w - current).abs() < 1e-9)
        .unwrap_or(1);
    let len = INTERVAL_CHOICES.len() as i64;
    let next = (idx as i64 + delta).rem_euclid(len) as usize;
    INTERVAL_CHOICES[next]
}

fn next_model_spec(cur: ModelSpec) -> ModelSpec {
    match cur {
        ModelSpec::Auto => ModelSpec::Trend,
        ModelSpec::Trend => ModelSpec::Weekly,
        ModelSpec::Weekly => ModelSpec::Full,
        ModelSpec::Full => ModelSpec::Auto,
        ModelSpec::All => ModelSpec::Auto,
    }
}

fn prev_model_spec(cur: ModelSpec) -> ModelSpec {
    match cur {
        ModelSpec::Auto => ModelSpec::Full,
        ModelSpec::Trend => ModelSpec::Auto,
        ModelSpec::Weekly => ModelSpec::Trend,
        ModelSpec::Full => ModelSpec::Weekly,
        ModelSpec::All => ModelSpec::Auto,
    }
}

fn fmt_axis_day(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_aqi(v: f64) -> String {
    format!("{v:.1}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    first_date: chrono::NaiveDate,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        // Tick labels are calendar dates, not raw day offsets.
        let date = first_date + chrono::Duration::days(x_val.round() as i64);
        let label = date.format("%m-%d").to_string();
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("aqi")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_cycle_wraps_in_both_directions() {
        assert!((cycle_interval(0.8, 1) - 0.9).abs() < 1e-12);
        assert!((cycle_interval(0.99, 1) - 0.5).abs() < 1e-12);
        assert!((cycle_interval(0.5, -1) - 0.99).abs() < 1e-12);
        // Unknown current value falls back to the default slot.
        assert!((cycle_interval(0.77, 1) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn model_spec_cycle_is_a_loop() {
        let mut spec = ModelSpec::Auto;
        for _ in 0..4 {
            spec = next_model_spec(spec);
        }
        assert_eq!(spec, ModelSpec::Auto);
        assert_eq!(prev_model_spec(next_model_spec(ModelSpec::Trend)), ModelSpec::Trend);
    }

    #[test]
    fn padded_bounds_handles_flat_series() {
        let [lo, hi] = padded_bounds([5.0, 5.0, 5.0].into_iter());
        assert!(lo < 5.0 && hi > 5.0);
    }
}
