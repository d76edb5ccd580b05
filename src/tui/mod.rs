//! Ratatui-based terminal UI.
//!
//! The TUI shows the chart for the active dataset, a statistics panel, and a
//! settings list for the date range, smoothing window, and standardize flag.
//! Data is fetched once and cached; `r` drops the cache and fetches again.

use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{ClimateView, StudyView, climate_view, load_climate, study_view};
use crate::data::{CLIMATE_KEY, DatasetCache, generate_study_records};
use crate::domain::{DashboardConfig, FetchResult, Origin, UserRecord, Variant};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{DashboardChart, PointStyle};

const FIELD_START: usize = 0;
const FIELD_END: usize = 1;
const FIELD_SMOOTHING: usize = 2;
const FIELD_STANDARDIZE: usize = 3;
const FIELD_COUNT: usize = 4;

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    // Fetch before taking over the screen so network warnings stay readable.
    let mut app = App::new(config);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::ui(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
///
/// Logging is muted while the alternate screen is up; stderr output would
/// tear the frame.
struct TerminalGuard {
    log_level: log::LevelFilter,
}

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        let log_level = log::max_level();
        enable_raw_mode().map_err(|e| AppError::ui(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::ui(format!("Failed to enter alternate screen: {e}")));
        }
        log::set_max_level(log::LevelFilter::Off);
        Ok(Self { log_level })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        log::set_max_level(self.log_level);
    }
}

struct App {
    config: DashboardConfig,
    cache: DatasetCache,
    climate: Option<Rc<FetchResult>>,
    records: Vec<UserRecord>,
    climate_view: Option<ClimateView>,
    study_view: Option<StudyView>,
    selected_field: usize,
    editing_date: bool,
    date_input: String,
    status: String,
}

impl App {
    fn new(config: DashboardConfig) -> Self {
        let records = generate_study_records(config.seed);
        let mut app = Self {
            config,
            cache: DatasetCache::new(),
            climate: None,
            records,
            climate_view: None,
            study_view: None,
            selected_field: 0,
            editing_date: false,
            date_input: String::new(),
            status: String::new(),
        };
        app.load();
        app
    }

    /// Load (or reuse) the climate data and rebuild the views.
    fn load(&mut self) {
        let result = load_climate(&self.config, &mut self.cache);
        self.status = match result.origin {
            Origin::Remote => crate::report::format_origin(result.origin, result.source.as_deref()),
            Origin::Fallback => result.origin.notice().to_string(),
        };
        self.climate = Some(result);
        self.recompute();
    }

    fn recompute(&mut self) {
        let controls = self.config.controls;
        self.climate_view = self.climate.as_deref().map(|r| climate_view(r, &controls));
        self.study_view = Some(study_view(&self.records, &controls));
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::ui(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::ui(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::ui(format!("Event read error: {e}")))? {
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

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => match self.selected_field {
                FIELD_START | FIELD_END => {
                    self.editing_date = true;
                    self.date_input = self.selected_date().map(|d| d.to_string()).unwrap_or_default();
                    self.status = "Editing date (YYYY-MM-DD, empty = open). Enter to apply, Esc to cancel.".to_string();
                }
                FIELD_STANDARDIZE => self.adjust_field(1),
                _ => {}
            },
            KeyCode::Char('r') => {
                self.cache.invalidate(CLIMATE_KEY);
                self.load();
            }
            KeyCode::Char('v') => {
                self.config.variant = self.config.variant.toggle();
                self.status = format!("Showing: {}", self.config.variant.display_name());
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn selected_date(&self) -> Option<NaiveDate> {
        match self.selected_field {
            FIELD_START => self.config.controls.range.start,
            FIELD_END => self.config.controls.range.end,
            _ => None,
        }
    }

    fn set_selected_date(&mut self, date: Option<NaiveDate>) {
        let range = &mut self.config.controls.range;
        match self.selected_field {
            FIELD_START => range.start = date,
            FIELD_END => range.end = date,
            _ => return,
        }
        if let (Some(s), Some(e)) = (range.start, range.end) {
            if s > e {
                self.status = "Start is after end: no rows selected.".to_string();
            }
        }
        self.recompute();
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            FIELD_START | FIELD_END => {
                // Arrow keys move an existing bound by a year; an open bound starts at the data edge.
                let Some(current) = self.selected_date().or_else(|| self.data_edge()) else {
                    return;
                };
                let shifted = current.with_year(current.year() + delta).unwrap_or(current);
                self.status = format!("{}: {shifted}", self.field_name());
                self.set_selected_date(Some(shifted));
            }
            FIELD_SMOOTHING => {
                let w = &mut self.config.controls.smoothing_window;
                *w = if delta >= 0 { w.saturating_add(1) } else { w.saturating_sub(1) };
                self.status = format!("smoothing: {}", self.config.controls.smoothing_window);
                self.recompute();
            }
            FIELD_STANDARDIZE => {
                self.config.controls.standardize = !self.config.controls.standardize;
                self.status = format!(
                    "standardize: {}",
                    if self.config.controls.standardize { "on" } else { "off" }
                );
                self.recompute();
            }
            _ => {}
        }
    }

    fn apply_date_input(&mut self) {
        let trimmed = self.date_input.trim();
        if trimmed.is_empty() {
            self.status = format!("{}: open", self.field_name());
            self.set_selected_date(None);
            return;
        }
        match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(date) => {
                self.status = format!("{}: {date}", self.field_name());
                self.set_selected_date(Some(date));
            }
            Err(e) => {
                self.status = format!("Invalid date '{trimmed}': {e}");
            }
        }
    }

    /// First or last date of the active dataset, used when an open bound is nudged.
    fn data_edge(&self) -> Option<NaiveDate> {
        let (first, last) = match self.config.variant {
            Variant::Climate => self.climate.as_ref()?.series.date_bounds()?,
            Variant::Study => {
                let first = self.records.iter().map(|r| r.year).min()?;
                let last = self.records.iter().map(|r| r.year).max()?;
                (NaiveDate::from_ymd_opt(first, 1, 1)?, NaiveDate::from_ymd_opt(last, 12, 31)?)
            }
        };
        Some(if self.selected_field == FIELD_START { first } else { last })
    }

    fn field_name(&self) -> &'static str {
        match self.selected_field {
            FIELD_START => "start",
            FIELD_END => "end",
            FIELD_SMOOTHING => "smoothing",
            _ => "standardize",
        }
    }

    fn export(&mut self) {
        let path = export_path(self.config.variant);
        let result = match self.config.variant {
            Variant::Climate => match &self.climate_view {
                Some(view) => crate::io::export::export_series(&path, &view.filtered),
                None => {
                    self.status = "No climate data to export.".to_string();
                    return;
                }
            },
            Variant::Study => match &self.study_view {
                Some(view) => crate::io::export::export_records(&path, &view.records),
                None => return,
            },
        };
        self.status = match result {
            Ok(()) => format!("Exported {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("cdash", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {}", self.config.variant.display_name())),
        ]));

        let notice = match self.config.variant {
            Variant::Climate => match &self.climate_view {
                Some(view) => {
                    let origin = crate::report::format_origin(view.origin, view.source.as_deref());
                    format!("{origin} | rows: {} of {}", view.filtered.len(), view.total_rows)
                }
                None => "Waiting for data...".to_string(),
            },
            Variant::Study => {
                let n = self.study_view.as_ref().map_or(0, |v| v.records.len());
                format!("Synthetic example data | rows: {n}")
            }
        };
        let color = match self.climate_view.as_ref().map(|v| v.origin) {
            Some(Origin::Fallback) if self.config.variant == Variant::Climate => Color::Yellow,
            _ => Color::Gray,
        };
        lines.push(Line::from(Span::styled(notice, Style::default().fg(color))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(44)])
            .split(rows[0]);

        self.draw_chart(frame, cols[0]);
        self.draw_stats(frame, cols[1]);
        self.draw_settings(frame, rows[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(self.config.variant.display_name())
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(data) = self.chart_data() else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };
        if data.points.is_empty() {
            let msg = Paragraph::new("No rows in the selected range.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let (chart_rect, insets) = chart_layout(inner);
        let widget = DashboardChart {
            points: &data.points,
            point_style: data.point_style,
            smoothed: &data.smoothed,
            trend: &data.trend,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: data.x_label,
            y_label: data.y_label,
            fmt_x: fmt_axis,
            fmt_y: fmt_axis,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &data);
        }
    }

    fn chart_data(&self) -> Option<ChartData> {
        match self.config.variant {
            Variant::Climate => self.climate_view.as_ref().map(climate_chart),
            Variant::Study => self.study_view.as_ref().map(study_chart),
        }
    }

    fn draw_stats(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let text = match self.config.variant {
            Variant::Climate => self.climate_view.as_ref().map(|v| {
                let mut s = crate::report::format_describe(&[("value", &v.stats)]);
                s.push_str(&format!(
                    "\nr(year, value): {}\n",
                    fmt_opt(v.correlation.get("year", "value"))
                ));
                s.push_str(&format!("trend: {}\n", crate::report::format_trend(&v.trend)));
                if let Some(err) = v.standardize_error {
                    s.push_str(&format!("standardize: {err}\n"));
                }
                s
            }),
            Variant::Study => self.study_view.as_ref().map(|v| {
                let mut s = crate::report::format_describe(&[("temp_C", &v.temp_stats), ("math", &v.score_stats)]);
                s.push_str(&format!("\nr(temp, math): {}\n", fmt_opt(v.temp_score_r)));
                s.push_str(&format!("trend: {}\n", crate::report::format_trend(&v.trend)));
                s
            }),
        }
        .unwrap_or_default();

        let p = Paragraph::new(text)
            .wrap(ratatui::widgets::Wrap { trim: false })
            .block(Block::default().title("Statistics").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let controls = &self.config.controls;
        let bound = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "open".to_string());
        let start = if self.editing_date && self.selected_field == FIELD_START {
            format!("{}_", self.date_input)
        } else {
            bound(controls.range.start)
        };
        let end = if self.editing_date && self.selected_field == FIELD_END {
            format!("{}_", self.date_input)
        } else {
            bound(controls.range.end)
        };

        let items = vec![
            ListItem::new(format!("Start: {start}")),
            ListItem::new(format!("End: {end}")),
            ListItem::new(format!(
                "Smoothing: {}",
                match controls.smoothing_window {
                    0 => "off".to_string(),
                    w => w.to_string(),
                }
            )),
            ListItem::new(format!("Standardize: {}", if controls.standardize { "on" } else { "off" })),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_date {
            let hint = Paragraph::new("Editing date…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Right);
            let rect = Rect {
                x: area.x + 2,
                y: area.y + 1,
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit  r refresh  v variant  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn export_path(variant: Variant) -> PathBuf {
    match variant {
        Variant::Climate => PathBuf::from("cdash-climate.csv"),
        Variant::Study => PathBuf::from("cdash-study.csv"),
    }
}

/// Series and bounds for one chart frame.
struct ChartData {
    points: Vec<(f64, f64)>,
    point_style: PointStyle,
    smoothed: Vec<(f64, f64)>,
    trend: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_label: &'static str,
    y_label: &'static str,
}

fn climate_chart(view: &ClimateView) -> ChartData {
    let points = view.display_points();
    let smoothed = if view.controls.smoothing_window > 1 {
        view.smoothed_points()
    } else {
        Vec::new()
    };
    let trend = view.trend.as_ref().map(|t| t.fitted.clone()).unwrap_or_default();
    let (x_bounds, y_bounds) = chart_bounds(&[points.as_slice(), smoothed.as_slice(), trend.as_slice()]);
    ChartData {
        points,
        point_style: PointStyle::Line,
        smoothed,
        trend,
        x_bounds,
        y_bounds,
        x_label: "year",
        y_label: if view.standardized() { "z-score" } else { "value" },
    }
}

fn study_chart(view: &StudyView) -> ChartData {
    let trend = view.trend.as_ref().map(|t| t.fitted.clone()).unwrap_or_default();
    let (x_bounds, y_bounds) = chart_bounds(&[view.scatter.as_slice(), trend.as_slice()]);
    let standardized = view.standardized();
    ChartData {
        points: view.scatter.clone(),
        point_style: PointStyle::Dots,
        smoothed: Vec::new(),
        trend,
        x_bounds,
        y_bounds,
        x_label: if standardized { "temperature (z)" } else { "summer temp (C)" },
        y_label: if standardized { "math (z)" } else { "math score" },
    }
}

/// Padded x/y bounds over every series; degenerate spans are widened.
fn chart_bounds(series: &[&[(f64, f64)]]) -> ([f64; 2], [f64; 2]) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in series.iter().flat_map(|s| s.iter()) {
        if x.is_finite() && y.is_finite() {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    (padded(x_min, x_max), padded(y_min, y_max))
}

fn padded(min: f64, max: f64) -> [f64; 2] {
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    if max <= min {
        return [min - 0.5, max + 0.5];
    }
    let pad = ((max - min) * 0.05).max(1e-12);
    [min - pad, max + pad]
}

fn fmt_axis(v: f64) -> String {
    format!("{v:.1}")
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.3}")).unwrap_or_else(|| "n/a".to_string())
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

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
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

fn draw_axis_ticks(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect, insets: AxisInsets, data: &ChartData) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = data.x_bounds;
    let [y0, y1] = data.y_bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x0 + u * (x1 - x0);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.1}");
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
        let y_val = y0 + u * (y1 - y0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.1}");
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

    let x_label = Paragraph::new(data.x_label)
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

    let y_label = Paragraph::new(data.y_label).style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
