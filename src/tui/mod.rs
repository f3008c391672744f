//! Ratatui-based terminal UI.
//!
//! The TUI provides a controls panel (date window, region and category
//! multi-selects) and renders one of the eight chart slots at a time. A control
//! change recomputes only the charts that listen to it.

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
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Tabs},
};

use crate::aggregate::{MonthTotal, RelationPoint};
use crate::app::pipeline::Dashboard;
use crate::charts::{ChartId, Figure, FigureData, LabeledTotal, format_currency};
use crate::domain::{Control, Restriction};
use crate::error::AppError;
use crate::io::ingest::parse_date;

mod plotters_chart;
pub mod state;

use plotters_chart::{Axes, FigureChart};
use state::DashboardState;

/// Start the TUI over a loaded dashboard.
pub fn run(dashboard: Dashboard) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(dashboard);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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

struct App {
    state: DashboardState,
    /// Index into `Control::ALL`.
    focus: usize,
    region_cursor: usize,
    category_cursor: usize,
    /// Index into `ChartId::ALL`.
    active: usize,
    editing_date: bool,
    date_input: String,
    status: String,
}

impl App {
    fn new(dashboard: Dashboard) -> Self {
        let state = DashboardState::new(dashboard);
        let status = format!("Loaded {} orders.", state.dashboard().dataset().len());
        Self {
            state,
            focus: 0,
            region_cursor: 0,
            category_cursor: 0,
            active: 0,
            editing_date: false,
            date_input: String::new(),
            status,
        }
    }

    fn focused(&self) -> Control {
        Control::ALL[self.focus]
    }

    fn active_chart(&self) -> ChartId {
        ChartId::ALL[self.active]
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
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
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        let control = self.focused();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.focus = self.focus.saturating_sub(1),
            KeyCode::Down => self.focus = (self.focus + 1).min(Control::ALL.len() - 1),
            KeyCode::Left => self.step(control, -1),
            KeyCode::Right => self.step(control, 1),
            KeyCode::PageUp => self.shift_date(control, -30),
            KeyCode::PageDown => self.shift_date(control, 30),
            KeyCode::Char(' ') => self.toggle_at_cursor(control),
            KeyCode::Char('c') => {
                let refreshed = self.state.clear(control);
                self.report(control, &refreshed);
            }
            KeyCode::Char('R') => {
                let refreshed = self.state.reset();
                self.status = format!("Reset all controls ({} charts refreshed).", refreshed.len());
            }
            KeyCode::Enter => {
                if let Some(current) = self.date_of(control) {
                    self.editing_date = true;
                    self.date_input = current;
                    self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Tab => self.active = (self.active + 1) % ChartId::ALL.len(),
            KeyCode::BackTab => self.active = (self.active + ChartId::ALL.len() - 1) % ChartId::ALL.len(),
            KeyCode::Char(c @ '1'..='8') => {
                self.active = (c as usize) - ('1' as usize);
            }
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
                if c.is_ascii_digit() || c == '-' || c == '/' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_date_input(&mut self) {
        let control = self.focused();
        let trimmed = self.date_input.trim().to_string();
        let date = match parse_date(&trimmed) {
            Ok(date) => date,
            Err(e) => {
                self.status = format!("Invalid date '{trimmed}': {e}");
                return;
            }
        };
        let refreshed = match control {
            Control::StartDate => self.state.set_start(date),
            Control::EndDate => self.state.set_end(date),
            Control::Regions | Control::Categories => return,
        };
        self.report(control, &refreshed);
        if self.state.options().clamp(date) != date {
            self.status.push_str(" (clamped to the data range)");
        }
    }

    fn date_of(&self, control: Control) -> Option<String> {
        let sel = self.state.selection();
        match control {
            Control::StartDate => Some(sel.start.to_string()),
            Control::EndDate => Some(sel.end.to_string()),
            Control::Regions | Control::Categories => None,
        }
    }

    /// Left/Right: move a date by one day, or move a multi-select cursor.
    fn step(&mut self, control: Control, delta: i64) {
        match control {
            Control::StartDate | Control::EndDate => self.shift_date(control, delta),
            Control::Regions => {
                let n = self.state.options().regions.len();
                self.region_cursor = move_cursor(self.region_cursor, delta, n);
            }
            Control::Categories => {
                let n = self.state.options().categories.len();
                self.category_cursor = move_cursor(self.category_cursor, delta, n);
            }
        }
    }

    fn shift_date(&mut self, control: Control, days: i64) {
        if matches!(control, Control::StartDate | Control::EndDate) {
            let refreshed = self.state.shift_date(control, days);
            self.report(control, &refreshed);
        }
    }

    fn toggle_at_cursor(&mut self, control: Control) {
        let options = self.state.options();
        let value = match control {
            Control::Regions => options.regions.get(self.region_cursor).cloned(),
            Control::Categories => options.categories.get(self.category_cursor).cloned(),
            Control::StartDate | Control::EndDate => None,
        };
        if let Some(value) = value {
            let refreshed = self.state.toggle(control, &value);
            self.report(control, &refreshed);
        }
    }

    fn report(&mut self, control: Control, refreshed: &[ChartId]) {
        self.status = if refreshed.is_empty() {
            format!("{}: unchanged.", control.label())
        } else {
            format!(
                "{}: {}/{} charts refreshed.",
                control.label(),
                refreshed.len(),
                ChartId::ALL.len()
            )
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let dataset = self.state.dashboard().dataset();
        let sel = self.state.selection();
        let summary = crate::report::summarize(dataset, sel);
        let options = self.state.options();

        let source = dataset
            .source()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("salesdash", Style::default().fg(Color::Cyan)),
            Span::raw(" | Retail Sales Dashboard"),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "source: {source} | orders: {} | dates: {} .. {}",
                dataset.len(),
                options.min_date,
                options.max_date
            ),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "selected: {} orders | sales {} | profit {} | qty {}",
                summary.orders,
                format_currency(summary.sales),
                format_currency(summary.profit),
                summary.quantity
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        self.draw_controls(frame, chunks[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(chunks[1]);

        self.draw_tabs(frame, right[0]);
        self.draw_chart(frame, right[1]);
    }

    fn draw_controls(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let sel = self.state.selection();
        let options = self.state.options();
        let focus_style = Style::default().fg(Color::Black).bg(Color::White);
        let head = |control: Control| {
            let marker = if self.focused() == control { "» " } else { "  " };
            (marker, control.label())
        };

        let mut lines: Vec<Line> = Vec::new();
        for (control, date) in [(Control::StartDate, sel.start), (Control::EndDate, sel.end)] {
            let (marker, label) = head(control);
            let value = if self.editing_date && self.focused() == control {
                format!("{}_", self.date_input)
            } else {
                date.to_string()
            };
            let style = if self.focused() == control { focus_style } else { Style::default() };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{label:<11}{value}"), style),
            ]));
        }
        if sel.is_reversed() {
            lines.push(Line::from(Span::styled(
                "  start is after end",
                Style::default().fg(Color::Red),
            )));
        }

        for (control, values, restriction, cursor) in [
            (Control::Regions, &options.regions, &sel.regions, self.region_cursor),
            (Control::Categories, &options.categories, &sel.categories, self.category_cursor),
        ] {
            lines.push(Line::raw(""));
            let (marker, label) = head(control);
            let summary = match restriction {
                Restriction::Unrestricted => "(all)".to_string(),
                Restriction::RestrictedTo(set) => format!("({} selected)", set.len()),
            };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    format!("{label} {summary}"),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
            for (i, value) in values.iter().enumerate() {
                let check = if restriction.is_unrestricted() {
                    "[ ]"
                } else if restriction.admits(value) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let style = if self.focused() == control && i == cursor {
                    focus_style
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!("{check} {value}"), style),
                ]));
            }
        }

        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Controls").borders(Borders::ALL));
        frame.render_widget(p, area);

        if self.editing_date {
            let hint = Paragraph::new("Editing date…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = ChartId::ALL
            .iter()
            .enumerate()
            .map(|(i, chart)| Line::from(format!("{} {}", i + 1, chart.slot())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.active)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let figure = self.state.figure(self.active_chart());
        let block = Block::default().title(figure.title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if figure.is_empty() {
            let msg = Paragraph::new("No data for the current filters.")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center);
            frame.render_widget(msg, inner);
            return;
        }

        match &figure.data {
            FigureData::Monthly(rows) => draw_trend(frame, inner, figure, rows),
            FigureData::Points(points) => draw_relation(frame, inner, figure, points),
            FigureData::Grouped(rows) => draw_bars(frame, inner, rows),
            FigureData::Shares(_) | FigureData::Hierarchy(_) => {
                let body = crate::report::format_body(figure, inner.width as usize, inner.height as usize);
                frame.render_widget(Paragraph::new(body), inner);
            }
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ control  ←/→ adjust  PgUp/PgDn ±30d  Space toggle  Enter edit  c clear  R reset  Tab/1-8 chart  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn move_cursor(cursor: usize, delta: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if delta < 0 {
        cursor.saturating_sub(1)
    } else {
        (cursor + 1).min(len - 1)
    }
}

fn draw_trend(frame: &mut ratatui::Frame<'_>, inner: Rect, figure: &Figure, rows: &[MonthTotal]) {
    let (line, x_bounds, y_bounds) = trend_series(rows);
    let axes = Axes {
        x_bounds,
        y_bounds,
        x_label: figure.x_label.unwrap_or("Month"),
        y_label: figure.y_label.unwrap_or("Amount"),
        fmt_x: fmt_month,
        fmt_y: fmt_compact,
    };
    let (chart_rect, insets) = chart_layout(inner);
    let widget = FigureChart {
        line: &line,
        points: &line,
        heavy: &[],
        zero_line: false,
        axes,
    };
    frame.render_widget(widget, chart_rect);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, &axes);
    }
}

fn draw_relation(frame: &mut ratatui::Frame<'_>, inner: Rect, figure: &Figure, points: &[RelationPoint]) {
    let (all, heavy, x_bounds, y_bounds) = relation_series(points);
    let axes = Axes {
        x_bounds,
        y_bounds,
        x_label: figure.x_label.unwrap_or("Sales"),
        y_label: figure.y_label.unwrap_or("Profit"),
        fmt_x: fmt_compact,
        fmt_y: fmt_compact,
    };
    let (chart_rect, insets) = chart_layout(inner);
    let widget = FigureChart {
        line: &[],
        points: &all,
        heavy: &heavy,
        zero_line: true,
        axes,
    };
    frame.render_widget(widget, chart_rect);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, &axes);
    }
}

fn draw_bars(frame: &mut ratatui::Frame<'_>, inner: Rect, rows: &[LabeledTotal]) {
    let bars: Vec<Bar> = rows
        .iter()
        .map(|r| {
            Bar::default()
                .value(r.sales.max(0.0).round() as u64)
                .label(Line::from(r.key.clone()))
                .text_value(r.label.clone())
        })
        .collect();

    let n = rows.len().max(1) as u16;
    let bar_width = (inner.width / n).saturating_sub(2).clamp(3, 24);
    let chart = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, inner);
}

/// Monthly totals as `(month ordinal, sales)` plus padded bounds.
fn trend_series(rows: &[MonthTotal]) -> (Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let line: Vec<(f64, f64)> = rows
        .iter()
        .map(|r| (r.month.ordinal() as f64, r.sales))
        .collect();

    let (mut x0, mut x1) = min_max(line.iter().map(|&(x, _)| x));
    if x1 <= x0 {
        x0 -= 1.0;
        x1 += 1.0;
    }
    let (y_min, y_max) = min_max(line.iter().map(|&(_, y)| y));
    (line, [x0, x1], pad([y_min.min(0.0), y_max]))
}

/// Sales/profit points; orders with above-median quantity go in the second series.
fn relation_series(points: &[RelationPoint]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let mut quantities: Vec<i64> = points.iter().map(|p| p.quantity).collect();
    quantities.sort_unstable();
    let median = quantities.get(quantities.len() / 2).copied().unwrap_or(0);

    let all: Vec<(f64, f64)> = points.iter().map(|p| (p.sales, p.profit)).collect();
    let heavy: Vec<(f64, f64)> = points
        .iter()
        .filter(|p| p.quantity > median)
        .map(|p| (p.sales, p.profit))
        .collect();

    let (x0, x1) = min_max(all.iter().map(|&(x, _)| x));
    let (y0, y1) = min_max(all.iter().map(|&(_, y)| y));
    (all, heavy, pad([x0, x1]), pad([y0, y1]))
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn pad([lo, hi]: [f64; 2]) -> [f64; 2] {
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi <= lo {
        let half = (lo.abs() * 0.1).max(0.5);
        return [lo - half, hi + half];
    }
    let p = ((hi - lo) * 0.05).max(1e-12);
    [lo - p, hi + p]
}

fn fmt_month(v: f64) -> String {
    let ordinal = v.round() as i64;
    format!("{:04}-{:02}", ordinal.div_euclid(12), ordinal.rem_euclid(12) + 1)
}

fn fmt_compact(v: f64) -> String {
    let a = v.abs();
    if a >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if a >= 1_000.0 {
        format!("{:.1}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
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
        left: 9,
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
    axes: &Axes<'_>,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = axes.x_bounds;
    let [y0, y1] = axes.y_bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = (axes.fmt_x)(x0 + u * (x1 - x0));
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label_len = label.chars().count() as u16;
        let start = x.saturating_sub(label_len / 2);
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
        let label = (axes.fmt_y)(y0 + u * (y1 - y0));
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label_len = label.chars().count() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
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

    let x_label = Paragraph::new(axes.x_label)
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

    let y_label = Paragraph::new(axes.y_label)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
