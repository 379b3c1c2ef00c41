use std::error::Error;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use quake_core::models::{DashboardResult, QueryResult, Value};
use quake_core::render::{ChartKind, ChartView, MISSING_METRIC, View};
use quake_core::{Dashboard, DataSource, Selector, TaskOutcome};
use ratatui::DefaultTerminal;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Text};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType, List, ListItem, ListState,
    Paragraph, Row, Table, Wrap,
};

const TITLE: &str = "Global Seismic Trends Dashboard";
const SUBTITLE: &str = "Earthquake analysis using USGS data";
/// Bar values are integers; keep two decimals of the source value.
const BAR_SCALE: f64 = 100.0;

struct App<'a, S: DataSource> {
    dashboard: &'a Dashboard<S>,
    selector: Selector,
    list_state: ListState,
    outcome: Option<TaskOutcome>,
}

/// Runs the interactive page until the user quits. A store failure ends the
/// session and is returned after the terminal is restored.
pub fn run<S: DataSource>(dashboard: &Dashboard<S>) -> Result<(), Box<dyn Error>> {
    let mut terminal = ratatui::try_init()?;
    let outcome = App::new(dashboard).event_loop(&mut terminal);
    ratatui::restore();
    outcome
}

impl<'a, S: DataSource> App<'a, S> {
    fn new(dashboard: &'a Dashboard<S>) -> Self {
        Self {
            dashboard,
            selector: Selector::default(),
            list_state: ListState::default().with_selected(Some(0)),
            outcome: None,
        }
    }

    fn event_loop(mut self, terminal: &mut DefaultTerminal) -> Result<(), Box<dyn Error>> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !self.handle_key(key)? {
                return Ok(());
            }
        }
    }

    /// Returns false when the user asked to quit.
    fn handle_key(&mut self, key: KeyEvent) -> DashboardResult<bool> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
            KeyCode::Down | KeyCode::Char('j') => self.selector.next(),
            KeyCode::Up | KeyCode::Char('k') => self.selector.previous(),
            KeyCode::Enter => {
                if let Some(id) = self.selector.confirm() {
                    self.outcome = Some(self.dashboard.run(id)?);
                }
            }
            _ => {}
        }
        self.list_state.select(Some(self.selector.cursor()));
        Ok(true)
    }

    fn draw(&mut self, frame: &mut Frame) {
        let [header, body] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(frame.area());
        let [sidebar, main] =
            Layout::horizontal([Constraint::Length(16), Constraint::Min(0)]).areas(body);
        let [preview, result] =
            Layout::vertical([Constraint::Length(9), Constraint::Min(0)]).areas(main);

        let heading = Text::from(vec![
            Line::from(TITLE).bold(),
            Line::from(SUBTITLE).fg(Color::Gray),
        ]);
        frame.render_widget(Paragraph::new(heading).centered(), header);

        self.draw_sidebar(frame, sidebar);
        draw_table(
            frame,
            preview,
            self.dashboard.preview(),
            Block::bordered().title("Dataset Preview"),
        );
        self.draw_result(frame, result);
    }

    fn draw_sidebar(&mut self, frame: &mut Frame, area: Rect) {
        let selected = self.selector.current_selection();
        let items: Vec<ListItem> = self
            .selector
            .ids()
            .iter()
            .zip(self.selector.labels())
            .map(|(id, label)| {
                let item = ListItem::new(label);
                if Some(*id) == selected {
                    item.style(Style::default().fg(Color::Cyan))
                } else {
                    item
                }
            })
            .collect();

        let list = List::new(items)
            .block(Block::bordered().title("Select Task"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn draw_result(&self, frame: &mut Frame, area: Rect) {
        let Some(outcome) = &self.outcome else {
            let hint = Paragraph::new("Choose a task with ↑/↓ and press Enter. q quits.")
                .block(Block::bordered().title("Result"));
            frame.render_widget(hint, area);
            return;
        };

        let block = Block::bordered().title(format!(
            "{}: {}",
            outcome.definition.id.label(),
            outcome.definition.title
        ));

        match &outcome.view {
            View::Empty { message } => {
                frame.render_widget(Paragraph::new(message.as_str()).block(block), area)
            }
            View::Error { message } => frame.render_widget(
                Paragraph::new(format!("Error: {message}"))
                    .fg(Color::Red)
                    .wrap(Wrap { trim: true })
                    .block(block),
                area,
            ),
            View::Table { table } => draw_table(frame, area, table, block),
            View::TableWithSummary { table, summary } => {
                let inner = block.inner(area);
                frame.render_widget(block, area);
                let [summary_area, table_area] =
                    Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(inner);
                frame.render_widget(
                    Paragraph::new(summary.as_str())
                        .bold()
                        .wrap(Wrap { trim: true }),
                    summary_area,
                );
                draw_table(frame, table_area, table, Block::default());
            }
            View::Metric { label, value } => {
                let shown = if value.is_null() {
                    MISSING_METRIC.to_string()
                } else {
                    value.to_string()
                };
                let text = Text::from(vec![
                    Line::from(label.as_str()).fg(Color::Gray),
                    Line::from(shown).bold(),
                ]);
                frame.render_widget(Paragraph::new(text).block(block), area);
            }
            View::Chart { table, chart } => {
                let inner = block.inner(area);
                frame.render_widget(block, area);
                let [chart_area, table_area] =
                    Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)])
                        .areas(inner);
                match chart.kind {
                    ChartKind::Bar => draw_bar_chart(frame, chart_area, chart),
                    ChartKind::Line => draw_line_chart(frame, chart_area, chart),
                }
                draw_table(frame, table_area, table, Block::default());
            }
        }
    }
}

fn draw_table(frame: &mut Frame, area: Rect, table: &QueryResult, block: Block) {
    let header = Row::new(table.columns.iter().map(String::as_str))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = table
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(Value::to_string)));
    let widths = vec![Constraint::Fill(1); table.columns.len()];

    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}

fn draw_bar_chart(frame: &mut Frame, area: Rect, chart: &ChartView) {
    let bars: Vec<Bar> = chart
        .points
        .iter()
        .map(|point| {
            let value = point.value.unwrap_or(0.0).max(0.0);
            Bar::default()
                .label(Line::from(point.label.clone()))
                .value((value * BAR_SCALE).round() as u64)
                .text_value(
                    point
                        .value
                        .map(|value| Value::Real(value).to_string())
                        .unwrap_or_default(),
                )
        })
        .collect();

    let widget = BarChart::default()
        .block(Block::default().title(format!("{} by {}", chart.value, chart.key)))
        .direction(ratatui::layout::Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Yellow))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(widget, area);
}

fn draw_line_chart(frame: &mut Frame, area: Rect, chart: &ChartView) {
    let points: Vec<(f64, f64)> = chart
        .points
        .iter()
        .enumerate()
        .filter_map(|(index, point)| point.value.map(|value| (index as f64, value)))
        .collect();
    let (Some(min), Some(max)) = (chart.min_value(), chart.max_value()) else {
        frame.render_widget(Paragraph::new(chart.value.as_str()), area);
        return;
    };
    let padding = ((max - min) * 0.1).max(1.0);
    let last = chart.points.len().saturating_sub(1);

    let x_labels: Vec<String> = [chart.points.first(), chart.points.last()]
        .into_iter()
        .flatten()
        .map(|point| point.label.clone())
        .collect();
    let y_labels = vec![
        Value::Real(min).to_string(),
        Value::Real(max).to_string(),
    ];

    let dataset = Dataset::default()
        .name(chart.value.clone())
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);
    let widget = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .title(chart.key.clone())
                .bounds([0.0, last.max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(chart.value.clone())
                .bounds([min - padding, max + padding])
                .labels(y_labels),
        );
    frame.render_widget(widget, area);
}
