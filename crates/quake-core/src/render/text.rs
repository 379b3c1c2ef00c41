use std::io::{self, Write};

use crate::models::{QueryResult, Value};
use crate::render::{ChartKind, ChartView, MISSING_METRIC, View};

const BAR_WIDTH: usize = 40;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn render_text(view: &View) -> String {
    let mut buffer = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_view(&mut buffer, view);
    String::from_utf8_lossy(&buffer).into_owned()
}

pub fn write_view(out: &mut impl Write, view: &View) -> io::Result<()> {
    match view {
        View::Empty { message } => writeln!(out, "{message}"),
        View::Error { message } => writeln!(out, "error: {message}"),
        View::Table { table } => write_table(out, table),
        View::TableWithSummary { table, summary } => {
            write_table(out, table)?;
            writeln!(out)?;
            writeln!(out, "{summary}")
        }
        View::Chart { table, chart } => {
            write_table(out, table)?;
            writeln!(out)?;
            match chart.kind {
                ChartKind::Bar => write_bar_chart(out, chart),
                ChartKind::Line => write_line_chart(out, chart),
            }
        }
        View::Metric { label, value } => {
            writeln!(out, "{label}")?;
            if value.is_null() {
                writeln!(out, "  {MISSING_METRIC}")
            } else {
                writeln!(out, "  {value}")
            }
        }
    }
}

/// Fixed-width table; numbers right-aligned, NULL cells blank.
pub fn write_table(out: &mut impl Write, table: &QueryResult) -> io::Result<()> {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = table
        .columns
        .iter()
        .map(|column| column.chars().count())
        .collect();
    for row in &cells {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| pad_right(column, *width))
        .collect();
    writeln!(out, "{}", header.join(" | ").trim_end())?;

    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(out, "{}", rule.join("-+-"))?;

    for (row, formatted) in table.rows.iter().zip(&cells) {
        let line: Vec<String> = formatted
            .iter()
            .zip(row)
            .zip(&widths)
            .map(|((cell, value), width)| match value {
                Value::Integer(_) | Value::Real(_) => pad_left(cell, *width),
                _ => pad_right(cell, *width),
            })
            .collect();
        writeln!(out, "{}", line.join(" | ").trim_end())?;
    }
    Ok(())
}

fn write_bar_chart(out: &mut impl Write, chart: &ChartView) -> io::Result<()> {
    writeln!(out, "{} by {}", chart.value, chart.key)?;
    let label_width = chart
        .points
        .iter()
        .map(|point| point.label.chars().count())
        .max()
        .unwrap_or(0);
    let scale = chart
        .points
        .iter()
        .filter_map(|point| point.value)
        .map(f64::abs)
        .reduce(f64::max)
        .filter(|max| *max > 0.0);

    for point in &chart.points {
        let label = pad_right(&point.label, label_width);
        match (point.value, scale) {
            (Some(value), Some(scale)) => {
                let length = ((value.abs() / scale) * BAR_WIDTH as f64).round() as usize;
                writeln!(
                    out,
                    "{label} | {} {}",
                    "#".repeat(length),
                    Value::Real(value)
                )?;
            }
            (Some(value), None) => writeln!(out, "{label} | {}", Value::Real(value))?,
            (None, _) => writeln!(out, "{label} |")?,
        }
    }
    Ok(())
}

fn write_line_chart(out: &mut impl Write, chart: &ChartView) -> io::Result<()> {
    writeln!(out, "{} over {}", chart.value, chart.key)?;
    let (Some(min), Some(max)) = (chart.min_value(), chart.max_value()) else {
        return Ok(());
    };
    let span = max - min;
    let line: String = chart
        .points
        .iter()
        .map(|point| match point.value {
            None => ' ',
            Some(_) if span == 0.0 => SPARK_LEVELS[SPARK_LEVELS.len() / 2],
            Some(value) => {
                let level = ((value - min) / span * (SPARK_LEVELS.len() - 1) as f64).round();
                SPARK_LEVELS[level as usize]
            }
        })
        .collect();
    let first = chart.points.first().map(|point| point.label.as_str());
    let last = chart.points.last().map(|point| point.label.as_str());
    writeln!(out, "{line}")?;
    if let (Some(first), Some(last)) = (first, last) {
        writeln!(
            out,
            "{first} .. {last} (min {}, max {})",
            Value::Real(min),
            Value::Real(max)
        )?;
    }
    Ok(())
}

fn pad_right(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.chars().count());
    format!("{text}{}", " ".repeat(padding))
}

fn pad_left(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.chars().count());
    format!("{}{text}", " ".repeat(padding))
}
