pub mod text;

use serde::Serialize;

use crate::models::{
    ChartSpec, DashboardError, DashboardResult, DisplayMode, QueryResult, Summary,
    TaskDefinition, Value,
};

pub use text::{render_text, write_view};

pub const EMPTY_MESSAGE: &str = "No data available for this task";
pub const MISSING_METRIC: &str = "n/a";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    /// `None` draws no bar or point.
    pub value: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartView {
    pub kind: ChartKind,
    pub key: String,
    pub value: String,
    pub points: Vec<ChartPoint>,
}

impl ChartView {
    pub fn max_value(&self) -> Option<f64> {
        self.points
            .iter()
            .filter_map(|point| point.value)
            .reduce(f64::max)
    }

    pub fn min_value(&self) -> Option<f64> {
        self.points
            .iter()
            .filter_map(|point| point.value)
            .reduce(f64::min)
    }
}

/// What the presentation layer draws for one task run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Empty { message: String },
    Table { table: QueryResult },
    Chart { table: QueryResult, chart: ChartView },
    Metric { label: String, value: Value },
    TableWithSummary { table: QueryResult, summary: String },
    Error { message: String },
}

impl View {
    pub fn error(error: &DashboardError) -> Self {
        View::Error {
            message: error.to_string(),
        }
    }

    pub fn table(&self) -> Option<&QueryResult> {
        match self {
            View::Table { table }
            | View::Chart { table, .. }
            | View::TableWithSummary { table, .. } => Some(table),
            _ => None,
        }
    }
}

/// Builds the view for `result` according to the definition's display mode.
pub fn render(definition: &TaskDefinition, result: QueryResult) -> DashboardResult<View> {
    if result.is_empty() {
        return Ok(View::Empty {
            message: EMPTY_MESSAGE.to_string(),
        });
    }

    match definition.display {
        DisplayMode::Table => Ok(View::Table { table: result }),
        DisplayMode::BarChart(spec) => chart(ChartKind::Bar, spec, result),
        DisplayMode::LineChart(spec) => chart(ChartKind::Line, spec, result),
        DisplayMode::Metric { label } => {
            let value = result
                .rows
                .first()
                .and_then(|row| row.first())
                .cloned()
                .unwrap_or(Value::Null);
            Ok(View::Metric {
                label: label.to_string(),
                value,
            })
        }
        DisplayMode::TableWithSummary(summary) => {
            let summary = summarize(summary, &result)?;
            Ok(View::TableWithSummary {
                table: result,
                summary,
            })
        }
    }
}

fn chart(kind: ChartKind, spec: ChartSpec, table: QueryResult) -> DashboardResult<View> {
    let keys = required_column(&table, spec.key)?;
    let values = required_column(&table, spec.value)?;
    let points = keys
        .into_iter()
        .zip(values)
        .map(|(key, value)| ChartPoint {
            label: chart_label(key),
            value: value.as_f64(),
        })
        .collect();

    Ok(View::Chart {
        chart: ChartView {
            kind,
            key: spec.key.to_string(),
            value: spec.value.to_string(),
            points,
        },
        table,
    })
}

fn summarize(summary: Summary, result: &QueryResult) -> DashboardResult<String> {
    match summary {
        Summary::RowCount { label } => Ok(format!("{label}: {}", result.len())),
        Summary::TopRow {
            key,
            value,
            lead,
            joiner,
            unit,
        } => {
            let top_key = top_cell(result, key)?;
            let top_value = top_cell(result, value)?;
            Ok(format!(
                "{lead} {} {joiner} {top_value} {unit}",
                chart_label(top_key)
            ))
        }
    }
}

fn top_cell<'a>(result: &'a QueryResult, column: &str) -> DashboardResult<&'a Value> {
    result
        .value(0, column)
        .ok_or_else(|| missing_column(result, column))
}

fn required_column<'a>(result: &'a QueryResult, column: &str) -> DashboardResult<Vec<&'a Value>> {
    result
        .column(column)
        .ok_or_else(|| missing_column(result, column))
}

fn missing_column(result: &QueryResult, column: &str) -> DashboardError {
    DashboardError::query(format!(
        "schema mismatch: result has no column '{column}' (columns: {})",
        result.columns.join(", ")
    ))
}

fn chart_label(value: &Value) -> String {
    match value {
        Value::Null => "(none)".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskId, TaskShape, TaskSource};

    fn definition(display: DisplayMode, columns: &'static [&'static str]) -> TaskDefinition {
        TaskDefinition {
            id: TaskId::known(1),
            title: "test",
            shape: TaskShape::GroupAggregate,
            source: TaskSource::Sql("SELECT 1"),
            columns,
            display,
            post: None,
        }
    }

    fn counts() -> QueryResult {
        let mut result = QueryResult::new(&["month", "total_earthquakes"]);
        result.push_row(vec![Value::Integer(3), Value::Integer(41)]);
        result.push_row(vec![Value::Integer(1), Value::Integer(17)]);
        result
    }

    #[test]
    fn empty_results_render_the_empty_state() {
        let definition = definition(DisplayMode::Table, &["month", "total_earthquakes"]);
        let view = render(&definition, QueryResult::new(&["month", "total_earthquakes"])).unwrap();

        assert_eq!(
            view,
            View::Empty {
                message: EMPTY_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn top_row_summary_names_key_and_value() {
        let definition = definition(
            DisplayMode::TableWithSummary(Summary::TopRow {
                key: "month",
                value: "total_earthquakes",
                lead: "Highest earthquakes occurred in",
                joiner: "with",
                unit: "events",
            }),
            &["month", "total_earthquakes"],
        );

        match render(&definition, counts()).unwrap() {
            View::TableWithSummary { summary, table } => {
                assert_eq!(summary, "Highest earthquakes occurred in 3 with 41 events");
                assert_eq!(table.len(), 2);
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn row_count_summary_reports_length() {
        let definition = definition(
            DisplayMode::TableWithSummary(Summary::RowCount {
                label: "Total Events",
            }),
            &["month", "total_earthquakes"],
        );

        match render(&definition, counts()).unwrap() {
            View::TableWithSummary { summary, .. } => assert_eq!(summary, "Total Events: 2"),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn charts_project_key_and_value_in_result_order() {
        let definition = definition(
            DisplayMode::BarChart(ChartSpec {
                key: "month",
                value: "total_earthquakes",
            }),
            &["month", "total_earthquakes"],
        );

        match render(&definition, counts()).unwrap() {
            View::Chart { chart, .. } => {
                assert_eq!(chart.kind, ChartKind::Bar);
                let labels: Vec<&str> =
                    chart.points.iter().map(|point| point.label.as_str()).collect();
                assert_eq!(labels, vec!["3", "1"]);
                assert_eq!(chart.max_value(), Some(41.0));
                assert_eq!(chart.min_value(), Some(17.0));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn null_chart_values_have_no_bar() {
        let definition = definition(
            DisplayMode::BarChart(ChartSpec {
                key: "country",
                value: "ratio",
            }),
            &["country", "ratio"],
        );
        let mut result = QueryResult::new(&["country", "ratio"]);
        result.push_row(vec!["tonga".into(), Value::Null]);

        match render(&definition, result).unwrap() {
            View::Chart { chart, .. } => {
                assert_eq!(chart.points[0].value, None);
                assert_eq!(chart.max_value(), None);
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn chart_with_missing_column_is_a_query_error() {
        let definition = definition(
            DisplayMode::LineChart(ChartSpec {
                key: "year",
                value: "total_quakes",
            }),
            &["year", "total_quakes"],
        );

        let error = render(&definition, counts()).unwrap_err();
        assert_eq!(error.kind, crate::models::DashboardErrorKind::Query);
        assert!(error.message.contains("schema mismatch"));
    }

    #[test]
    fn metric_takes_the_single_scalar() {
        let definition = definition(
            DisplayMode::Metric {
                label: "Avg Magnitude Difference",
            },
            &["avg_magnitude_difference"],
        );
        let mut result = QueryResult::new(&["avg_magnitude_difference"]);
        result.push_row(vec![Value::Real(0.85)]);

        assert_eq!(
            render(&definition, result).unwrap(),
            View::Metric {
                label: "Avg Magnitude Difference".to_string(),
                value: Value::Real(0.85),
            }
        );
    }
}
