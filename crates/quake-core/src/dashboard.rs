use crate::models::{
    BaseDataset, DashboardError, DashboardResult, PostProcess, QueryResult, TaskDefinition,
    TaskId, TaskSource, Value,
};
use crate::registry;
use crate::render::{self, View};
use crate::source::DataSource;

/// The rendered result of one selection.
#[derive(Clone, Debug)]
pub struct TaskOutcome {
    pub definition: &'static TaskDefinition,
    pub view: View,
}

/// Owns the data source and the base dataset loaded at startup, and runs
/// one task per selection.
pub struct Dashboard<S: DataSource> {
    source: S,
    dataset: BaseDataset,
    preview: QueryResult,
}

impl<S: DataSource> Dashboard<S> {
    /// Loads the base dataset and the preview rows. Any failure here is fatal
    /// to the session.
    pub fn open(source: S, preview_rows: usize) -> DashboardResult<Self> {
        let dataset = source.load_dataset()?;
        let preview = source.preview(preview_rows)?;
        Ok(Self {
            source,
            dataset,
            preview,
        })
    }

    pub fn dataset(&self) -> &BaseDataset {
        &self.dataset
    }

    pub fn preview(&self) -> &QueryResult {
        &self.preview
    }

    /// Runs `id` and renders it. Fatal errors propagate; any other failure
    /// is rendered inline so the remaining tasks stay usable.
    pub fn run(&self, id: TaskId) -> DashboardResult<TaskOutcome> {
        let definition = registry::lookup(id)?;
        tracing::info!(task = id.get(), title = definition.title, "running task");

        let view = match self
            .execute(definition)
            .and_then(|result| render::render(definition, result))
        {
            Ok(view) => view,
            Err(error) => {
                let error = error.for_task(id);
                if error.kind.is_fatal() {
                    tracing::error!(task = id.get(), error = %error, "store failure");
                    return Err(error);
                }
                tracing::warn!(task = id.get(), error = %error, "task failed");
                View::error(&error)
            }
        };

        Ok(TaskOutcome { definition, view })
    }

    /// Produces the post-processed result for `definition` without rendering.
    pub fn execute(&self, definition: &TaskDefinition) -> DashboardResult<QueryResult> {
        let result = match definition.source {
            TaskSource::Sql(query) => self.source.execute(query)?,
            TaskSource::InMemory(transform) => transform(&self.dataset),
        };
        let result = match definition.post {
            Some(post) => apply_post(post, result)?,
            None => result,
        };
        check_columns(definition, &result)?;
        Ok(result)
    }
}

pub fn apply_post(post: PostProcess, mut result: QueryResult) -> DashboardResult<QueryResult> {
    match post {
        PostProcess::TakeTop(rows) => {
            result.truncate(rows);
            Ok(result)
        }
        PostProcess::ExtractScalar(column) => {
            let index = result.column_index(column).ok_or_else(|| {
                DashboardError::query(format!(
                    "schema mismatch: no column '{column}' to extract a scalar from"
                ))
            })?;
            let mut scalar = QueryResult::new(&[column]);
            if let Some(row) = result.rows.first() {
                scalar.push_row(vec![row.get(index).cloned().unwrap_or(Value::Null)]);
            }
            Ok(scalar)
        }
    }
}

fn check_columns(definition: &TaskDefinition, result: &QueryResult) -> DashboardResult<()> {
    if result
        .columns
        .iter()
        .map(String::as_str)
        .eq(definition.columns.iter().copied())
    {
        return Ok(());
    }
    Err(DashboardError::query(format!(
        "schema mismatch: expected columns [{}], got [{}]",
        definition.columns.join(", "),
        result.columns.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DashboardErrorKind, EVENT_COLUMNS};

    /// Serves the base dataset and preview, and a fixed response for every
    /// other query.
    struct FixtureSource {
        sql_response: DashboardResult<QueryResult>,
    }

    impl FixtureSource {
        fn answering(sql_response: DashboardResult<QueryResult>) -> Self {
            Self { sql_response }
        }
    }

    impl DataSource for FixtureSource {
        fn execute(&self, query: &str) -> DashboardResult<QueryResult> {
            if query.starts_with("SELECT \"id\"") {
                let mut events = QueryResult::new(&EVENT_COLUMNS);
                for (index, mag) in [6.1, 7.9, 5.0].into_iter().enumerate() {
                    let mut row = vec![Value::Null; EVENT_COLUMNS.len()];
                    row[0] = Value::Text(format!("ev{index}"));
                    row[2] = Value::Real(mag);
                    row[4] = Value::Real(10.0);
                    row[13] = "us".into();
                    events.push_row(row);
                }
                return Ok(events);
            }
            if query.starts_with("SELECT *") {
                let mut preview = QueryResult::new(&["id"]);
                preview.push_row(vec!["ev0".into()]);
                return Ok(preview);
            }
            self.sql_response.clone()
        }
    }

    fn id(raw: u8) -> TaskId {
        TaskId::new(raw).unwrap()
    }

    #[test]
    fn opens_with_dataset_and_preview() {
        let dashboard =
            Dashboard::open(FixtureSource::answering(Ok(QueryResult::default())), 5).unwrap();

        assert_eq!(dashboard.dataset().len(), 3);
        assert_eq!(dashboard.preview().len(), 1);
    }

    #[test]
    fn in_memory_task_renders_table() {
        let dashboard =
            Dashboard::open(FixtureSource::answering(Ok(QueryResult::default())), 5).unwrap();
        let outcome = dashboard.run(id(1)).unwrap();

        assert_eq!(outcome.definition.id, id(1));
        let table = outcome.view.table().unwrap();
        assert_eq!(table.value(0, "mag"), Some(&Value::Real(7.9)));
    }

    #[test]
    fn take_top_keeps_only_the_leader() {
        let dashboard =
            Dashboard::open(FixtureSource::answering(Ok(QueryResult::default())), 5).unwrap();
        let outcome = dashboard.run(id(10)).unwrap();

        let table = outcome.view.table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "Network"), Some(&Value::from("us")));
        assert_eq!(table.value(0, "Count"), Some(&Value::Integer(3)));
    }

    #[test]
    fn query_errors_are_rendered_inline() {
        let dashboard = Dashboard::open(
            FixtureSource::answering(Err(DashboardError::query("no such column: types"))),
            5,
        )
        .unwrap();

        let outcome = dashboard.run(id(15)).unwrap();
        match outcome.view {
            View::Error { message } => assert!(message.contains("no such column")),
            other => panic!("unexpected view {other:?}"),
        }

        // other tasks are unaffected
        assert!(dashboard.run(id(2)).unwrap().view.table().is_some());
    }

    #[test]
    fn schema_mismatch_is_rendered_inline() {
        let mut wrong = QueryResult::new(&["status", "n"]);
        wrong.push_row(vec!["reviewed".into(), 1.into()]);
        let dashboard = Dashboard::open(FixtureSource::answering(Ok(wrong)), 5).unwrap();

        match dashboard.run(id(13)).unwrap().view {
            View::Error { message } => assert!(message.contains("schema mismatch")),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn connection_errors_end_the_session() {
        let dashboard = Dashboard::open(
            FixtureSource::answering(Err(DashboardError::connection("disk I/O error"))),
            5,
        )
        .unwrap();

        let error = dashboard.run(id(7)).unwrap_err();
        assert_eq!(error.kind, DashboardErrorKind::Connection);
        assert_eq!(error.task, Some(id(7)));
    }

    #[test]
    fn extract_scalar_keeps_first_cell_of_named_column() {
        let mut result = QueryResult::new(&["avg_magnitude_difference"]);
        result.push_row(vec![Value::Real(0.85)]);

        let scalar =
            apply_post(PostProcess::ExtractScalar("avg_magnitude_difference"), result).unwrap();
        assert_eq!(scalar.rows, vec![vec![Value::Real(0.85)]]);

        let error = apply_post(
            PostProcess::ExtractScalar("missing"),
            QueryResult::new(&["other"]),
        )
        .unwrap_err();
        assert_eq!(error.kind, DashboardErrorKind::Query);
    }
}
