use crate::models::{BaseDataset, DashboardResult, EVENT_COLUMNS, Event, QueryResult};
use crate::sqlite::schema::EARTHQUAKE_TABLE;

/// Read-only access to the store holding the `earthquake` table.
pub trait DataSource {
    /// Runs `query` verbatim and returns every row.
    fn execute(&self, query: &str) -> DashboardResult<QueryResult>;

    fn load_events(&self) -> DashboardResult<Vec<Event>> {
        let columns = EVENT_COLUMNS
            .iter()
            .map(|column| format!("\"{column}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let result = self.execute(&format!("SELECT {columns} FROM {EARTHQUAKE_TABLE}"))?;
        (0..result.len())
            .map(|index| Event::from_row(&result, index))
            .collect()
    }

    fn load_dataset(&self) -> DashboardResult<BaseDataset> {
        let events = self.load_events()?;
        tracing::info!(events = events.len(), "loaded base dataset");
        Ok(BaseDataset::new(events))
    }

    /// First `rows` rows of the table with every stored column.
    fn preview(&self, rows: usize) -> DashboardResult<QueryResult> {
        self.execute(&format!("SELECT * FROM {EARTHQUAKE_TABLE} LIMIT {rows}"))
    }
}
