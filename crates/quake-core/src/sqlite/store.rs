use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode, OpenFlags};

use crate::models::{DashboardError, DashboardErrorKind, DashboardResult, QueryResult, Value};
use crate::source::DataSource;
use crate::sqlite::schema::{EARTHQUAKE_TABLE, SchemaProblem, verify_schema};

/// Virtual machine instructions between deadline checks.
const PROGRESS_CHECK_OPS: i32 = 10_000;

/// Read-only SQLite connection opened once and reused for every task run.
pub struct SqliteDataSource {
    database_path: PathBuf,
    connection: Connection,
    query_timeout: Option<Duration>,
}

impl SqliteDataSource {
    /// Opens `database_path` read-only and verifies the `earthquake` schema.
    pub fn open(
        database_path: impl Into<PathBuf>,
        query_timeout: Option<Duration>,
    ) -> DashboardResult<Self> {
        let database_path = database_path.into();
        let connection =
            open_connection(&database_path).map_err(|error| storage_error("open", error))?;

        match verify_schema(&connection).map_err(|error| storage_error("verify_schema", error))? {
            None => {}
            Some(SchemaProblem::MissingTable) => {
                return Err(DashboardError::query(format!(
                    "table '{EARTHQUAKE_TABLE}' not found in '{}'",
                    database_path.display()
                )));
            }
            Some(SchemaProblem::MissingColumns(columns)) => {
                return Err(DashboardError::query(format!(
                    "table '{EARTHQUAKE_TABLE}' is missing columns: {}",
                    columns.join(", ")
                )));
            }
        }

        tracing::info!(path = %database_path.display(), "opened earthquake store");
        Ok(Self {
            database_path,
            connection,
            query_timeout,
        })
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    fn with_deadline<T>(
        &self,
        operation: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> rusqlite::Result<T> {
        let Some(timeout) = self.query_timeout else {
            return operation(&self.connection);
        };

        let deadline = Instant::now() + timeout;
        self.connection
            .progress_handler(PROGRESS_CHECK_OPS, Some(move || Instant::now() >= deadline));
        let outcome = operation(&self.connection);
        self.connection.progress_handler(0, None::<fn() -> bool>);
        outcome
    }
}

impl DataSource for SqliteDataSource {
    fn execute(&self, query: &str) -> DashboardResult<QueryResult> {
        let started = Instant::now();
        let result = self
            .with_deadline(|connection| read_result(connection, query))
            .map_err(|error| match self.query_timeout {
                Some(timeout) if is_interrupt(&error) => DashboardError::new(
                    DashboardErrorKind::Timeout,
                    format!("query exceeded the {} ms timeout", timeout.as_millis()),
                ),
                _ => storage_error("execute", error),
            })?;

        tracing::debug!(
            rows = result.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "executed query"
        );
        Ok(result)
    }
}

fn open_connection(database_path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(
        database_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

fn read_result(connection: &Connection, query: &str) -> rusqlite::Result<QueryResult> {
    let mut statement = connection.prepare(query)?;
    let columns: Vec<String> = statement
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();

    let mut result = QueryResult {
        columns,
        rows: Vec::new(),
    };
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for index in 0..width {
            cells.push(to_value(row.get_ref(index)?));
        }
        result.rows.push(cells);
    }
    Ok(result)
}

fn to_value(raw: ValueRef<'_>) -> Value {
    match raw {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(value) => Value::Integer(value),
        ValueRef::Real(value) => Value::Real(value),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Text(format!("<{} byte blob>", bytes.len())),
    }
}

fn is_interrupt(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::OperationInterrupted
    )
}

fn storage_error(operation: &str, error: rusqlite::Error) -> DashboardError {
    DashboardError::new(
        classify(&error),
        format!("sqlite store '{operation}' failed: {error}"),
    )
}

/// Unreachable or unreadable stores end the session; everything else is a
/// query problem scoped to one task.
fn classify(error: &rusqlite::Error) -> DashboardErrorKind {
    match error {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::OperationInterrupted => DashboardErrorKind::Timeout,
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::SystemIoFailure
            | ErrorCode::PermissionDenied
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked => DashboardErrorKind::Connection,
            _ => DashboardErrorKind::Query,
        },
        rusqlite::Error::InvalidPath(_) | rusqlite::Error::NulError(_) => {
            DashboardErrorKind::Connection
        }
        _ => DashboardErrorKind::Query,
    }
}
