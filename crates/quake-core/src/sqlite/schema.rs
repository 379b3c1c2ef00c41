use rusqlite::Connection;

use crate::models::EVENT_COLUMNS;

pub const EARTHQUAKE_TABLE: &str = "earthquake";

/// Layout the dashboard expects; the dashboard itself never executes it.
pub const EARTHQUAKE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS earthquake (
    id TEXT PRIMARY KEY,
    place TEXT,
    mag REAL,
    magType TEXT,
    depth_km REAL,
    latitude REAL,
    longitude REAL,
    time TEXT,
    country TEXT,
    sig REAL,
    alert TEXT,
    tsunami INTEGER NOT NULL DEFAULT 0,
    status TEXT,
    net TEXT,
    nst INTEGER,
    rms REAL,
    gap REAL,
    type TEXT,
    types TEXT,
    year INTEGER,
    month INTEGER,
    day_of_week TEXT
);

CREATE INDEX IF NOT EXISTS idx_earthquake_time ON earthquake (time);
"#;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SchemaProblem {
    MissingTable,
    MissingColumns(Vec<&'static str>),
}

/// Checks the `earthquake` table exists and carries every event column.
pub fn verify_schema(connection: &Connection) -> rusqlite::Result<Option<SchemaProblem>> {
    let mut statement = connection.prepare(&format!("PRAGMA table_info({EARTHQUAKE_TABLE})"))?;
    let present = statement
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if present.is_empty() {
        return Ok(Some(SchemaProblem::MissingTable));
    }

    let missing: Vec<&'static str> = EVENT_COLUMNS
        .iter()
        .copied()
        .filter(|column| !present.iter().any(|name| name.eq_ignore_ascii_case(column)))
        .collect();

    if missing.is_empty() {
        Ok(None)
    } else {
        Ok(Some(SchemaProblem::MissingColumns(missing)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_satisfies_verification() {
        let connection = Connection::open_in_memory().unwrap();
        connection.execute_batch(EARTHQUAKE_DDL).unwrap();

        assert_eq!(verify_schema(&connection).unwrap(), None);
    }

    #[test]
    fn reports_missing_table_and_columns() {
        let connection = Connection::open_in_memory().unwrap();
        assert_eq!(
            verify_schema(&connection).unwrap(),
            Some(SchemaProblem::MissingTable)
        );

        connection
            .execute_batch("CREATE TABLE earthquake (id TEXT, place TEXT)")
            .unwrap();
        match verify_schema(&connection).unwrap() {
            Some(SchemaProblem::MissingColumns(missing)) => {
                assert!(missing.contains(&"mag"));
                assert!(missing.contains(&"day_of_week"));
                assert!(!missing.contains(&"place"));
            }
            other => panic!("unexpected verification result: {other:?}"),
        }
    }
}
