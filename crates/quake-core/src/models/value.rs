use std::fmt::{Display, Formatter};

use serde::Serialize;

/// A single typed cell, mirroring the SQLite storage classes.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(value) => Some(*value as f64),
            Value::Real(value) => Some(*value),
            Value::Text(raw) => raw.trim().parse().ok(),
            Value::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            Value::Real(value) if value.fract() == 0.0 => Some(*value as i64),
            Value::Text(raw) => raw.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(raw) => Some(raw.as_str()),
            _ => None,
        }
    }

    pub fn real(value: Option<f64>) -> Self {
        value.map(Value::Real).unwrap_or(Value::Null)
    }

    pub fn text(value: Option<&str>) -> Self {
        value
            .map(|raw| Value::Text(raw.to_string()))
            .unwrap_or(Value::Null)
    }
}

impl Display for Value {
    /// Table cell form: NULL is blank, whole reals keep one decimal digit.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Real(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{value:.1}")
            }
            Value::Real(value) => write!(f, "{value}"),
            Value::Text(raw) => f.write_str(raw),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Ordered columns plus the rows returned by one query or transform.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(index))
    }

    /// Cells of one column in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|cells| cells.get(index).unwrap_or(&Value::Null))
                .collect(),
        )
    }

    pub fn truncate(&mut self, rows: usize) {
        self.rows.truncate(rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_one_decimal_for_whole_reals() {
        assert_eq!(Value::Real(6.0).to_string(), "6.0");
        assert_eq!(Value::Real(0.85).to_string(), "0.85");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn numeric_accessors_coerce_between_storage_classes() {
        assert_eq!(Value::Integer(7).as_f64(), Some(7.0));
        assert_eq!(Value::Real(2021.0).as_i64(), Some(2021));
        assert_eq!(Value::Real(2021.5).as_i64(), None);
        assert_eq!(Value::Text(" 3.5 ".to_string()).as_f64(), Some(3.5));
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn lookup_by_column_name() {
        let mut result = QueryResult::new(&["country", "deep_focus_count"]);
        result.push_row(vec!["fiji".into(), 12.into()]);

        assert_eq!(
            result.value(0, "deep_focus_count"),
            Some(&Value::Integer(12))
        );
        assert_eq!(result.value(0, "missing"), None);
        assert_eq!(result.value(1, "country"), None);
    }

    #[test]
    fn null_serializes_as_json_null() {
        let json = serde_json::to_string(&vec![Value::Null, Value::Real(1.5)]).unwrap();
        assert_eq!(json, "[null,1.5]");
    }
}
