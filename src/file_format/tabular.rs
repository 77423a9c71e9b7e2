use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{DashboardError, ErrorLayer, Result};

/// One field of a tabular result.  `data_type` is whatever type name the
/// query engine reported (ex: "text", "INT8", "jsonb"), so consumers only ever
/// do loose matching on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub data_type: String,
}

impl Column {
    pub fn new(name: &str, data_type: &str) -> Self {
        Column {
            name: name.to_string(),
            data_type: data_type.to_string(),
        }
    }

    /// Loose, case-insensitive substring match on the data type name which is
    /// good enough to cover "int4", "BIGINT", "float8", "NUMERIC(10,2)", etc.
    pub fn is_numeric(&self) -> bool {
        let lowered = self.data_type.to_lowercase();
        ["int", "float", "numeric"]
            .iter()
            .any(|needle| lowered.contains(needle))
    }
}

/// A name-indexed row.  Cells are arbitrary JSON values so that nested jsonb
/// cells survive untouched; `preserve_order` keeps the column order.
pub type Row = Map<String, Value>;

/// The generic result format produced by the query engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TabularResult {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

/// Rows may arrive either keyed by column name or positionally.
#[derive(Deserialize)]
#[serde(untagged)]
enum RowJson {
    Named(Map<String, Value>),
    Positional(Vec<Value>),
}

#[derive(Deserialize)]
struct TabularResultJson {
    columns: Option<Vec<Column>>,
    rows: Option<Vec<RowJson>>,
}

impl TabularResult {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        TabularResult { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column_index(&self) -> ColumnIndex {
        ColumnIndex::new(&self.columns)
    }

    /// Return the row's cells in column order, substituting null for any
    /// column the row doesn't carry.
    pub fn positional_cells(&self, row: &Row) -> Vec<Value> {
        self.columns
            .iter()
            .map(|c| row.get(&c.name).cloned().unwrap_or(Value::Null))
            .collect()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let raw: TabularResultJson = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: TabularResultJson = serde_json::from_str(s)?;
        Self::from_raw(raw)
    }

    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// A result missing either `columns` or `rows` is treated as empty, even if
    /// the other one is populated.
    fn from_raw(raw: TabularResultJson) -> Result<Self> {
        let (columns, raw_rows) = match (raw.columns, raw.rows) {
            (Some(columns), Some(rows)) => (columns, rows),
            (columns, rows) => {
                debug!(
                    has_columns = columns.is_some(),
                    has_rows = rows.is_some(),
                    "incomplete tabular result treated as empty"
                );
                return Ok(TabularResult::default());
            }
        };

        let mut rows = Vec::with_capacity(raw_rows.len());
        for (row_index, row) in raw_rows.into_iter().enumerate() {
            match row {
                RowJson::Named(map) => rows.push(map),
                RowJson::Positional(cells) => {
                    if cells.len() > columns.len() {
                        return Err(DashboardError::new(
                            ErrorLayer::DataLayer,
                            format!(
                                "row {} has {} cells but only {} columns are defined",
                                row_index,
                                cells.len(),
                                columns.len()
                            ),
                        ));
                    }
                    let mut map = Map::new();
                    let mut cells = cells.into_iter();
                    for column in columns.iter() {
                        map.insert(column.name.clone(), cells.next().unwrap_or(Value::Null));
                    }
                    rows.push(map);
                }
            }
        }

        Ok(TabularResult { columns, rows })
    }
}

/// Column-name to position resolver.
pub struct ColumnIndex {
    by_name: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new(columns: &[Column]) -> Self {
        let mut by_name = HashMap::new();
        for (i, column) in columns.iter().enumerate() {
            // First definition wins if the engine ever hands us duplicates.
            by_name.entry(column.name.clone()).or_insert(i);
        }
        ColumnIndex { by_name }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn has(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

/// Render a scalar cell as a string for use as an identifier or label.  Null
/// (and absent) cells are None; nested arrays/objects use their JSON text.
pub fn cell_to_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Interpret a cell as an integer, accepting integral numbers and numeric
/// strings.
pub fn cell_to_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_data_types() {
        assert!(Column::new("a", "INT8").is_numeric());
        assert!(Column::new("a", "bigint").is_numeric());
        assert!(Column::new("a", "float8").is_numeric());
        assert!(Column::new("a", "NUMERIC(10,2)").is_numeric());
        assert!(!Column::new("a", "text").is_numeric());
        assert!(!Column::new("a", "jsonb").is_numeric());
        assert!(!Column::new("a", "").is_numeric());
    }

    #[test]
    fn test_named_and_positional_rows() {
        let result = TabularResult::from_value(json!({
            "columns": [
                { "name": "id", "data_type": "text" },
                { "name": "title", "data_type": "text" },
            ],
            "rows": [
                { "id": "a", "title": "A" },
                ["b", "B"],
                ["c"],
            ],
        }))
        .unwrap();

        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.rows[1].get("id"), Some(&json!("b")));
        assert_eq!(result.rows[1].get("title"), Some(&json!("B")));
        assert_eq!(result.rows[2].get("title"), Some(&Value::Null));
    }

    #[test]
    fn test_positional_row_too_long() {
        let err = TabularResult::from_value(json!({
            "columns": [{ "name": "id", "data_type": "text" }],
            "rows": [["a", "b"]],
        }))
        .unwrap_err();
        assert_eq!(err.layer, ErrorLayer::DataLayer);
    }

    #[test]
    fn test_missing_columns_and_rows() {
        let result = TabularResult::from_value(json!({})).unwrap();
        assert!(result.is_empty());

        let result = TabularResult::from_value(json!({ "rows": [{ "id": "a" }] })).unwrap();
        assert!(result.is_empty());

        let result =
            TabularResult::from_value(json!({ "columns": [{ "name": "title" }] })).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_column_index() {
        let index = ColumnIndex::new(&[
            Column::new("id", "text"),
            Column::new("depth", "int4"),
            Column::new("id", "text"),
        ]);
        assert_eq!(index.position("id"), Some(0));
        assert_eq!(index.position("depth"), Some(1));
        assert!(!index.has("from_id"));
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(cell_to_string(Some(&json!("x"))), Some("x".to_string()));
        assert_eq!(cell_to_string(Some(&json!(12))), Some("12".to_string()));
        assert_eq!(cell_to_string(Some(&Value::Null)), None);
        assert_eq!(cell_to_string(None), None);
        assert_eq!(cell_to_i64(Some(&json!(3))), Some(3));
        assert_eq!(cell_to_i64(Some(&json!(3.0))), Some(3));
        assert_eq!(cell_to_i64(Some(&json!(" 4 "))), Some(4));
        assert_eq!(cell_to_i64(Some(&json!(2.5))), None);
        assert_eq!(cell_to_i64(Some(&json!("deep"))), None);
    }
}
