use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

pub type Row = IndexMap<String, Value>;

static NULL: Value = Value::Null;

/// Row/column view over one stream. Rows may be sparse; a missing cell reads as null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexSet<String>,
    rows: Vec<Row>,
}

// New
impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(columns: impl IntoIterator<Item = impl ToString>) -> Self {
        Self {
            columns: columns.into_iter().map(|c| c.to_string()).collect(),
            rows: vec![],
        }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Objects become rows; anything else in the record stream is skipped.
    pub fn from_records(records: Vec<Value>) -> Self {
        let rows = records
            .into_iter()
            .filter_map(|record| match record {
                Value::Object(map) => Some(map.into_iter().collect::<Row>()),
                _ => None,
            })
            .collect();
        Self::from_rows(rows)
    }
}

impl Table {
    pub fn push_row(&mut self, row: Row) {
        for column in row.keys() {
            if !self.columns.contains(column) {
                self.columns.insert(column.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |row| row.cell(column))
    }

    /// Sets `column` on every row, overwriting existing values.
    pub fn with_column<F>(&mut self, column: &str, mut f: F)
    where
        F: FnMut(&Row) -> Value,
    {
        for row in &mut self.rows {
            let value = f(row);
            row.insert(column.to_string(), value);
        }
        self.columns.insert(column.to_string());
    }

    /// Number of rows per distinct value of `column`, in first-seen order. Nulls are skipped.
    pub fn group_count(&self, column: &str) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for key in self.column_values(column).filter_map(cell_text) {
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }
}

pub trait RowExt {
    fn cell(&self, column: &str) -> &Value;
    fn text(&self, column: &str) -> Option<String>;
}

impl RowExt for Row {
    fn cell(&self, column: &str) -> &Value {
        self.get(column).unwrap_or(&NULL)
    }

    fn text(&self, column: &str) -> Option<String> {
        cell_text(self.cell(column))
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
