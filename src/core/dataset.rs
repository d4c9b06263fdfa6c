//! In-memory table loaded from one spreadsheet export.

use super::value::Value;
use std::collections::HashMap;

/// Collapses every run of whitespace to a single space and trims the ends.
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A header row plus data rows. Headers are normalized on construction and
/// rows are padded or truncated to the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new<S: AsRef<str>>(headers: &[S], rows: Vec<Vec<Value>>) -> Self {
        let columns: Vec<String> = headers
            .iter()
            .map(|h| normalize_header(h.as_ref()))
            .collect();

        // First occurrence wins on duplicate headers.
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Empty);
                row
            })
            .collect();

        Self {
            columns,
            index,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column. The name is normalized before lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(&normalize_header(name)).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Every value of a column, or `None` if the column does not exist.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + use<'a>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// A new dataset with the same columns and only the rows `keep` accepts.
    pub fn retain_rows(&self, mut keep: impl FnMut(&[Value]) -> bool) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}
