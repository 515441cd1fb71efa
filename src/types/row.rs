//! Raw rows as returned by a session.

use std::sync::Arc;

use super::value::OracleValue;

/// Select-list names shared by every row of one statement.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    names: Vec<String>,
}

impl ColumnInfo {
    pub fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of a select-list entry (ASCII case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Driver values of one fetched row, in select-list order.
///
/// Table reads select every column explicitly, so value `i` belongs to
/// column position `i + 1`. Catalog lookups address values by name.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<OracleValue>,
    info: Arc<ColumnInfo>,
}

impl Row {
    pub fn new(values: Vec<OracleValue>, info: Arc<ColumnInfo>) -> Self {
        Self { values, info }
    }

    /// Value at a 0-based select-list index.
    pub fn get(&self, index: usize) -> Option<&OracleValue> {
        self.values.get(index)
    }

    /// Value of a named select-list entry. `None` when there is no such entry.
    pub fn get_by_name(&self, name: &str) -> Option<&OracleValue> {
        self.values.get(self.info.find_by_name(name)?)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.info.column_names()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OracleValue> {
        self.values.iter()
    }

    /// Take the values, dropping the shared names.
    pub fn into_values(self) -> Vec<OracleValue> {
        self.values
    }
}
