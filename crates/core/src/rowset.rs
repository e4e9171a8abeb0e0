//! Ordered, in-memory table of cells.

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::value::Value;

/// Storage class inferred for one column of a row-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Text,
}

impl ColumnType {
    /// SQL type name used when the column is persisted.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
        }
    }
}

/// Named columns plus rows of cells, in source order.
///
/// Every row holds exactly one cell per column; [`RowSet::push_row`] enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RowSet {
    #[must_use]
    pub const fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Build a row-set from columns and rows, checking arity of each row.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut set = Self::new(columns);
        set.rows.reserve(rows.len());
        for row in rows {
            set.push_row(row)?;
        }
        Ok(set)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(PipelineError::RowArity { expected: self.columns.len(), found: row.len() });
        }
        self.rows.push(row);
        Ok(())
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// `Integer` when every non-null cell in the column is an integer.
    ///
    /// All-null columns report `Text`.
    #[must_use]
    pub fn column_type(&self, idx: usize) -> ColumnType {
        let mut saw_integer = false;
        for row in &self.rows {
            match row.get(idx) {
                Some(Value::Integer(_)) => saw_integer = true,
                Some(Value::Text(_)) => return ColumnType::Text,
                Some(Value::Null) | None => {},
            }
        }
        if saw_integer { ColumnType::Integer } else { ColumnType::Text }
    }

    /// Keep rows for which `keep` returns true, preserving order.
    /// Returns the number of rows removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Value]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before.saturating_sub(self.rows.len())
    }
}
