use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// An in-memory table of named columns and ordered rows.
///
/// Cells are JSON values; `Value::Null` marks an empty cell. Rows always
/// have exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("row has {actual} cells but the table has {expected} columns")]
pub struct RowWidthError {
    pub expected: usize,
    pub actual: usize,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), RowWidthError> {
        if row.len() != self.columns.len() {
            return Err(RowWidthError {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder-style variant of [`Table::push_row`] for literal tables.
    pub fn with_row(mut self, row: Vec<Value>) -> Result<Self, RowWidthError> {
        self.push_row(row)?;
        Ok(self)
    }
}

struct RowView<'a> {
    columns: &'a [String],
    cells: &'a [Value],
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

struct RowsView<'a>(&'a Table);

impl Serialize for RowsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let table = self.0;
        let mut seq = serializer.serialize_seq(Some(table.rows.len()))?;
        for cells in &table.rows {
            seq.serialize_element(&RowView {
                columns: &table.columns,
                cells,
            })?;
        }
        seq.end()
    }
}

/// Serializes as `{"TableName": ..., "Rows": [{column: value, ...}]}` with
/// column order preserved.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Table", 2)?;
        state.serialize_field("TableName", &self.name)?;
        state.serialize_field("Rows", &RowsView(self))?;
        state.end()
    }
}
