//! Column-oriented in-memory table.
//!
//! Measurements arrive from heterogeneous sources (delimited text, JSON
//! records, hand-built fixtures), so cells are loosely typed. Numeric
//! interpretation happens at the point of use, never at construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{P3Error, Result};

/// A single cell.
///
/// `Number(NaN)` is treated as missing everywhere, the same way a null is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(v) => v.is_nan(),
            Value::Text(_) => false,
        }
    }

    /// Numeric interpretation of the cell. Text is accepted when it parses
    /// as a float after trimming; NaN collapses to `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Number(v) => Some(*v).filter(|v| !v.is_nan()),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        }
    }

    /// True for nulls and for anything [`Value::as_number`] can read.
    pub fn is_numeric_or_null(&self) -> bool {
        match self {
            Value::Null | Value::Number(_) => true,
            Value::Text(s) => s.trim().parse::<f64>().is_ok(),
        }
    }

    /// Category label used for grouping. Nulls have no label.
    pub fn label(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(v) if v.is_nan() => Ok(()),
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self { name: name.into(), values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Named, equal-length columns. Column names are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Table::push_column`].
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        self.push_column(name, values)?;
        Ok(self)
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(P3Error::DuplicateColumn { column: name });
        }
        if let Some(first) = self.columns.first() {
            if first.len() != values.len() {
                return Err(P3Error::LengthMismatch {
                    column: name,
                    expected: first.len(),
                    found: values.len(),
                });
            }
        }
        self.columns.push(Column::new(name, values));
        Ok(())
    }

    /// Builds a table from row-major data. Every row must have one cell per header.
    pub fn from_rows<S: AsRef<str>>(headers: &[S], rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); headers.len()];
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != headers.len() {
                return Err(P3Error::LengthMismatch {
                    column: format!("<row {}>", idx),
                    expected: headers.len(),
                    found: row.len(),
                });
            }
            for (col, cell) in columns.iter_mut().zip(row) {
                col.push(cell);
            }
        }

        let mut table = Table::new();
        for (header, values) in headers.iter().zip(columns) {
            table.push_column(header.as_ref(), values)?;
        }
        Ok(table)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn values(&self, name: &str) -> Option<&[Value]> {
        self.column(name).map(|c| c.values.as_slice())
    }

    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        self.values(name).and_then(|v| v.get(row))
    }

    /// Replaces the values of an existing column, or appends a new one.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        match self.columns.iter().position(|c| c.name == name) {
            Some(idx) => {
                if self.columns[idx].len() != values.len() {
                    return Err(P3Error::LengthMismatch {
                        column: name.to_string(),
                        expected: self.columns[idx].len(),
                        found: values.len(),
                    });
                }
                self.columns[idx].values = values;
                Ok(())
            }
            None => self.push_column(name, values),
        }
    }

    /// Removes a column and returns it, if present.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(idx))
    }

    /// Row `idx` as JSON-style records keyed by column name, in column order.
    pub fn record(&self, idx: usize) -> Option<serde_json::Map<String, serde_json::Value>> {
        if idx >= self.n_rows() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.clone(), serde_json::Value::from(&c.values[idx])))
                .collect(),
        )
    }

    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        (0..self.n_rows()).filter_map(|idx| self.record(idx)).collect()
    }
}
