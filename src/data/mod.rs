//! Data Loading
//!
//! Reads measurement files into a [`Table`]. Delimited text goes through the
//! `csv` reader with per-cell type inference; JSON is an array of records
//! whose nested values (coverage traces) are kept as JSON text.

mod infer;

pub use infer::infer_cell;

use p3_core::{Table, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed delimited data: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported input format '{0}' (expected .csv, .tsv or .json)")]
    UnsupportedFormat(String),
    #[error("{0}")]
    Shape(String),
    #[error(transparent)]
    Table(#[from] p3_core::P3Error),
}

/// Input file formats understood by [`load_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Tsv,
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            other => Err(DataError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Loads a measurement table, picking the parser from the file extension.
pub fn load_table(path: impl AsRef<Path>) -> Result<Table, DataError> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = read_table(file, format)?;
    debug!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.n_cols(),
        "Loaded measurement table"
    );
    Ok(table)
}

/// Parses a measurement table from any reader.
pub fn read_table<R: Read>(reader: R, format: InputFormat) -> Result<Table, DataError> {
    match format {
        InputFormat::Csv => read_delimited(reader, b','),
        InputFormat::Tsv => read_delimited(reader, b'\t'),
        InputFormat::Json => read_json(reader),
    }
}

fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Table, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(infer_cell).collect::<Vec<Value>>());
    }
    Ok(Table::from_rows(&headers[..], rows)?)
}

fn read_json<R: Read>(reader: R) -> Result<Table, DataError> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let records = values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| match value {
            serde_json::Value::Object(record) => Ok(record),
            other => Err(DataError::Shape(format!("record {} is not an object: {}", idx, other))),
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    // Union of keys, in first-seen order.
    let mut headers: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let mut row = Vec::with_capacity(headers.len());
        for header in &headers {
            let cell = match record.get(header) {
                None | Some(serde_json::Value::Null) => Value::Null,
                Some(serde_json::Value::Number(n)) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
                Some(serde_json::Value::String(s)) => Value::Text(s.clone()),
                Some(serde_json::Value::Bool(b)) => Value::Text(b.to_string()),
                // Nested data such as coverage traces stays as JSON text.
                Some(nested) => Value::Text(nested.to_string()),
            };
            row.push(cell);
        }
        rows.push(row);
    }
    Ok(Table::from_rows(&headers[..], rows)?)
}
