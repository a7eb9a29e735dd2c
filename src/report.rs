//! Output formatters for analysis tables.
//!
//! - [`OutputFormat::Table`]: aligned plain text (default)
//! - [`OutputFormat::Json`]: array of records for programmatic use
//! - [`OutputFormat::Csv`]: comma-separated values for spreadsheets
//! - [`OutputFormat::Markdown`]: pipe table for docs and issues

use p3_core::{Table, Value};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" | "text" | "human" => Some(Self::Table),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "markdown" | "md" => Some(Self::Markdown),
            _ => None,
        }
    }
}

pub struct Report<W: Write> {
    writer: W,
    format: OutputFormat,
    precision: usize,
}

impl<W: Write> Report<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            precision: 4,
        }
    }

    /// Decimal places used by the text formats. JSON and CSV keep full precision.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn write(&mut self, table: &Table) -> io::Result<()> {
        match self.format {
            OutputFormat::Table => self.write_table(table),
            OutputFormat::Json => self.write_json(table),
            OutputFormat::Csv => self.write_csv(table),
            OutputFormat::Markdown => self.write_markdown(table),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn cells(&self, table: &Table) -> Vec<Vec<String>> {
        (0..table.n_rows())
            .map(|row| {
                table
                    .columns()
                    .iter()
                    .map(|c| format_cell(&c.values[row], self.precision))
                    .collect()
            })
            .collect()
    }

    fn write_table(&mut self, table: &Table) -> io::Result<()> {
        let headers = table.column_names();
        let rows = self.cells(table);

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        writeln!(self.writer, "{}", line(headers.clone()))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(self.writer, "{}", line(rule.iter().map(String::as_str).collect()))?;
        for row in &rows {
            writeln!(self.writer, "{}", line(row.iter().map(String::as_str).collect()))?;
        }
        Ok(())
    }

    fn write_json(&mut self, table: &Table) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &table.to_records())?;
        writeln!(self.writer)
    }

    fn write_csv(&mut self, table: &Table) -> io::Result<()> {
        let mut csv = csv::Writer::from_writer(&mut self.writer);
        csv.write_record(table.column_names())?;
        for row in 0..table.n_rows() {
            csv.write_record(table.columns().iter().map(|c| c.values[row].to_string()))?;
        }
        csv.flush()
    }

    fn write_markdown(&mut self, table: &Table) -> io::Result<()> {
        let headers: Vec<String> = table.column_names().into_iter().map(escape_pipes).collect();
        writeln!(self.writer, "| {} |", headers.join(" | "))?;
        writeln!(self.writer, "|{}", "---|".repeat(headers.len()))?;
        for row in self.cells(table) {
            let row: Vec<String> = row.iter().map(|cell| escape_pipes(cell)).collect();
            writeln!(self.writer, "| {} |", row.join(" | "))?;
        }
        Ok(())
    }
}

fn escape_pipes(cell: &str) -> String {
    cell.replace('|', "\\|")
}

fn format_cell(value: &Value, precision: usize) -> String {
    match value {
        Value::Number(v) if !v.is_nan() => format!("{:.*}", precision, v),
        Value::Text(s) => s.clone(),
        _ => "-".to_string(),
    }
}
