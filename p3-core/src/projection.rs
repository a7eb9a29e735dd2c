//! Projection of raw measurement columns onto problem / application / platform.
//!
//! Raw data rarely carries columns with exactly those meanings. A projection
//! names, for each target, the source columns whose values together identify
//! it. Several sources are concatenated with [`LABEL_SEPARATOR`]; a single
//! source is a plain rename.

use serde::{Deserialize, Serialize};

use crate::error::{P3Error, Result};
use crate::table::{Table, Value};
use crate::validation::{require_columns, APPLICATION, PLATFORM, PROBLEM};

pub const LABEL_SEPARATOR: &str = "-";

/// Source columns for each target. An empty list leaves that target alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    pub problem: Vec<String>,
    pub application: Vec<String>,
    pub platform: Vec<String>,
}

impl Projection {
    pub fn new<S: AsRef<str>>(problem: &[S], application: &[S], platform: &[S]) -> Self {
        let owned = |cols: &[S]| -> Vec<String> { cols.iter().map(|c| c.as_ref().to_string()).collect() };
        Self {
            problem: owned(problem),
            application: owned(application),
            platform: owned(platform),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.problem.is_empty() && self.application.is_empty() && self.platform.is_empty()
    }

    fn targets(&self) -> [(&'static str, &[String]); 3] {
        [
            (PROBLEM, self.problem.as_slice()),
            (APPLICATION, self.application.as_slice()),
            (PLATFORM, self.platform.as_slice()),
        ]
    }

    /// Applies the projection, returning a new table.
    ///
    /// Projected columns come first (problem, application, platform), followed
    /// by every column that was not consumed as a source, in original order.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        let sources: Vec<&str> = self
            .targets()
            .iter()
            .flat_map(|(_, cols)| cols.iter().map(String::as_str))
            .collect();
        require_columns(table, &sources)?;

        let mut projected = Table::new();
        for (target, cols) in self.targets() {
            if cols.is_empty() {
                continue;
            }
            if table.contains(target) && !sources.contains(&target) {
                return Err(P3Error::DuplicateColumn {
                    column: target.to_string(),
                });
            }
            projected.push_column(target, combine(table, cols))?;
        }

        for column in table.columns() {
            if sources.contains(&column.name.as_str()) {
                continue;
            }
            projected.push_column(column.name.clone(), column.values.clone())?;
        }
        Ok(projected)
    }
}

/// Convenience wrapper around [`Projection::apply`].
pub fn project(table: &Table, problem: &[&str], application: &[&str], platform: &[&str]) -> Result<Table> {
    Projection::new(problem, application, platform).apply(table)
}

fn combine(table: &Table, cols: &[String]) -> Vec<Value> {
    if let [single] = cols {
        return table.values(single).map(<[Value]>::to_vec).unwrap_or_default();
    }
    let sources: Vec<&[Value]> = cols.iter().filter_map(|c| table.values(c)).collect();
    (0..table.n_rows())
        .map(|row| {
            let parts: Vec<String> = sources.iter().map(|values| values[row].to_string()).collect();
            Value::Text(parts.join(LABEL_SEPARATOR))
        })
        .collect()
}
