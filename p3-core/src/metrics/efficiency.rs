//! Application efficiency: performance relative to the best known result
//! for the same problem on the same platform.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::table::{Table, Value};
use crate::validation::{require_columns, require_numeric, APP_EFF, APPLICATION, PLATFORM, PROBLEM};

pub const DEFAULT_FOM_COLUMN: &str = "fom";

/// Which direction of the figure of merit is better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FomOrdering {
    /// Time to solution and similar.
    #[default]
    Lower,
    /// Throughput and similar.
    Higher,
}

impl FomOrdering {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lower" | "low" | "time" => Some(Self::Lower),
            "higher" | "high" | "throughput" => Some(Self::Higher),
            _ => None,
        }
    }

    fn better(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Lower => a.min(b),
            Self::Higher => a.max(b),
        }
    }

    fn efficiency(self, fom: f64, best: f64) -> f64 {
        match self {
            Self::Lower => best / fom,
            Self::Higher => fom / best,
        }
    }
}

/// A fom counts only if it is finite and strictly positive. Anything else
/// (null, NaN, zero, negative) marks a run that failed to compile, run or verify.
fn valid_fom(value: &Value) -> Option<f64> {
    value.as_number().filter(|v| v.is_finite() && *v > 0.0)
}

/// Appends (or overwrites) an `app eff` column computed from `fom_column`.
///
/// The best valid fom per (problem, platform) is taken across all
/// applications and all rows. Invalid runs get efficiency 0.0. Row order and
/// all other columns are preserved.
pub fn application_efficiency(table: &Table, fom_column: &str, ordering: FomOrdering) -> Result<Table> {
    require_columns(table, &[PROBLEM, PLATFORM, APPLICATION, fom_column])?;
    require_numeric(table, &[fom_column])?;

    let key = |row: usize| -> Option<(String, String)> {
        let problem = table.get(row, PROBLEM).and_then(Value::label)?;
        let platform = table.get(row, PLATFORM).and_then(Value::label)?;
        Some((problem, platform))
    };
    let foms = table.values(fom_column).unwrap_or_default();

    let mut best: HashMap<(String, String), f64> = HashMap::new();
    for (row, fom) in foms.iter().enumerate() {
        let (Some(group), Some(fom)) = (key(row), valid_fom(fom)) else {
            continue;
        };
        best.entry(group)
            .and_modify(|b| *b = ordering.better(*b, fom))
            .or_insert(fom);
    }

    let effs: Vec<Value> = foms
        .iter()
        .enumerate()
        .map(|(row, fom)| {
            let eff = match (key(row).and_then(|k| best.get(&k).copied()), valid_fom(fom)) {
                (Some(best_fom), Some(fom)) => ordering.efficiency(fom, best_fom),
                _ => 0.0,
            };
            Value::Number(eff)
        })
        .collect();

    let mut result = table.clone();
    result.set_column(APP_EFF, effs)?;
    Ok(result)
}
