//! Column and value checks shared by every metric.
//!
//! All checks are pure: they inspect the table and either pass or report the
//! first violation found.

use crate::error::{P3Error, Result};
use crate::table::Table;

pub const PROBLEM: &str = "problem";
pub const PLATFORM: &str = "platform";
pub const APPLICATION: &str = "application";
pub const APP_EFF: &str = "app eff";
pub const ARCH_EFF: &str = "arch eff";

/// Key columns every metric needs.
pub const KEY_COLUMNS: [&str; 3] = [PROBLEM, PLATFORM, APPLICATION];

/// Fails on the first of `columns` that the table lacks.
pub fn require_columns(table: &Table, columns: &[&str]) -> Result<()> {
    for column in columns {
        if !table.contains(column) {
            return Err(P3Error::MissingColumn {
                column: column.to_string(),
                required: columns.iter().map(|c| c.to_string()).collect(),
            });
        }
    }
    Ok(())
}

/// Fails on the first column holding a non-null value that does not read as a number.
pub fn require_numeric(table: &Table, columns: &[&str]) -> Result<()> {
    for column in columns {
        let values = table.values(column).ok_or_else(|| P3Error::MissingColumn {
            column: column.to_string(),
            required: columns.iter().map(|c| c.to_string()).collect(),
        })?;
        if !values.iter().all(|v| v.is_numeric_or_null()) {
            return Err(P3Error::NonNumericValue {
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Fails on the first column holding a value outside [0, 1]. Nulls count as 0.
pub fn require_unit_interval(table: &Table, columns: &[&str]) -> Result<()> {
    for column in columns {
        let in_range = table
            .values(column)
            .map(|values| {
                values
                    .iter()
                    .all(|v| (0.0..=1.0).contains(&v.as_number().unwrap_or(0.0)))
            })
            .unwrap_or(true);
        if !in_range {
            return Err(P3Error::OutOfRange {
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Efficiency columns present in the table, in canonical order (`app eff`, then `arch eff`).
pub fn efficiency_columns(table: &Table) -> Result<Vec<&'static str>> {
    let present: Vec<&'static str> = [APP_EFF, ARCH_EFF]
        .into_iter()
        .filter(|c| table.contains(c))
        .collect();
    if present.is_empty() {
        return Err(P3Error::MissingEfficiencyColumn);
    }
    Ok(present)
}

/// Full input check for efficiency-based metrics, in the order
/// missing key columns, missing efficiency columns, non-numeric, out-of-range.
///
/// Returns the efficiency columns the caller should aggregate.
pub fn validate_efficiency_table(table: &Table) -> Result<Vec<&'static str>> {
    require_columns(table, &KEY_COLUMNS)?;
    let efficiencies = efficiency_columns(table)?;
    require_numeric(table, &efficiencies)?;
    require_unit_interval(table, &efficiencies)?;
    Ok(efficiencies)
}
