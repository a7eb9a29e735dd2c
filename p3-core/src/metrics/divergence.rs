//! Code divergence (Harrell and Kitson).
//!
//! For a set of platforms H, the divergence of application `a` solving
//! problem `p` is the mean pairwise Jaccard distance between the lines of
//! code each platform needs:
//!
//! `d(i, j) = 1 - |c_i ∩ c_j| / |c_i ∪ c_j|`
//!
//! 0 means every line is shared, 1 means nothing is. Fewer than two
//! platforms gives 0.
//!
//! Each row of the input carries one coverage trace, either inline in a
//! `coverage` column or by `coverage_key` into a separate coverage table.
//! Within a (problem, application) group every row counts as one platform.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{P3Error, Result};
use crate::table::{Table, Value};
use crate::validation::{require_columns, APPLICATION, PLATFORM, PROBLEM};

pub const COVERAGE: &str = "coverage";
pub const COVERAGE_KEY: &str = "coverage_key";
pub const DIVERGENCE: &str = "divergence";

/// Lines of one source file (or one instantiation of it, told apart by
/// `id`) used when building for a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub file: String,
    pub id: String,
    #[serde(alias = "lines")]
    pub used_lines: Vec<u64>,
    #[serde(default)]
    pub unused_lines: Vec<u64>,
}

/// Reads a coverage trace from a table cell holding JSON text.
pub fn parse_coverage(value: &Value) -> Result<Vec<CoverageEntry>> {
    match value {
        Value::Text(json) => serde_json::from_str(json).map_err(|e| P3Error::InvalidCoverage {
            reason: e.to_string(),
        }),
        other if other.is_null() => Err(P3Error::InvalidCoverage {
            reason: "coverage is missing".to_string(),
        }),
        other => Err(P3Error::InvalidCoverage {
            reason: format!("expected a JSON string, found {}", other),
        }),
    }
}

/// Code divergence per (problem, application), sorted by problem then
/// application.
///
/// With `coverage` unset, `table` needs a `coverage` column. Otherwise
/// `table` needs `coverage_key` and `coverage` must hold `coverage_key` and
/// `coverage` columns; every key in `table` must resolve. Neither input is
/// modified.
pub fn divergence(table: &Table, coverage: Option<&Table>) -> Result<Table> {
    require_columns(table, &[PROBLEM, PLATFORM, APPLICATION])?;
    let traces = match coverage {
        None => {
            require_columns(table, &[COVERAGE])?;
            inline_traces(table)?
        }
        Some(cov) => {
            require_columns(table, &[COVERAGE_KEY])?;
            require_columns(cov, &[COVERAGE_KEY, COVERAGE])?;
            joined_traces(table, cov)?
        }
    };

    let mut groups: BTreeMap<(String, String), Vec<Vec<CoverageEntry>>> = BTreeMap::new();
    for (row, trace) in traces.into_iter().enumerate() {
        let problem = table.get(row, PROBLEM).and_then(Value::label);
        let application = table.get(row, APPLICATION).and_then(Value::label);
        if let (Some(problem), Some(application)) = (problem, application) {
            groups.entry((problem, application)).or_default().push(trace);
        }
    }

    let mut problems = Vec::with_capacity(groups.len());
    let mut applications = Vec::with_capacity(groups.len());
    let mut scores = Vec::with_capacity(groups.len());
    for ((problem, application), traces) in groups {
        problems.push(Value::Text(problem));
        applications.push(Value::Text(application));
        scores.push(Value::Number(trace_divergence(&traces)));
    }

    Table::new()
        .with_column(PROBLEM, problems)?
        .with_column(APPLICATION, applications)?
        .with_column(DIVERGENCE, scores)
}

fn inline_traces(table: &Table) -> Result<Vec<Vec<CoverageEntry>>> {
    table
        .values(COVERAGE)
        .unwrap_or_default()
        .iter()
        .map(parse_coverage)
        .collect()
}

fn joined_traces(table: &Table, cov: &Table) -> Result<Vec<Vec<CoverageEntry>>> {
    let mut by_key: HashMap<String, &Value> = HashMap::new();
    for row in 0..cov.n_rows() {
        if let (Some(key), Some(value)) = (
            cov.get(row, COVERAGE_KEY).and_then(Value::label),
            cov.get(row, COVERAGE),
        ) {
            by_key.insert(key, value);
        }
    }

    table
        .values(COVERAGE_KEY)
        .unwrap_or_default()
        .iter()
        .map(|key| {
            let key = key.label().ok_or_else(|| P3Error::InvalidCoverage {
                reason: "row has no coverage_key".to_string(),
            })?;
            let value = by_key.get(&key).ok_or_else(|| P3Error::InvalidCoverage {
                reason: format!("no coverage for key '{}'", key),
            })?;
            parse_coverage(value)
        })
        .collect()
}

/// Folds one group's traces into a divergence score.
fn trace_divergence(traces: &[Vec<CoverageEntry>]) -> f64 {
    // (file, id, line) -> platforms using it
    let mut users: BTreeMap<(&str, &str, u64), BTreeSet<usize>> = BTreeMap::new();
    for (platform, trace) in traces.iter().enumerate() {
        for entry in trace {
            for line in &entry.used_lines {
                users
                    .entry((entry.file.as_str(), entry.id.as_str(), *line))
                    .or_default()
                    .insert(platform);
            }
        }
    }

    // platform set -> number of lines used by exactly that set
    let mut shared: BTreeMap<BTreeSet<usize>, usize> = BTreeMap::new();
    for platforms in users.into_values() {
        *shared.entry(platforms).or_default() += 1;
    }
    average_distance(&shared)
}

fn average_distance(shared: &BTreeMap<BTreeSet<usize>, usize>) -> f64 {
    let platforms: Vec<usize> = shared
        .keys()
        .flatten()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in platforms.iter().enumerate() {
        for b in &platforms[i + 1..] {
            total += distance(shared, *a, *b);
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}

fn distance(shared: &BTreeMap<BTreeSet<usize>, usize>, a: usize, b: usize) -> f64 {
    let mut union = 0usize;
    let mut differing = 0usize;
    for (platforms, count) in shared {
        let (in_a, in_b) = (platforms.contains(&a), platforms.contains(&b));
        if in_a || in_b {
            union += count;
        }
        if in_a ^ in_b {
            differing += count;
        }
    }
    if union == 0 {
        0.0
    } else {
        differing as f64 / union as f64
    }
}
