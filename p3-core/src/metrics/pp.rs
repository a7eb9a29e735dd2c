//! Performance portability (Pennycook, Sewall and Lee).
//!
//! For a platform set H, the performance portability of application `a`
//! solving problem `p` is the harmonic mean of its efficiencies `e_i(a, p)`
//! over every `i` in H, or 0 if `a` is unsupported on any platform in H.
//!
//! Stages, in data-flow order:
//! 1. validate the input columns and values
//! 2. collapse repeated (problem, platform, application) measurements by max
//! 3. complete the problem × platform × application cross-product with
//!    "did not run" entries
//! 4. harmonic mean per (problem, application), with missing entries as 0.0
//! 5. restore the input's first-seen application order

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::Result;
use crate::table::{Table, Value};
use crate::validation::{
    validate_efficiency_table, APPLICATION, APP_EFF, ARCH_EFF, PLATFORM, PROBLEM,
};

pub const APP_PP: &str = "app pp";
pub const ARCH_PP: &str = "arch pp";

/// Name of the output column aggregated from an efficiency column.
pub fn pp_column(efficiency: &str) -> String {
    efficiency.replace("eff", "pp")
}

/// One output row: the portability of an application on a problem.
///
/// A score is `None` only when the matching efficiency column was absent
/// from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortabilityScore {
    pub problem: String,
    pub application: String,
    #[serde(rename = "app pp", skip_serializing_if = "Option::is_none", default)]
    pub app_pp: Option<f64>,
    #[serde(rename = "arch pp", skip_serializing_if = "Option::is_none", default)]
    pub arch_pp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct MeasurementKey {
    problem: String,
    platform: String,
    application: String,
}

/// One slot per efficiency column; `None` means no usable measurement.
type Efficiencies = Vec<Option<f64>>;

/// Harmonic mean of non-negative values.
///
/// Any zero forces the result to exactly 0.0: a platform with zero
/// efficiency is unsupported, and the metric is defined as 0 in that case.
/// A single value is returned unchanged. Empty input has no mean.
pub fn harmonic_mean(values: &[f64]) -> Option<f64> {
    match values {
        [] => None,
        [only] => Some(*only),
        _ if values.iter().any(|v| *v == 0.0) => Some(0.0),
        _ => {
            let reciprocal_sum: f64 = values.iter().map(|v| 1.0 / v).sum();
            Some(values.len() as f64 / reciprocal_sum)
        }
    }
}

/// Computes performance portability for every (problem, application) pair.
///
/// Output columns are `problem`, `application`, then `app pp` and/or
/// `arch pp` for each efficiency column present in the input.
pub fn pp(table: &Table) -> Result<Table> {
    let efficiencies = validate_efficiency_table(table)?;
    let scores = compute(table, &efficiencies);
    scores_to_table(&scores, &efficiencies)
}

/// Same computation as [`pp`], returned as typed rows.
pub fn pp_scores(table: &Table) -> Result<Vec<PortabilityScore>> {
    let efficiencies = validate_efficiency_table(table)?;
    Ok(compute(table, &efficiencies))
}

fn compute(table: &Table, efficiencies: &[&str]) -> Vec<PortabilityScore> {
    let app_order = application_order(table);
    let deduplicated = max_per_key(table, efficiencies);
    let completed = complete_cross_product(deduplicated, efficiencies.len());
    let aggregated = aggregate_harmonic(&completed, efficiencies.len());

    let mut scores: Vec<PortabilityScore> = aggregated
        .into_iter()
        .map(|((problem, application), pps)| {
            let mut score = PortabilityScore {
                problem,
                application,
                app_pp: None,
                arch_pp: None,
            };
            for (eff, value) in efficiencies.iter().zip(pps) {
                match *eff {
                    APP_EFF => score.app_pp = Some(value),
                    ARCH_EFF => score.arch_pp = Some(value),
                    _ => {}
                }
            }
            score
        })
        .collect();

    sort_by_app_order(&mut scores, &app_order);
    scores
}

/// Distinct application labels in order of first appearance.
fn application_order(table: &Table) -> Vec<String> {
    let mut seen = BTreeSet::new();
    table
        .values(APPLICATION)
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.label())
        .filter(|label| seen.insert(label.clone()))
        .collect()
}

/// Collapses repeated measurements of a key to the per-column maximum.
/// Rows with a null key label are dropped.
fn max_per_key(table: &Table, efficiencies: &[&str]) -> BTreeMap<MeasurementKey, Efficiencies> {
    let columns: Vec<&[Value]> = efficiencies
        .iter()
        .filter_map(|eff| table.values(eff))
        .collect();
    let mut reduced: BTreeMap<MeasurementKey, Efficiencies> = BTreeMap::new();

    for row in 0..table.n_rows() {
        let label = |name: &str| table.get(row, name).and_then(Value::label);
        let (Some(problem), Some(platform), Some(application)) =
            (label(PROBLEM), label(PLATFORM), label(APPLICATION))
        else {
            continue;
        };

        let slots = reduced
            .entry(MeasurementKey {
                problem,
                platform,
                application,
            })
            .or_insert_with(|| vec![None; columns.len()]);
        for (slot, column) in slots.iter_mut().zip(&columns) {
            if let Some(v) = column[row].as_number() {
                *slot = Some(slot.map_or(v, |current| current.max(v)));
            }
        }
    }
    reduced
}

/// Adds a "did not run" entry for every missing problem × platform × application
/// combination. Distinct values are taken from the deduplicated keys.
fn complete_cross_product(
    mut reduced: BTreeMap<MeasurementKey, Efficiencies>,
    n_efficiencies: usize,
) -> BTreeMap<MeasurementKey, Efficiencies> {
    let problems: BTreeSet<String> = reduced.keys().map(|k| k.problem.clone()).collect();
    let platforms: BTreeSet<String> = reduced.keys().map(|k| k.platform.clone()).collect();
    let applications: BTreeSet<String> = reduced.keys().map(|k| k.application.clone()).collect();

    for problem in &problems {
        for platform in &platforms {
            for application in &applications {
                reduced
                    .entry(MeasurementKey {
                        problem: problem.clone(),
                        platform: platform.clone(),
                        application: application.clone(),
                    })
                    .or_insert_with(|| vec![None; n_efficiencies]);
            }
        }
    }
    reduced
}

/// Harmonic mean across platforms per (problem, application), missing entries as 0.0.
fn aggregate_harmonic(
    completed: &BTreeMap<MeasurementKey, Efficiencies>,
    n_efficiencies: usize,
) -> BTreeMap<(String, String), Vec<f64>> {
    let mut groups: BTreeMap<(String, String), Vec<Vec<f64>>> = BTreeMap::new();
    for (key, effs) in completed {
        let per_column = groups
            .entry((key.problem.clone(), key.application.clone()))
            .or_insert_with(|| vec![Vec::new(); n_efficiencies]);
        for (samples, eff) in per_column.iter_mut().zip(effs) {
            samples.push(eff.unwrap_or(0.0));
        }
    }

    groups
        .into_iter()
        .map(|(key, per_column)| {
            let pps = per_column
                .iter()
                .map(|samples| harmonic_mean(samples).unwrap_or(0.0))
                .collect();
            (key, pps)
        })
        .collect()
}

/// Stable sort by first-seen application; rows of one application keep
/// ascending problem order.
fn sort_by_app_order(scores: &mut [PortabilityScore], app_order: &[String]) {
    let rank: HashMap<&str, usize> = app_order
        .iter()
        .enumerate()
        .map(|(idx, app)| (app.as_str(), idx))
        .collect();
    scores.sort_by(|a, b| {
        let ra = rank.get(a.application.as_str()).copied().unwrap_or(usize::MAX);
        let rb = rank.get(b.application.as_str()).copied().unwrap_or(usize::MAX);
        ra.cmp(&rb).then_with(|| a.problem.cmp(&b.problem))
    });
}

fn scores_to_table(scores: &[PortabilityScore], efficiencies: &[&str]) -> Result<Table> {
    let mut columns: Vec<(String, Vec<Value>)> = vec![
        (
            PROBLEM.to_string(),
            scores.iter().map(|s| Value::from(s.problem.as_str())).collect(),
        ),
        (
            APPLICATION.to_string(),
            scores.iter().map(|s| Value::from(s.application.as_str())).collect(),
        ),
    ];
    for eff in efficiencies {
        let values = scores
            .iter()
            .map(|s| match *eff {
                APP_EFF => Value::from(s.app_pp),
                _ => Value::from(s.arch_pp),
            })
            .collect();
        columns.push((pp_column(eff), values));
    }

    let mut table = Table::new();
    for (name, values) in columns {
        table.push_column(name, values)?;
    }
    Ok(table)
}
