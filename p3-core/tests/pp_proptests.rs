use proptest::prelude::*;
use std::collections::BTreeSet;

use p3_core::metrics::{pp, APP_PP};
use p3_core::validation::{APPLICATION, APP_EFF, PLATFORM, PROBLEM};
use p3_core::{Table, Value};

/// (problem, platform, application, efficiency) with small label alphabets so
/// duplicates and gaps in the cross-product both show up.
fn measurement() -> impl Strategy<Value = (u8, u8, u8, Option<f64>)> {
    (
        0u8..3,
        0u8..4,
        0u8..4,
        prop_oneof![
            1 => Just(None),
            1 => Just(Some(0.0)),
            6 => (0.0f64..=1.0).prop_map(Some),
        ],
    )
}

fn build(rows: &[(u8, u8, u8, Option<f64>)]) -> Table {
    Table::from_rows(
        &[PROBLEM, PLATFORM, APPLICATION, APP_EFF],
        rows.iter()
            .map(|(p, plat, app, eff)| {
                vec![
                    Value::from(format!("p{p}")),
                    Value::from(format!("plat{plat}")),
                    Value::from(format!("app{app}")),
                    Value::from(*eff),
                ]
            })
            .collect(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn test_pp_is_deterministic(rows in proptest::collection::vec(measurement(), 1..40)) {
        let table = build(&rows);
        prop_assert_eq!(pp(&table).unwrap(), pp(&table).unwrap());
    }

    #[test]
    fn test_pp_has_one_row_per_pair_and_stays_in_unit_interval(
        rows in proptest::collection::vec(measurement(), 1..40)
    ) {
        let table = build(&rows);
        let result = pp(&table).unwrap();

        let problems: BTreeSet<u8> = rows.iter().map(|r| r.0).collect();
        let apps: BTreeSet<u8> = rows.iter().map(|r| r.2).collect();
        prop_assert_eq!(result.n_rows(), problems.len() * apps.len());

        for value in result.values(APP_PP).unwrap() {
            let v = value.as_number().unwrap();
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_applications_are_grouped_in_first_seen_order(
        rows in proptest::collection::vec(measurement(), 1..40)
    ) {
        let table = build(&rows);
        let result = pp(&table).unwrap();

        let mut first_seen: Vec<String> = Vec::new();
        for (_, _, app, _) in &rows {
            let label = format!("app{app}");
            if !first_seen.contains(&label) {
                first_seen.push(label);
            }
        }

        let mut output_order: Vec<String> = Vec::new();
        for value in result.values(APPLICATION).unwrap() {
            let label = value.to_string();
            if output_order.last() != Some(&label) {
                output_order.push(label);
            }
        }
        prop_assert_eq!(output_order, first_seen);
    }

    #[test]
    fn test_zero_on_any_platform_forces_zero(
        rows in proptest::collection::vec(measurement(), 1..40),
        victim in 0usize..40
    ) {
        let mut rows = rows;
        let idx = victim % rows.len();
        let (p, _, app, _) = rows[idx];
        // Every measurement of this triple must be zero, or max-dedup would hide it.
        let plat = rows[idx].1;
        for r in rows.iter_mut() {
            if r.0 == p && r.1 == plat && r.2 == app {
                r.3 = Some(0.0);
            }
        }

        let result = pp(&build(&rows)).unwrap();
        let problem = format!("p{p}");
        let application = format!("app{app}");
        let hit = (0..result.n_rows()).find(|&i| {
            result.get(i, PROBLEM).map(|v| v.to_string()) == Some(problem.clone())
                && result.get(i, APPLICATION).map(|v| v.to_string()) == Some(application.clone())
        });
        let i = hit.expect("pair present in output");
        prop_assert_eq!(result.get(i, APP_PP), Some(&Value::Number(0.0)));
    }
}
