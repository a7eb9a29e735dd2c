use p3_core::metrics::{pp, pp_scores, APP_PP, ARCH_PP};
use p3_core::validation::{APPLICATION, APP_EFF, ARCH_EFF, PLATFORM, PROBLEM};
use p3_core::{P3Error, Table, Value};

fn table(headers: &[&str], rows: Vec<Vec<Value>>) -> Table {
    Table::from_rows(headers, rows).unwrap()
}

fn row(problem: &str, platform: &str, app: &str, eff: f64) -> Vec<Value> {
    vec![problem.into(), platform.into(), app.into(), eff.into()]
}

fn app_eff_table(rows: Vec<Vec<Value>>) -> Table {
    table(&[PROBLEM, PLATFORM, APPLICATION, APP_EFF], rows)
}

fn column_f64(table: &Table, name: &str) -> Vec<f64> {
    table
        .values(name)
        .unwrap()
        .iter()
        .map(|v| v.as_number().unwrap())
        .collect()
}

fn column_str(table: &Table, name: &str) -> Vec<String> {
    table.values(name).unwrap().iter().map(|v| v.to_string()).collect()
}

/// Three applications over five platforms, with both efficiency columns.
fn mixed_dataset() -> Table {
    let platforms = ["A", "B", "C", "D", "E"];
    let fom = [
        Some(25.0), Some(12.5), Some(25.0), Some(5.0), Some(5.0),
        Some(25.0), Some(10.0), Some(12.5), Some(5.0), Some(1.0),
        Some(25.0), Some(12.5), Some(25.0), None, Some(5.0),
    ];
    let app_eff = [
        1.0, 0.8, 0.5, 1.0, 0.2,
        1.0, 1.0, 1.0, 1.0, 1.0,
        1.0, 0.8, 0.5, 0.0, 0.2,
    ];
    let apps = ["latest", "best", "dummy"];

    let rows = (0..15)
        .map(|i| {
            vec![
                "test".into(),
                platforms[i % 5].into(),
                apps[i / 5].into(),
                Value::from(fom[i]),
                app_eff[i].into(),
                0.0.into(),
            ]
        })
        .collect();
    table(&[PROBLEM, PLATFORM, APPLICATION, "fom", APP_EFF, ARCH_EFF], rows)
}

// ──────────────────────────────────────────────────────────────────────────────
// VALIDATION
// ──────────────────────────────────────────────────────────────────────────────

#[test]
fn test_required_columns() {
    let err = pp(&Table::new()).unwrap_err();
    assert!(matches!(err, P3Error::MissingColumn { .. }));

    let without_platform = table(
        &[PROBLEM, APPLICATION, APP_EFF],
        vec![vec!["p".into(), "x".into(), 0.5.into()]],
    );
    assert!(matches!(
        pp(&without_platform).unwrap_err(),
        P3Error::MissingColumn { ref column, .. } if column == PLATFORM
    ));
}

#[test]
fn test_requires_an_efficiency_column() {
    let t = table(
        &[PROBLEM, PLATFORM, APPLICATION, "fom"],
        vec![vec!["p".into(), "A".into(), "x".into(), 1.0.into()]],
    );
    let err = pp(&t).unwrap_err();
    assert_eq!(err, P3Error::MissingEfficiencyColumn);
    assert!(err.to_string().contains("app eff"));
    assert!(err.to_string().contains("arch eff"));
}

#[test]
fn test_efficiencies_given_as_percentages_are_rejected() {
    let headers = [PROBLEM, PLATFORM, APPLICATION, APP_EFF, ARCH_EFF];
    let t = table(&headers, vec![vec!["test".into(), "test".into(), "test".into(), 50.0.into(), 0.5.into()]]);
    assert_eq!(pp(&t).unwrap_err(), P3Error::OutOfRange { column: APP_EFF.to_string() });

    let t = table(&headers, vec![vec!["test".into(), "test".into(), "test".into(), 0.5.into(), 50.0.into()]]);
    assert_eq!(pp(&t).unwrap_err(), P3Error::OutOfRange { column: ARCH_EFF.to_string() });
}

#[test]
fn test_non_numeric_efficiency() {
    let t = app_eff_table(vec![
        vec!["test".into(), "A".into(), "latest".into(), "invalid".into()],
        row("test", "B", "latest", 1.0),
    ]);
    assert_eq!(
        pp(&t).unwrap_err(),
        P3Error::NonNumericValue { column: APP_EFF.to_string() }
    );
}

#[test]
fn test_null_efficiencies_pass_validation() {
    let t = app_eff_table(vec![
        vec!["p".into(), "A".into(), "x".into(), Value::Null],
        vec!["p".into(), "B".into(), "x".into(), Value::Number(f64::NAN)],
    ]);
    let result = pp(&t).unwrap();
    assert_eq!(column_f64(&result, APP_PP), vec![0.0]);
}

// ──────────────────────────────────────────────────────────────────────────────
// AGGREGATION
// ──────────────────────────────────────────────────────────────────────────────

#[test]
fn test_pp_mixed_dataset() {
    let result = pp(&mixed_dataset()).unwrap();

    assert_eq!(result.column_names(), vec![PROBLEM, APPLICATION, APP_PP, ARCH_PP]);
    assert_eq!(column_str(&result, APPLICATION), vec!["latest", "best", "dummy"]);
    assert_eq!(column_str(&result, PROBLEM), vec!["test"; 3]);

    let app_pp = column_f64(&result, APP_PP);
    assert!((app_pp[0] - 0.4878).abs() < 1e-4);
    assert_eq!(app_pp[1], 1.0);
    assert_eq!(app_pp[2], 0.0);
    assert_eq!(column_f64(&result, ARCH_PP), vec![0.0; 3]);
}

#[test]
fn test_pp_single_record() {
    let t = table(
        &[PROBLEM, PLATFORM, APPLICATION, "fom", APP_EFF, ARCH_EFF],
        vec![vec!["test".into(), "A".into(), "latest".into(), 25.0.into(), 0.2.into(), 0.5.into()]],
    );
    let result = pp(&t).unwrap();
    assert_eq!(result.n_rows(), 1);
    assert_eq!(column_f64(&result, APP_PP), vec![0.2]);
    assert_eq!(column_f64(&result, ARCH_PP), vec![0.5]);
}

#[test]
fn test_pp_duplicates_keep_best_result() {
    let t = table(
        &[PROBLEM, PLATFORM, APPLICATION, "fom", APP_EFF, ARCH_EFF],
        vec![
            vec!["test".into(), "A".into(), "latest".into(), Value::Null, 0.0.into(), 0.0.into()],
            vec!["test".into(), "A".into(), "latest".into(), 25.0.into(), 1.0.into(), 0.5.into()],
            vec!["test".into(), "B".into(), "latest".into(), 1.0.into(), 0.5.into(), 0.25.into()],
            vec!["test".into(), "B".into(), "latest".into(), 2.0.into(), 1.0.into(), 0.5.into()],
        ],
    );
    let result = pp(&t).unwrap();
    assert_eq!(column_f64(&result, APP_PP), vec![1.0]);
    assert_eq!(column_f64(&result, ARCH_PP), vec![0.5]);
}

#[test]
fn test_equal_efficiencies_give_same_pp() {
    let t = app_eff_table(vec![row("P1", "A", "X", 0.5), row("P1", "B", "X", 0.5)]);
    let result = pp(&t).unwrap();
    assert_eq!(column_str(&result, PROBLEM), vec!["P1"]);
    assert_eq!(column_str(&result, APPLICATION), vec!["X"]);
    assert_eq!(column_f64(&result, APP_PP), vec![0.5]);
}

#[test]
fn test_did_not_run_is_zero() {
    let t = app_eff_table(vec![
        row("P1", "A", "X", 1.0),
        row("P1", "A", "Y", 0.5),
        row("P1", "B", "Y", 0.5),
    ]);
    let scores = pp_scores(&t).unwrap();
    assert_eq!(scores[0].application, "X");
    assert_eq!(scores[0].app_pp, Some(0.0));
    assert_eq!(scores[1].app_pp, Some(0.5));
}

#[test]
fn test_max_dedup_before_aggregation() {
    let t = app_eff_table(vec![row("P1", "A", "X", 0.4), row("P1", "A", "X", 0.6)]);
    assert_eq!(column_f64(&pp(&t).unwrap(), APP_PP), vec![0.6]);
}

#[test]
fn test_single_platform_identity_after_dedup() {
    let t = app_eff_table(vec![
        row("P1", "A", "X", 0.3),
        row("P2", "A", "X", 0.7),
        row("P2", "A", "X", 0.9),
    ]);
    let result = pp(&t).unwrap();
    assert_eq!(column_str(&result, PROBLEM), vec!["P1", "P2"]);
    assert_eq!(column_f64(&result, APP_PP), vec![0.3, 0.9]);
}

// ──────────────────────────────────────────────────────────────────────────────
// ORDERING & COMPLETENESS
// ──────────────────────────────────────────────────────────────────────────────

#[test]
fn test_application_order_follows_first_appearance() {
    let t = app_eff_table(vec![
        row("P2", "A", "zulu", 1.0),
        row("P1", "A", "alpha", 1.0),
        row("P1", "A", "zulu", 1.0),
        row("P2", "A", "mike", 1.0),
        row("P1", "A", "mike", 1.0),
        row("P2", "A", "alpha", 1.0),
    ]);
    let result = pp(&t).unwrap();
    assert_eq!(
        column_str(&result, APPLICATION),
        vec!["zulu", "zulu", "alpha", "alpha", "mike", "mike"]
    );
    assert_eq!(
        column_str(&result, PROBLEM),
        vec!["P1", "P2", "P1", "P2", "P1", "P2"]
    );
}

#[test]
fn test_one_row_per_problem_application_pair() {
    let t = app_eff_table(vec![
        row("P1", "A", "X", 1.0),
        row("P2", "B", "Y", 1.0),
    ]);
    let result = pp(&t).unwrap();
    // Completion fills P1/Y and P2/X with did-not-run entries.
    assert_eq!(result.n_rows(), 4);
    assert_eq!(column_f64(&result, APP_PP), vec![0.0; 4]);
}

#[test]
fn test_input_is_untouched_and_result_is_repeatable() {
    let input = mixed_dataset();
    let before = input.clone();
    let first = pp(&input).unwrap();
    let second = pp(&input).unwrap();
    assert_eq!(input, before);
    assert_eq!(first, second);
    assert_ne!(first, input);
}

#[test]
fn test_numeric_labels_group_by_display_form() {
    let t = app_eff_table(vec![
        vec![128.0.into(), "A".into(), "x".into(), 0.5.into()],
        vec!["128".into(), "B".into(), "x".into(), 0.5.into()],
    ]);
    let result = pp(&t).unwrap();
    assert_eq!(column_str(&result, PROBLEM), vec!["128"]);
    assert_eq!(column_f64(&result, APP_PP), vec![0.5]);
}
