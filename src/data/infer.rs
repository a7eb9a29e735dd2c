use p3_core::Value;

/// Markers that spreadsheet and pandas exports use for a missing value.
const NULL_MARKERS: [&str; 4] = ["nan", "null", "na", "none"];

/// Interprets one delimited-text cell.
///
/// Empty cells and the usual null markers become `Null`, anything that parses
/// as a float becomes `Number`, and everything else stays `Text`.
pub fn infer_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NULL_MARKERS.iter().any(|m| trimmed.eq_ignore_ascii_case(m)) {
        return Value::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(v) => Value::Number(v),
        Err(_) => Value::Text(raw.to_string()),
    }
}
