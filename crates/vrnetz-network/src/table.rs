//! Row helpers for the tabular sections.

use serde_json::{Map, Value};

/// One table row: column name → cell value.
pub type Row = Map<String, Value>;

/// Canonical string key for an id-bearing cell.
///
/// Strings are used verbatim; numbers and booleans use their JSON rendering, so
/// a link endpoint `3` matches a node id `3`. Everything else is not an id.
pub fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// True for cells treated as missing: `null` and the empty string.
pub fn is_empty_cell(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Copy of `row` without missing cells.
pub fn compact_row(row: &Row) -> Row {
    row.iter()
        .filter(|(_, v)| !is_empty_cell(v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Read a cell as `f64`, accepting numeric strings.
pub fn cell_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_key_matches_numbers_and_strings() {
        assert_eq!(id_key(&json!(3)), Some("3".to_string()));
        assert_eq!(id_key(&json!("P12345")), Some("P12345".to_string()));
        assert_eq!(id_key(&json!("")), None);
        assert_eq!(id_key(&json!(null)), None);
        assert_eq!(id_key(&json!([1])), None);
    }

    #[test]
    fn compact_row_drops_missing_cells() {
        let row = json!({"id": 1, "name": "", "score": null, "x": 0.5})
            .as_object()
            .cloned()
            .unwrap();
        let compact = compact_row(&row);
        assert_eq!(compact.len(), 2);
        assert!(compact.contains_key("id"));
        assert!(compact.contains_key("x"));
    }

    #[test]
    fn cell_f64_accepts_numeric_strings() {
        assert_eq!(cell_f64(&json!("12")), Some(12.0));
        assert_eq!(cell_f64(&json!(0.25)), Some(0.25));
        assert_eq!(cell_f64(&json!("abc")), None);
    }
}
