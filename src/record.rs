// src/record.rs

use serde_json::{Map, Value};

/// One comparison row: an ordered mapping from column key to display value.
pub type Record = Map<String, Value>;

/// A display field derived from one key of the first record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// The key as it appears in the records.
    pub key: String,
    /// Header text: underscores replaced by spaces, upper-cased.
    pub label: String,
}

impl Column {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let label = display_label(&key);
        Self { key, label }
    }
}

/// `model_name` → `MODEL NAME`.
pub fn display_label(key: &str) -> String {
    key.replace('_', " ").to_uppercase()
}

/// Derive the columns from the first element of the array.
///
/// Keys are enumerated the way object keys are: canonical array-index keys
/// first in ascending numeric order, then the remaining keys in insertion
/// order. A non-object element has no keys.
pub fn columns_from(first: &Value) -> Vec<Column> {
    let Some(obj) = first.as_object() else {
        return Vec::new();
    };

    let mut indices: Vec<(u32, &String)> = Vec::new();
    let mut names: Vec<&String> = Vec::new();
    for key in obj.keys() {
        match array_index(key) {
            Some(i) => indices.push((i, key)),
            None => names.push(key),
        }
    }
    indices.sort_by_key(|(i, _)| *i);

    indices
        .into_iter()
        .map(|(_, k)| k)
        .chain(names)
        .map(|k| Column::new(k.as_str()))
        .collect()
}

/// A key is an array index if it is the canonical decimal form of an
/// integer below 2^32 - 1.
fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|&i| i != u32::MAX)
}

/// Cell text for `column` in `record`; missing keys and non-object records
/// yield an empty string.
pub fn cell_text(record: &Value, column: &Column) -> String {
    match record.get(&column.key) {
        Some(v) => display_value(v),
        None => String::new(),
    }
}

/// The string form of a JSON value as it appears in a table cell.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(format_float).unwrap_or_default()
            }
        }
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        // covers -0
        return "0".to_string();
    }

    let abs = f.abs();
    if abs >= 1e21 || abs < 1e-6 {
        // Rust prints `1e21`; the exponent sign is always spelled out in cells.
        let s = format!("{:e}", f);
        return match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => s,
        };
    }

    // shortest round-trip; integral values print without a fraction
    format!("{}", f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("model_name"), "MODEL NAME");
        assert_eq!(display_label("score"), "SCORE");
        assert_eq!(display_label("__a_b__"), "  A B  ");
        assert_eq!(display_label(""), "");
    }

    #[test]
    fn test_columns_keep_source_order() {
        let first: Value =
            serde_json::from_str(r#"{"zeta":1,"alpha":2,"poaching_risk_score":3}"#).unwrap();
        let labels: Vec<_> = columns_from(&first).into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["ZETA", "ALPHA", "POACHING RISK SCORE"]);
    }

    #[test]
    fn test_columns_index_keys_first() {
        let first: Value = serde_json::from_str(r#"{"b":1,"10":2,"a":3,"2":4,"01":5}"#).unwrap();
        let keys: Vec<_> = columns_from(&first).into_iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["2", "10", "b", "a", "01"]);
    }

    #[test]
    fn test_columns_of_non_object() {
        assert!(columns_from(&json!(5)).is_empty());
        assert!(columns_from(&json!(null)).is_empty());
        assert!(columns_from(&json!({})).is_empty());
    }

    #[test]
    fn test_cell_text_missing_key() {
        let col = Column::new("score");
        assert_eq!(cell_text(&json!({"name": "A"}), &col), "");
        assert_eq!(cell_text(&json!("scalar"), &col), "");
        assert_eq!(cell_text(&json!({"score": 0.9}), &col), "0.9");
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(display_value(&json!("Nile Crocodile")), "Nile Crocodile");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!(-7)), "-7");
        assert_eq!(display_value(&json!(u64::MAX)), "18446744073709551615");
    }

    #[test]
    fn test_display_floats() {
        assert_eq!(display_value(&json!(0.9)), "0.9");
        assert_eq!(display_value(&json!(1.0)), "1");
        assert_eq!(display_value(&json!(-0.0)), "0");
        assert_eq!(display_value(&json!(0.1 + 0.2)), "0.30000000000000004");
        assert_eq!(display_value(&json!(1e21)), "1e+21");
        assert_eq!(display_value(&json!(1.5e-7)), "1.5e-7");
        assert_eq!(display_value(&json!(123456.789)), "123456.789");
    }

    #[test]
    fn test_display_nested() {
        assert_eq!(display_value(&json!([1, "a", null, true])), "1,a,,true");
        assert_eq!(display_value(&json!([[1, 2], 3])), "1,2,3");
        assert_eq!(display_value(&json!({"k": 1})), "[object Object]");
    }
}
