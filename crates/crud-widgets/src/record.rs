//! Dotted-path access into JSON rows.
//!
//! Rows are the untyped JSON objects the REST backend returns. A column key
//! like `"client.name"` resolves through nested objects; missing segments and
//! JSON nulls both display as the placeholder dash.

use serde_json::Value;

/// Placeholder shown for null/missing values.
pub const PLACEHOLDER: &str = "-";

/// Resolve a dotted path into a row. Returns `None` when any segment is
/// missing or the traversal hits a non-object.
pub fn get<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = row;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Display form of a resolved value: bare strings unquoted, scalars via
/// their JSON form, arrays comma-joined, null/missing as [`PLACEHOLDER`].
pub fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => PLACEHOLDER.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| display(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// The row's identity under `key_field`, as a string. Scalar values only;
/// identity must be unique and stable across the dataset.
pub fn key_of(row: &Value, key_field: &str) -> Option<String> {
    match get(row, key_field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_flat_and_nested() {
        let row = json!({"name": "Alice", "client": {"name": "Acme", "tier": 2}});
        assert_eq!(get(&row, "name"), Some(&json!("Alice")));
        assert_eq!(get(&row, "client.name"), Some(&json!("Acme")));
        assert_eq!(get(&row, "client.tier"), Some(&json!(2)));
        assert_eq!(get(&row, "client.missing"), None);
        assert_eq!(get(&row, "name.deeper"), None);
    }

    #[test]
    fn test_display_placeholder() {
        let row = json!({"a": null, "b": "x"});
        assert_eq!(display(get(&row, "a")), "-");
        assert_eq!(display(get(&row, "missing")), "-");
        assert_eq!(display(get(&row, "b")), "x");
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(display(Some(&json!(42))), "42");
        assert_eq!(display(Some(&json!(true))), "true");
        assert_eq!(display(Some(&json!(["a", "b"]))), "a, b");
    }

    #[test]
    fn test_key_of() {
        assert_eq!(key_of(&json!({"id": 7}), "id"), Some("7".into()));
        assert_eq!(key_of(&json!({"id": "VH-001"}), "id"), Some("VH-001".into()));
        assert_eq!(key_of(&json!({"id": {"no": 1}}), "id"), None);
        assert_eq!(key_of(&json!({}), "id"), None);
    }
}
