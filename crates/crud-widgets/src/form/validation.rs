//! Schema-driven validation, run on blur for single fields and in full on
//! submit.

use std::collections::HashMap;

use super::field::{Field, FieldKind, FieldValue};

/// Validate every field against the current values. Returns a map of field
/// name to first error. Required wins over format and custom checks.
pub fn validate(
    fields: &[Field],
    values: &HashMap<String, FieldValue>,
) -> HashMap<String, String> {
    let mut errors = HashMap::new();
    for field in fields {
        if let Some(message) = validate_field(field, values.get(&field.name)) {
            errors.insert(field.name.clone(), message);
        }
    }
    errors
}

/// Validate a single field. `None` means the field is valid.
pub fn validate_field(field: &Field, value: Option<&FieldValue>) -> Option<String> {
    let empty = FieldValue::Null;
    let value = value.unwrap_or(&empty);

    if field.required && value.is_missing() {
        return Some(format!("{} is required", field.label));
    }
    // Optional fields left empty skip format checks.
    if value.is_missing() {
        return None;
    }
    if let Some(message) = format_error(&field.kind, value) {
        return Some(message);
    }
    if let Some(custom) = field.validate {
        return custom(value);
    }
    None
}

fn format_error(kind: &FieldKind, value: &FieldValue) -> Option<String> {
    match kind {
        FieldKind::Email => {
            let text = value.as_text();
            let valid = text
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            (!valid).then(|| "Enter a valid email address".to_string())
        }
        FieldKind::Url => {
            let text = value.as_text();
            let valid = text.starts_with("http://") || text.starts_with("https://");
            (!valid).then(|| "Enter a valid URL".to_string())
        }
        FieldKind::Date => {
            (!is_date(value.as_text())).then(|| "Enter a date as YYYY-MM-DD".to_string())
        }
        FieldKind::Number { min, max, .. } => {
            let FieldValue::Number(n) = value else {
                return Some("Enter a number".to_string());
            };
            if let Some(min) = min {
                if n < min {
                    return Some(format!("Must be at least {}", min));
                }
            }
            if let Some(max) = max {
                if n > max {
                    return Some(format!("Must be at most {}", max));
                }
            }
            None
        }
        _ => None,
    }
}

fn is_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && text
            .chars()
            .enumerate()
            .all(|(i, c)| matches!(i, 4 | 7) || c.is_ascii_digit())
}
