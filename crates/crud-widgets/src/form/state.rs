//! State management for FormDialog.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use super::field::{Field, FieldKind, FieldValue};
use super::validation::validate_field;

/// Caller-owned form state. `reset` repopulates it whenever the dialog opens,
/// so one instance per page is enough.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    /// Current field values
    pub values: HashMap<String, FieldValue>,
    /// Validation errors (field name -> message)
    pub errors: HashMap<String, String>,
    /// Fields the user has left at least once; errors only show for these
    pub touched: HashSet<String>,
    /// Focused field index within the schema
    pub focused: usize,
    /// Highlighted option within a focused select field
    pub option_cursor: usize,
    /// Raw text being typed into number fields, keyed by field name.
    /// Committed to a typed value on blur.
    buffers: HashMap<String, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repopulate for a dialog opening. `initial` carries the record being
    /// edited or viewed; `None` starts a blank create form.
    pub fn reset(&mut self, fields: &[Field], initial: Option<&Map<String, Value>>) {
        self.values.clear();
        self.errors.clear();
        self.touched.clear();
        self.buffers.clear();
        self.option_cursor = 0;
        self.focused = fields.iter().position(|f| !f.disabled).unwrap_or(0);

        if let Some(record) = initial {
            for field in fields {
                if let Some(value) = record.get(&field.name) {
                    self.values
                        .insert(field.name.clone(), FieldValue::from_json(&field.kind, value));
                }
            }
        }
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Set a field value. Changing a value clears its error.
    pub fn set_value(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        self.errors.remove(&name);
        self.values.insert(name, value);
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    /// Append a character to the focused field's text. Number fields edit a
    /// raw buffer that is committed on blur.
    pub fn input_char(&mut self, field: &Field, c: char) {
        if !field.accepts_char(c) || field.disabled {
            return;
        }
        self.errors.remove(&field.name);
        if matches!(field.kind, FieldKind::Number { .. }) {
            self.number_buffer(field).push(c);
        } else {
            let text = match self.values.get(&field.name) {
                Some(FieldValue::Text(s)) => {
                    let mut s = s.clone();
                    s.push(c);
                    s
                }
                _ => c.to_string(),
            };
            self.values.insert(field.name.clone(), FieldValue::Text(text));
        }
    }

    pub fn backspace(&mut self, field: &Field) {
        if field.disabled {
            return;
        }
        self.errors.remove(&field.name);
        if matches!(field.kind, FieldKind::Number { .. }) {
            self.number_buffer(field).pop();
        } else if let Some(FieldValue::Text(s)) = self.values.get_mut(&field.name) {
            s.pop();
        }
    }

    /// The text shown while the field is being edited.
    pub fn editing_text(&self, field: &Field) -> String {
        if matches!(field.kind, FieldKind::Number { .. }) {
            if let Some(buffer) = self.buffers.get(&field.name) {
                return buffer.clone();
            }
        }
        field.display(self.values.get(&field.name).unwrap_or(&FieldValue::Null))
    }

    /// Mark the field touched, commit any pending buffer, and validate it.
    pub fn blur(&mut self, field: &Field) {
        self.touched.insert(field.name.clone());
        self.commit_buffer(field);
        match validate_field(field, self.values.get(&field.name)) {
            Some(message) => self.errors.insert(field.name.clone(), message),
            None => self.errors.remove(&field.name),
        };
    }

    /// Parse a pending number buffer into a typed value. Empty stays null.
    fn commit_buffer(&mut self, field: &Field) {
        let Some(buffer) = self.buffers.remove(&field.name) else {
            return;
        };
        let value = if buffer.is_empty() {
            FieldValue::Null
        } else {
            match buffer.parse::<f64>() {
                Ok(n) => FieldValue::Number(n),
                Err(_) => {
                    // Keep the raw text so validation can reject it.
                    self.buffers.insert(field.name.clone(), buffer);
                    self.errors
                        .insert(field.name.clone(), "Enter a number".to_string());
                    return;
                }
            }
        };
        self.values.insert(field.name.clone(), value);
    }

    fn number_buffer(&mut self, field: &Field) -> &mut String {
        let seed = field.display(self.values.get(&field.name).unwrap_or(&FieldValue::Null));
        self.buffers.entry(field.name.clone()).or_insert(seed)
    }

    /// Move focus forward, skipping disabled fields. Blurs the field left
    /// behind. Returns false when focus wrapped past the last field.
    pub fn focus_next(&mut self, fields: &[Field]) -> bool {
        self.shift_focus(fields, 1)
    }

    pub fn focus_previous(&mut self, fields: &[Field]) -> bool {
        self.shift_focus(fields, -1)
    }

    fn shift_focus(&mut self, fields: &[Field], direction: isize) -> bool {
        if fields.is_empty() {
            return true;
        }
        if let Some(current) = fields.get(self.focused) {
            self.blur(current);
        }
        let len = fields.len() as isize;
        let mut idx = self.focused as isize;
        for _ in 0..fields.len() {
            idx = (idx + direction).rem_euclid(len);
            if !fields[idx as usize].disabled {
                let wrapped = direction > 0 && idx <= self.focused as isize;
                self.focused = idx as usize;
                self.option_cursor = 0;
                return !wrapped;
            }
        }
        true
    }

    /// Commit buffers and collect every field into a JSON object for submit.
    pub fn values_bag(&mut self, fields: &[Field]) -> Map<String, Value> {
        for field in fields {
            self.commit_buffer(field);
        }
        fields
            .iter()
            .map(|field| {
                let value = self.values.get(&field.name).unwrap_or(&FieldValue::Null);
                (field.name.clone(), value.to_json())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Vec<Field> {
        vec![
            Field::new("vehicle_id", "Vehicle ID").required(true),
            Field::new("year", "Year").kind(FieldKind::Number {
                min: Some(1990.0),
                max: None,
                step: None,
            }),
            Field::new("notes", "Notes").disabled(true),
            Field::new("status", "Status"),
        ]
    }

    #[test]
    fn test_reset_seeds_values_from_record() {
        let fields = schema();
        let record = json!({"vehicle_id": "VH-001", "year": 2021, "extra": "ignored"});
        let mut state = FormState::new();
        state.reset(&fields, record.as_object());

        assert_eq!(
            state.value("vehicle_id"),
            Some(&FieldValue::Text("VH-001".into()))
        );
        assert_eq!(state.value("year"), Some(&FieldValue::Number(2021.0)));
        assert_eq!(state.value("extra"), None, "non-schema keys are dropped");
        assert!(state.errors.is_empty());
    }

    #[test]
    fn test_blur_validates_and_marks_touched() {
        let fields = schema();
        let mut state = FormState::new();
        state.reset(&fields, None);

        state.blur(&fields[0]);
        assert!(state.is_touched("vehicle_id"));
        assert_eq!(state.error("vehicle_id"), Some("Vehicle ID is required"));

        state.input_char(&fields[0], 'x');
        assert_eq!(state.error("vehicle_id"), None, "typing clears the error");
    }

    #[test]
    fn test_number_buffer_commits_on_blur() {
        let fields = schema();
        let year = &fields[1];
        let mut state = FormState::new();
        state.reset(&fields, None);

        state.input_char(year, '2');
        state.input_char(year, '0');
        state.input_char(year, '2');
        state.input_char(year, '4');
        state.input_char(year, 'x');
        assert_eq!(state.editing_text(year), "2024", "rejected chars are dropped");

        state.blur(year);
        assert_eq!(state.value("year"), Some(&FieldValue::Number(2024.0)));
    }

    #[test]
    fn test_empty_number_stays_null() {
        let fields = schema();
        let year = &fields[1];
        let mut state = FormState::new();
        state.reset(&fields, None);

        state.input_char(year, '5');
        state.backspace(year);
        state.blur(year);
        assert_eq!(state.value("year"), Some(&FieldValue::Null));

        let bag = state.values_bag(&fields);
        assert_eq!(bag["year"], Value::Null);
    }

    #[test]
    fn test_focus_skips_disabled() {
        let fields = schema();
        let mut state = FormState::new();
        state.reset(&fields, None);
        assert_eq!(state.focused, 0);

        state.focus_next(&fields);
        assert_eq!(state.focused, 1);
        state.focus_next(&fields);
        assert_eq!(state.focused, 3, "disabled field is skipped");
        assert!(!state.focus_next(&fields), "wraps back to the start");
        assert_eq!(state.focused, 0);
    }

    #[test]
    fn test_values_bag_covers_all_fields() {
        let fields = schema();
        let mut state = FormState::new();
        state.reset(&fields, None);
        state.set_value("vehicle_id", FieldValue::Text("VH-002".into()));

        let bag = state.values_bag(&fields);
        assert_eq!(bag["vehicle_id"], json!("VH-002"));
        assert_eq!(bag["status"], Value::Null);
        assert_eq!(bag.len(), 4);
    }
}
