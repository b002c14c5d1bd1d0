//! Field schema and typed values.

use serde_json::Value;

/// One choice in a select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A file already chosen for upload. The widget carries only metadata; the
/// page performs the actual transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub size: u64,
}

/// Input kind for form fields. The kind decides which characters a field
/// accepts, how it renders, and how its value serializes.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Single-line text input
    Text,
    /// Text with email format validation
    Email,
    /// Masked text input
    Password,
    /// Phone number input
    Tel,
    /// Text with URL format validation
    Url,
    /// Date input (YYYY-MM-DD)
    Date,
    /// Date and time input
    DateTime,
    /// Numeric input; empty submits as null. Left/Right nudges the value by
    /// `step` while the field is focused.
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    /// Multi-line text input
    TextArea {
        rows: u16,
    },
    /// One-of or many-of a fixed option list
    Select {
        options: Vec<SelectOption>,
        multiple: bool,
    },
    /// Boolean toggle
    Checkbox,
    /// File picker (metadata only)
    File {
        accept: Option<String>,
    },
}

impl Default for FieldKind {
    fn default() -> Self {
        Self::Text
    }
}

impl FieldKind {
    /// Whether the kind takes free-form character input.
    pub fn is_textual(&self) -> bool {
        !matches!(
            self,
            Self::Select { .. } | Self::Checkbox | Self::File { .. }
        )
    }
}

/// Typed value held by a form field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
    File(FileRef),
}

impl FieldValue {
    /// Whether the value counts as absent for required-field checks. An
    /// unchecked checkbox is present, not missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::List(l) => l.is_empty(),
            Self::Number(_) | Self::Bool(_) | Self::File(_) => false,
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            _ => "",
        }
    }

    /// Convert to JSON for the submitted value bag. Empty numbers and empty
    /// text submit as null.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(s) => {
                if s.is_empty() {
                    Value::Null
                } else {
                    Value::String(s.clone())
                }
            }
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Bool(b) => Value::Bool(*b),
            Self::List(l) => Value::Array(l.iter().cloned().map(Value::String).collect()),
            Self::File(f) => serde_json::json!({ "name": f.name, "size": f.size }),
        }
    }

    /// Read a value out of an existing record, shaped for the given kind.
    pub fn from_json(kind: &FieldKind, value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match kind {
                FieldKind::Number { .. } => {
                    n.as_f64().map(Self::Number).unwrap_or(Self::Null)
                }
                _ => Self::Text(n.to_string()),
            },
            Value::String(s) => match kind {
                FieldKind::Number { .. } => {
                    s.parse::<f64>().map(Self::Number).unwrap_or(Self::Null)
                }
                FieldKind::Checkbox => Self::Bool(s == "true"),
                FieldKind::Select { multiple: true, .. } => Self::List(vec![s.clone()]),
                _ => Self::Text(s.clone()),
            },
            Value::Array(items) => Self::List(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            Value::Object(map) => {
                let name = map.get("name").and_then(Value::as_str);
                let size = map.get("size").and_then(Value::as_u64);
                match name {
                    Some(name) => Self::File(FileRef {
                        name: name.to_string(),
                        size: size.unwrap_or(0),
                    }),
                    None => Self::Null,
                }
            }
        }
    }
}

/// Form field definition.
#[derive(Clone)]
pub struct Field {
    /// Field name (key in the submitted value bag)
    pub name: String,
    /// Display label
    pub label: String,
    /// Input kind
    pub kind: FieldKind,
    /// Whether the field must be present on submit
    pub required: bool,
    /// Whether the field is read-only
    pub disabled: bool,
    /// Placeholder text
    pub placeholder: Option<String>,
    /// Help text shown under the input
    pub helper: Option<String>,
    /// Columns spanned in the two-column grid (1 or 2)
    pub col_span: u16,
    /// Custom validation, run after the required check
    pub validate: Option<fn(&FieldValue) -> Option<String>>,
}

impl Field {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: FieldKind::Text,
            required: false,
            disabled: false,
            placeholder: None,
            helper: None,
            col_span: 1,
            validate: None,
        }
    }

    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn helper(mut self, text: impl Into<String>) -> Self {
        self.helper = Some(text.into());
        self
    }

    /// Span both columns of the grid.
    pub fn full_width(mut self) -> Self {
        self.col_span = 2;
        self
    }

    pub fn validate_with(mut self, f: fn(&FieldValue) -> Option<String>) -> Self {
        self.validate = Some(f);
        self
    }

    /// Whether the field accepts the character as input.
    pub fn accepts_char(&self, c: char) -> bool {
        match &self.kind {
            FieldKind::Number { .. } => c.is_ascii_digit() || c == '.' || c == '-',
            FieldKind::Tel => c.is_ascii_digit() || "+-() ".contains(c),
            FieldKind::TextArea { .. } => c == '\n' || !c.is_control(),
            kind => kind.is_textual() && !c.is_control(),
        }
    }

    /// Display text for a value, per kind.
    pub fn display(&self, value: &FieldValue) -> String {
        match (&self.kind, value) {
            (FieldKind::Password, FieldValue::Text(s)) => "\u{2022}".repeat(s.chars().count()),
            (FieldKind::Checkbox, v) => {
                let checked = matches!(v, FieldValue::Bool(true));
                if checked { "[\u{2713}]" } else { "[ ]" }.to_string()
            }
            (FieldKind::Select { options, .. }, FieldValue::Text(s)) => options
                .iter()
                .find(|o| &o.value == s)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| s.clone()),
            (FieldKind::Select { options, .. }, FieldValue::List(l)) => l
                .iter()
                .map(|v| {
                    options
                        .iter()
                        .find(|o| &o.value == v)
                        .map(|o| o.label.as_str())
                        .unwrap_or(v.as_str())
                })
                .collect::<Vec<_>>()
                .join(", "),
            (_, FieldValue::File(f)) => format!("{} ({} bytes)", f.name, f.size),
            (_, FieldValue::Text(s)) => s.clone(),
            (_, FieldValue::Number(n)) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            (_, FieldValue::Bool(b)) => b.to_string(),
            (_, FieldValue::List(l)) => l.join(", "),
            (_, FieldValue::Null) => String::new(),
        }
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}
