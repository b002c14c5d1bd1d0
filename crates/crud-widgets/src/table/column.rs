//! Column definitions for DataTable.

use serde_json::Value;

use crate::record;

/// Column width specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Fixed width in characters
    Fixed(u16),
    /// Percentage of available width
    Percentage(f32),
    /// Flexible width with relative weight
    Flex(u16),
}

impl Default for ColumnWidth {
    fn default() -> Self {
        Self::Flex(1)
    }
}

type RenderFn = Box<dyn Fn(Option<&Value>, &Value) -> String>;

/// Column definition: a dotted path into the row plus presentation.
pub struct Column {
    /// Dotted path into the row (`"client.name"`)
    pub key: String,
    /// Header text
    pub header: String,
    /// Width specification
    pub width: ColumnWidth,
    /// Display override; when set it is the sole authority for the cell text
    render: Option<RenderFn>,
}

impl Column {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            width: ColumnWidth::default(),
            render: None,
        }
    }

    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    /// Set a render override. Receives the resolved value (`None` when the
    /// path is missing) and the full row.
    pub fn render(mut self, f: impl Fn(Option<&Value>, &Value) -> String + 'static) -> Self {
        self.render = Some(Box::new(f));
        self
    }

    /// The cell text for a row: the override's output verbatim, or the raw
    /// resolved value with the dash placeholder for null/missing.
    pub fn cell_text(&self, row: &Value) -> String {
        let value = record::get(row, &self.key);
        match &self.render {
            Some(f) => f(value, row),
            None => record::display(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_value_and_placeholder() {
        let col = Column::new("year", "Year");
        assert_eq!(col.cell_text(&json!({"year": 2023})), "2023");
        assert_eq!(col.cell_text(&json!({"year": null})), "-");
        assert_eq!(col.cell_text(&json!({})), "-");
    }

    #[test]
    fn test_render_override_is_sole_authority() {
        let col = Column::new("status", "Status")
            .render(|value, _row| format!("[{}]", value.and_then(|v| v.as_str()).unwrap_or("?")));
        assert_eq!(col.cell_text(&json!({"status": "active"})), "[active]");
        // Even for null the override decides, not the placeholder.
        assert_eq!(col.cell_text(&json!({"status": null})), "[?]");
    }

    #[test]
    fn test_render_sees_full_row() {
        let col = Column::new("first", "Name")
            .render(|_, row| {
                format!(
                    "{} {}",
                    row["first"].as_str().unwrap_or(""),
                    row["last"].as_str().unwrap_or("")
                )
            });
        assert_eq!(
            col.cell_text(&json!({"first": "Ada", "last": "Lovelace"})),
            "Ada Lovelace"
        );
    }

    #[test]
    fn test_builder() {
        let col = Column::new("vehicle_id", "Vehicle ID").width(ColumnWidth::Fixed(12));
        assert_eq!(col.key, "vehicle_id");
        assert_eq!(col.width, ColumnWidth::Fixed(12));
    }
}
