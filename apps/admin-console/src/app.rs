//! Application state for the vehicles page.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use serde_json::Value;
use tracing::info;

use crud_client::{CrudApi, HttpClient, ListPage, Mutation, Query, Resource, Session, Transport};
use crud_widgets::{
    record, Column, ColumnWidth, ConfirmEvent, DataTable, DeleteDialog, Field, FieldKind,
    FormDialog, FormEvent, FormMode, FormState, SelectOption, TableEvent, TableState,
};

use crate::config::Config;

/// Which modal is on top of the table, if any.
pub enum Dialog {
    None,
    Form {
        mode: FormMode,
        editing_id: Option<String>,
    },
    Delete {
        id: String,
        name: String,
    },
}

pub struct App {
    pub config: Config,
    pub session: Session,

    vehicles: Resource<ListPage>,
    create: Mutation<Value, Value>,
    update: Mutation<Value, (String, Value)>,
    remove: Mutation<Value, String>,

    pub columns: Vec<Column>,
    pub fields: Vec<Field>,
    pub table: TableState,
    pub form: FormState,
    pub dialog: Dialog,

    /// Last-settled page of rows, mirrored out of the resource each tick so
    /// widgets can borrow them.
    pub rows: Vec<Value>,
    pub loading: bool,
    pub error: Option<String>,
    /// Write error shown inside the open form dialog.
    pub form_error: Option<String>,
    pub status_message: Option<String>,
}

/// Built per frame from disjoint app fields so the table state can be
/// borrowed mutably alongside it.
pub fn build_table<'a>(
    columns: &'a [Column],
    rows: &'a [Value],
    loading: bool,
    error: Option<&'a str>,
) -> DataTable<'a> {
    DataTable::new(columns, rows, "id")
        .loading(loading)
        .error(error)
        .empty_message("No vehicles found.")
        .search_placeholder("Search vehicles...")
        .add_button("Add Vehicle")
        .selectable(true)
        .viewable(true)
        .editable(true)
        .deletable(true)
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let session = Session::new();
        if let Some(token) = &config.api.token {
            session.set_token(token.clone());
        }

        let transport: Arc<dyn Transport> =
            Arc::new(HttpClient::new(config.api.base_url.clone(), session.clone())?);
        let vehicles = Resource::new(Arc::clone(&transport));
        let api = CrudApi::new(transport, "/vehicles");

        let create = Mutation::new({
            let api = api.clone();
            move |body: Value| {
                let api = api.clone();
                async move { api.create(&body).await }
            }
        });
        let update = Mutation::new({
            let api = api.clone();
            move |(id, body): (String, Value)| {
                let api = api.clone();
                async move { api.update(&id, &body).await }
            }
        });
        let remove = Mutation::new({
            let api = api.clone();
            move |id: String| {
                let api = api.clone();
                async move { api.delete(&id).await }
            }
        });

        let mut table = TableState::new();
        table.page_size = config.display.page_size;

        Ok(Self {
            config,
            session,
            vehicles,
            create,
            update,
            remove,
            columns: vehicle_columns(),
            fields: vehicle_fields(),
            table,
            form: FormState::new(),
            dialog: Dialog::None,
            rows: Vec::new(),
            loading: true,
            error: None,
            form_error: None,
            status_message: None,
        })
    }

    /// Issue a fresh list request for the current page, size, and search.
    pub async fn refresh(&mut self) {
        let mut query = Query::new()
            .set("skip", self.table.offset() as u64)
            .set("limit", self.table.page_size as u64);
        if !self.table.search.is_empty() {
            query = query.set("search", self.table.search.clone());
        }
        self.vehicles.load(Some("/vehicles"), query).await;
        self.sync();
    }

    /// Mirror the resource into plain fields the widgets can borrow.
    pub fn sync(&mut self) {
        let state = self.vehicles.snapshot();
        self.loading = state.loading;
        self.error = state.error;
        if let Some(page) = state.data {
            self.rows = page.items;
            self.table.total = page.total;
        }
    }

    /// Title and pending flag for the open form dialog.
    pub fn form_chrome(&self, mode: FormMode) -> (&'static str, bool) {
        match mode {
            FormMode::Create => ("Add Vehicle", self.create.loading()),
            FormMode::Edit => ("Edit Vehicle", self.update.loading()),
            FormMode::View => ("Vehicle Details", false),
        }
    }

    pub fn delete_pending(&self) -> bool {
        self.remove.loading()
    }

    /// Handle a key press. Returns true when the app should quit.
    pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
        match &self.dialog {
            Dialog::Form { .. } => {
                self.handle_form_key(key).await;
                false
            }
            Dialog::Delete { .. } => {
                self.handle_delete_key(key).await;
                false
            }
            Dialog::None => self.handle_table_key(key).await,
        }
    }

    async fn handle_table_key(&mut self, key: KeyEvent) -> bool {
        if !self.table.search_mode {
            match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('r') => {
                    self.refresh().await;
                    return false;
                }
                _ => {}
            }
        }

        let event = {
            let widget = build_table(&self.columns, &self.rows, self.loading, self.error.as_deref());
            widget.handle_key(key, &mut self.table)
        };
        match event {
            Some(TableEvent::Add) => {
                self.form.reset(&self.fields, None);
                self.form.set_value(
                    "acquired_on",
                    crud_widgets::FieldValue::Text(
                        chrono::Local::now().format("%Y-%m-%d").to_string(),
                    ),
                );
                self.form_error = None;
                self.status_message = None;
                self.create.reset();
                self.dialog = Dialog::Form {
                    mode: FormMode::Create,
                    editing_id: None,
                };
            }
            Some(TableEvent::View(row)) => self.open_record(row, FormMode::View),
            Some(TableEvent::Edit(row)) => self.open_record(row, FormMode::Edit),
            Some(TableEvent::Delete(row)) => {
                if let Some(record) = self.rows.get(row) {
                    if let Some(id) = record::key_of(record, "id") {
                        let name = record::key_of(record, "vehicle_id").unwrap_or_else(|| id.clone());
                        self.remove.reset();
                        self.dialog = Dialog::Delete { id, name };
                    }
                }
            }
            Some(
                TableEvent::PageChanged | TableEvent::PageSizeChanged | TableEvent::SearchChanged,
            ) => {
                self.refresh().await;
            }
            Some(TableEvent::SelectionChanged) => {
                let count = self.table.selection.len();
                self.status_message =
                    (count > 0).then(|| format!("{} vehicle(s) selected", count));
            }
            Some(TableEvent::Action { .. }) | None => {}
        }
        false
    }

    fn open_record(&mut self, row: usize, mode: FormMode) {
        let Some(record) = self.rows.get(row) else {
            return;
        };
        let Some(id) = record::key_of(record, "id") else {
            return;
        };
        self.form.reset(&self.fields, record.as_object());
        self.form_error = None;
        self.status_message = None;
        self.update.reset();
        self.dialog = Dialog::Form {
            mode,
            editing_id: Some(id),
        };
    }

    async fn handle_form_key(&mut self, key: KeyEvent) {
        let Dialog::Form { mode, editing_id } = &self.dialog else {
            return;
        };
        let mode = *mode;
        let editing_id = editing_id.clone();

        let event = {
            let widget = FormDialog::new("", &self.fields, mode)
                .loading(self.create.loading() || self.update.loading());
            widget.handle_key(key, &mut self.form)
        };
        match event {
            Some(FormEvent::Submit(bag)) => {
                let body = Value::Object(bag);
                let result = match (mode, editing_id) {
                    (FormMode::Edit, Some(id)) => self.update.mutate((id, body)).await,
                    (FormMode::Create, _) => self.create.mutate(body).await,
                    _ => None,
                };
                match result {
                    Some(_) => {
                        info!(mode = ?mode, "vehicle saved");
                        self.dialog = Dialog::None;
                        self.form_error = None;
                        self.status_message = Some(match mode {
                            FormMode::Create => "Vehicle created".to_string(),
                            _ => "Vehicle updated".to_string(),
                        });
                        self.vehicles.refetch().await;
                        self.sync();
                    }
                    None => {
                        self.form_error = self.create.error().or_else(|| self.update.error());
                    }
                }
            }
            Some(FormEvent::Close) => {
                self.dialog = Dialog::None;
                self.form_error = None;
            }
            None => {}
        }
    }

    async fn handle_delete_key(&mut self, key: KeyEvent) {
        let Dialog::Delete { id, name } = &self.dialog else {
            return;
        };
        let id = id.clone();
        let name = name.clone();

        let widget = DeleteDialog::new(&name).loading(self.remove.loading());
        match widget.handle_key(key) {
            Some(ConfirmEvent::Confirm) => match self.remove.mutate(id.clone()).await {
                Some(_) => {
                    info!(%id, "vehicle deleted");
                    self.table.selection.clear();
                    self.dialog = Dialog::None;
                    self.status_message = Some("Vehicle deleted".to_string());
                    self.vehicles.refetch().await;
                    self.sync();
                }
                None => {
                    self.status_message = self.remove.error();
                }
            },
            Some(ConfirmEvent::Close) => {
                self.dialog = Dialog::None;
            }
            None => {}
        }
    }
}

fn vehicle_columns() -> Vec<Column> {
    vec![
        Column::new("vehicle_id", "Vehicle ID").width(ColumnWidth::Fixed(12)),
        Column::new("make", "Make/Model").render(|_, row| {
            let make = record::get(row, "make").and_then(Value::as_str).unwrap_or("-");
            let model = record::get(row, "model").and_then(Value::as_str).unwrap_or("");
            format!("{} {}", make, model).trim().to_string()
        }),
        Column::new("year", "Year").width(ColumnWidth::Fixed(6)),
        Column::new("license_plate", "Plate").width(ColumnWidth::Fixed(10)),
        Column::new("status", "Status").render(|value, _| {
            value
                .and_then(Value::as_str)
                .map(|s| s.replace('_', " ").to_uppercase())
                .unwrap_or_else(|| "-".to_string())
        }),
        Column::new("assigned_driver.name", "Driver"),
    ]
}

fn vehicle_fields() -> Vec<Field> {
    vec![
        Field::new("vehicle_id", "Vehicle ID")
            .required(true)
            .placeholder("VH-001"),
        Field::new("license_plate", "License Plate").required(true),
        Field::new("make", "Make").required(true),
        Field::new("model", "Model").required(true),
        Field::new("year", "Year").kind(FieldKind::Number {
            min: Some(1980.0),
            max: Some(2100.0),
            step: Some(1.0),
        }),
        Field::new("status", "Status")
            .kind(FieldKind::Select {
                options: vec![
                    SelectOption::new("in_service", "In Service"),
                    SelectOption::new("maintenance", "Maintenance"),
                    SelectOption::new("retired", "Retired"),
                ],
                multiple: false,
            })
            .required(true),
        Field::new("acquired_on", "Acquired")
            .kind(FieldKind::Date)
            .helper("YYYY-MM-DD"),
        Field::new("notes", "Notes")
            .kind(FieldKind::TextArea { rows: 3 })
            .full_width(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_schema_shape() {
        let columns = vehicle_columns();
        assert_eq!(columns.len(), 6);

        let fields = vehicle_fields();
        let required: Vec<_> = fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["vehicle_id", "license_plate", "make", "model", "status"]
        );
    }

    #[test]
    fn test_make_model_column_renders_from_row() {
        let columns = vehicle_columns();
        let row = serde_json::json!({"make": "Toyota", "model": "Corolla"});
        assert_eq!(columns[1].cell_text(&row), "Toyota Corolla");
    }
}
