//! # crud-widgets
//!
//! Schema-driven CRUD components for terminal admin consoles.
//!
//! Every page of a console is the same composition: a paginated [`DataTable`]
//! over JSON rows from a REST backend, a [`FormDialog`] for create/edit/view,
//! and a [`DeleteDialog`] guarding the destructive path. Pages supply all
//! domain semantics through column and field schemas; the widgets themselves
//! know no business entities and perform no I/O - every interaction is
//! reported upward as an event for the caller to act on.
//!
//! ## Components
//!
//! - [`DataTable`] - paginated, searchable grid with row actions and keyed
//!   bulk selection
//! - [`FormDialog`] - modal form over a field schema with validation and
//!   create/edit/view modes
//! - [`DeleteDialog`] - confirmation modal with pending-state lockout
//!
//! ## Architecture
//!
//! Widgets implement Ratatui's `StatefulWidget`; their state structs are
//! owned by the caller and passed to both rendering and key handling, so
//! pagination, search, selection, and form values all live in the page, not
//! the widget.

mod confirm;
mod form;
pub mod record;
mod table;

pub use confirm::{ConfirmEvent, DeleteDialog};
pub use form::{
    Field, FieldKind, FieldValue, FileRef, FormDialog, FormEvent, FormMode, FormState,
    SelectOption, validate,
};
pub use table::{
    Column, ColumnWidth, DataTable, PAGE_SIZES, RowAction, Selection, TableEvent, TableState,
};
