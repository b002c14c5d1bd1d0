//! # crud-client
//!
//! REST plumbing for the CRUD console: a transport abstraction over the JSON
//! backend plus the two request-lifecycle state machines every page reuses.
//!
//! ## Components
//!
//! - [`Transport`] / [`HttpClient`] - the HTTP boundary, mockable in tests
//! - [`Resource`] - read lifecycle (`load -> success | error`) with a
//!   generation guard against stale responses
//! - [`Mutation`] - write lifecycle (`idle -> pending -> success | error`),
//!   reentrancy-guarded
//! - [`CrudApi`] - list/get/create/update/delete bundle over a base path
//!
//! ## Architecture
//!
//! State machines own their state behind shared handles so fetches can be
//! spawned off the UI loop while rendering reads snapshots. Failures never
//! propagate past the hook boundary: reads keep stale data and surface a
//! message, writes resolve to `None`.

mod api;
mod client;
mod error;
mod mutation;
mod query;
mod resource;
mod session;

pub use api::{CrudApi, ListPage};
pub use client::{HttpClient, Transport};
pub use error::ApiError;
pub use mutation::{Mutation, MutationState};
pub use query::{Query, QueryValue};
pub use resource::{Resource, ResourceState};
pub use session::Session;
