//! Endpoint bundle for a standard CRUD resource.

use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;

use crate::client::Transport;
use crate::error::{ApiError, ApiResult};
use crate::query::Query;

/// One page of a list endpoint's results.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub items: Vec<Value>,
    pub total: u64,
}

// Deserializes through the same envelope normalization as `CrudApi::list`,
// so `Resource<ListPage>` accepts every shape the backend produces.
impl<'de> serde::Deserialize<'de> for ListPage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        parse_list(value).map_err(serde::de::Error::custom)
    }
}

/// The five standard operations over a REST base path
/// (`GET /`, `GET /{id}`, `POST /`, `PUT /{id}`, `DELETE /{id}`).
#[derive(Clone)]
pub struct CrudApi {
    transport: Arc<dyn Transport>,
    base: String,
}

impl CrudApi {
    pub fn new(transport: Arc<dyn Transport>, base: impl Into<String>) -> Self {
        Self {
            transport,
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn item_path(&self, id: impl Display) -> String {
        format!("{}/{}", self.base, id)
    }

    /// Fetch one page. The backend answers either with a paged envelope
    /// (`total` plus an array under `items` or an entity-named key) or with a
    /// bare array; both normalize to a [`ListPage`].
    pub async fn list(&self, query: &Query) -> ApiResult<ListPage> {
        let value = self.transport.get(&self.base, query).await?;
        parse_list(value)
    }

    pub async fn get_one(&self, id: impl Display) -> ApiResult<Value> {
        self.transport.get(&self.item_path(id), &Query::new()).await
    }

    pub async fn create(&self, body: &Value) -> ApiResult<Value> {
        self.transport.post(&self.base, body).await
    }

    pub async fn update(&self, id: impl Display, body: &Value) -> ApiResult<Value> {
        self.transport.put(&self.item_path(id), body).await
    }

    pub async fn delete(&self, id: impl Display) -> ApiResult<Value> {
        self.transport.delete(&self.item_path(id)).await
    }
}

fn parse_list(value: Value) -> ApiResult<ListPage> {
    match value {
        Value::Array(items) => {
            let total = items.len() as u64;
            Ok(ListPage { items, total })
        }
        Value::Object(mut map) => {
            let total = map.get("total").and_then(Value::as_u64);
            let items_key = if map.get("items").map(|v| v.is_array()).unwrap_or(false) {
                Some("items".to_string())
            } else {
                // Entity-named envelopes: {"vehicles": [...], "total": n}
                map.iter()
                    .find(|(k, v)| *k != "total" && v.is_array())
                    .map(|(k, _)| k.clone())
            };
            match (items_key, total) {
                (Some(key), total) => {
                    let items = match map.remove(&key) {
                        Some(Value::Array(items)) => items,
                        _ => Vec::new(),
                    };
                    let total = total.unwrap_or(items.len() as u64);
                    Ok(ListPage { items, total })
                }
                (None, _) => Err(ApiError::Status {
                    status: 200,
                    message: "Unexpected list response shape".to_string(),
                }),
            }
        }
        _ => Err(ApiError::Status {
            status: 200,
            message: "Unexpected list response shape".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bare_array() {
        let page = parse_list(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_parse_items_envelope() {
        let page = parse_list(json!({"items": [{"id": 1}], "total": 95})).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 95);
    }

    #[test]
    fn test_parse_entity_named_envelope() {
        let page = parse_list(json!({"vehicles": [{"id": 1}, {"id": 2}], "total": 40})).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 40);
    }

    #[test]
    fn test_parse_rejects_scalar() {
        assert!(parse_list(json!(42)).is_err());
        assert!(parse_list(json!({"total": 5})).is_err());
    }

    #[test]
    fn test_deserialize_matches_parse() {
        let page: ListPage =
            serde_json::from_value(json!({"items": [{"id": 1}], "total": 7})).unwrap();
        assert_eq!(page.total, 7);

        let page: ListPage = serde_json::from_value(json!([{"id": 1}])).unwrap();
        assert_eq!(page.total, 1);
    }
}
