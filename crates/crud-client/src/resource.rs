//! Read-lifecycle state machine, the query half of every page.

use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::client::Transport;
use crate::query::Query;

/// Observable state of a [`Resource`].
#[derive(Debug, Clone)]
pub struct ResourceState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

struct Inner<T> {
    state: ResourceState<T>,
    /// Last issued request, replayed by `refetch`.
    request: Option<(String, Query)>,
}

/// A GET-backed resource: `data`/`loading`/`error` plus re-run and local
/// cache mutation.
///
/// Each `load` takes a fresh generation; a settlement whose generation has
/// been superseded is discarded, so the displayed state always reflects the
/// most recently requested path/query pair even when responses arrive out of
/// order. Failures keep the previous `data` (a transient error does not blank
/// an already-rendered table) and surface a message.
///
/// Cloning shares state: spawn `load` on a clone and render from snapshots.
pub struct Resource<T> {
    transport: Arc<dyn Transport>,
    inner: Arc<Mutex<Inner<T>>>,
    generation: Arc<AtomicU64>,
    enabled: Arc<AtomicBool>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            inner: Arc::clone(&self.inner),
            generation: Arc::clone(&self.generation),
            enabled: Arc::clone(&self.enabled),
        }
    }
}

impl<T: DeserializeOwned> Resource<T> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            inner: Arc::new(Mutex::new(Inner {
                state: ResourceState::default(),
                request: None,
            })),
            generation: Arc::new(AtomicU64::new(0)),
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Gate fetching without dropping the recorded request. While disabled,
    /// `load` and `refetch` are no-ops and `loading` stays false.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Issue a GET for `path` with `query`. `None` path is a no-op, matching
    /// the "page not ready yet" case where an id is still unknown.
    pub async fn load(&self, path: Option<&str>, query: Query) {
        let Some(path) = path else {
            self.lock().state.loading = false;
            return;
        };
        self.lock().request = Some((path.to_string(), query.clone()));
        self.run(path.to_string(), query).await;
    }

    /// Re-run the last issued request with a fresh generation.
    pub async fn refetch(&self) {
        let request = self.lock().request.clone();
        if let Some((path, query)) = request {
            self.run(path, query).await;
        }
    }

    async fn run(&self, path: String, query: Query) {
        if !self.enabled.load(Ordering::SeqCst) {
            self.lock().state.loading = false;
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut inner = self.lock();
            inner.state.loading = true;
            inner.state.error = None;
        }
        debug!(%path, generation, "resource load");

        let result = self.transport.get(&path, &query).await;

        let mut inner = self.lock();
        if generation != self.generation.load(Ordering::SeqCst) {
            // Superseded by a newer load; applying would show stale data.
            debug!(%path, generation, "discarding stale response");
            return;
        }

        match result.and_then(|value| Ok(serde_json::from_value::<T>(value)?)) {
            Ok(data) => {
                inner.state.data = Some(data);
                inner.state.error = None;
            }
            Err(err) => {
                warn!(%path, error = %err, "resource load failed");
                inner.state.error = Some(err.read_message());
            }
        }
        inner.state.loading = false;
    }

    /// Replace the cached value directly, e.g. to merge a mutation result
    /// into the list without a round trip.
    pub fn set_data(&self, f: impl FnOnce(Option<T>) -> Option<T>) {
        let mut inner = self.lock();
        let current = inner.state.data.take();
        inner.state.data = f(current);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.inner.lock().expect("resource lock poisoned")
    }
}

impl<T: Clone> Resource<T> {
    /// Current state for rendering.
    pub fn snapshot(&self) -> ResourceState<T> {
        self.inner.lock().expect("resource lock poisoned").state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ApiResult};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;

    /// Transport that answers from a queue, optionally delaying each response
    /// by a `delay_ms` query parameter (used with the paused tokio clock).
    struct MockTransport {
        responses: Mutex<Vec<ApiResult<Value>>>,
    }

    impl MockTransport {
        fn new(responses: Vec<ApiResult<Value>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
            })
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, _path: &str, query: &Query) -> ApiResult<Value> {
            let result = self.responses.lock().unwrap().remove(0);
            let delay = query
                .pairs()
                .iter()
                .find(|(k, _)| k == "delay_ms")
                .and_then(|(_, v)| v.parse::<u64>().ok());
            if let Some(ms) = delay {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
            result
        }

        async fn post(&self, _path: &str, _body: &Value) -> ApiResult<Value> {
            unimplemented!()
        }

        async fn put(&self, _path: &str, _body: &Value) -> ApiResult<Value> {
            unimplemented!()
        }

        async fn delete(&self, _path: &str) -> ApiResult<Value> {
            unimplemented!()
        }
    }

    fn status_err(status: u16, message: &str) -> ApiError {
        ApiError::Status {
            status,
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn test_load_success() {
        let transport = MockTransport::new(vec![Ok(json!(["a", "b"]))]);
        let resource: Resource<Vec<String>> = Resource::new(transport);

        resource.load(Some("/api/items"), Query::new()).await;

        let state = resource.snapshot();
        assert_eq!(state.data, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_data() {
        let transport = MockTransport::new(vec![
            Ok(json!(["a"])),
            Err(status_err(500, "boom")),
            Ok(json!(["a", "b"])),
        ]);
        let resource: Resource<Vec<String>> = Resource::new(transport);

        resource.load(Some("/api/items"), Query::new()).await;
        resource.refetch().await;

        let state = resource.snapshot();
        assert_eq!(state.data, Some(vec!["a".to_string()]), "stale data retained");
        assert_eq!(state.error, Some("boom".to_string()));
        assert!(!state.loading);

        // A later successful refetch clears the error and replaces data.
        resource.refetch().await;
        let state = resource.snapshot();
        assert_eq!(state.data, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_decode_failure_uses_generic_message() {
        let transport = MockTransport::new(vec![Ok(json!({"not": "a list"}))]);
        let resource: Resource<Vec<String>> = Resource::new(transport);

        resource.load(Some("/api/items"), Query::new()).await;

        let state = resource.snapshot();
        assert_eq!(state.error, Some("Failed to fetch data".to_string()));
    }

    #[tokio::test]
    async fn test_none_path_is_noop() {
        let transport = MockTransport::new(vec![]);
        let resource: Resource<Vec<String>> = Resource::new(transport);

        resource.load(None, Query::new()).await;

        let state = resource.snapshot();
        assert_eq!(state.data, None);
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let transport = MockTransport::new(vec![]);
        let resource: Resource<Vec<String>> = Resource::new(transport);
        resource.set_enabled(false);

        resource.load(Some("/api/items"), Query::new()).await;

        let state = resource.snapshot();
        assert_eq!(state.data, None);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_discarded() {
        // First load answers slowly, second quickly; the slow settlement must
        // not overwrite the newer one.
        let transport = MockTransport::new(vec![Ok(json!(["old"])), Ok(json!(["new"]))]);
        let resource: Resource<Vec<String>> = Resource::new(transport);

        let slow = {
            let resource = resource.clone();
            tokio::spawn(async move {
                resource
                    .load(Some("/api/items"), Query::new().set("delay_ms", 100u64))
                    .await;
            })
        };
        tokio::task::yield_now().await;

        let fast = {
            let resource = resource.clone();
            tokio::spawn(async move {
                resource
                    .load(Some("/api/items"), Query::new().set("delay_ms", 10u64))
                    .await;
            })
        };

        slow.await.unwrap();
        fast.await.unwrap();

        let state = resource.snapshot();
        assert_eq!(state.data, Some(vec!["new".to_string()]));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_set_data_merges_locally() {
        let transport = MockTransport::new(vec![Ok(json!(["a"]))]);
        let resource: Resource<Vec<String>> = Resource::new(transport);
        resource.load(Some("/api/items"), Query::new()).await;

        resource.set_data(|data| {
            let mut items = data.unwrap_or_default();
            items.push("b".to_string());
            Some(items)
        });

        assert_eq!(
            resource.snapshot().data,
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }
}
