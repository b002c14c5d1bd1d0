//! Write-lifecycle state machine, the command half of every page.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Observable state of a [`Mutation`].
#[derive(Debug, Clone)]
pub struct MutationState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for MutationState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

type MutationFn<T, V> =
    Arc<dyn Fn(V) -> Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send>> + Send + Sync>;

/// Wraps an arbitrary async write operation with `data`/`loading`/`error`
/// state.
///
/// `mutate` resolves to `Some(result)` on success and `None` on failure, so
/// call sites branch on the return value instead of catching. At most one
/// call is in flight per instance: a `mutate` issued while another is pending
/// is ignored and resolves to `None` without touching state. No retry, no
/// queue, no cancellation - a failed write stays failed until the user
/// re-triggers it.
pub struct Mutation<T, V> {
    op: MutationFn<T, V>,
    state: Arc<Mutex<MutationState<T>>>,
    in_flight: Arc<AtomicBool>,
}

impl<T, V> Clone for Mutation<T, V> {
    fn clone(&self) -> Self {
        Self {
            op: Arc::clone(&self.op),
            state: Arc::clone(&self.state),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<T, V> Mutation<T, V> {
    pub fn new<F, Fut>(op: F) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        Self {
            op: Arc::new(move |vars| Box::pin(op(vars))),
            state: Arc::new(Mutex::new(MutationState::default())),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the write. Returns the result value, or `None` on failure or when
    /// another call is already pending.
    pub async fn mutate(&self, variables: V) -> Option<T>
    where
        T: Clone,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("mutation already in flight, ignoring");
            return None;
        }

        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
        }

        let result = (self.op)(variables).await;

        let mut state = self.lock();
        state.loading = false;
        self.in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(value) => {
                state.data = Some(value.clone());
                state.error = None;
                Some(value)
            }
            Err(err) => {
                warn!(error = %err, "mutation failed");
                state.error = Some(err.write_message());
                None
            }
        }
    }

    /// Clear `data`, `error`, and `loading`.
    pub fn reset(&self) {
        *self.lock() = MutationState::default();
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MutationState<T>> {
        self.state.lock().expect("mutation lock poisoned")
    }
}

impl<T: Clone, V> Mutation<T, V> {
    /// Current state for rendering.
    pub fn snapshot(&self) -> MutationState<T> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fail_with(message: &str) -> ApiError {
        ApiError::Status {
            status: 422,
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn test_mutate_success() {
        let mutation: Mutation<i64, i64> = Mutation::new(|n: i64| async move { Ok(n * 2) });

        let result = mutation.mutate(21).await;
        assert_eq!(result, Some(42));

        let state = mutation.snapshot();
        assert_eq!(state.data, Some(42));
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_mutate_failure_returns_none() {
        let mutation: Mutation<i64, ()> =
            Mutation::new(|_| async { Err(fail_with("Vehicle ID already exists")) });

        let result = mutation.mutate(()).await;
        assert_eq!(result, None);

        let state = mutation.snapshot();
        assert_eq!(state.data, None, "data unchanged on failure");
        assert!(!state.loading, "loading false after settlement");
        assert_eq!(state.error, Some("Vehicle ID already exists".to_string()));
    }

    #[tokio::test]
    async fn test_failure_generic_fallback() {
        let mutation: Mutation<i64, ()> = Mutation::new(|_| async {
            Err(ApiError::Decode(
                serde_json::from_str::<i64>("x").unwrap_err(),
            ))
        });

        mutation.mutate(()).await;
        assert_eq!(mutation.error(), Some("Operation failed".to_string()));
    }

    #[tokio::test]
    async fn test_error_cleared_on_next_attempt() {
        let flag = Arc::new(AtomicBool::new(true));
        let mutation: Mutation<i64, ()> = {
            let flag = Arc::clone(&flag);
            Mutation::new(move |_| {
                let fail = flag.load(Ordering::SeqCst);
                async move {
                    if fail {
                        Err(fail_with("nope"))
                    } else {
                        Ok(7)
                    }
                }
            })
        };

        mutation.mutate(()).await;
        assert!(mutation.error().is_some());

        flag.store(false, Ordering::SeqCst);
        let result = mutation.mutate(()).await;
        assert_eq!(result, Some(7));
        assert_eq!(mutation.error(), None);
    }

    #[tokio::test]
    async fn test_reset() {
        let mutation: Mutation<i64, ()> = Mutation::new(|_| async { Err(fail_with("x")) });
        mutation.mutate(()).await;

        mutation.reset();
        let state = mutation.snapshot();
        assert_eq!(state.data, None);
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentrancy_guard() {
        let mutation: Mutation<i64, i64> = Mutation::new(|n: i64| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(n)
        });

        let first = {
            let mutation = mutation.clone();
            tokio::spawn(async move { mutation.mutate(1).await })
        };
        tokio::task::yield_now().await;

        // Second call while the first is pending is ignored.
        let second = mutation.mutate(2).await;
        assert_eq!(second, None);

        assert_eq!(first.await.unwrap(), Some(1));
        assert_eq!(mutation.snapshot().data, Some(1));
    }
}
