//! Request-scoped network context.
//!
//! The context lives in a task-local slot that only exists while the future
//! passed to [`RequestContext::scope`] is being polled. Completion, an error
//! return, a panic or cancellation all drop the scope, so a later request
//! served by the same task never observes it.

use std::future::Future;

/// Maximum stored length of the client identifier, in characters.
pub const CLIENT_ID_MAX_CHARS: usize = 255;

tokio::task_local! {
    static CURRENT_REQUEST_CONTEXT: RequestContext;
}

/// Network origin of the current inbound operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    ip_address: Option<String>,
    client_id: Option<String>,
}

impl RequestContext {
    /// Creates a context, dropping empty values and bounding the client id.
    #[must_use]
    pub fn new(ip_address: Option<String>, client_id: Option<String>) -> Self {
        let ip_address = ip_address
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let client_id = client_id
            .filter(|value| !value.is_empty())
            .map(|value| value.chars().take(CLIENT_ID_MAX_CHARS).collect());

        Self {
            ip_address,
            client_id,
        }
    }

    /// Returns the origin IP address, if known.
    #[must_use]
    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// Returns the client identifier, if provided.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Returns a copy of the context of the operation currently running on
    /// this task, or `None` outside any request scope.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT_REQUEST_CONTEXT.try_with(Clone::clone).ok()
    }

    /// Runs `operation` with this context installed.
    pub async fn scope<F>(self, operation: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_REQUEST_CONTEXT.scope(self, operation).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use panelist_core::{AppError, AppResult};
    use tokio::task::JoinSet;

    use super::{CLIENT_ID_MAX_CHARS, RequestContext};

    fn context(ip_address: &str) -> RequestContext {
        RequestContext::new(Some(ip_address.to_owned()), Some("test-agent".to_owned()))
    }

    #[tokio::test]
    async fn current_is_none_outside_scope() {
        assert!(RequestContext::current().is_none());
    }

    #[tokio::test]
    async fn scope_exposes_context_to_nested_calls() {
        async fn nested_read() -> Option<String> {
            RequestContext::current().and_then(|value| value.ip_address().map(ToOwned::to_owned))
        }

        let observed = context("198.51.100.4").scope(nested_read()).await;
        assert_eq!(observed.as_deref(), Some("198.51.100.4"));
    }

    #[tokio::test]
    async fn sequential_operations_on_one_task_do_not_share_context() {
        let first = context("203.0.113.7")
            .scope(async { RequestContext::current() })
            .await;
        assert_eq!(
            first.as_ref().and_then(RequestContext::ip_address),
            Some("203.0.113.7")
        );

        assert!(RequestContext::current().is_none());

        let second = RequestContext::new(None, None)
            .scope(async { RequestContext::current() })
            .await;
        assert_eq!(second.as_ref().and_then(RequestContext::ip_address), None);
    }

    #[tokio::test]
    async fn context_is_cleared_after_failed_operation() {
        let result: AppResult<()> = context("203.0.113.7")
            .scope(async { Err(AppError::Internal("boom".to_owned())) })
            .await;

        assert!(result.is_err());
        assert!(RequestContext::current().is_none());
    }

    #[tokio::test]
    async fn context_is_cleared_after_cancelled_operation() {
        let timed_out = tokio::time::timeout(
            Duration::from_millis(10),
            context("203.0.113.7").scope(std::future::pending::<()>()),
        )
        .await;

        assert!(timed_out.is_err());
        assert!(RequestContext::current().is_none());
    }

    #[tokio::test]
    async fn context_is_cleared_after_panicking_operation() {
        let joined = tokio::spawn(async {
            let _ = tokio::spawn(context("203.0.113.7").scope(async {
                panic!("handler exploded");
            }))
            .await;
            RequestContext::current()
        })
        .await;

        assert!(matches!(joined, Ok(None)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_scopes_only_observe_their_own_context() {
        let mut operations = JoinSet::new();
        for index in 0..64_u8 {
            let ip_address = format!("198.51.100.{index}");
            operations.spawn(context(&ip_address).scope(async move {
                let mut observed = Vec::new();
                for _ in 0..8 {
                    tokio::task::yield_now().await;
                    observed.push(
                        RequestContext::current()
                            .and_then(|current| current.ip_address().map(str::to_owned)),
                    );
                }
                (ip_address, observed)
            }));
        }

        let mut completed = 0;
        while let Some(joined) = operations.join_next().await {
            let Ok((expected, observed)) = joined else {
                panic!("scoped operation should not panic");
            };
            assert!(
                observed
                    .iter()
                    .all(|ip_address| ip_address.as_deref() == Some(expected.as_str()))
            );
            completed += 1;
        }
        assert_eq!(completed, 64);
    }

    #[test]
    fn client_id_is_bounded_and_empty_values_are_dropped() {
        let long_agent = "a".repeat(CLIENT_ID_MAX_CHARS + 40);
        let context = RequestContext::new(Some("  ".to_owned()), Some(long_agent));

        assert_eq!(context.ip_address(), None);
        assert_eq!(
            context.client_id().map(|value| value.chars().count()),
            Some(CLIENT_ID_MAX_CHARS)
        );
    }
}
