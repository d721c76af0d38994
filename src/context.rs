//! Per-request correlation context.
//!
//! A small key→value map scoped to one request's task, readable from
//! anywhere inside that request without threading a parameter through every
//! call. The [`Trace`](crate::Trace) middleware installs a context around
//! each dispatch and records the request's method and path under
//! [`METHOD_AND_PATH`]; application code may add its own keys.
//!
//! The map lives in tokio task-local storage. [`scope`] is the only way to
//! install one, so teardown is structural: when the scoped future completes,
//! fails, or is dropped mid-flight, the context goes with it. Nothing leaks
//! into the next request handled by the same worker thread.
//!
//! Outside a scope, [`get`] returns `None` and [`set`]/[`clear`] are no-ops.
//!
//! ```rust
//! // No scope installed here, so reads miss and writes vanish.
//! ruta::context::set("user-id", "42");
//! assert_eq!(ruta::context::get("user-id"), None);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;

tokio::task_local! {
    static CONTEXT: RefCell<HashMap<String, String>>;
}

/// Well-known key holding `"<METHOD> <PATH>"` for the current request.
pub const METHOD_AND_PATH: &str = "method-and-path";

/// Runs `fut` with a fresh, empty context installed for the current task.
///
/// The context is destroyed when `fut` finishes — normally, by error, or by
/// being dropped (cancellation). Nested scopes shadow the outer context for
/// their extent and restore it afterwards.
pub async fn scope<F>(fut: F) -> F::Output
where
    F: Future,
{
    CONTEXT.scope(RefCell::new(HashMap::new()), fut).await
}

/// Sets `key` in the current context. No-op outside a [`scope`].
pub fn set(key: impl Into<String>, value: impl Into<String>) {
    let (key, value) = (key.into(), value.into());
    let _ = CONTEXT.try_with(|ctx| ctx.borrow_mut().insert(key, value));
}

/// Reads `key` from the current context. `None` if unset or outside a [`scope`].
pub fn get(key: &str) -> Option<String> {
    CONTEXT.try_with(|ctx| ctx.borrow().get(key).cloned()).ok().flatten()
}

/// Empties the current context. Idempotent; safe to call outside a [`scope`].
pub fn clear() {
    let _ = CONTEXT.try_with(|ctx| ctx.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scoped_values_are_visible_then_gone() {
        scope(async {
            set(METHOD_AND_PATH, "GET /users/42");
            assert_eq!(get(METHOD_AND_PATH).as_deref(), Some("GET /users/42"));
        })
        .await;

        // Scope ended; the next request on this worker starts clean.
        assert_eq!(get(METHOD_AND_PATH), None);
    }

    #[tokio::test]
    async fn clear_is_idempotent_and_safe_anywhere() {
        // Outside any scope: must not panic.
        clear();
        clear();

        scope(async {
            set("k", "v");
            clear();
            assert_eq!(get("k"), None);
            clear();
            assert_eq!(get("k"), None);
        })
        .await;
    }

    #[tokio::test]
    async fn set_outside_scope_is_dropped() {
        set("k", "v");
        assert_eq!(get("k"), None);
    }

    #[tokio::test]
    async fn concurrent_scopes_do_not_share_state() {
        let first = scope(async {
            set(METHOD_AND_PATH, "GET /a");
            tokio::task::yield_now().await;
            get(METHOD_AND_PATH)
        });
        let second = scope(async {
            set(METHOD_AND_PATH, "POST /b");
            tokio::task::yield_now().await;
            get(METHOD_AND_PATH)
        });

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a.as_deref(), Some("GET /a"));
        assert_eq!(b.as_deref(), Some("POST /b"));
    }

    #[tokio::test]
    async fn nested_scope_shadows_and_restores() {
        scope(async {
            set("k", "outer");
            scope(async {
                assert_eq!(get("k"), None);
                set("k", "inner");
            })
            .await;
            assert_eq!(get("k").as_deref(), Some("outer"));
        })
        .await;
    }

    #[tokio::test]
    async fn cancelled_scope_still_tears_down() {
        let mut fut = Box::pin(scope(async {
            set("k", "v");
            std::future::pending::<()>().await;
        }));

        // Poll once so the scope is entered and the value written, then drop
        // the future as the server would on cancellation.
        std::future::poll_fn(|cx| {
            assert!(fut.as_mut().poll(cx).is_pending());
            std::task::Poll::Ready(())
        })
        .await;
        drop(fut);

        assert_eq!(get("k"), None);
    }
}
