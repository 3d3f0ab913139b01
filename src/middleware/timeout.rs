//! Deadline race for the remainder of the chain.
//!
//! # Responsibilities
//! - Run the rest of the chain on its own task
//! - Race it against a deadline derived from any enclosing deadline
//! - Turn a panic on that task into a 500 JSON `"panic"` response
//! - On expiry, set the timeout flag and write the 500 "time out" response
//!
//! # Design Decisions
//! - Best effort, not cancellation: when the deadline wins, the task is
//!   detached and keeps running; its later writes are dropped by the
//!   context's timeout gate and it cannot advance the chain any further
//! - Timed-out requests return 500 with a JSON body, like other failures
//! - The panic payload is logged, not echoed; [`Recovery`](super::Recovery)
//!   is the middleware that puts the message in the body

use std::time::Duration;

use axum::http::StatusCode;

use crate::dispatch::{BoxFuture, Context, Handler, HandlerError};
use crate::middleware::recovery::panic_message;
use crate::observability::metrics;

/// Bounds the rest of the chain to `duration`.
#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    duration: Duration,
}

impl Timeout {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Handler for Timeout {
    fn call(&self, ctx: Context) -> BoxFuture {
        let duration = self.duration;
        Box::pin(async move {
            let deadline = ctx.narrow_deadline(duration);

            let worker = ctx.clone();
            let mut task = tokio::spawn(async move { worker.next().await });

            tokio::select! {
                joined = &mut task => match joined {
                    Ok(result) => result,
                    Err(e) if e.is_panic() => {
                        let message = panic_message(e.into_panic().as_ref());
                        tracing::error!(
                            path = %ctx.request().path(),
                            panic = %message,
                            "Handler panicked behind timeout"
                        );
                        metrics::record_panic();
                        ctx.abort_with(StatusCode::INTERNAL_SERVER_ERROR, "panic");
                        Ok(())
                    }
                    Err(e) => Err(HandlerError::msg(format!("chain task aborted: {e}"))),
                },
                _ = tokio::time::sleep_until(deadline) => {
                    if ctx.finalize_timeout(StatusCode::INTERNAL_SERVER_ERROR, "time out") {
                        tracing::warn!(
                            method = %ctx.request().method(),
                            path = %ctx.request().path(),
                            timeout_ms = duration.as_millis() as u64,
                            "Request timed out"
                        );
                        metrics::record_timeout();
                    }
                    // Dropping the handle detaches the task.
                    Ok(())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{handler, handler_fn, HandlerRef};
    use crate::http::request::RequestDescriptor;
    use crate::routing::{Params, Router};
    use axum::http::Method;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn slow(delay: Duration, finished: Arc<AtomicBool>) -> HandlerRef {
        handler_fn(move |ctx: Context| {
            let finished = finished.clone();
            async move {
                tokio::time::sleep(delay).await;
                ctx.set_status(StatusCode::OK).text("late")?;
                ctx.set_header("x-late", "1");
                finished.store(true, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_deadline_wins_and_late_write_is_dropped() {
        let finished = Arc::new(AtomicBool::new(false));
        let chain: Vec<HandlerRef> = vec![
            handler(Timeout::new(Duration::from_millis(50))),
            slow(Duration::from_millis(200), finished.clone()),
        ];
        let ctx = Context::new(
            RequestDescriptor::new(Method::GET, "/slow"),
            chain.into(),
            Params::new(),
        );

        ctx.next().await.unwrap();

        assert!(ctx.is_timeout());
        let response = ctx.response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text(), "\"time out\"");
        assert!(!finished.load(Ordering::SeqCst));

        // The detached task still runs to completion.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(finished.load(Ordering::SeqCst));

        let after = ctx.response();
        assert_eq!(after.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(after.text(), "\"time out\"");
        assert!(after.header("x-late").is_none());
    }

    #[tokio::test]
    async fn test_fast_chain_is_untouched() {
        let finished = Arc::new(AtomicBool::new(false));
        let mut router = Router::new();
        router
            .get(
                "/fast",
                vec![
                    handler(Timeout::new(Duration::from_secs(2))),
                    slow(Duration::from_millis(1), finished.clone()),
                ],
            )
            .unwrap();

        let response = router
            .dispatch(RequestDescriptor::new(Method::GET, "/fast"))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text(), "late");
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panic_behind_timeout_is_contained() {
        let mut router = Router::new();
        router
            .get(
                "/panic",
                vec![
                    handler(Timeout::new(Duration::from_secs(2))),
                    handler_fn(|_ctx: Context| async move {
                        if true {
                            panic!("worker exploded");
                        }
                        Ok(())
                    }),
                ],
            )
            .unwrap();

        let response = router
            .dispatch(RequestDescriptor::new(Method::GET, "/panic"))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text(), "\"panic\"");
    }

    #[tokio::test]
    async fn test_failure_propagates_through_timeout() {
        let mut router = Router::new();
        router
            .get(
                "/fail",
                vec![
                    handler(Timeout::new(Duration::from_secs(2))),
                    handler_fn(|_ctx: Context| async { Err(HandlerError::msg("bad")) }),
                ],
            )
            .unwrap();

        let response = router
            .dispatch(RequestDescriptor::new(Method::GET, "/fail"))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text(), "\"server error\"");
    }

    #[tokio::test]
    async fn test_inner_timeout_cannot_extend_outer() {
        let chain: Vec<HandlerRef> = vec![
            handler(Timeout::new(Duration::from_millis(50))),
            handler(Timeout::new(Duration::from_secs(5))),
            slow(Duration::from_millis(300), Arc::new(AtomicBool::new(false))),
        ];
        let ctx = Context::new(
            RequestDescriptor::new(Method::GET, "/nested"),
            chain.into(),
            Params::new(),
        );

        let started = tokio::time::Instant::now();
        ctx.next().await.unwrap();

        assert!(ctx.is_timeout());
        assert!(started.elapsed() < Duration::from_millis(250));
    }
}
