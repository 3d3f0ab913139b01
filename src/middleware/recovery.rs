//! Panic barrier.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::http::StatusCode;
use futures_util::FutureExt;

use crate::dispatch::{BoxFuture, Context, Handler};
use crate::observability::metrics;

/// Converts a panic anywhere downstream into a 500 JSON response carrying
/// the panic message. Transparent otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recovery;

impl Handler for Recovery {
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin(async move {
            match AssertUnwindSafe(ctx.next()).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(
                        method = %ctx.request().method(),
                        path = %ctx.request().path(),
                        panic = %message,
                        "Recovered from handler panic"
                    );
                    metrics::record_panic();
                    ctx.abort_with(StatusCode::INTERNAL_SERVER_ERROR, &message);
                    Ok(())
                }
            }
        })
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
