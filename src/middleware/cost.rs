//! Request timing.

use std::time::Instant;

use crate::dispatch::{BoxFuture, Context, Handler};

/// Logs the URI and elapsed time of the rest of the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cost;

impl Handler for Cost {
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin(async move {
            let start = Instant::now();
            let result = ctx.next().await;
            tracing::info!(
                method = %ctx.request().method(),
                uri = %ctx.request().uri(),
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                ok = result.is_ok(),
                "Request served"
            );
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain;
    use crate::dispatch::HandlerResult;
    use crate::http::request::RequestDescriptor;
    use crate::routing::Router;
    use axum::http::{Method, StatusCode};

    async fn hello(ctx: Context) -> HandlerResult {
        ctx.text("hello")
    }

    #[tokio::test]
    async fn test_cost_is_transparent() {
        let mut router = Router::new();
        router.get("/test", chain![Cost, hello]).unwrap();

        let response = router
            .dispatch(RequestDescriptor::new(Method::GET, "/test?x=1"))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text(), "hello");
    }
}
