//! Per-request dispatch.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor
//!     → Router::find (method tree + path)
//!     → no match: 404 "not found"
//!     → match: Context { chain, params } → ctx.next()
//!         → Err: 500 "server error" (suppressed after a timeout)
//!     → Response snapshot
//! ```

use axum::http::StatusCode;
use std::time::Instant;

use crate::dispatch::context::Context;
use crate::http::request::RequestDescriptor;
use crate::http::response::Response;
use crate::observability::metrics;
use crate::routing::Router;

impl Router {
    /// Route `request`, run its handler chain and return the response.
    pub async fn dispatch(&self, request: RequestDescriptor) -> Response {
        let start = Instant::now();
        let method = request.method().clone();

        let Some(route) = self.find(&method, request.path()) else {
            tracing::debug!(method = %method, path = %request.path(), "No route matched");
            let response = Response::json(StatusCode::NOT_FOUND, "not found");
            metrics::record_request(method.as_str(), response.status().as_u16(), start);
            return response;
        };

        let ctx = Context::new(request, route.handlers, route.params);
        if let Err(e) = ctx.next().await {
            tracing::error!(
                method = %method,
                path = %ctx.request().path(),
                error = %e,
                "Handler chain failed"
            );
            ctx.abort_with(StatusCode::INTERNAL_SERVER_ERROR, "server error");
        }

        let response = ctx.response();
        metrics::record_request(method.as_str(), response.status().as_u16(), start);
        response
    }
}
