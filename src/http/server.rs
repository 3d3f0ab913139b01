//! HTTP listener adapter.
//!
//! # Responsibilities
//! - Accept connections with axum and collect request bodies
//! - Convert each request into a [`RequestDescriptor`]
//! - Hand it to [`Router::dispatch`] and write the buffered response back
//! - Stop accepting on shutdown and drain in-flight requests
//!
//! # Design Decisions
//! - Every path and method goes through one fallback handler; axum's own
//!   routing is not used
//! - Bodies over the configured limit are rejected with 413 before dispatch

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router as AxumRouter,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::DispatcherConfig;
use crate::http::request::RequestDescriptor;
use crate::lifecycle::ShutdownSignal;
use crate::routing::Router;

/// State shared with the fallback handler.
#[derive(Clone)]
struct AppState {
    router: Arc<Router>,
    max_body_bytes: usize,
}

/// HTTP front end for a fully built [`Router`].
pub struct HttpServer {
    app: AxumRouter,
    config: DispatcherConfig,
}

impl HttpServer {
    /// Freeze `router` and wire it behind an axum app.
    pub fn new(config: DispatcherConfig, router: Router) -> Self {
        let state = AppState {
            router: Arc::new(router),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let app = AxumRouter::new()
            .fallback(serve_request)
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        Self { app, config }
    }

    /// The axum app, for embedding or driving with `tower::ServiceExt`.
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.app.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn serve_request(State(state): State<AppState>, request: Request<Body>) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Rejected request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let mut descriptor = RequestDescriptor::new(parts.method, target)
        .with_headers(parts.headers)
        .with_body(body);
    if let Some(addr) = remote_addr {
        descriptor = descriptor.with_remote_addr(addr);
    }

    state.router.dispatch(descriptor).await.into_response()
}
