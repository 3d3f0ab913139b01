//! Shared utilities for integration tests.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_dispatch::middleware::{Recovery, RequestId, Timeout};
use http_dispatch::{chain, Context, DispatcherConfig, HandlerError, HandlerResult, HttpServer, Router};
use tower::ServiceExt;

/// Test router exercising groups, params, failures, panics and timeouts.
pub fn test_router(timeout: Duration) -> Router {
    let mut router = Router::new();
    router.use_middleware(chain![Recovery, RequestId, Timeout::new(timeout)]);

    router.get("/test", chain![hello]).unwrap();
    router.post("/echo", chain![echo]).unwrap();

    let mut api = router.group("/api");
    let mut users = api.group("/users");
    users.get("/:id", chain![show_user]).unwrap();
    users.delete("/:id", chain![fail]).unwrap();
    users.get("/:id/boom", chain![boom]).unwrap();
    users.get("/:id/slow", chain![slow]).unwrap();

    router
}

/// Build a server around [`test_router`] with default config.
pub fn test_server(timeout: Duration) -> HttpServer {
    HttpServer::new(DispatcherConfig::default(), test_router(timeout))
}

/// Drive one request through the axum app without a socket.
#[allow(dead_code)]
pub async fn send(server: &HttpServer, method: &str, uri: &str, body: &str) -> (StatusCode, String, Option<String>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = server.app().oneshot(request).await.unwrap();
    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned(), request_id)
}

async fn hello(ctx: Context) -> HandlerResult {
    ctx.text("hello")
}

async fn echo(ctx: Context) -> HandlerResult {
    let value: serde_json::Value = ctx.bind_json()?;
    ctx.set_status(StatusCode::CREATED).json(&value)
}

async fn show_user(ctx: Context) -> HandlerResult {
    let id = ctx.param_i64("id").ok_or_else(|| HandlerError::msg("id must be numeric"))?;
    ctx.json(&serde_json::json!({ "id": id }))
}

async fn fail(_ctx: Context) -> HandlerResult {
    Err(HandlerError::msg("refusing to delete"))
}

async fn boom(_ctx: Context) -> HandlerResult {
    panic!("boom");
}

async fn slow(ctx: Context) -> HandlerResult {
    tokio::time::sleep(Duration::from_millis(500)).await;
    ctx.text("too late")
}
