//! Embeddable HTTP request dispatcher.
//!
//! Routes are registered into per-method segment tries, optionally through
//! nested groups that contribute path prefixes and middleware. At request
//! time the matching handler chain runs against a per-request [`Context`]
//! that hands out path params and buffers the response behind a timeout
//! gate.
//!
//! ```ignore
//! use http_dispatch::{chain, Context, HandlerResult, Router};
//! use http_dispatch::middleware::{Recovery, Timeout};
//!
//! async fn show_user(ctx: Context) -> HandlerResult {
//!     let id = ctx.param_i64("id").unwrap_or_default();
//!     ctx.json(&serde_json::json!({ "id": id }))
//! }
//!
//! let mut router = Router::new();
//! router.use_middleware(chain![Recovery, Timeout::new(Duration::from_secs(1))]);
//! router.group("/api").get("/users/:id", chain![show_user])?;
//! ```

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;

pub use config::DispatcherConfig;
pub use dispatch::{Context, Handler, HandlerError, HandlerRef, HandlerResult};
pub use http::{HttpServer, RequestDescriptor, Response};
pub use lifecycle::Shutdown;
pub use routing::{Group, RouteError, Router};
