//! Request context and chain execution.
//!
//! # Data Flow
//! ```text
//! RouteMatch + RequestDescriptor
//!     → context.rs (chain, cursor, params, gated response buffer)
//!     → handler.rs (each stage: Fn(Context) -> Future<HandlerResult>)
//!     → engine.rs (404 / 500 mapping, response snapshot)
//! ```
//!
//! # Design Decisions
//! - Explicit cursor over an ordered chain instead of nested closures
//! - A stage decides whether the rest runs by calling `ctx.next()`
//! - Failures stop the chain at the failing stage

pub mod context;
pub mod engine;
pub mod error;
pub mod handler;
pub mod params;

pub use context::Context;
pub use error::{HandlerError, HandlerResult};
pub use handler::{handler, handler_fn, BoxFuture, Handler, HandlerRef};
