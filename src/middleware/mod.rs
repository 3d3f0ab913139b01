//! Built-in middleware.
//!
//! Every middleware is a [`Handler`](crate::dispatch::Handler) that wraps
//! the remainder of the chain by calling `ctx.next()`.
//!
//! - `recovery.rs`: panic barrier, turns a panic into a 500 JSON response
//! - `timeout.rs`: races the rest of the chain against a deadline
//! - `cost.rs`: logs how long the rest of the chain took
//! - `request_id.rs`: propagates or generates `x-request-id`

pub mod cost;
pub mod recovery;
pub mod request_id;
pub mod timeout;

pub use cost::Cost;
pub use recovery::Recovery;
pub use request_id::{RequestId, X_REQUEST_ID};
pub use timeout::Timeout;
