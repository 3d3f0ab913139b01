//! HTTP boundary of the dispatcher.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum listener, body collection)
//!     → request.rs (RequestDescriptor)
//!     → [Router::dispatch]
//!     → response.rs (buffered response → axum response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::RequestDescriptor;
pub use response::{Response, ResponseWriter, X_REQUEST_ID};
pub use server::HttpServer;
