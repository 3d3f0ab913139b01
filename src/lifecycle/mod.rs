//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Ctrl-C / test harness
//!     → Shutdown::trigger
//!     → every ShutdownSignal resolves
//!     → listener stops accepting, in-flight requests drain
//! ```

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownSignal};
