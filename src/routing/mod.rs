//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     Router::get/post/... or Group::get/post/...
//!     → group.rs (prefix + middleware resolved root-to-leaf)
//!     → router.rs (global middleware prepended, tree chosen by method)
//!     → tree.rs (segments inserted, terminal node owns the chain)
//!
//! Lookup (per request):
//!     method + path
//!     → router.rs (select tree)
//!     → tree.rs (depth-first match, then upward param extraction)
//!     → RouteMatch { handlers, params } or no match
//! ```
//!
//! # Design Decisions
//! - Trees are mutated only through `&mut Router`; once shared behind an
//!   `Arc` they are read-only and need no locking
//! - Duplicate registration is an error, never an overwrite
//! - First successful branch wins; literal segments do not outrank wildcards

pub mod group;
pub mod router;
pub mod tree;

pub use group::Group;
pub use router::{RouteError, RouteMatch, Router};
pub use tree::{Params, Tree, WILDCARD_MARKER};
