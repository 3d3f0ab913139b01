//! Handler failure taxonomy.

use thiserror::Error;

/// Outcome of a single handler invocation.
pub type HandlerResult = Result<(), HandlerError>;

/// Error reported by a handler in the chain.
///
/// Any variant stops the chain at the failing handler; the dispatcher turns it
/// into a 500 response unless the request already timed out.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Application-level failure with a human readable reason.
    #[error("handler failed: {0}")]
    Failed(String),

    /// Body (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request deadline elapsed; the chain must not advance further.
    #[error("request timed out")]
    TimedOut,

    /// Any other error raised by application code.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Failed`].
    pub fn msg(reason: impl Into<String>) -> Self {
        HandlerError::Failed(reason.into())
    }
}
