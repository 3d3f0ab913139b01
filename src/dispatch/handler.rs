//! Handler abstraction.
//!
//! A handler is anything that takes the request [`Context`] and returns a
//! boxed future resolving to a [`HandlerResult`]. Plain async closures and
//! functions get a blanket implementation; middlewares are unit-ish structs
//! with their own `impl Handler`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::dispatch::context::Context;
use crate::dispatch::error::HandlerResult;

/// Boxed handler future. `'static` so a chain can be moved onto another task.
pub type BoxFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

/// A single stage of a handler chain.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: Context) -> BoxFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin(self(ctx))
    }
}

impl std::fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}

/// Shared reference to a handler. Chains are ordered sequences of these.
pub type HandlerRef = Arc<dyn Handler>;

/// Erase a concrete handler into a [`HandlerRef`].
pub fn handler<H: Handler>(h: H) -> HandlerRef {
    Arc::new(h)
}

/// Erase an async closure into a [`HandlerRef`].
///
/// Unlike [`handler`], the `Fn` bound here lets the compiler infer the
/// closure's future output, so `?` works inside the async block.
pub fn handler_fn<F, Fut>(f: F) -> HandlerRef
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(f)
}

/// Build a `Vec<HandlerRef>` from a list of handlers.
///
/// ```ignore
/// router.get("/users/:id", chain![Recovery, show_user])?;
/// ```
#[macro_export]
macro_rules! chain {
    ($($h:expr),* $(,)?) => {
        vec![$($crate::dispatch::handler::handler($h)),*]
    };
}
