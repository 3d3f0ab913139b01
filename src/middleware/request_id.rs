//! Request ID propagation.
//!
//! # Design Decisions
//! - An incoming `x-request-id` is reused so IDs survive proxy hops
//! - Otherwise a UUID v4 is generated
//! - The ID is attached to a tracing span around the rest of the chain and
//!   recorded on the [`Context`], which echoes it on the final response.
//!   Error, panic and timeout responses replace everything else the chain
//!   wrote but still carry the ID

use tracing::Instrument;
use uuid::Uuid;

use crate::dispatch::{BoxFuture, Context, Handler};

pub use crate::http::response::X_REQUEST_ID;

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestId;

impl Handler for RequestId {
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin(async move {
            let request_id = ctx
                .request()
                .header(X_REQUEST_ID)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            let span = tracing::info_span!("request", request_id = %request_id);
            ctx.set_request_id(request_id);
            ctx.next().instrument(span).await
        })
    }
}
