//! Per-request context and chain execution.
//!
//! # Responsibilities
//! - Hold the resolved handler chain and the cursor into it
//! - Advance the chain on [`Context::next`]
//! - Expose extracted path params and the inbound request
//! - Gate every response write on the timeout flag
//!
//! # Design Decisions
//! - Cheaply cloneable handle (`Arc` inside) so the timeout middleware can
//!   drive the rest of the chain from a spawned task
//! - Cursor starts at -1 and saturates at the chain length
//! - The response buffer and the timeout flag are updated under one mutex,
//!   so a late write can never interleave with the timeout response

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;

use crate::dispatch::error::{HandlerError, HandlerResult};
use crate::dispatch::handler::HandlerRef;
use crate::http::request::RequestDescriptor;
use crate::http::response::{Response, ResponseWriter, X_REQUEST_ID};
use crate::routing::Params;

/// Request-scoped state shared by every handler in the chain.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    request: RequestDescriptor,
    handlers: Arc<[HandlerRef]>,
    cursor: AtomicIsize,
    params: Params,
    deadline: Mutex<Option<Instant>>,
    timed_out: AtomicBool,
    request_id: OnceLock<String>,
    response: Mutex<ResponseWriter>,
}

impl Context {
    pub fn new(request: RequestDescriptor, handlers: Arc<[HandlerRef]>, params: Params) -> Self {
        Self {
            inner: Arc::new(Inner {
                request,
                handlers,
                cursor: AtomicIsize::new(-1),
                params,
                deadline: Mutex::new(None),
                timed_out: AtomicBool::new(false),
                request_id: OnceLock::new(),
                response: Mutex::new(ResponseWriter::new()),
            }),
        }
    }

    /// Run the next handler in the chain.
    ///
    /// Returns the handler's outcome, or `Ok(())` once the chain is
    /// exhausted. A handler that wants wrap semantics calls this, does its
    /// post-processing, then returns. After a timeout the chain refuses to
    /// advance.
    pub async fn next(&self) -> HandlerResult {
        if self.is_timeout() {
            return Err(HandlerError::TimedOut);
        }

        let len = self.inner.handlers.len() as isize;
        let advanced = self
            .inner
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
                (c < len).then_some(c + 1)
            });

        let index = match advanced {
            Ok(previous) => (previous + 1) as usize,
            Err(_) => return Ok(()),
        };

        match self.inner.handlers.get(index) {
            Some(handler) => handler.call(self.clone()).await,
            None => Ok(()),
        }
    }

    /// Current cursor position: -1 before the first handler, chain length
    /// once exhausted.
    pub fn cursor(&self) -> isize {
        self.inner.cursor.load(Ordering::SeqCst)
    }

    pub fn chain_len(&self) -> usize {
        self.inner.handlers.len()
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.inner.request
    }

    pub fn params(&self) -> &Params {
        &self.inner.params
    }

    /// Raw request body.
    pub fn raw_data(&self) -> Bytes {
        self.inner.request.body().clone()
    }

    /// Tag the request with an ID. The first ID wins; it is echoed as
    /// `x-request-id` on whatever response is finally sent, error and
    /// timeout responses included.
    pub fn set_request_id(&self, id: impl Into<String>) -> bool {
        self.inner.request_id.set(id.into()).is_ok()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.inner.request_id.get().map(String::as_str)
    }

    /// Deserialize the request body as JSON.
    pub fn bind_json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        Ok(serde_json::from_slice(self.inner.request.body())?)
    }

    // ---- deadline / timeout ----

    pub fn is_timeout(&self) -> bool {
        self.inner.timed_out.load(Ordering::SeqCst)
    }

    /// Deadline installed by an enclosing timeout middleware, if any.
    pub fn deadline(&self) -> Option<Instant> {
        *self.inner.deadline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install a deadline `timeout` from now, never extending an existing
    /// one. Returns the effective deadline.
    pub fn narrow_deadline(&self, timeout: Duration) -> Instant {
        let candidate = Instant::now() + timeout;
        let mut deadline = self.inner.deadline.lock().unwrap_or_else(PoisonError::into_inner);
        let effective = match *deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        };
        *deadline = Some(effective);
        effective
    }

    /// Set the timeout flag and replace the response with `body`.
    ///
    /// Returns `false` if the request had already timed out, in which case
    /// nothing is written.
    pub fn finalize_timeout<T: Serialize + ?Sized>(&self, status: StatusCode, body: &T) -> bool {
        let mut writer = self.writer();
        if self.inner.timed_out.swap(true, Ordering::SeqCst) {
            return false;
        }
        replace_with_json(&mut writer, status, body);
        true
    }

    /// Replace whatever has been written with a JSON error response.
    /// No-op after a timeout.
    pub fn abort_with<T: Serialize + ?Sized>(&self, status: StatusCode, body: &T) {
        self.with_writer(|writer| replace_with_json(writer, status, body));
    }

    // ---- response writing ----

    /// Set the response status. Only the first call takes effect.
    pub fn set_status(&self, status: StatusCode) -> &Self {
        self.with_writer(|writer| {
            if !writer.set_status(status) {
                tracing::debug!(status = %status, "Superfluous status write ignored");
            }
        });
        self
    }

    pub fn set_ok_status(&self) -> &Self {
        self.set_status(StatusCode::OK)
    }

    /// Append a response header. Invalid names or values are logged and skipped.
    pub fn set_header(&self, name: &str, value: &str) -> &Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.with_writer(|writer| writer.add_header(name, value));
            }
            _ => tracing::warn!(header = %name, "Invalid response header skipped"),
        }
        self
    }

    /// Append raw bytes to the body.
    pub fn write(&self, bytes: impl AsRef<[u8]>) -> &Self {
        self.with_writer(|writer| writer.write(bytes.as_ref()));
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> HandlerResult {
        let body = serde_json::to_vec(value)?;
        self.with_writer(|writer| {
            writer.insert_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
            writer.write(&body);
        });
        Ok(())
    }

    /// Write `body` as plain text.
    pub fn text(&self, body: impl AsRef<str>) -> HandlerResult {
        self.with_writer(|writer| {
            writer.insert_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
            writer.write(body.as_ref().as_bytes());
        });
        Ok(())
    }

    /// Permanent redirect to `location`.
    pub fn redirect(&self, location: &str) -> HandlerResult {
        let location = HeaderValue::from_str(location)
            .map_err(|_| HandlerError::msg(format!("invalid redirect location: {location}")))?;
        self.with_writer(|writer| {
            writer.set_status(StatusCode::MOVED_PERMANENTLY);
            writer.insert_header(header::LOCATION, location);
        });
        Ok(())
    }

    /// Snapshot of the response written so far.
    pub fn response(&self) -> Response {
        let response = self.writer().snapshot();
        match self.request_id().map(HeaderValue::from_str) {
            Some(Ok(value)) => {
                response.with_default_header(HeaderName::from_static(X_REQUEST_ID), value)
            }
            Some(Err(_)) => {
                tracing::warn!("Request ID is not a valid header value");
                response
            }
            None => response,
        }
    }

    fn writer(&self) -> MutexGuard<'_, ResponseWriter> {
        self.inner.response.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` on the response buffer unless the request has timed out.
    fn with_writer(&self, f: impl FnOnce(&mut ResponseWriter)) -> bool {
        let mut writer = self.writer();
        if self.is_timeout() {
            return false;
        }
        f(&mut writer);
        true
    }
}

fn replace_with_json<T: Serialize + ?Sized>(writer: &mut ResponseWriter, status: StatusCode, body: &T) {
    writer.reset();
    writer.set_status(status);
    writer.insert_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    match serde_json::to_vec(body) {
        Ok(bytes) => writer.write(&bytes),
        Err(e) => tracing::error!(error = %e, "Failed to serialize error body"),
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.inner.request.method())
            .field("path", &self.inner.request.path())
            .field("cursor", &self.cursor())
            .field("chain_len", &self.chain_len())
            .field("params", &self.inner.params)
            .field("timed_out", &self.is_timeout())
            .field("request_id", &self.request_id())
            .finish()
    }
}
