//! Response sink and finished response.
//!
//! # Responsibilities
//! - Buffer status, headers and body written by handlers
//! - Enforce "status is set once" (later attempts are ignored)
//! - Produce an immutable [`Response`] for the listener
//!
//! # Design Decisions
//! - Buffered rather than streamed, so a timeout or panic can replace a
//!   partially written response wholesale
//! - Gating on the timeout flag happens in the request context, not here

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;

/// Header carrying the request ID. Survives error responses that replace
/// everything else the chain wrote.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Mutable response buffer owned by a request context.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code. Returns `false` if a status was already set.
    pub fn set_status(&mut self, status: StatusCode) -> bool {
        if self.status.is_some() {
            return false;
        }
        self.status = Some(status);
        true
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Append a header value, keeping any existing values for `name`.
    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    /// Replace every value of `name` with `value`.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Discard everything written so far.
    pub fn reset(&mut self) {
        self.status = None;
        self.headers.clear();
        self.body.clear();
    }

    /// Copy the buffer into a finished response. A missing status means 200.
    pub fn snapshot(&self) -> Response {
        Response {
            status: self.status.unwrap_or(StatusCode::OK),
            headers: self.headers.clone(),
            body: Bytes::copy_from_slice(&self.body),
        }
    }
}

/// Finished response handed back to the listener.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// JSON response built outside any request context (e.g. no route).
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => {
                let mut headers = HeaderMap::new();
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                Self {
                    status,
                    headers,
                    body: Bytes::from(body),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    headers: HeaderMap::new(),
                    body: Bytes::new(),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Set `name` unless the response already carries it.
    pub fn with_default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.entry(name).or_insert(value);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_set_once() {
        let mut writer = ResponseWriter::new();
        assert!(writer.set_status(StatusCode::CREATED));
        assert!(!writer.set_status(StatusCode::IM_A_TEAPOT));
        assert_eq!(writer.snapshot().status(), StatusCode::CREATED);
    }

    #[test]
    fn test_default_status_is_ok() {
        let mut writer = ResponseWriter::new();
        writer.write(b"hello");
        let response = writer.snapshot();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text(), "hello");
    }

    #[test]
    fn test_add_header_appends() {
        let mut writer = ResponseWriter::new();
        let name = HeaderName::from_static("x-tag");
        writer.add_header(name.clone(), HeaderValue::from_static("a"));
        writer.add_header(name.clone(), HeaderValue::from_static("b"));
        assert_eq!(writer.headers().get_all(&name).iter().count(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut writer = ResponseWriter::new();
        writer.set_status(StatusCode::ACCEPTED);
        writer.write(b"partial");
        writer.reset();
        assert!(writer.status().is_none());
        assert!(writer.snapshot().body().is_empty());
    }

    #[test]
    fn test_json_response() {
        let response = Response::json(StatusCode::NOT_FOUND, &"not found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.text(), "\"not found\"");
    }
}
