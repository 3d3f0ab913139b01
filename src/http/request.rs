//! Inbound request descriptor.
//!
//! # Responsibilities
//! - Carry method, path, query, headers, body and peer address into the core
//! - Normalize the method so lookups are case-insensitive
//! - Expose the read-only accessors handlers need (host, client IP, headers)
//!
//! # Design Decisions
//! - Body is collected up front by the listener adapter; handlers see bytes
//! - Query, form and cookie parsing are left to application code

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::net::SocketAddr;

/// Raw request as handed over by the listener.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    uri: String,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` and a request target such as
    /// `/users/42?verbose=1`.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (uri.clone(), None),
        };
        let path = if path.is_empty() { "/".to_string() } else { path };

        Self {
            method: normalize_method(method),
            uri,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    /// Append a header. Names or values that are not valid HTTP are dropped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid request header"),
        }
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request target exactly as received, including the query string.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Path component used for route matching.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of `name`, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn host(&self) -> Option<&str> {
        self.header("host")
    }

    /// Client address: `X-Real-Ip`, then `X-Forwarded-For`, then the peer.
    pub fn client_ip(&self) -> Option<String> {
        self.header("x-real-ip")
            .or_else(|| self.header("x-forwarded-for"))
            .map(str::to_string)
            .or_else(|| self.remote_addr.map(|addr| addr.to_string()))
    }
}

/// Upper-case extension methods so `get` and `GET` select the same tree.
pub fn normalize_method(method: Method) -> Method {
    let upper = method.as_str().to_ascii_uppercase();
    if upper == method.as_str() {
        return method;
    }
    Method::from_bytes(upper.as_bytes()).unwrap_or(method)
}
