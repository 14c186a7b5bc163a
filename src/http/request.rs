//! Request context handed to route handlers.
//!
//! # Responsibilities
//! - Carry method, target, headers and buffered body of one request
//! - Expose the path used for route lookup and the URL used in fallbacks
//! - Generate a unique request ID (UUID v4) for tracing
//!
//! # Design Decisions
//! - Body is buffered before dispatch so handlers stay synchronous
//! - Request ID added as early as possible, and echoed back to the client

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::http::{header, request, HeaderMap, HeaderValue, Method, Request, Uri};
use percent_encoding::percent_decode_str;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID for requests arriving without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Everything a handler may inspect about the incoming request.
#[derive(Debug, Clone)]
pub struct Context {
    method: Method,
    uri: Uri,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
}

impl Context {
    /// Context with no headers and an empty body.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            path: decode_path(&uri),
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    /// Build a context from request parts and an already buffered body.
    pub fn from_parts(parts: request::Parts, body: Bytes) -> Self {
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);

        Self {
            path: decode_path(&parts.uri),
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            remote_addr,
        }
    }

    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Percent-decoded request path, without query string.
    ///
    /// This is the path used for route lookup: `/%68ello` and `/hello` are
    /// the same route. Malformed escapes are kept as written.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request target as received (path plus query, or absolute form).
    pub fn url(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of header `name`, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    /// First query-string value for `key`, percent-decoded.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.uri.query()?;
        lookup_pair(query.as_bytes(), key)
    }

    /// Value of form field `key`.
    ///
    /// A URL-encoded request body takes precedence over the query string.
    pub fn form_value(&self, key: &str) -> Option<String> {
        if self.has_form_body() {
            if let Some(value) = lookup_pair(&self.body, key) {
                return Some(value);
            }
        }
        self.query(key)
    }

    fn has_form_body(&self) -> bool {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false)
    }

    /// Attach a header; used when building contexts by hand.
    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a body; used when building contexts by hand.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

impl From<Request<Bytes>> for Context {
    fn from(req: Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::from_parts(parts, body)
    }
}

fn decode_path(uri: &Uri) -> String {
    percent_decode_str(uri.path())
        .decode_utf8_lossy()
        .into_owned()
}

fn lookup_pair(input: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(input)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
