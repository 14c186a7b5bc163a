//! Response sink handed to route handlers.
//!
//! # Responsibilities
//! - Collect status, headers and body written by a handler
//! - Commit the status on first body write (default 200)
//! - Convert the collected response into an axum `Response`
//!
//! # Design Decisions
//! - Body is buffered; handlers never touch the socket
//! - Status can only be committed once, later calls are ignored and logged
//! - A body without an explicit `Content-Type` is sent as UTF-8 plain text

use std::fmt;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

/// Content type applied when a handler writes a body but sets none.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Buffered response writer.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    header_written: bool,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            header_written: false,
        }
    }

    /// Headers that will be sent with the response.
    ///
    /// Changes made after the status has been committed still apply, since
    /// nothing reaches the client until the handler returns.
    pub fn header_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Commit the response status. Only the first call has an effect.
    pub fn write_header(&mut self, status: StatusCode) {
        if self.header_written {
            tracing::warn!(
                committed = %self.status,
                ignored = %status,
                "Superfluous write_header call"
            );
            return;
        }
        self.status = status;
        self.header_written = true;
    }

    /// Append raw bytes to the body, committing status 200 if none was set.
    pub fn write(&mut self, bytes: &[u8]) {
        if !self.header_written {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes);
    }

    /// Append text to the body.
    pub fn write_text(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether a status has been committed, explicitly or by a body write.
    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Finish the response.
    pub fn into_response(self) -> Response {
        let Self {
            status,
            mut headers,
            body,
            ..
        } = self;

        if !body.is_empty() && !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
            );
        }

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets handlers use `write!` and `writeln!` directly on the sink.
impl fmt::Write for ResponseWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_text(s);
        Ok(())
    }
}
