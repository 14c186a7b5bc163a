//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum/hyper, request ID, tracing, timeout)
//!     → request.rs (buffer body, build Context)
//!     → [routing engine looks up handler]
//!     → response.rs (handler writes into ResponseWriter)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Context, MakeRequestUuidV4, X_REQUEST_ID};
pub use response::ResponseWriter;
pub use server::{bind, HttpServer, ServerError};
