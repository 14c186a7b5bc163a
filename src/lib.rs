//! gee: a minimal HTTP request router.
//!
//! Handlers are registered by HTTP method and exact path; every request is
//! looked up by `"<METHOD>-<path>"` and either handed to its handler or
//! answered with `404 NOT FOUND: <url>`.
//!
//! ```no_run
//! use std::fmt::Write;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gee::ServerError> {
//!     let engine = gee::Engine::new();
//!     engine.get("/hello", |w, ctx| {
//!         let _ = writeln!(w, "hello from {}", ctx.path());
//!     });
//!     engine.run("127.0.0.1:9999").await
//! }
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GeeConfig;
pub use http::{Context, HttpServer, ResponseWriter, ServerError};
pub use lifecycle::Shutdown;
pub use routing::{Engine, HandlerFunc, RouteKey};
