//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (setup, or while serving):
//!     (method, path, handler)
//!     → key.rs ("METHOD-path")
//!     → router.rs (copy table, insert, atomic swap)
//!
//! Dispatch (per request):
//!     Context (method, path)
//!     → key.rs (build lookup key)
//!     → router.rs (load snapshot, exact lookup)
//!     → handler(w, ctx) or "404 NOT FOUND: <url>"
//! ```
//!
//! # Design Decisions
//! - Exact, case-sensitive match only: no parameters, wildcards or regex
//! - Deterministic: same input always matches same route
//! - Last registration for a key wins

pub mod key;
pub mod router;

pub use key::RouteKey;
pub use router::{Engine, HandlerFunc};
