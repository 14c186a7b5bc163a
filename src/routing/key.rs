//! Route key construction.
//!
//! A route key is the request method and the exact request path joined by a
//! single `-`, e.g. `GET-/hello`. Both halves are taken verbatim: no case
//! folding, no trailing-slash normalization, no validation.

use std::fmt;

/// Separator placed between method and path.
pub const KEY_SEPARATOR: char = '-';

/// Lookup key for the route table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey(String);

impl RouteKey {
    /// Build the key for `method` and `path`.
    pub fn new(method: &str, path: &str) -> Self {
        let mut key = String::with_capacity(method.len() + path.len() + 1);
        key.push_str(method);
        key.push(KEY_SEPARATOR);
        key.push_str(path);
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
