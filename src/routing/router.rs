//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Store handlers keyed by method + exact path
//! - Look up the handler for a request and invoke it
//! - Write the fallback response when nothing matches
//!
//! # Design Decisions
//! - Table is an immutable snapshot behind `ArcSwap`: dispatch is one
//!   lock-free load, registration is clone + insert + swap
//! - Last registration for a key wins, there is no unregister
//! - Fallback status is 200 unless configured otherwise

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::GeeConfig;
use crate::http::server::{bind, HttpServer, ServerError};
use crate::http::{Context, ResponseWriter};
use crate::lifecycle::{signals, Shutdown};
use crate::routing::key::RouteKey;

/// A route handler. Writes its response into the sink.
pub type HandlerFunc = Arc<dyn Fn(&mut ResponseWriter, &Context) + Send + Sync + 'static>;

/// One immutable generation of the route table.
#[derive(Clone, Default)]
struct RouteTable {
    routes: HashMap<RouteKey, HandlerFunc>,
}

/// The router. Cheap to clone; clones share one route table.
#[derive(Clone)]
pub struct Engine {
    table: Arc<ArcSwap<RouteTable>>,
    not_found_status: StatusCode,
}

impl Engine {
    /// Create a router with an empty route table.
    pub fn new() -> Self {
        Self {
            table: Arc::new(ArcSwap::from_pointee(RouteTable::default())),
            not_found_status: StatusCode::OK,
        }
    }

    /// Create a router honouring the routing section of `config`.
    ///
    /// An invalid `not_found_status` falls back to 200 with a warning; run
    /// `validate_config` first to reject it instead.
    pub fn from_config(config: &GeeConfig) -> Self {
        let status = match config.routing.not_found_status_code() {
            Some(status) => status,
            None => {
                tracing::warn!(
                    not_found_status = config.routing.not_found_status,
                    "Invalid not-found status, using 200"
                );
                StatusCode::OK
            }
        };
        Self::new().with_not_found_status(status)
    }

    /// Status sent with the `404 NOT FOUND` fallback body.
    pub fn with_not_found_status(mut self, status: StatusCode) -> Self {
        self.not_found_status = status;
        self
    }

    pub fn not_found_status(&self) -> StatusCode {
        self.not_found_status
    }

    /// Register `handler` for `method` and `path`, replacing any previous one.
    ///
    /// Safe to call while serving; requests already in flight keep the table
    /// they started with.
    pub fn add_route<F>(&self, method: &str, path: &str, handler: F)
    where
        F: Fn(&mut ResponseWriter, &Context) + Send + Sync + 'static,
    {
        let key = RouteKey::new(method, path);
        let handler: HandlerFunc = Arc::new(handler);

        let previous = self.table.rcu(|current| {
            let mut next = RouteTable::clone(current);
            next.routes.insert(key.clone(), Arc::clone(&handler));
            next
        });

        if previous.routes.contains_key(&key) {
            tracing::debug!(route = %key, "Route handler replaced");
        } else {
            tracing::debug!(route = %key, "Route registered");
        }
    }

    /// Register a `GET` route.
    pub fn get<F>(&self, path: &str, handler: F)
    where
        F: Fn(&mut ResponseWriter, &Context) + Send + Sync + 'static,
    {
        self.add_route("GET", path, handler);
    }

    /// Register a `POST` route.
    pub fn post<F>(&self, path: &str, handler: F)
    where
        F: Fn(&mut ResponseWriter, &Context) + Send + Sync + 'static,
    {
        self.add_route("POST", path, handler);
    }

    /// Handle one request, writing into `w`.
    pub fn serve_http(&self, w: &mut ResponseWriter, ctx: &Context) {
        let key = RouteKey::new(ctx.method(), ctx.path());
        let table = self.table.load();

        match table.routes.get(&key) {
            Some(handler) => handler(w, ctx),
            None => {
                tracing::debug!(route = %key, url = %ctx.url(), "No route matched");
                if self.not_found_status != StatusCode::OK {
                    w.write_header(self.not_found_status);
                }
                w.write_text(&format!("404 NOT FOUND: {}\n", ctx.url()));
            }
        }
    }

    /// Handle one request into a fresh response writer.
    pub fn dispatch(&self, ctx: &Context) -> ResponseWriter {
        let mut w = ResponseWriter::new();
        self.serve_http(&mut w, ctx);
        w
    }

    /// Bind `addr` and serve until SIGINT or SIGTERM.
    ///
    /// Returns early with [`ServerError::Bind`] if the address cannot be bound.
    pub async fn run(&self, addr: &str) -> Result<(), ServerError> {
        let mut config = GeeConfig::default();
        config.listener.bind_address = addr.to_string();
        self.run_with_config(&config).await
    }

    /// Like [`Engine::run`], with timeouts and limits taken from `config`.
    pub async fn run_with_config(&self, config: &GeeConfig) -> Result<(), ServerError> {
        let shutdown = Shutdown::new();
        let stop = shutdown.subscribe();
        let signal_task = signals::spawn_signal_listener(shutdown);

        let result = self.run_until(config, stop).await;
        signal_task.abort();
        result
    }

    /// Bind the configured address and serve until `shutdown` fires.
    pub async fn run_until(
        &self,
        config: &GeeConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let listener = bind(&config.listener.bind_address).await?;
        self.serve(listener, config, shutdown).await
    }

    /// Serve on an already bound `listener` until `shutdown` fires.
    pub async fn serve(
        &self,
        listener: TcpListener,
        config: &GeeConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        tracing::info!(routes = self.route_count(), "Serving routes");
        HttpServer::new(self.clone(), config)
            .run(listener, shutdown)
            .await
    }

    /// Number of registered routes.
    pub fn route_count(&self) -> usize {
        self.table.load().routes.len()
    }

    pub fn contains(&self, method: &str, path: &str) -> bool {
        self.table
            .load()
            .routes
            .contains_key(&RouteKey::new(method, path))
    }

    /// Registered route keys, sorted.
    pub fn routes(&self) -> Vec<RouteKey> {
        let mut keys: Vec<RouteKey> = self.table.load().routes.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("routes", &self.routes())
            .field("not_found_status", &self.not_found_status)
            .finish()
    }
}
