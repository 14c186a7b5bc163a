//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum service that forwards every request to the engine
//! - Wire up server-wide layers (tracing, timeout, request ID)
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - axum only provides the fallback service; route lookup stays in `Engine`
//! - Request bodies are buffered up to a configured limit before dispatch
//! - Bind failures are returned, never panicked on

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{self, Body},
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GeeConfig;
use crate::http::request::{Context, MakeRequestUuidV4};
use crate::routing::Engine;

/// Errors surfaced by the server runtime.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind the listening socket.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The server failed while accepting or serving connections.
    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}

/// State shared with the fallback handler.
#[derive(Clone)]
struct AppState {
    engine: Engine,
    max_body_bytes: usize,
}

/// HTTP server wrapping an [`Engine`].
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server for `engine`, applying the limits in `config`.
    pub fn new(engine: Engine, config: &GeeConfig) -> Self {
        let state = AppState {
            engine,
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GeeConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The axum service, for driving the server without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve on `listener` until `shutdown` fires or its sender is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Bind a TCP listener on `addr`.
///
/// An address with an empty host such as `:9999` binds all interfaces.
pub async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    let resolved = if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    };

    let listener = TcpListener::bind(&resolved)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    tracing::info!(address = %resolved, "Listener bound");
    Ok(listener)
}

/// Fallback handler: buffers the request and hands it to the engine.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, limit = state.max_body_bytes, "Request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let ctx = Context::from_parts(parts, bytes);
    tracing::debug!(
        request_id = ctx.request_id().unwrap_or("unknown"),
        method = %ctx.method(),
        path = %ctx.path(),
        "Dispatching request"
    );

    state.engine.dispatch(&ctx).into_response()
}
