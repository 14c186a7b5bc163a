//! gee demo server.
//!
//! Serves a handful of example routes on top of the router:
//!
//! ```text
//! GET  /        → echoes the request path
//! GET  /hello   → echoes the request headers
//! POST /login   → echoes the submitted form as JSON
//! anything else → 404 NOT FOUND: <url>
//! ```

use std::fmt::Write;
use std::path::PathBuf;

use axum::http::{header, HeaderValue};
use clap::Parser;

use gee::config::{load_config, override_bind_address, GeeConfig};
use gee::observability::init_logging;
use gee::Engine;

#[derive(Parser)]
#[command(name = "gee")]
#[command(about = "Demo server for the gee router", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the configuration (e.g. ":9999")
    #[arg(short, long)]
    bind: Option<String>,
}

fn register_demo_routes(engine: &Engine) {
    engine.get("/", |w, ctx| {
        let _ = writeln!(w, "URL.Path = {:?}", ctx.path());
    });

    engine.get("/hello", |w, ctx| {
        for (name, value) in ctx.headers() {
            let _ = writeln!(w, "Header[{:?}] = {:?}", name.as_str(), value);
        }
    });

    engine.post("/login", |w, ctx| {
        let body = serde_json::json!({
            "username": ctx.form_value("username"),
            "password": ctx.form_value("password"),
        });
        w.header_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        w.write_text(&body.to_string());
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GeeConfig::default(),
    };
    if let Some(bind) = cli.bind {
        override_bind_address(&mut config, bind)?;
    }

    init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        not_found_status = config.routing.not_found_status,
        "Configuration loaded"
    );

    let engine = Engine::from_config(&config);
    register_demo_routes(&engine);
    engine.run_with_config(&config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
