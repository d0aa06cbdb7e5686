//! postcalc-daemon entry point.
//!
//! Sets up tracing, loads layered config, builds the shared state, wires
//! middleware and starts the HTTP server. Route handlers live in `routes.rs`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use postcalc_config::LoadedConfig;
use postcalc_daemon::{boot, routes, state};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let loaded = config_from_env()?;
    let settings = boot::load_settings(&loaded)?;

    let env_addr = std::env::var("POSTCALC_DAEMON_ADDR").ok();
    let addr = boot::resolve_bind_addr(env_addr.as_deref(), &settings.daemon_addr)?;

    let shared = Arc::new(state::AppState::new(settings.plot, loaded.config_hash));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    info!("postcalc-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(boot::shutdown_on(tokio::signal::ctrl_c()))
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// `POSTCALC_CONFIG`: comma-separated YAML paths in merge order.
fn config_from_env() -> Result<LoadedConfig> {
    let raw = std::env::var("POSTCALC_CONFIG").unwrap_or_default();
    let paths: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if paths.is_empty() {
        return LoadedConfig::empty();
    }
    postcalc_config::load_layered_yaml(&paths)
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
