//! HTTP server exposing the project workflow as a REST API
//!
//! All command routes live under `/api`; `/health` and `/api/version` are
//! unauthenticated probes.

pub mod response;
pub mod routes;
pub mod state;

pub use response::{ApiError, ApiResponse};
pub use state::ServerAppState;

use crate::config::ServerConfig;
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue,
    },
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Version information for the server
#[derive(serde::Serialize)]
struct VersionInfo {
    name: String,
    version: String,
}

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    if cors_origins.is_empty() {
        // Permissive CORS: allow any origin (default for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([CONTENT_TYPE, ACCEPT])
    } else {
        let allowed_origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods(Any)
            .allow_headers([CONTENT_TYPE, ACCEPT])
    }
}

/// Build the application router
pub fn build_router(state: ServerAppState, cors_origins: &[String]) -> Router {
    Router::new()
        .nest(
            "/api",
            routes::api_router().route("/version", get(version_handler)),
        )
        .route("/health", get(health_handler))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Run the HTTP server until a shutdown is requested
pub async fn run_server(config: &ServerConfig, state: ServerAppState) -> Result<(), String> {
    let app = build_router(state.clone(), &config.cors_origins);

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let cors_display = if config.cors_origins.is_empty() {
        "*".to_string()
    } else {
        config.cors_origins.join(", ")
    };
    let data_dir = state.ctx.store.root().display().to_string();

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      PRD Rails Server                        ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║                                                              ║");
    println!("║  Server URL: http://{:<41}║", addr);
    println!("║  Data Dir: {:<50}║", data_dir);
    println!("║  Model: {:<53}║", state.ctx.llm_config.model);
    println!("║  CORS Origins: {:<46}║", cors_display);
    println!("║                                                              ║");
    println!("║  Endpoints:                                                  ║");
    println!("║    /api/projects/...      - Project workflow                 ║");
    println!("║    POST /api/llm/test     - Model connectivity check         ║");
    println!("║    GET  /api/version      - Server version info              ║");
    println!("║    GET  /health           - Health check                     ║");
    println!("║                                                              ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);

    let shutdown_state = state.shutdown_state.clone();
    let shutdown_signal = async move { shutdown_state.wait_for_shutdown().await };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    log::info!("Server stopped");
    Ok(())
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Version endpoint
async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
