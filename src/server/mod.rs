//! HTTP service in front of the keyspace.
//!
//! `POST /execute` takes `{"command": "..."}` and answers either
//! `{"response": [...]}` with `200` or `{"error": "..."}` with `400`. When a
//! static directory is configured, `/` serves `views/index.html` from it and
//! `/static/*` serves the files under `static/`.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::storage::sweeper::spawn_sweeper;
use crate::storage::Ledis;

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    command: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
    pub gc_interval: Duration,
}

pub fn router(ledis: Ledis, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new().route("/execute", post(execute));
    if let Some(dir) = static_dir {
        if !dir.exists() {
            log::warn!("static directory {} does not exist", dir.display());
        }
        app = app
            .route_service("/", ServeFile::new(dir.join("views").join("index.html")))
            .nest_service("/static", ServeDir::new(dir.join("static")));
    }
    app.fallback(not_found)
        .with_state(ledis)
        .layer(TraceLayer::new_for_http())
}

async fn execute(State(ledis): State<Ledis>, body: Bytes) -> Response {
    let request: ExecuteRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            log::debug!("rejecting /execute body: {}", e);
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    match ledis.handle(&request.command).await {
        Ok(reply) => (StatusCode::OK, Json(json!({ "response": reply.into_lines() }))).into_response(),
        Err(e) => {
            log::warn!("error executing {:?}: {}", request.command, e);
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve<F>(cfg: ServerConfig, ledis: Ledis, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    serve_listener(listener, cfg, ledis, shutdown).await
}

pub async fn serve_listener<F>(listener: TcpListener, cfg: ServerConfig, ledis: Ledis, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let sweeper = spawn_sweeper(ledis.clone(), cfg.gc_interval);
    log::info!("Starting server on {}...", listener.local_addr()?);

    let app = router(ledis, cfg.static_dir.as_deref());
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;
    sweeper.abort();
    result.context("server failed")?;

    log::info!("Server shut down gracefully.");
    Ok(())
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
