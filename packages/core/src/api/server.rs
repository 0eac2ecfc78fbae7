//! Tree API Server
//!
//! Router assembly and the serving loop. `router()` is separated from
//! `serve()` so tests can drive the API in-process with `tower::ServiceExt`.

use crate::api::handlers;
use crate::services::TreeService;
use axum::{
    routing::{get, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Install the global tracing subscriber
///
/// Filter defaults to `info` and is overridable via `RUST_LOG`. Call once at
/// process start, before serving.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Build the tree API router over a bootstrapped service
pub fn router(service: Arc<TreeService>) -> Router {
    Router::new()
        .route("/tree", get(handlers::get_tree))
        .route(
            "/tree/:id",
            get(handlers::get_node).post(handlers::create_node),
        )
        .route("/tree/:id/move", put(handlers::move_node))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve the tree API until the process is stopped
///
/// # Arguments
///
/// * `addr` - Socket address to bind
/// * `service` - Shared, already-bootstrapped TreeService
pub async fn serve(addr: SocketAddr, service: Arc<TreeService>) -> anyhow::Result<()> {
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("tree API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
