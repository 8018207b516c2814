use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::engine::ClusterCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ClusterCoordinator>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/clusters", get(handlers::list_clusters))
        .route(
            "/cluster/:name",
            get(handlers::get_cluster)
                .put(handlers::create_cluster)
                .delete(handlers::delete_cluster),
        )
        .layer(CorsLayer::permissive())
        .with_state(state.coordinator)
}

pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    log::info!("mcluster API server listening on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("mcluster API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
