// ABOUTME: HTTP server assembly: router composition, middleware layers and the serve loop
// ABOUTME: Mounts all domain routers under /api and serves locally stored images
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! # Gateway Server
//!
//! [`build_router`] produces the complete axum application for a set of
//! [`ServerResources`]; [`run`] binds it and serves until Ctrl+C or SIGTERM.

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::config::StorageBackend;
use crate::errors::{AppError, AppResult};
use crate::middleware::{request_trace_layer, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{ExerciseRoutes, FoodRoutes, HealthRoutes, ImageRoutes};

/// Path prefix for every API route
pub const API_PREFIX: &str = "/api";

/// Build the full application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let api = Router::new()
        .merge(HealthRoutes::routes())
        .merge(ExerciseRoutes::routes(Arc::clone(&resources)))
        .merge(FoodRoutes::routes(Arc::clone(&resources)))
        .merge(ImageRoutes::routes(Arc::clone(&resources)));

    let mut app = Router::new().nest(API_PREFIX, api);

    // Local storage URLs point back at this server
    if let StorageBackend::Local { public_base_url } = &resources.config.storage.backend {
        if let Some(mount) = local_mount_path(public_base_url) {
            app = app.nest_service(
                &mount,
                ServeDir::new(&resources.config.storage.upload_dir),
            );
        }
    }

    app.layer(setup_cors(&resources.config))
        .layer(request_trace_layer())
}

/// Path component of the public URL prefix, if it can be served from here
fn local_mount_path(public_base_url: &str) -> Option<String> {
    let path = url::Url::parse(public_base_url).ok()?.path().trim_end_matches('/').to_owned();
    (!path.is_empty() && path != API_PREFIX && !path.starts_with("/api/")).then_some(path)
}

/// Bind and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    let addr = format!(
        "{}:{}",
        resources.config.host, resources.config.http_port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind {addr}: {e}")).with_source(e))?;

    let local_addr: SocketAddr = listener.local_addr()?;
    info!("HTTP server listening on http://{local_addr}");

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")).with_source(e))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_mount_path() {
        assert_eq!(
            local_mount_path("http://localhost:5000/uploads/").as_deref(),
            Some("/uploads")
        );
        assert_eq!(local_mount_path("http://cdn.example.com"), None);
        assert_eq!(local_mount_path("http://localhost:5000/api/files"), None);
        assert_eq!(local_mount_path("not a url"), None);
    }
}
