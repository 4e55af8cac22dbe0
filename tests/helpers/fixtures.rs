// ABOUTME: Fixture servers and resource builders for integration tests
// ABOUTME: Serves sample images over HTTP and assembles ServerResources around temp dirs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

use aeterna_gateway::config::{ServerConfig, StorageBackend};
use aeterna_gateway::llm::LlmProvider;
use aeterna_gateway::resources::ServerResources;
use aeterna_gateway::storage::{ImageStore, LocalFsStore};
use axum::{http::header, routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Smallest byte string that passes PNG signature detection
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// Public URL prefix used by test local stores
pub const PUBLIC_BASE: &str = "http://localhost:5000/uploads";

/// Serve `router` on an ephemeral port and return its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Image host with `/food.png` and a text-typed `/food.bin`; anything else is 404
pub async fn spawn_image_host() -> String {
    let router = Router::new()
        .route(
            "/food.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES) }),
        )
        .route(
            "/food.bin",
            get(|| async { ([(header::CONTENT_TYPE, "text/plain")], PNG_BYTES) }),
        )
        .route("/empty.png", get(|| async { "" }));
    spawn_server(router).await
}

/// Configuration storing uploads under `dir`
pub fn config_in(dir: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.storage.upload_dir = dir.to_path_buf();
    config.storage.backend = StorageBackend::Local {
        public_base_url: PUBLIC_BASE.to_owned(),
    };
    config
}

/// Resources with a local store under `dir` and an optional model
pub fn resources_in(dir: &Path, llm: Option<Arc<dyn LlmProvider>>) -> Arc<ServerResources> {
    let store: Arc<dyn ImageStore> = Arc::new(LocalFsStore::new(
        dir.to_path_buf(),
        PUBLIC_BASE.to_owned(),
    ));
    Arc::new(
        ServerResources::builder()
            .with_config(Arc::new(config_in(dir)))
            .with_llm(llm)
            .with_image_store(Some(store))
            .build()
            .unwrap(),
    )
}

/// Resources with no model and no image store
pub fn bare_resources() -> Arc<ServerResources> {
    Arc::new(ServerResources::builder().build().unwrap())
}
