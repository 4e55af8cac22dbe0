// ABOUTME: Image upload and delete route handlers
// ABOUTME: Multipart upload with validation, temp copy for analysis, and store delegation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! Image routes
//!
//! - `POST /image/upload`: multipart `file` (required) and `folder` (optional)
//! - `POST /image/delete`: JSON `{image_url}`

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use super::{required_image_url, ApiSuccess};
use crate::constants::upload::DEFAULT_FOLDER;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::storage::{normalize_folder, sanitize_filename, validate_image, ImageStore};

/// Room for multipart boundaries and the `folder` field on top of the file
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Serialize)]
struct UploadResult {
    image_url: String,
    image_path: String,
}

#[derive(Serialize)]
struct DeleteResult {
    message: &'static str,
}

/// Fields collected from the upload form
struct UploadForm {
    filename: String,
    bytes: Bytes,
    folder: String,
}

fn multipart_error(e: &MultipartError) -> AppError {
    AppError::invalid_input(format!("Invalid multipart request: {}", e.body_text()))
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut file: Option<(String, Bytes)> = None;
    let mut folder = DEFAULT_FOLDER.to_owned();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
                file = Some((filename, bytes));
            }
            Some("folder") => {
                folder = field.text().await.map_err(|e| multipart_error(&e))?;
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| AppError::missing_field("file is required"))?;
    if filename.trim().is_empty() {
        return Err(AppError::invalid_input("No file selected"));
    }

    Ok(UploadForm {
        filename,
        bytes,
        folder,
    })
}

/// Image routes
pub struct ImageRoutes;

impl ImageRoutes {
    /// Create all image routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let body_limit = resources.config.storage.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
        Router::new()
            .route("/image/upload", post(Self::handle_upload))
            .route("/image/delete", post(Self::handle_delete))
            .layer(DefaultBodyLimit::max(body_limit))
            .with_state(resources)
    }

    fn store(resources: &ServerResources) -> AppResult<&Arc<dyn ImageStore>> {
        resources
            .image_store
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("Image storage"))
    }

    /// Keep a private copy of the upload for later analysis
    ///
    /// Copies live outside the served upload directory and carry a random
    /// prefix so equal filenames never overwrite each other.
    async fn save_temp_copy(
        resources: &ServerResources,
        filename: &str,
        bytes: &[u8],
    ) -> AppResult<PathBuf> {
        let dir = &resources.config.storage.temp_dir;
        fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}_{filename}", Uuid::new_v4().simple()));
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    async fn handle_upload(
        State(resources): State<Arc<ServerResources>>,
        multipart: Multipart,
    ) -> Result<Response, AppError> {
        let store = Self::store(&resources)?;
        let form = read_upload_form(multipart).await?;

        let filename = sanitize_filename(&form.filename);
        let folder = normalize_folder(&form.folder)?;
        let format = validate_image(
            &form.bytes,
            &filename,
            resources.config.storage.max_upload_bytes,
        )?;

        let temp_path = Self::save_temp_copy(&resources, &filename, &form.bytes).await?;
        let image_url = store.upload(form.bytes, &filename, &folder).await?;

        info!(
            image_url = %image_url,
            format = ?format,
            backend = store.backend_tag(),
            "Image uploaded"
        );

        Ok(ApiSuccess::json(UploadResult {
            image_url,
            image_path: temp_path.display().to_string(),
        })
        .into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let image_url = required_image_url(&body)?;
        let store = Self::store(&resources)?;

        if store.delete(&image_url).await {
            Ok(ApiSuccess::json(DeleteResult {
                message: "Image deleted",
            })
            .into_response())
        } else {
            warn!("Image delete failed for {image_url}");
            Err(AppError::storage("Failed to delete image"))
        }
    }
}
