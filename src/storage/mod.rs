// ABOUTME: Image object storage abstraction with local filesystem and S3-compatible backends
// ABOUTME: Upload validation (extension, size, signature), object key and content type derivation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! # Image Storage
//!
//! Uploaded images are validated here, then handed to an [`ImageStore`]
//! which returns the public URL of the stored object.

mod local;
mod s3;
mod sigv4;

pub use local::LocalFsStore;
pub use s3::S3LikeStore;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{StorageBackend, StorageConfig};
use crate::constants::upload::{ALLOWED_EXTENSIONS, DEFAULT_FOLDER};
use crate::errors::{AppError, AppResult};

/// Stores and deletes image objects
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Short backend name for logs
    fn backend_tag(&self) -> &'static str;

    /// Store `bytes` under a fresh key in `folder` and return the public URL
    async fn upload(&self, bytes: Bytes, filename: &str, folder: &str) -> AppResult<String>;

    /// Delete the object behind `url`; `false` when it could not be deleted
    async fn delete(&self, url: &str) -> bool;
}

/// Build the configured store
///
/// # Errors
///
/// Returns an error if the HTTP client for the S3 backend cannot be created.
pub fn store_from_config(config: &StorageConfig) -> AppResult<Arc<dyn ImageStore>> {
    Ok(match &config.backend {
        StorageBackend::Local { public_base_url } => Arc::new(LocalFsStore::new(
            config.upload_dir.clone(),
            public_base_url.clone(),
        )),
        StorageBackend::S3Like {
            endpoint_url,
            region,
            credentials,
            auth_token,
            object_acl,
        } => {
            let mut store = S3LikeStore::new(endpoint_url.clone(), auth_token.clone())?
                .with_object_acl(object_acl.clone());
            if let Some(credentials) = credentials {
                store = store.with_credentials(credentials.clone(), region.clone());
            }
            Arc::new(store)
        }
    })
}

/// Image formats recognised by signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG
    Png,
    /// JPEG
    Jpeg,
    /// GIF87a / GIF89a
    Gif,
    /// RIFF WEBP
    Webp,
}

impl ImageFormat {
    /// Detect the format from leading bytes
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }
}

/// Lowercase extension of `filename` without the dot
#[must_use]
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Whether the extension is one of the accepted image types
#[must_use]
pub fn is_allowed_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Content type for an extension (with or without the leading dot)
#[must_use]
pub fn content_type_for(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Reduce a client filename to `[A-Za-z0-9._-]`
///
/// Spaces become `_`, other characters are dropped and leading dots removed.
/// If nothing of the stem survives, `upload` is used so the extension is kept.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    fn clean(part: &str) -> String {
        part.chars()
            .filter_map(|c| match c {
                ' ' => Some('_'),
                c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
                _ => None,
            })
            .collect::<String>()
            .trim_start_matches('.')
            .to_owned()
    }

    // Only the final path component counts
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, Some(clean(ext))),
        _ => (base, None),
    };

    let mut stem = clean(stem);
    if stem.is_empty() {
        stem = "upload".to_owned();
    }
    match ext.filter(|ext| !ext.is_empty()) {
        Some(ext) => format!("{stem}.{}", ext.to_lowercase()),
        None => stem,
    }
}

/// Validate a folder name: `/`-separated segments of `[A-Za-z0-9_-]`
///
/// An empty folder becomes the default `images`.
///
/// # Errors
///
/// Returns `InvalidInput` for empty segments, `..` or other characters.
pub fn normalize_folder(folder: &str) -> AppResult<String> {
    let folder = folder.trim().trim_matches('/');
    if folder.is_empty() {
        return Ok(DEFAULT_FOLDER.to_owned());
    }
    let valid = folder.split('/').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
    });
    if valid {
        Ok(folder.to_owned())
    } else {
        Err(AppError::invalid_input(format!("Invalid folder name: {folder}")))
    }
}

/// Object key `{folder}/{YYYYmmdd_HHMMSS}_{8 hex}{.ext}`
#[must_use]
pub fn object_key(folder: &str, filename: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let ext = extension_of(filename)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!(
        "{folder}/{}_{}{ext}",
        now.format("%Y%m%d_%H%M%S"),
        &suffix[..8]
    )
}

/// Check extension, size and signature of an uploaded image
///
/// # Errors
///
/// `InvalidInput` for an unsupported extension, `ImageProcessingError` for
/// empty, oversized or unrecognised content.
pub fn validate_image(bytes: &[u8], filename: &str, max_bytes: usize) -> AppResult<ImageFormat> {
    let ext = extension_of(filename).unwrap_or_default();
    if !is_allowed_extension(&ext) {
        return Err(AppError::invalid_input(format!(
            "Unsupported file type. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    if bytes.is_empty() {
        return Err(AppError::image_processing("Uploaded file is empty"));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::image_processing(format!(
            "File exceeds the {max_bytes} byte limit"
        )));
    }
    ImageFormat::detect(bytes).ok_or_else(|| AppError::image_processing("Invalid image file"))
}
