// ABOUTME: Downloads images referenced by URL and encodes them as base64 data URLs
// ABOUTME: Content type comes from the response header, defaulting to image/jpeg
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use crate::constants::defaults::IMAGE_FETCH_TIMEOUT_SECS;
use crate::errors::{AppError, AppResult};

const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// HTTP image downloader
#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    /// Create a fetcher with the default 30 second timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> AppResult<Self> {
        Self::with_timeout(Duration::from_secs(IMAGE_FETCH_TIMEOUT_SECS))
    }

    /// Create a fetcher with a custom timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Download `image_url` and return `data:<type>;base64,<bytes>`
    ///
    /// # Errors
    ///
    /// `ImageProcessingError` for non-HTTP URLs, transport failures, non-2xx
    /// responses and empty bodies.
    pub async fn fetch_as_data_url(&self, image_url: &str) -> AppResult<String> {
        let url = Url::parse(image_url)
            .map_err(|e| AppError::image_processing(format!("Invalid image URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::image_processing(format!(
                "Unsupported image URL scheme: {}",
                url.scheme()
            )));
        }

        debug!("Downloading image from {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                error!("Image download failed: {e}");
                AppError::image_processing(format!("Could not download image: {e}"))
            })?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_owned())
            .filter(|value| value.starts_with("image/"))
            .unwrap_or_else(|| DEFAULT_IMAGE_CONTENT_TYPE.to_owned());

        let bytes = response.bytes().await.map_err(|e| {
            AppError::image_processing(format!("Could not read image body: {e}"))
        })?;
        if bytes.is_empty() {
            return Err(AppError::image_processing("Downloaded image is empty"));
        }

        Ok(format!("data:{content_type};base64,{}", STANDARD.encode(&bytes)))
    }
}
