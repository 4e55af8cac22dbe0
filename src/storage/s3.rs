// ABOUTME: S3-compatible HTTP image store using PUT and DELETE on object URLs
// ABOUTME: SigV4-signed with AWS credentials or bearer-authenticated; object URL is the public URL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use url::Url;

use super::sigv4::SigV4Signer;
use super::{content_type_for, extension_of, object_key, ImageStore};
use crate::config::AwsCredentials;
use crate::errors::{AppError, AppResult};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Canned ACL header
const AMZ_ACL: &str = "x-amz-acl";

/// Stores images on an S3-compatible endpoint (AWS virtual-host URLs, `MinIO`, R2)
///
/// With credentials every request is `SigV4` signed and the bearer token is
/// not sent.
pub struct S3LikeStore {
    client: Client,
    base_url: String,
    auth_bearer: Option<String>,
    signer: Option<SigV4Signer>,
    object_acl: Option<String>,
}

impl S3LikeStore {
    /// Create a store for `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: String, auth_bearer: Option<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_bearer: auth_bearer.filter(|token| !token.is_empty()),
            signer: None,
            object_acl: None,
        })
    }

    /// Sign requests with AWS credentials for `region`
    #[must_use]
    pub fn with_credentials(mut self, credentials: AwsCredentials, region: String) -> Self {
        self.signer = Some(SigV4Signer::new(credentials, region));
        self
    }

    /// Send `acl` as `x-amz-acl` on every upload
    #[must_use]
    pub fn with_object_acl(mut self, acl: Option<String>) -> Self {
        self.object_acl = acl.filter(|acl| !acl.is_empty());
        self
    }

    /// Authenticate a request whose other headers are already in `headers`
    fn authorize(
        &self,
        method: &str,
        url: &str,
        mut headers: HeaderMap,
        payload: &[u8],
    ) -> AppResult<HeaderMap> {
        if let Some(signer) = &self.signer {
            let parsed = Url::parse(url)
                .map_err(|e| AppError::storage(format!("Invalid object URL {url}: {e}")))?;
            signer.sign(method, &parsed, &mut headers, payload, Utc::now())?;
        } else if let Some(token) = &self.auth_bearer {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| AppError::config(format!("Invalid storage auth token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn upload_headers(&self, content_type: &str) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = |raw: &str| {
            HeaderValue::from_str(raw)
                .map_err(|e| AppError::storage(format!("Invalid header value {raw}: {e}")))
        };
        headers.insert(CONTENT_TYPE, value(content_type)?);
        if let Some(acl) = &self.object_acl {
            headers.insert(HeaderName::from_static(AMZ_ACL), value(acl.as_str())?);
        }
        Ok(headers)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }

    /// Object key for a URL produced by this store
    ///
    /// Falls back to the URL path for URLs with a different host spelling.
    fn key_from_url(&self, url: &str) -> Option<String> {
        if let Some(key) = url
            .strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            return Some(key.to_owned()).filter(|key| !key.is_empty());
        }
        Url::parse(url)
            .ok()
            .map(|parsed| parsed.path().trim_start_matches('/').to_owned())
            .filter(|key| !key.is_empty() && !key.split('/').any(|s| s == ".."))
    }
}

#[async_trait]
impl ImageStore for S3LikeStore {
    fn backend_tag(&self) -> &'static str {
        "s3"
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, bytes: Bytes, filename: &str, folder: &str) -> AppResult<String> {
        let key = object_key(folder, filename, Utc::now());
        let url = self.object_url(&key);
        let content_type = content_type_for(&extension_of(filename).unwrap_or_default());

        let headers =
            self.authorize("PUT", &url, self.upload_headers(content_type)?, &bytes)?;

        let response = self
            .client
            .put(&url)
            .headers(headers)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                error!("Object upload failed: {e}");
                AppError::storage(format!("Upload failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Object store rejected upload of {key}");
            return Err(AppError::storage(format!(
                "Object store rejected upload ({status})"
            )));
        }

        info!(url = %url, "Uploaded image to object store");
        Ok(url)
    }

    #[instrument(skip(self))]
    async fn delete(&self, url: &str) -> bool {
        let Some(key) = self.key_from_url(url) else {
            warn!("Cannot derive object key from URL: {url}");
            return false;
        };
        let url = self.object_url(&key);
        let headers = match self.authorize("DELETE", &url, HeaderMap::new(), b"") {
            Ok(headers) => headers,
            Err(e) => {
                error!("{e}");
                return false;
            }
        };

        match self
            .client
            .delete(&url)
            .headers(headers)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!("Deleted object {key}");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "Object store refused delete of {key}");
                false
            }
            Err(e) => {
                warn!("Object delete failed for {key}: {e}");
                false
            }
        }
    }
}
