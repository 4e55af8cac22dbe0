// ABOUTME: Filesystem image store serving objects under a public URL prefix
// ABOUTME: Keys are confined to the store root; deletes map URLs back to paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

use super::{object_key, ImageStore};
use crate::errors::{AppError, AppResult};

/// Stores images below a local directory
pub struct LocalFsStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFsStore {
    /// Create a store rooted at `root`; URLs are `{public_base_url}/{key}`
    #[must_use]
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Directory objects are written under
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path, rejecting anything that could leave the root
    fn path_for_key(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key);
        let confined = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        confined.then(|| self.root.join(relative))
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

#[async_trait]
impl ImageStore for LocalFsStore {
    fn backend_tag(&self) -> &'static str {
        "local"
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, bytes: Bytes, filename: &str, folder: &str) -> AppResult<String> {
        let key = object_key(folder, filename, Utc::now());
        let path = self
            .path_for_key(&key)
            .ok_or_else(|| AppError::invalid_input(format!("Invalid object key: {key}")))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &bytes).await?;

        let url = format!("{}/{key}", self.public_base_url);
        info!(url = %url, "Stored image on local filesystem");
        Ok(url)
    }

    #[instrument(skip(self))]
    async fn delete(&self, url: &str) -> bool {
        let Some(path) = self.key_from_url(url).and_then(|key| self.path_for_key(key)) else {
            warn!("Refusing to delete URL outside the local store: {url}");
            return false;
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted image {}", path.display());
                true
            }
            Err(e) => {
                warn!("Failed to delete image {}: {e}", path.display());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_confined_to_root() {
        let store = LocalFsStore::new(PathBuf::from("/data"), "http://host/uploads/".to_owned());
        assert_eq!(
            store.path_for_key("images/a.png"),
            Some(PathBuf::from("/data/images/a.png"))
        );
        assert!(store.path_for_key("../a.png").is_none());
        assert!(store.path_for_key("/etc/passwd").is_none());
        assert!(store.path_for_key("").is_none());
    }

    #[test]
    fn test_key_from_url() {
        let store = LocalFsStore::new(PathBuf::from("/data"), "http://host/uploads".to_owned());
        assert_eq!(
            store.key_from_url("http://host/uploads/images/a.png"),
            Some("images/a.png")
        );
        assert_eq!(store.key_from_url("http://elsewhere/images/a.png"), None);
    }
}
