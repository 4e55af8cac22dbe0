// ABOUTME: Centralized resource container for dependency injection into HTTP routes
// ABOUTME: Holds the calorie calculator, optional food analysis service and image store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! # Server Resources
//!
//! Built once at startup and shared with every router through axum `State`.
//! Optional collaborators stay `None` when not configured; the routes that
//! need them answer 503.

use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;
use crate::errors::AppResult;
use crate::exercise::ExerciseCalorieCalculator;
use crate::food::{FoodAnalysisService, ImageFetcher};
use crate::llm::{LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
use crate::storage::{store_from_config, ImageStore};

/// Shared server resources
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Exercise calorie calculator
    pub calculator: ExerciseCalorieCalculator,
    /// Food photo analysis, `None` without a language model
    pub food_analysis: Option<FoodAnalysisService>,
    /// Image store, `None` when storage is disabled
    pub image_store: Option<Arc<dyn ImageStore>>,
}

impl ServerResources {
    /// Create a new builder for `ServerResources`
    #[must_use]
    pub const fn builder() -> ServerResourcesBuilder {
        ServerResourcesBuilder::new()
    }

    /// Build every collaborator described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created.
    pub fn from_config(config: ServerConfig) -> AppResult<Self> {
        let llm: Option<Arc<dyn LlmProvider>> = match &config.llm {
            Some(settings) => Some(Arc::new(OpenAiCompatibleProvider::new(
                OpenAiCompatibleConfig::from(settings),
            )?)),
            None => None,
        };
        let image_store = store_from_config(&config.storage)?;

        Self::builder()
            .with_config(Arc::new(config))
            .with_llm(llm)
            .with_image_store(Some(image_store))
            .build()
    }
}

/// Builder for [`ServerResources`]
pub struct ServerResourcesBuilder {
    config: Option<Arc<ServerConfig>>,
    llm: Option<Arc<dyn LlmProvider>>,
    image_store: Option<Arc<dyn ImageStore>>,
    image_fetcher: Option<ImageFetcher>,
}

impl Default for ServerResourcesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerResourcesBuilder {
    /// Create an empty builder
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: None,
            llm: None,
            image_store: None,
            image_fetcher: None,
        }
    }

    /// Set the server configuration
    #[must_use]
    pub fn with_config(mut self, config: Arc<ServerConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the language model used for MET fallback and food analysis
    #[must_use]
    pub fn with_llm(mut self, llm: Option<Arc<dyn LlmProvider>>) -> Self {
        self.llm = llm;
        self
    }

    /// Set the image store
    #[must_use]
    pub fn with_image_store(mut self, image_store: Option<Arc<dyn ImageStore>>) -> Self {
        self.image_store = image_store;
        self
    }

    /// Set the image downloader used by food analysis
    #[must_use]
    pub fn with_image_fetcher(mut self, fetcher: ImageFetcher) -> Self {
        self.image_fetcher = Some(fetcher);
        self
    }

    /// Build the `ServerResources`
    ///
    /// A missing config falls back to an environment-independent default.
    ///
    /// # Errors
    ///
    /// Returns an error if the default image fetcher cannot be created.
    pub fn build(self) -> AppResult<ServerResources> {
        let config = self
            .config
            .unwrap_or_else(|| Arc::new(ServerConfig::default()));

        let food_analysis = match &self.llm {
            Some(llm) => {
                let fetcher = match self.image_fetcher {
                    Some(fetcher) => fetcher,
                    None => ImageFetcher::new()?,
                };
                let fallback_models = config
                    .llm
                    .as_ref()
                    .map(|settings| settings.fallback_models.clone())
                    .unwrap_or_default();
                Some(
                    FoodAnalysisService::new(Arc::clone(llm), fetcher)
                        .with_fallback_models(fallback_models),
                )
            }
            None => None,
        };

        info!(
            llm = self.llm.as_ref().map_or("disabled", |llm| llm.display_name()),
            storage = self
                .image_store
                .as_ref()
                .map_or("disabled", |store| store.backend_tag()),
            "Server resources initialized"
        );

        Ok(ServerResources {
            config,
            calculator: ExerciseCalorieCalculator::new(self.llm),
            food_analysis,
            image_store: self.image_store,
        })
    }
}
