// ABOUTME: Food photo analysis route handlers
// ABOUTME: Delegates to the vision model service; 503 when no model is configured
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use super::{required_image_url, ApiSuccess};
use crate::errors::AppError;
use crate::food::FoodAnalysisService;
use crate::resources::ServerResources;

#[derive(Serialize)]
struct FoodName {
    food_name: String,
}

/// Food analysis routes
pub struct FoodRoutes;

impl FoodRoutes {
    /// Create all food analysis routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/food/analyze-name", post(Self::handle_analyze_name))
            .route("/food/analyze-nutrition", post(Self::handle_analyze_nutrition))
            .with_state(resources)
    }

    fn service(resources: &ServerResources) -> Result<&FoodAnalysisService, AppError> {
        resources
            .food_analysis
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("Food analysis"))
    }

    async fn handle_analyze_name(
        State(resources): State<Arc<ServerResources>>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let image_url = required_image_url(&body)?;
        let food_name = Self::service(&resources)?
            .analyze_food_name(&image_url)
            .await?;
        Ok(ApiSuccess::json(FoodName { food_name }).into_response())
    }

    async fn handle_analyze_nutrition(
        State(resources): State<Arc<ServerResources>>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let image_url = required_image_url(&body)?;
        let nutrition = Self::service(&resources)?
            .analyze_food_nutrition(&image_url)
            .await?;
        Ok(ApiSuccess::json(nutrition).into_response())
    }
}
