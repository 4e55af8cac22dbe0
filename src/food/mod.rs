// ABOUTME: Food photo analysis through a vision-capable language model
// ABOUTME: Downloads the image, sends it as a data URL and parses the food name or nutrition JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! # Food Analysis
//!
//! Two operations over a public image URL:
//!
//! - [`FoodAnalysisService::analyze_food_name`]: the dish name only
//! - [`FoodAnalysisService::analyze_food_nutrition`]: name, kcal and macronutrients
//!
//! The image bytes are passed through untouched (no decoding or resizing).

mod image_fetch;

pub use image_fetch::ImageFetcher;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, instrument, warn};

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::prompts::{FOOD_NAME_PROMPT, FOOD_NUTRITION_PROMPT};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

static JSON_OBJECT_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches a JSON object with at most one level of nesting, ignoring any
    // surrounding prose or markdown fences
    Regex::new(r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").ok()
});

/// Macronutrients in grams
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    /// Carbohydrate (g)
    pub carbohydrate: f64,
    /// Protein (g)
    pub protein: f64,
    /// Fat (g)
    pub fat: f64,
}

/// Nutrition estimate for a photographed dish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodNutrition {
    /// Dish name (Korean)
    pub food_name: String,
    /// Energy (kcal)
    pub calories: f64,
    /// Macronutrients
    pub nutrition: Nutrition,
}

/// Return the first JSON object embedded in a model reply
#[must_use]
pub fn extract_json_object(reply: &str) -> Option<&str> {
    JSON_OBJECT_PATTERN
        .as_ref()
        .and_then(|pattern| pattern.find(reply))
        .map(|m| m.as_str())
}

/// Read a numeric field, accepting numbers or numeric strings; 0 otherwise
fn number_field(object: &Value, key: &str) -> f64 {
    match object.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Parse a nutrition reply into [`FoodNutrition`]
///
/// # Errors
///
/// Returns `FoodAnalysisFailed` when no JSON object can be parsed from the reply.
pub fn parse_nutrition_reply(reply: &str) -> AppResult<FoodNutrition> {
    let candidate = extract_json_object(reply).unwrap_or(reply);
    let object: Value = serde_json::from_str(candidate).map_err(|e| {
        let preview: String = reply.chars().take(200).collect();
        error!("Failed to parse nutrition reply as JSON: {e}");
        AppError::food_analysis(format!("Model reply is not valid JSON: {preview}"))
    })?;

    if !object.is_object() {
        return Err(AppError::food_analysis("Model reply is not a JSON object"));
    }

    Ok(FoodNutrition {
        food_name: object
            .get("food_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_owned(),
        calories: number_field(&object, "calories"),
        nutrition: Nutrition {
            carbohydrate: number_field(&object, "carbohydrate"),
            protein: number_field(&object, "protein"),
            fat: number_field(&object, "fat"),
        },
    })
}

/// Food photo analysis service
#[derive(Clone)]
pub struct FoodAnalysisService {
    llm: Arc<dyn LlmProvider>,
    fetcher: ImageFetcher,
    fallback_models: Vec<String>,
}

impl FoodAnalysisService {
    /// Create the service from a provider and an image fetcher
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>, fetcher: ImageFetcher) -> Self {
        Self {
            llm,
            fetcher,
            fallback_models: Vec::new(),
        }
    }

    /// Models tried in order when the provider reports the model as missing
    ///
    /// The provider's default model is skipped since it was already tried.
    #[must_use]
    pub fn with_fallback_models(mut self, models: Vec<String>) -> Self {
        let default_model = self.llm.default_model().to_owned();
        self.fallback_models = models
            .into_iter()
            .map(|model| model.trim().to_owned())
            .filter(|model| !model.is_empty() && *model != default_model)
            .collect();
        self
    }

    /// Identify the dish in the image
    ///
    /// # Errors
    ///
    /// `ImageProcessingError` if the image cannot be downloaded,
    /// `FoodAnalysisFailed` if the model call fails or returns nothing.
    #[instrument(skip(self))]
    pub async fn analyze_food_name(&self, image_url: &str) -> AppResult<String> {
        let reply = self.ask_about_image(image_url, FOOD_NAME_PROMPT).await?;
        let food_name = reply.trim().trim_matches('"').trim().to_owned();
        if food_name.is_empty() {
            return Err(AppError::food_analysis("Model returned an empty food name"));
        }
        info!(food_name = %food_name, "Food name analysis complete");
        Ok(food_name)
    }

    /// Estimate name, calories and macronutrients for the dish in the image
    ///
    /// # Errors
    ///
    /// `ImageProcessingError` if the image cannot be downloaded,
    /// `FoodAnalysisFailed` if the model call fails or the reply is not JSON.
    #[instrument(skip(self))]
    pub async fn analyze_food_nutrition(&self, image_url: &str) -> AppResult<FoodNutrition> {
        let reply = self.ask_about_image(image_url, FOOD_NUTRITION_PROMPT).await?;
        let nutrition = parse_nutrition_reply(&reply)?;
        info!(
            food_name = %nutrition.food_name,
            calories = nutrition.calories,
            "Nutrition analysis complete"
        );
        Ok(nutrition)
    }

    async fn ask_about_image(&self, image_url: &str, prompt: &str) -> AppResult<String> {
        if !self.llm.capabilities().supports_vision() {
            return Err(AppError::food_analysis(format!(
                "{} cannot analyze images",
                self.llm.display_name()
            )));
        }

        let data_url = self.fetcher.fetch_as_data_url(image_url).await?;
        let request = ChatRequest::new(vec![ChatMessage::user_with_image(prompt, data_url)]);

        match self.llm.complete(&request).await {
            Ok(response) => Ok(response.content),
            Err(e) if e.code == ErrorCode::ResourceNotFound && !self.fallback_models.is_empty() => {
                warn!("Vision model unavailable ({e}), trying fallback models");
                self.retry_with_fallback_models(&request, e).await
            }
            Err(e) => Err(Self::analysis_error(e)),
        }
    }

    async fn retry_with_fallback_models(
        &self,
        request: &ChatRequest,
        first_error: AppError,
    ) -> AppResult<String> {
        for model in &self.fallback_models {
            info!(model = %model, "Retrying image analysis");
            match self.llm.complete(&request.clone().with_model(model)).await {
                Ok(response) => {
                    info!(model = %response.model, "Fallback model answered");
                    return Ok(response.content);
                }
                Err(e) => warn!(model = %model, "Fallback model failed: {e}"),
            }
        }

        error!("No vision model available: {first_error}");
        Err(AppError::food_analysis(format!(
            "Image analysis model is unavailable: {}",
            first_error.message
        ))
        .with_source(first_error))
    }

    fn analysis_error(e: AppError) -> AppError {
        error!("Image analysis request failed: {e}");
        if e.code == ErrorCode::ImageProcessingError {
            e
        } else {
            AppError::food_analysis(format!("Image analysis failed: {}", e.message)).with_source(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_reply() {
        let reply = "```json\n{\n  \"food_name\": \"김치찌개\",\n  \"calories\": 250\n}\n```";
        let json = extract_json_object(reply).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("김치찌개"));
    }

    #[test]
    fn test_parse_nutrition_lenient_numbers() {
        let reply = r#"결과입니다: {"food_name": "비빔밥", "calories": "560", "carbohydrate": 85.5, "protein": 18}"#;
        let parsed = parse_nutrition_reply(reply).unwrap();
        assert_eq!(parsed.food_name, "비빔밥");
        assert!((parsed.calories - 560.0).abs() < f64::EPSILON);
        assert!((parsed.nutrition.carbohydrate - 85.5).abs() < f64::EPSILON);
        assert!((parsed.nutrition.protein - 18.0).abs() < f64::EPSILON);
        assert!(parsed.nutrition.fat.abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_nutrition_rejects_prose() {
        let err = parse_nutrition_reply("죄송하지만 음식을 찾을 수 없습니다").unwrap_err();
        assert_eq!(err.code, ErrorCode::FoodAnalysisFailed);
    }

    #[test]
    fn test_nutrition_serializes_nested() {
        let value = serde_json::to_value(FoodNutrition {
            food_name: "치킨".to_owned(),
            calories: 300.0,
            nutrition: Nutrition {
                carbohydrate: 10.0,
                protein: 25.0,
                fat: 18.0,
            },
        })
        .unwrap();
        assert_eq!(value["nutrition"]["protein"], 25.0);
    }
}
