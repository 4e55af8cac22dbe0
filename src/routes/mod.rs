// ABOUTME: Route module organization for the gateway HTTP API
// ABOUTME: Domain routers plus the shared success envelope and JSON body helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! Route module for the Aeterna gateway
//!
//! Each domain module contains only route definitions and thin handlers that
//! delegate to the services held in [`ServerResources`](crate::resources::ServerResources).
//! Everything is mounted under `/api` by [`crate::server::build_router`].

/// Exercise calorie routes
pub mod exercise;
/// Food photo analysis routes
pub mod food;
/// Health check route
pub mod health;
/// Image upload and delete routes
pub mod image;

pub use exercise::ExerciseRoutes;
pub use food::FoodRoutes;
pub use health::HealthRoutes;
pub use image::ImageRoutes;

use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};

/// `{success: true, ...data}` envelope
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T: Serialize> {
    /// Always `true`
    pub success: bool,
    /// Payload fields, flattened into the envelope
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiSuccess<T> {
    /// Wrap `data` in a success envelope
    pub fn json(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Parse a request body as a JSON object
///
/// Empty, malformed and non-object bodies all fail with `missing_message`.
pub(crate) fn parse_json_object(
    body: &[u8],
    missing_message: &str,
) -> AppResult<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(AppError::invalid_input(missing_message)),
    }
}

/// Extract a non-empty `image_url` string from a JSON body
pub(crate) fn required_image_url(body: &[u8]) -> AppResult<String> {
    const MESSAGE: &str = "image_url is required";
    let object = parse_json_object(body, MESSAGE)?;
    object
        .get("image_url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| AppError::missing_field(MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_success_envelope_flattens() {
        #[derive(Serialize)]
        struct Payload {
            food_name: &'static str,
        }
        let Json(body) = ApiSuccess::json(Payload { food_name: "비빔밥" });
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["food_name"], "비빔밥");
    }

    #[test]
    fn test_required_image_url() {
        assert_eq!(
            required_image_url(br#"{"image_url": " https://x/a.jpg "}"#).unwrap(),
            "https://x/a.jpg"
        );
        assert_eq!(
            required_image_url(b"").unwrap_err().code,
            ErrorCode::InvalidInput
        );
        assert_eq!(
            required_image_url(br#"{"other": 1}"#).unwrap_err().code,
            ErrorCode::MissingRequiredField
        );
        assert!(required_image_url(br#"{"image_url": 5}"#).is_err());
    }
}
