// ABOUTME: Exercise calorie route handlers
// ABOUTME: Validates the calculation request field by field and lists known exercises
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! Exercise routes
//!
//! - `POST /exercise/calculate-calories`
//! - `GET /exercise/exercises`

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{parse_json_object, ApiSuccess};
use crate::errors::{AppError, AppResult};
use crate::exercise::CalorieEstimateRequest;
use crate::resources::ServerResources;

#[derive(Serialize)]
struct ExerciseList {
    exercises: Vec<&'static str>,
    count: usize,
}

/// Read a positive finite number, accepting numeric strings
fn positive_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (number.is_finite() && number > 0.0).then_some(number)
}

/// Validate a calculate-calories body
///
/// # Errors
///
/// Returns a 400 error naming the first invalid field.
pub fn parse_calorie_request(body: &[u8]) -> AppResult<CalorieEstimateRequest> {
    let object: Map<String, Value> = parse_json_object(body, "request body is required")?;

    let name = object
        .get("exercise_name")
        .ok_or_else(|| AppError::missing_field("exercise_name is required"))?;
    let duration = object
        .get("duration_minutes")
        .ok_or_else(|| AppError::missing_field("duration_minutes is required"))?;

    let exercise_name = name
        .as_str()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::invalid_input("exercise_name must not be empty"))?
        .to_owned();

    let duration_minutes = positive_number(duration)
        .ok_or_else(|| AppError::invalid_input("duration_minutes must be a positive number"))?;

    let weight_kg = match object.get("weight_kg") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            positive_number(value)
                .ok_or_else(|| AppError::invalid_input("weight_kg must be a positive number"))?,
        ),
    };

    let memo = match object.get("memo") {
        None | Some(Value::Null) => None,
        Some(Value::String(memo)) => Some(memo.clone()),
        Some(other) => Some(other.to_string()),
    };

    Ok(CalorieEstimateRequest {
        exercise_name,
        duration_minutes,
        memo,
        weight_kg,
    })
}

/// Exercise routes
pub struct ExerciseRoutes;

impl ExerciseRoutes {
    /// Create all exercise routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/exercise/calculate-calories",
                post(Self::handle_calculate_calories),
            )
            .route("/exercise/exercises", get(Self::handle_list_exercises))
            .with_state(resources)
    }

    async fn handle_calculate_calories(
        State(resources): State<Arc<ServerResources>>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let request = parse_calorie_request(&body)?;
        let estimate = resources.calculator.estimate(&request).await;
        Ok(ApiSuccess::json(estimate).into_response())
    }

    async fn handle_list_exercises(State(resources): State<Arc<ServerResources>>) -> Response {
        let exercises = resources.calculator.list_known_exercises();
        ApiSuccess::json(ExerciseList {
            count: exercises.len(),
            exercises,
        })
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn message(body: &str) -> String {
        parse_calorie_request(body.as_bytes()).unwrap_err().message
    }

    #[test]
    fn test_valid_request() {
        let request = parse_calorie_request(
            r#"{"exercise_name":"수영","duration_minutes":"45","weight_kg":65,"memo":"저녁"}"#.as_bytes(),
        )
        .unwrap();
        assert_eq!(request.exercise_name, "수영");
        assert!((request.duration_minutes - 45.0).abs() < f64::EPSILON);
        assert_eq!(request.weight_kg, Some(65.0));
        assert_eq!(request.memo.as_deref(), Some("저녁"));
    }

    #[test]
    fn test_field_messages() {
        assert_eq!(message(""), "request body is required");
        assert_eq!(message("[1,2]"), "request body is required");
        assert_eq!(message(r#"{"duration_minutes":30}"#), "exercise_name is required");
        assert_eq!(message(r#"{"exercise_name":"요가"}"#), "duration_minutes is required");
        assert_eq!(
            message(r#"{"exercise_name":"   ","duration_minutes":30}"#),
            "exercise_name must not be empty"
        );
        assert_eq!(
            message(r#"{"exercise_name":7,"duration_minutes":30}"#),
            "exercise_name must not be empty"
        );
        assert_eq!(
            message(r#"{"exercise_name":"요가","duration_minutes":0}"#),
            "duration_minutes must be a positive number"
        );
        assert_eq!(
            message(r#"{"exercise_name":"요가","duration_minutes":"abc"}"#),
            "duration_minutes must be a positive number"
        );
        assert_eq!(
            message(r#"{"exercise_name":"요가","duration_minutes":30,"weight_kg":-1}"#),
            "weight_kg must be a positive number"
        );
    }

    #[test]
    fn test_missing_fields_use_missing_code() {
        let err = parse_calorie_request(br#"{"duration_minutes":30}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn test_null_optionals() {
        let request = parse_calorie_request(
            r#"{"exercise_name":"요가","duration_minutes":30,"weight_kg":null,"memo":null}"#.as_bytes(),
        )
        .unwrap();
        assert_eq!(request.weight_kg, None);
        assert_eq!(request.memo, None);
    }
}
