// ABOUTME: Exercise calorie calculator combining MET lookup, model fallback and the energy formula
// ABOUTME: calories = MET x body mass (kg) x hours, rounded to two decimals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::fallback::{estimate_met_with_llm, MetEstimate};
use super::met_table::{self, MetSource};
use crate::constants::exercise::{DEFAULT_BODY_MASS_KG, DEFAULT_MET_VALUE, MINUTES_PER_HOUR};
use crate::llm::LlmProvider;

/// Validated input for a calorie estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieEstimateRequest {
    /// Free-text exercise name, non-empty after trimming
    pub exercise_name: String,
    /// Positive duration in minutes
    pub duration_minutes: f64,
    /// Optional note echoed back
    pub memo: Option<String>,
    /// Optional positive body mass in kilograms
    pub weight_kg: Option<f64>,
}

impl CalorieEstimateRequest {
    /// Request with only the required fields
    #[must_use]
    pub fn new(exercise_name: impl Into<String>, duration_minutes: f64) -> Self {
        Self {
            exercise_name: exercise_name.into(),
            duration_minutes,
            memo: None,
            weight_kg: None,
        }
    }

    /// Set the body mass
    #[must_use]
    pub const fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    /// Set the memo
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Result of a calorie estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieEstimate {
    /// Exercise name as given by the caller
    pub exercise_name: String,
    /// Duration as given by the caller
    pub duration_minutes: f64,
    /// Memo, empty when absent
    pub memo: String,
    /// Kilocalories rounded to two decimals
    pub calories_burned: f64,
    /// MET value used
    pub met_value: f64,
    /// Body mass used
    pub weight_kg: f64,
    /// How the MET value was resolved (not part of the HTTP body)
    #[serde(skip)]
    pub met_source: Option<MetSource>,
}

/// Round half away from zero to two decimals
#[must_use]
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Energy expenditure in kilocalories, unrounded
#[must_use]
pub fn calories_for(met_value: f64, weight_kg: f64, duration_minutes: f64) -> f64 {
    met_value * weight_kg * (duration_minutes / MINUTES_PER_HOUR)
}

/// Calorie calculator shared across requests
///
/// Holds only the optional model collaborator; the MET table is static.
#[derive(Clone, Default)]
pub struct ExerciseCalorieCalculator {
    llm: Option<Arc<dyn LlmProvider>>,
}

impl ExerciseCalorieCalculator {
    /// Create a calculator; `None` disables the model fallback
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { llm }
    }

    /// Resolve the MET value for a name
    ///
    /// Never fails: unknown names without a usable estimate get
    /// [`DEFAULT_MET_VALUE`].
    pub async fn resolve_met(&self, exercise_name: &str) -> (f64, MetSource) {
        let name = exercise_name.trim();

        if let Some(hit) = met_table::lookup(name) {
            return (hit.met_value, hit.source);
        }

        match estimate_met_with_llm(self.llm.as_deref(), name).await {
            MetEstimate::Estimated(met) => (met, MetSource::Estimated),
            MetEstimate::Unavailable(reason) => {
                warn!(
                    exercise = %name,
                    "No MET value for exercise ({reason}); using default {DEFAULT_MET_VALUE}"
                );
                (DEFAULT_MET_VALUE, MetSource::Default)
            }
        }
    }

    /// Estimate calories burned
    #[instrument(skip(self, request), fields(exercise = %request.exercise_name))]
    pub async fn estimate(&self, request: &CalorieEstimateRequest) -> CalorieEstimate {
        let (met_value, met_source) = self.resolve_met(&request.exercise_name).await;
        let weight_kg = request.weight_kg.unwrap_or(DEFAULT_BODY_MASS_KG);
        let calories_burned =
            round_to_hundredths(calories_for(met_value, weight_kg, request.duration_minutes));

        info!(
            exercise = %request.exercise_name,
            met_source = %met_source,
            met_value,
            calories = calories_burned,
            "Calculated exercise calories"
        );

        CalorieEstimate {
            exercise_name: request.exercise_name.clone(),
            duration_minutes: request.duration_minutes,
            memo: request.memo.clone().unwrap_or_default(),
            calories_burned,
            met_value,
            weight_kg,
            met_source: Some(met_source),
        }
    }

    /// Every known exercise name in table order
    #[must_use]
    pub fn list_known_exercises(&self) -> Vec<&'static str> {
        met_table::known_exercises()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert!((round_to_hundredths(1.005_000_1) - 1.01).abs() < 1e-9);
        assert!((round_to_hundredths(292.5) - 292.5).abs() < 1e-9);
        assert!((round_to_hundredths(0.125) - 0.13).abs() < 1e-9);
        assert!((round_to_hundredths(-0.125) + 0.13).abs() < 1e-9);
    }

    #[test]
    fn test_formula() {
        assert!((calories_for(8.0, 70.0, 30.0) - 280.0).abs() < 1e-9);
        assert!((calories_for(6.0, 65.0, 45.0) - 292.5).abs() < 1e-9);
        assert!(calories_for(6.0, 65.0, 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_resolve_trims_before_lookup() {
        let calc = ExerciseCalorieCalculator::new(None);
        let (met, source) = calc.resolve_met("  요가  ").await;
        assert!((met - 3.0).abs() < f64::EPSILON);
        assert_eq!(source, MetSource::Exact);
    }

    #[tokio::test]
    async fn test_estimate_echoes_input() {
        let calc = ExerciseCalorieCalculator::new(None);
        let request = CalorieEstimateRequest::new(" 달리기 ", 30.0).with_memo("아침");
        let result = calc.estimate(&request).await;
        assert_eq!(result.exercise_name, " 달리기 ");
        assert_eq!(result.memo, "아침");
        assert!((result.calories_burned - 280.0).abs() < 1e-9);
    }
}
