// ABOUTME: Prompt templates for LLM interactions loaded at compile time
// ABOUTME: MET estimation, food name and food nutrition prompts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! # Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.

/// Placeholder replaced with the exercise name in [`MET_ESTIMATE_PROMPT`]
const EXERCISE_NAME_PLACEHOLDER: &str = "{exercise_name}";

/// Asks for a MET value in the `MET 값: <number>` format
pub const MET_ESTIMATE_PROMPT: &str = include_str!("met_estimate.md");

/// Asks for the food name only
pub const FOOD_NAME_PROMPT: &str = include_str!("food_name.md");

/// Asks for food name, calories and macronutrients as a JSON object
pub const FOOD_NUTRITION_PROMPT: &str = include_str!("food_nutrition.md");

/// Render the MET estimation prompt for an exercise
#[must_use]
pub fn met_estimate_prompt(exercise_name: &str) -> String {
    MET_ESTIMATE_PROMPT.replace(EXERCISE_NAME_PLACEHOLDER, exercise_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_met_prompt_embeds_exercise_name() {
        let prompt = met_estimate_prompt("카약");
        assert!(prompt.contains("운동 이름: 카약"));
        assert!(prompt.contains("MET 값: [숫자]"));
        assert!(!prompt.contains(EXERCISE_NAME_PLACEHOLDER));
    }

    #[test]
    fn test_nutrition_prompt_lists_all_fields() {
        for field in ["food_name", "calories", "carbohydrate", "protein", "fat"] {
            assert!(FOOD_NUTRITION_PROMPT.contains(field), "missing {field}");
        }
    }
}
