// ABOUTME: Exercise energy expenditure estimation from free-text exercise names
// ABOUTME: MET table lookup, language model fallback and calorie calculation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! # Exercise Calories
//!
//! Resolution order for the MET (metabolic equivalent) value of an exercise:
//!
//! 1. exact table key
//! 2. case-insensitive substring match, first entry in table order
//! 3. language model estimate, accepted only within `[1.0, 20.0]`
//! 4. default of 4.0
//!
//! Calories are `MET x kg x hours`, rounded to two decimals.
//!
//! ```rust,no_run
//! use aeterna_gateway::exercise::{CalorieEstimateRequest, ExerciseCalorieCalculator};
//!
//! async fn example() {
//!     let calculator = ExerciseCalorieCalculator::new(None);
//!     let result = calculator
//!         .estimate(&CalorieEstimateRequest::new("달리기", 30.0))
//!         .await;
//!     assert_eq!(result.calories_burned, 280.0);
//! }
//! ```

mod calculator;
/// Model fallback for unknown exercises
pub mod fallback;
/// Static MET table
pub mod met_table;

pub use calculator::{
    calories_for, round_to_hundredths, CalorieEstimate, CalorieEstimateRequest,
    ExerciseCalorieCalculator,
};
pub use fallback::{MetEstimate, UnavailableReason};
pub use met_table::{MetSource, MET_TABLE};
