// ABOUTME: Language model fallback for exercises missing from the MET table
// ABOUTME: Prompts the provider, extracts the first number and checks it is a plausible MET
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! MET estimation fallback
//!
//! Failures never propagate: every outcome is either a validated estimate or
//! [`MetEstimate::Unavailable`] carrying the reason, and the caller decides
//! what default to use.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::constants::exercise::{MAX_PLAUSIBLE_MET, MIN_PLAUSIBLE_MET};
use crate::llm::prompts::met_estimate_prompt;
use crate::llm::LlmProvider;

static NUMBER_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // ASCII digits only: 7, 7.5, 12. (first occurrence only is used)
    Regex::new(r"([0-9]+\.?[0-9]*)").ok()
});

/// Outcome of asking the model for a MET value
#[derive(Debug, Clone, PartialEq)]
pub enum MetEstimate {
    /// A number in the plausible range
    Estimated(f64),
    /// No provider, call failed, or the reply was unusable
    Unavailable(UnavailableReason),
}

/// Why no estimate could be used
#[derive(Debug, Clone, PartialEq)]
pub enum UnavailableReason {
    /// No provider configured
    NoProvider,
    /// Provider call returned an error
    ProviderError(String),
    /// Reply contained no number
    NoNumber,
    /// Reply number outside the plausible range
    OutOfRange(f64),
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoProvider => f.write_str("no language model configured"),
            Self::ProviderError(e) => write!(f, "provider error: {e}"),
            Self::NoNumber => f.write_str("reply contained no number"),
            Self::OutOfRange(v) => write!(
                f,
                "estimate {v} outside [{MIN_PLAUSIBLE_MET}, {MAX_PLAUSIBLE_MET}]"
            ),
        }
    }
}

/// Extract and range-check a MET value from a model reply
///
/// Uses the first number anywhere in the text. Out-of-range values are
/// rejected, not clamped.
#[must_use]
pub fn parse_met_value(reply: &str) -> MetEstimate {
    let Some(pattern) = NUMBER_PATTERN.as_ref() else {
        return MetEstimate::Unavailable(UnavailableReason::NoNumber);
    };

    let Some(value) = pattern
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    else {
        return MetEstimate::Unavailable(UnavailableReason::NoNumber);
    };

    if (MIN_PLAUSIBLE_MET..=MAX_PLAUSIBLE_MET).contains(&value) {
        MetEstimate::Estimated(value)
    } else {
        MetEstimate::Unavailable(UnavailableReason::OutOfRange(value))
    }
}

/// Ask the provider for a MET value for `exercise_name`
pub async fn estimate_met_with_llm(
    provider: Option<&dyn LlmProvider>,
    exercise_name: &str,
) -> MetEstimate {
    let Some(provider) = provider else {
        return MetEstimate::Unavailable(UnavailableReason::NoProvider);
    };

    let reply = match provider.ask_text(&met_estimate_prompt(exercise_name)).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(exercise = %exercise_name, "MET estimation request failed: {e}");
            return MetEstimate::Unavailable(UnavailableReason::ProviderError(e.to_string()));
        }
    };

    debug!(exercise = %exercise_name, reply = %reply.trim(), "MET estimation reply");

    let estimate = parse_met_value(&reply);
    if let MetEstimate::Unavailable(reason) = &estimate {
        warn!(exercise = %exercise_name, "Discarding MET estimate: {reason}");
    }
    estimate
}
