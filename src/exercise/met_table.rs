// ABOUTME: Curated MET (metabolic equivalent) table for common exercises
// ABOUTME: Exact and case-insensitive substring lookup in definition order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! MET lookup table
//!
//! Values follow the Compendium of Physical Activities. Entry order matters:
//! substring lookup returns the first entry that matches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MET values by exercise name, in definition order
pub const MET_TABLE: &[(&str, f64)] = &[
    // walking
    ("걷기", 3.5),
    ("빠른걷기", 4.5),
    ("산책", 3.0),
    ("등산", 6.0),
    // running
    ("달리기", 8.0),
    ("조깅", 7.0),
    ("마라톤", 13.5),
    ("러닝", 8.0),
    // cycling
    ("자전거", 6.0),
    ("실내자전거", 5.5),
    ("로드사이클", 8.0),
    // swimming
    ("수영", 6.0),
    ("자유형", 8.0),
    ("평영", 6.0),
    ("배영", 6.0),
    ("접영", 11.0),
    // strength
    ("웨이트트레이닝", 5.0),
    ("근력운동", 5.0),
    ("팔굽혀펴기", 3.5),
    ("윗몸일으키기", 3.0),
    ("스쿼트", 5.0),
    ("플랭크", 3.0),
    // yoga / pilates
    ("요가", 3.0),
    ("필라테스", 3.0),
    ("스트레칭", 2.5),
    // dance
    ("댄스", 5.0),
    ("줌바", 7.0),
    ("발레", 5.0),
    // ball sports
    ("축구", 7.0),
    ("농구", 8.0),
    ("배구", 4.0),
    ("테니스", 7.0),
    ("탁구", 4.0),
    ("배드민턴", 5.5),
    ("골프", 4.5),
    ("야구", 5.0),
    // combat
    ("복싱", 12.0),
    ("태권도", 8.0),
    ("무에타이", 10.0),
    // other
    ("계단오르기", 8.0),
    ("줄넘기", 10.0),
    ("에어로빅", 6.5),
    ("크로스핏", 8.0),
    ("헬스", 5.0),
    ("조깅머신", 7.0),
    ("러닝머신", 8.0),
];

/// How the MET value for an estimate was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetSource {
    /// Name is a table key
    Exact,
    /// Name contains a table key, or is contained in one
    Substring,
    /// Language model estimate that passed validation
    Estimated,
    /// Nothing matched and no usable estimate
    Default,
}

impl MetSource {
    /// Lowercase label used in logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Substring => "substring",
            Self::Estimated => "estimated",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for MetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableMatch {
    /// Table key that matched
    pub key: &'static str,
    /// MET value of that key
    pub met_value: f64,
    /// `Exact` or `Substring`
    pub source: MetSource,
}

/// Resolve an already-trimmed exercise name against [`MET_TABLE`]
///
/// Exact match is case-sensitive. Otherwise the first entry, in definition
/// order, whose lowercased key contains or is contained in the lowercased
/// name wins. Returns `None` for an empty name.
#[must_use]
pub fn lookup(name: &str) -> Option<TableMatch> {
    if name.is_empty() {
        return None;
    }

    if let Some(&(key, met_value)) = MET_TABLE.iter().find(|(key, _)| *key == name) {
        return Some(TableMatch {
            key,
            met_value,
            source: MetSource::Exact,
        });
    }

    let lowered = name.to_lowercase();
    MET_TABLE
        .iter()
        .find(|(key, _)| {
            let key = key.to_lowercase();
            lowered.contains(&key) || key.contains(&lowered)
        })
        .map(|&(key, met_value)| TableMatch {
            key,
            met_value,
            source: MetSource::Substring,
        })
}

/// All table keys in definition order
#[must_use]
pub fn known_exercises() -> Vec<&'static str> {
    MET_TABLE.iter().map(|(key, _)| *key).collect()
}
