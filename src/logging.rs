// ABOUTME: Tracing subscriber setup for the gateway (pretty, json or compact output)
// ABOUTME: Reads RUST_LOG and LOG_FORMAT and quiets HTTP client and server internals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! Logging setup
//!
//! | variable | effect |
//! |---|---|
//! | `RUST_LOG` | filter directives, default `info` |
//! | `LOG_FORMAT` | `pretty` (default), `json` or `compact` |
//! | `LOG_INCLUDE_LOCATION` | add file and line (always on in production) |
//! | `LOG_INCLUDE_SPANS` | emit span open/close events |

use crate::constants::service_names;
use anyhow::Result;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Directives appended unless the user filter names the target
const QUIET_DEPENDENCIES: &[&str] = &[
    "hyper=warn",
    "hyper_util=warn",
    "reqwest=warn",
    "tower_http=info",
];

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directives when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include span open/close events
    pub include_spans: bool,
    /// Deployment environment name
    pub environment: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human readable multi-field lines
    Pretty,
    /// Single line, no target
    Compact,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value, defaulting to pretty output
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Pretty,
            include_location: false,
            include_spans: false,
            environment: "development".to_owned(),
        }
    }
}

impl LoggingConfig {
    /// Read the logging variables
    #[must_use]
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_owned());
        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned()),
            format: LogFormat::from_str_or_default(&env::var("LOG_FORMAT").unwrap_or_default()),
            include_location: environment == "production"
                || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            environment,
        }
    }

    /// Targets the user filter already names keep the user's level
    fn env_filter(&self) -> EnvFilter {
        let user_targets: Vec<&str> = self
            .level
            .split(',')
            .filter_map(|directive| directive.split_once('=').map(|(target, _)| target.trim()))
            .collect();
        let names_target = |directive: &str| {
            directive
                .split_once('=')
                .is_some_and(|(target, _)| user_targets.contains(&target))
        };

        let crate_directive = format!("aeterna_gateway={}", self.level);
        let crate_level = (!self.level.contains('=')).then_some(crate_directive.as_str());

        QUIET_DEPENDENCIES
            .iter()
            .copied()
            .filter(|directive| !names_target(directive))
            .chain(crate_level)
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(EnvFilter::new(&self.level), |filter, directive| {
                filter.add_directive(directive)
            })
    }

    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = fmt::layer()
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_writer(io::stdout)
            .with_span_events(span_events);

        match self.format {
            LogFormat::Json => registry.with(layer.json()).try_init()?,
            LogFormat::Pretty => registry.with(layer.with_target(true)).try_init()?,
            LogFormat::Compact => registry
                .with(layer.compact().with_target(false))
                .try_init()?,
        }

        info!(
            service.name = service_names::AETERNA_GATEWAY,
            service.version = env!("CARGO_PKG_VERSION"),
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}
