// ABOUTME: Main library entry point for the Aeterna gateway
// ABOUTME: Food photo analysis, exercise calorie estimation and image storage over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

#![deny(unsafe_code)]

//! # Aeterna Gateway
//!
//! A backend gateway between the Aeterna client application and third-party
//! AI and storage services.
//!
//! ## Features
//!
//! - **Exercise calories**: MET table lookup with a language model fallback
//! - **Food analysis**: dish name and macronutrients from a photo URL
//! - **Image storage**: validated uploads to local disk or an S3-compatible store
//!
//! ## Architecture
//!
//! - **Exercise**: MET resolution and the calorie formula
//! - **LLM**: provider trait and the `OpenAI`-compatible client
//! - **Storage**: `ImageStore` backends and upload validation
//! - **Routes**: thin axum handlers over the services in `ServerResources`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use aeterna_gateway::config::ServerConfig;
//! use aeterna_gateway::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Aeterna gateway configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Application constants and defaults
pub mod constants;

/// Unified error handling
pub mod errors;

/// Exercise calorie estimation
pub mod exercise;

/// Food photo analysis
pub mod food;

/// LLM provider abstraction
pub mod llm;

/// Logging configuration
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Shared server resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// Router assembly and serve loop
pub mod server;

/// Image object storage
pub mod storage;
