// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Exposes the environment-driven ServerConfig and its sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! Configuration module for the Aeterna gateway

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AwsCredentials, CorsConfig, Environment, LlmConfig, ServerConfig, StorageBackend,
    StorageConfig,
};
