// ABOUTME: Core types and constants for the Aeterna nutrition and exercise gateway
// ABOUTME: Foundation crate with error handling and domain constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

#![deny(unsafe_code)]

//! # Aeterna Core
//!
//! Foundation crate providing shared types and constants for the Aeterna
//! gateway. It changes rarely, so the main crate can rebuild without it.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Exercise defaults, upload limits and environment variable names

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;
