// ABOUTME: HTTP middleware for CORS and request tracing
// ABOUTME: Layers applied once to the whole gateway router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

/// CORS configuration
pub mod cors;
/// Per-request tracing spans
pub mod tracing;

pub use cors::setup_cors;
pub use tracing::request_trace_layer;
