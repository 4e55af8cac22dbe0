// ABOUTME: Shared test helpers for gateway integration tests
// ABOUTME: Exports axum request helpers, a scripted LLM provider and fixture servers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

pub mod axum_test;
pub mod fixtures;
pub mod mock_llm;
