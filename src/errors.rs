// ABOUTME: Re-exports the unified error system from aeterna-core
// ABOUTME: Keeps `crate::errors::AppError` paths stable across the gateway
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

pub use aeterna_core::errors::*;
