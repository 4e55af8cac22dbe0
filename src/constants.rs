// ABOUTME: Re-exports domain constants from aeterna-core
// ABOUTME: Exercise defaults, upload limits and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

pub use aeterna_core::constants::*;
