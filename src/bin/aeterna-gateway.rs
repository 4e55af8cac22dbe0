// ABOUTME: Gateway server binary: loads configuration, initializes logging and serves the API
// ABOUTME: Supports a --http-port override on top of environment configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! # Aeterna Gateway Server Binary
//!
//! Starts the food analysis, exercise calorie and image storage API.

use aeterna_gateway::{
    config::ServerConfig, logging, resources::ServerResources, server, server::API_PREFIX,
};
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "aeterna-gateway")]
#[command(about = "Aeterna gateway - food photo analysis, exercise calories and image storage")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("{}", config.summary());
    display_available_endpoints(&config);

    let resources = Arc::new(ServerResources::from_config(config)?);

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e}");
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}

/// Display all available API endpoints
#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(config: &ServerConfig) {
    let base = format!("http://{}:{}{API_PREFIX}", config.host, config.http_port);

    info!("=== Available API Endpoints ===");
    info!("   Health:            GET  {base}/health");
    info!("   Calorie estimate:  POST {base}/exercise/calculate-calories");
    info!("   Known exercises:   GET  {base}/exercise/exercises");
    info!("   Food name:         POST {base}/food/analyze-name");
    info!("   Food nutrition:    POST {base}/food/analyze-nutrition");
    info!("   Image upload:      POST {base}/image/upload");
    info!("   Image delete:      POST {base}/image/delete");
    info!("=== End of Endpoint List ===");
}
