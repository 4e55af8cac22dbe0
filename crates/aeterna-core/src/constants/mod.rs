// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Exercise defaults, upload limits, service names and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! Constants module
//!
//! Constants are grouped into small domain modules rather than one flat list.

/// Exercise energy expenditure constants
pub mod exercise {
    /// Body mass used when the caller does not provide one (kg)
    pub const DEFAULT_BODY_MASS_KG: f64 = 70.0;
    /// MET value used when neither the table nor the model yields one
    pub const DEFAULT_MET_VALUE: f64 = 4.0;
    /// Lowest MET value accepted from a model estimate (inclusive)
    pub const MIN_PLAUSIBLE_MET: f64 = 1.0;
    /// Highest MET value accepted from a model estimate (inclusive)
    pub const MAX_PLAUSIBLE_MET: f64 = 20.0;
    /// Minutes per hour
    pub const MINUTES_PER_HOUR: f64 = 60.0;
}

/// Image upload constants
pub mod upload {
    /// Maximum accepted upload size (10 MiB)
    pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
    /// Extensions accepted by the upload endpoint (lowercase, no dot)
    pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
    /// Folder used when the client does not send one
    pub const DEFAULT_FOLDER: &str = "images";
    /// Local directory for stored uploads
    pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
    /// Subdirectory of the system temp dir for upload copies
    pub const TEMP_DIR_NAME: &str = "aeterna-gateway";
}

/// Service identity
pub mod service_names {
    /// Service name reported by health checks and logs
    pub const AETERNA_GATEWAY: &str = "aeterna-gateway";
    /// Provider label used in LLM error messages
    pub const OPENAI: &str = "OpenAI";
}

/// Default values for configuration
pub mod defaults {
    /// Default bind host
    pub const HOST: &str = "0.0.0.0";
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 5000;
    /// Default CORS origins (the companion app server)
    pub const CORS_ALLOWED_ORIGINS: &str = "http://localhost:8080,http://127.0.0.1:8080";
    /// Default OpenAI-compatible endpoint
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    /// Default vision-capable model
    pub const OPENAI_MODEL: &str = "gpt-4o";
    /// Default sampling temperature
    pub const OPENAI_TEMPERATURE: f32 = 0.3;
    /// Default completion token limit
    pub const OPENAI_MAX_TOKENS: u32 = 1000;
    /// Vision models tried when the configured one does not exist
    pub const OPENAI_FALLBACK_MODELS: &str = "gpt-4o,gpt-4-turbo,gpt-4";
    /// Default public URL prefix for the local image store
    pub const PUBLIC_BASE_URL: &str = "http://localhost:5000/uploads";
    /// Default bucket name
    pub const S3_BUCKET_NAME: &str = "aeterna-health-images";
    /// Default bucket region
    pub const AWS_REGION: &str = "ap-northeast-2";
    /// Canned ACL applied to uploaded objects
    pub const S3_OBJECT_ACL: &str = "public-read";
    /// Timeout for downloading images to analyze (seconds)
    pub const IMAGE_FETCH_TIMEOUT_SECS: u64 = 30;
}

/// Environment variable names
pub mod env_config {
    /// Bind host
    pub const HOST: &str = "HOST";
    /// Bind port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Comma separated CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// OpenAI API key
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// OpenAI-compatible base URL
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    /// Model id
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    /// Sampling temperature
    pub const OPENAI_TEMPERATURE: &str = "OPENAI_TEMPERATURE";
    /// Completion token limit
    pub const OPENAI_MAX_TOKENS: &str = "OPENAI_MAX_TOKENS";
    /// Comma separated vision models to retry with
    pub const OPENAI_FALLBACK_MODELS: &str = "OPENAI_FALLBACK_MODELS";
    /// Image store backend (`local` or `s3`)
    pub const STORAGE_BACKEND: &str = "STORAGE_BACKEND";
    /// Local upload directory
    pub const UPLOAD_FOLDER: &str = "UPLOAD_FOLDER";
    /// Directory for temporary upload copies
    pub const TEMP_UPLOAD_DIR: &str = "TEMP_UPLOAD_DIR";
    /// Public URL prefix for the local store
    pub const PUBLIC_BASE_URL: &str = "PUBLIC_BASE_URL";
    /// S3-compatible endpoint
    pub const S3_ENDPOINT_URL: &str = "S3_ENDPOINT_URL";
    /// Bucket name
    pub const S3_BUCKET_NAME: &str = "S3_BUCKET_NAME";
    /// Bucket region
    pub const AWS_REGION: &str = "AWS_REGION";
    /// Optional bearer token for the S3-compatible endpoint
    pub const S3_AUTH_TOKEN: &str = "S3_AUTH_TOKEN";
    /// AWS access key id used to sign object requests
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    /// AWS secret access key used to sign object requests
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    /// Temporary credential session token
    pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
    /// Canned ACL for uploaded objects, empty to send none
    pub const S3_OBJECT_ACL: &str = "S3_OBJECT_ACL";
    /// Upload size limit in bytes
    pub const MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
}
