// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses bind address, CORS, LLM provider and image storage settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! Environment-based configuration management
//!
//! The gateway is configured through environment variables only. Optional
//! collaborators (the LLM provider) are represented as `Option`s so that a
//! missing key degrades the affected features instead of failing startup.

use crate::constants::{defaults, env_config, upload};
use crate::errors::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma separated origin list, or `*`
    pub allowed_origins: String,
}

/// OpenAI-compatible LLM provider settings
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (never logged)
    pub api_key: String,
    /// Base URL of the chat completions API
    pub base_url: String,
    /// Model id
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
    /// Vision models retried in order when `model` does not exist
    pub fallback_models: Vec<String>,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("fallback_models", &self.fallback_models)
            .finish()
    }
}

/// AWS credentials for signing object store requests
#[derive(Clone, Serialize, Deserialize)]
pub struct AwsCredentials {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key (never logged)
    pub secret_access_key: String,
    /// Session token for temporary credentials
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Where uploaded images are written
#[derive(Clone, Serialize, Deserialize)]
pub enum StorageBackend {
    /// Files on local disk, served under a public URL prefix
    Local {
        /// Public URL prefix for stored objects
        public_base_url: String,
    },
    /// S3-compatible HTTP endpoint
    S3Like {
        /// Base URL objects are `PUT` under
        endpoint_url: String,
        /// Signing region
        region: String,
        /// SigV4 credentials; requests are signed when present
        credentials: Option<AwsCredentials>,
        /// Bearer token for endpoints without SigV4
        auth_token: Option<String>,
        /// Canned ACL sent as `x-amz-acl` on upload
        object_acl: Option<String>,
    },
}

impl StorageBackend {
    /// Short tag for logs
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::S3Like { .. } => "s3",
        }
    }
}

impl fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { public_base_url } => f
                .debug_struct("Local")
                .field("public_base_url", public_base_url)
                .finish(),
            Self::S3Like {
                endpoint_url,
                region,
                credentials,
                auth_token,
                object_acl,
            } => f
                .debug_struct("S3Like")
                .field("endpoint_url", endpoint_url)
                .field("region", region)
                .field("credentials", credentials)
                .field("auth_token", &auth_token.as_ref().map(|_| "[REDACTED]"))
                .field("object_acl", object_acl)
                .finish(),
        }
    }
}

/// Image storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Selected backend
    pub backend: StorageBackend,
    /// Local directory for stored files (served publicly by the local backend)
    pub upload_dir: PathBuf,
    /// Directory for temporary upload copies; never served
    pub temp_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// CORS settings
    pub cors: CorsConfig,
    /// LLM provider settings; `None` when no API key is configured
    pub llm: Option<LlmConfig>,
    /// Image storage settings
    pub storage: StorageConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_owned(),
            http_port: defaults::HTTP_PORT,
            environment: Environment::default(),
            cors: CorsConfig {
                allowed_origins: defaults::CORS_ALLOWED_ORIGINS.to_owned(),
            },
            llm: None,
            storage: StorageConfig {
                backend: StorageBackend::Local {
                    public_base_url: defaults::PUBLIC_BASE_URL.to_owned(),
                },
                upload_dir: PathBuf::from(upload::DEFAULT_UPLOAD_DIR),
                temp_dir: default_temp_dir(),
                max_upload_bytes: upload::MAX_UPLOAD_BYTES,
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if a numeric variable cannot be parsed or the
    /// storage backend name is unknown.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        // Variables already set in the process take precedence over .env
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {e}");
        }

        let config = Self {
            host: env_var_or(env_config::HOST, defaults::HOST),
            http_port: parse_env_or(env_config::HTTP_PORT, defaults::HTTP_PORT)?,
            environment: Environment::from_str_or_default(&env_var_or(
                env_config::ENVIRONMENT,
                "development",
            )),
            cors: CorsConfig {
                allowed_origins: env_var_or(
                    env_config::CORS_ALLOWED_ORIGINS,
                    defaults::CORS_ALLOWED_ORIGINS,
                ),
            },
            llm: Self::llm_from_env()?,
            storage: Self::storage_from_env()?,
        };

        if config.llm.is_none() {
            warn!(
                "{} is not set: food analysis is disabled and unknown exercises use the default MET value",
                env_config::OPENAI_API_KEY
            );
        }

        Ok(config)
    }

    fn llm_from_env() -> AppResult<Option<LlmConfig>> {
        let Some(api_key) = env::var(env_config::OPENAI_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
        else {
            return Ok(None);
        };

        Ok(Some(LlmConfig {
            api_key,
            base_url: env_var_or(env_config::OPENAI_BASE_URL, defaults::OPENAI_BASE_URL),
            model: env_var_or(env_config::OPENAI_MODEL, defaults::OPENAI_MODEL),
            temperature: parse_env_or(
                env_config::OPENAI_TEMPERATURE,
                defaults::OPENAI_TEMPERATURE,
            )?,
            max_tokens: parse_env_or(env_config::OPENAI_MAX_TOKENS, defaults::OPENAI_MAX_TOKENS)?,
            fallback_models: comma_list(&env_var_or(
                env_config::OPENAI_FALLBACK_MODELS,
                defaults::OPENAI_FALLBACK_MODELS,
            )),
        }))
    }

    fn storage_from_env() -> AppResult<StorageConfig> {
        let backend = match env_var_or(env_config::STORAGE_BACKEND, "local")
            .to_lowercase()
            .as_str()
        {
            "local" => StorageBackend::Local {
                public_base_url: env_var_or(
                    env_config::PUBLIC_BASE_URL,
                    defaults::PUBLIC_BASE_URL,
                ),
            },
            "s3" => {
                let bucket = env_var_or(env_config::S3_BUCKET_NAME, defaults::S3_BUCKET_NAME);
                let region = env_var_or(env_config::AWS_REGION, defaults::AWS_REGION);
                StorageBackend::S3Like {
                    endpoint_url: env::var(env_config::S3_ENDPOINT_URL)
                        .unwrap_or_else(|_| format!("https://{bucket}.s3.{region}.amazonaws.com")),
                    region,
                    credentials: Self::aws_credentials_from_env(),
                    auth_token: non_empty_env(env_config::S3_AUTH_TOKEN),
                    object_acl: Some(env_var_or(
                        env_config::S3_OBJECT_ACL,
                        defaults::S3_OBJECT_ACL,
                    ))
                    .filter(|acl| !acl.trim().is_empty()),
                }
            }
            other => {
                return Err(AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!(
                        "Invalid {} value '{other}' (expected 'local' or 's3')",
                        env_config::STORAGE_BACKEND
                    ),
                ))
            }
        };

        Ok(StorageConfig {
            backend,
            upload_dir: PathBuf::from(env_var_or(
                env_config::UPLOAD_FOLDER,
                upload::DEFAULT_UPLOAD_DIR,
            )),
            temp_dir: env::var(env_config::TEMP_UPLOAD_DIR)
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map_or_else(default_temp_dir, PathBuf::from),
            max_upload_bytes: parse_env_or(
                env_config::MAX_UPLOAD_BYTES,
                upload::MAX_UPLOAD_BYTES,
            )?,
        })
    }

    /// Both key parts must be set; a lone id or secret is ignored with a warning
    fn aws_credentials_from_env() -> Option<AwsCredentials> {
        match (
            non_empty_env(env_config::AWS_ACCESS_KEY_ID),
            non_empty_env(env_config::AWS_SECRET_ACCESS_KEY),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(AwsCredentials {
                access_key_id,
                secret_access_key,
                session_token: non_empty_env(env_config::AWS_SESSION_TOKEN),
            }),
            (None, None) => None,
            _ => {
                warn!(
                    "Only one of {} and {} is set: object requests will not be signed",
                    env_config::AWS_ACCESS_KEY_ID,
                    env_config::AWS_SECRET_ACCESS_KEY
                );
                None
            }
        }
    }

    /// One-line configuration summary without secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Aeterna gateway: environment={}, bind={}:{}, llm={}, storage={} ({}), max_upload_bytes={}",
            self.environment,
            self.host,
            self.http_port,
            self.llm
                .as_ref()
                .map_or_else(|| "disabled".to_owned(), |llm| llm.model.clone()),
            self.storage.backend.tag(),
            self.storage.upload_dir.display(),
            self.storage.max_upload_bytes,
        )
    }
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn default_temp_dir() -> PathBuf {
    env::temp_dir().join(upload::TEMP_DIR_NAME)
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_env_or<T>(name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            AppError::new(
                ErrorCode::ConfigInvalid,
                format!("Invalid {name} value '{raw}': {e}"),
            )
        }),
        Err(_) => Ok(default),
    }
}
