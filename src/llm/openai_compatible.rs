// ABOUTME: OpenAI-compatible chat completions provider used for MET estimation and food vision
// ABOUTME: Sends text or text+image messages and maps HTTP failures onto gateway error codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! # `OpenAI`-Compatible Provider
//!
//! Implementation of [`LlmProvider`] for any endpoint speaking the `OpenAI`
//! chat completions protocol (`api.openai.com`, Azure-style proxies, vLLM,
//! Ollama). Messages with an attached image are sent in the multi-part
//! content form (`[{type: text}, {type: image_url}]`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use aeterna_gateway::config::LlmConfig;
//! use aeterna_gateway::llm::{LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
//! use aeterna_gateway::errors::AppError;
//!
//! async fn example(settings: &LlmConfig) -> Result<(), AppError> {
//!     let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::from(settings))?;
//!     let reply = provider.ask_text("달리기의 MET 값은?").await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use crate::config::LlmConfig;
use crate::constants::{defaults, service_names};
use crate::errors::{AppError, ErrorCode};

/// Connection timeout for the chat completions endpoint
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Request timeout (vision requests can be slow)
const REQUEST_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Chat completions request body
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Message in request format
#[derive(Debug, Clone, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: OpenAiContent,
}

/// Plain string content, or typed parts when an image is attached
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiImageUrl },
}

#[derive(Debug, Clone, Serialize)]
struct OpenAiImageUrl {
    url: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        let content = match &msg.image_url {
            None => OpenAiContent::Text(msg.content.clone()),
            Some(url) => OpenAiContent::Parts(vec![
                OpenAiContentPart::Text {
                    text: msg.content.clone(),
                },
                OpenAiContentPart::ImageUrl {
                    image_url: OpenAiImageUrl { url: url.clone() },
                },
            ]),
        };
        Self {
            role: msg.role.as_str(),
            content,
        }
    }
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible provider
#[derive(Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <https://api.openai.com/v1>)
    pub base_url: String,
    /// Bearer API key
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
    /// Temperature applied when a request does not set one
    pub temperature: f32,
    /// Token limit applied when a request does not set one
    pub max_tokens: u32,
    /// Capabilities of this provider
    pub capabilities: LlmCapabilities,
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_BASE_URL.to_owned(),
            api_key: None,
            default_model: defaults::OPENAI_MODEL.to_owned(),
            temperature: defaults::OPENAI_TEMPERATURE,
            max_tokens: defaults::OPENAI_MAX_TOKENS,
            capabilities: LlmCapabilities::vision(),
        }
    }
}

impl From<&LlmConfig> for OpenAiCompatibleConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: Some(config.api_key.clone()),
            default_model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            capabilities: LlmCapabilities::vision(),
        }
    }
}

impl std::fmt::Debug for OpenAiCompatibleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("default_model", &self.default_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// `OpenAI` chat completions client
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            "Initializing OpenAI provider: base_url={}, model={}",
            config.base_url, config.default_model
        );

        Ok(Self { client, config })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Parse error response from API
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        let service = service_names::OPENAI;
        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            let message = error_response.error.message;
            match status.as_u16() {
                401 | 403 => AppError::new(
                    ErrorCode::ExternalAuthFailed,
                    format!("API authentication failed: {message}"),
                ),
                429 => AppError::new(
                    ErrorCode::ExternalRateLimited,
                    Self::extract_rate_limit_message(&message),
                ),
                400 => AppError::invalid_input(format!("API validation error: {message}")),
                404 => AppError::not_found(format!("Model or endpoint ({message})")),
                503 => AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("{service} is temporarily unavailable: {message}"),
                ),
                _ => {
                    let error_type = error_response
                        .error
                        .error_type
                        .unwrap_or_else(|| "unknown".to_owned());
                    AppError::external_service(service, format!("{error_type} - {message}"))
                }
            }
        } else {
            match status.as_u16() {
                404 => AppError::not_found(format!("Model or endpoint ({status})")),
                502..=504 => AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("{service} is not responding ({status})"),
                ),
                _ => AppError::external_service(
                    service,
                    format!(
                        "API error ({}): {}",
                        status,
                        body.chars().take(200).collect::<String>()
                    ),
                ),
            }
        }
    }

    /// Extract a user-friendly rate limit message
    fn extract_rate_limit_message(message: &str) -> String {
        let lowered = message.to_lowercase();
        if let Some(retry_pos) = lowered.find("try again in ") {
            let after_prefix = &lowered[retry_pos + "try again in ".len()..];
            let time_str: String = after_prefix
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            if let Ok(seconds) = time_str.parse::<f64>() {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let seconds_int = seconds.ceil() as u64;
                return format!("LLM rate limit reached. Please try again in {seconds_int} seconds.");
            }
        }
        "LLM rate limit reached. Please wait a moment and try again.".to_owned()
    }

    /// Add authorization header if API key is configured
    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.bearer_auth(api_key)
        } else {
            request
        }
    }

    fn send_error(&self, e: &reqwest::Error) -> AppError {
        error!("Failed to send request to {}: {}", service_names::OPENAI, e);
        if e.is_timeout() || e.is_connect() {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!(
                    "Cannot reach {} at {}: {e}",
                    service_names::OPENAI,
                    self.config.base_url
                ),
            )
        } else {
            AppError::external_service(service_names::OPENAI, format!("Request failed: {e}"))
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn display_name(&self) -> &'static str {
        "OpenAI"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        if request.has_images() && !self.capabilities().supports_vision() {
            return Err(AppError::invalid_input(format!(
                "Model {} does not accept image input",
                self.config.default_model
            )));
        }

        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let messages: Vec<OpenAiMessage> =
            request.messages.iter().map(OpenAiMessage::from).collect();
        debug!(
            "Sending chat completion request with {} messages (images: {})",
            messages.len(),
            request.has_images()
        );

        let openai_request = OpenAiRequest {
            model: model.to_owned(),
            messages,
            temperature: Some(request.temperature.unwrap_or(self.config.temperature)),
            max_tokens: Some(request.max_tokens.unwrap_or(self.config.max_tokens)),
        };

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .json(&openai_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| self.send_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read API response: {}", e);
            AppError::external_service(service_names::OPENAI, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse API response: {}", e);
            AppError::external_service(
                service_names::OPENAI,
                format!("Failed to parse response: {e}"),
            )
        })?;

        let choice = openai_response.choices.into_iter().next().ok_or_else(|| {
            AppError::external_service(service_names::OPENAI, "API returned no choices")
        })?;

        let content = choice.message.content.unwrap_or_default();

        debug!(
            "Received response: {} chars, finish_reason: {:?}",
            content.len(),
            choice.finish_reason
        );

        Ok(ChatResponse {
            content,
            model: openai_response.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message_serializes_as_string() {
        let msg = OpenAiMessage::from(&ChatMessage::user("hello"));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
    }

    #[test]
    fn test_image_message_serializes_as_parts() {
        let msg = OpenAiMessage::from(&ChatMessage::user_with_image(
            "what is this",
            "data:image/jpeg;base64,AAAA",
        ));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "what is this");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
    }

    #[test]
    fn test_error_mapping() {
        let body = r#"{"error":{"message":"bad key","type":"invalid_request_error"}}"#;
        let err =
            OpenAiCompatibleProvider::parse_error_response(reqwest::StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.code, ErrorCode::ExternalAuthFailed);

        let body = r#"{"error":{"message":"Rate limit. Please try again in 1.5s","type":"rate"}}"#;
        let err = OpenAiCompatibleProvider::parse_error_response(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            body,
        );
        assert_eq!(err.code, ErrorCode::ExternalRateLimited);
        assert!(err.message.contains("2 seconds"));

        let err = OpenAiCompatibleProvider::parse_error_response(
            reqwest::StatusCode::BAD_GATEWAY,
            "<html>",
        );
        assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = OpenAiCompatibleConfig {
            api_key: Some("sk-secret".to_owned()),
            ..OpenAiCompatibleConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("gpt-4o"));
    }
}
