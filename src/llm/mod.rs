// ABOUTME: Language model abstraction used for MET estimation and food photo analysis
// ABOUTME: Message and request types plus the LlmProvider trait with a one-shot text helper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! # Language Model Layer
//!
//! Two consumers sit on top of [`LlmProvider`]:
//!
//! - the exercise calculator, which sends a plain text prompt through
//!   [`LlmProvider::ask_text`] when an exercise is not in the MET table
//! - the food analysis service, which attaches a photo to a user message and
//!   therefore needs a provider reporting [`LlmCapabilities::VISION`]
//!
//! ```rust,no_run
//! use aeterna_gateway::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn describe(provider: &dyn LlmProvider) {
//!     let request = ChatRequest::new(vec![ChatMessage::user_with_image(
//!         "이 음식의 이름은?",
//!         "data:image/jpeg;base64,...",
//!     )]);
//!     let _reply = provider.complete(&request).await;
//! }
//! ```

mod openai_compatible;
pub mod prompts;

pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

bitflags::bitflags! {
    /// What a provider's model can accept
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Accepts image parts in user messages
        const VISION = 0b0001;
        /// Can be forced to answer with a JSON object
        const JSON_MODE = 0b0010;
        /// Honors a leading system message
        const SYSTEM_MESSAGES = 0b0100;
    }
}

impl LlmCapabilities {
    /// Text-only chat model
    #[must_use]
    pub const fn text_only() -> Self {
        Self::SYSTEM_MESSAGES
    }

    /// Multimodal chat model such as `gpt-4o`
    #[must_use]
    pub const fn vision() -> Self {
        Self::VISION.union(Self::JSON_MODE).union(Self::SYSTEM_MESSAGES)
    }

    /// Whether photos can be analyzed
    #[must_use]
    pub const fn supports_vision(&self) -> bool {
        self.contains(Self::VISION)
    }

    /// Whether JSON output can be requested
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions ahead of the conversation
    System,
    /// Prompt text, optionally with a photo
    User,
}

impl MessageRole {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// One message of a chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: MessageRole,
    /// Prompt text
    pub content: String,
    /// Attached photo as an `https://` or `data:` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ChatMessage {
    /// Message without an image
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            image_url: None,
        }
    }

    /// System instructions
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Plain user prompt
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// User prompt about a photo
    #[must_use]
    pub fn user_with_image(content: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
            ..Self::user(content)
        }
    }

    /// Whether a photo is attached
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.image_url.is_some()
    }
}

/// A completion request; unset options fall back to the provider's config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Messages in order
    pub messages: Vec<ChatMessage>,
    /// Model override
    pub model: Option<String>,
    /// Sampling temperature override
    pub temperature: Option<f32>,
    /// Completion length override
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Request with provider defaults
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Use a specific model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Override the completion token limit
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Whether any message carries a photo
    #[must_use]
    pub fn has_images(&self) -> bool {
        self.messages.iter().any(ChatMessage::has_image)
    }
}

/// Model reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Reply text
    pub content: String,
    /// Model that answered
    pub model: String,
}

/// A hosted chat model
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Name shown in logs and error messages
    fn display_name(&self) -> &'static str;

    /// Accepted inputs
    fn capabilities(&self) -> LlmCapabilities;

    /// Model used when a request sets none
    fn default_model(&self) -> &str;

    /// Run a chat completion
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;

    /// Send one user prompt and return the reply text
    async fn ask_text(&self, prompt: &str) -> Result<String, AppError> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        Ok(self.complete(&request).await?.content)
    }
}
