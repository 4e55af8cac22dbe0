// ABOUTME: Scripted LLM provider for tests that need a model collaborator
// ABOUTME: Returns a fixed reply or error and records every request it receives
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

use aeterna_gateway::errors::{AppError, ErrorCode};
use aeterna_gateway::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the mock answers with
#[derive(Clone)]
enum Reply {
    Text(String),
    Error(ErrorCode),
}

/// Provider returning a scripted reply
pub struct MockLlm {
    reply: Reply,
    capabilities: LlmCapabilities,
    missing_models: Vec<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockLlm {
    /// Vision-capable provider answering `reply`
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Text(reply.to_owned()),
            capabilities: LlmCapabilities::vision(),
            missing_models: Vec::new(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Text-only provider answering `reply`
    pub fn text_only(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Text(reply.to_owned()),
            capabilities: LlmCapabilities::text_only(),
            missing_models: Vec::new(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Provider failing every call with `code`
    pub fn failing(code: ErrorCode) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Error(code),
            capabilities: LlmCapabilities::vision(),
            missing_models: Vec::new(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Vision provider answering `reply` except for `missing` models, which
    /// fail with `ResourceNotFound` like an unknown model id
    pub fn without_models(missing: &[&str], reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Text(reply.to_owned()),
            capabilities: LlmCapabilities::vision(),
            missing_models: missing.iter().map(|m| (*m).to_owned()).collect(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    fn display_name(&self) -> &'static str {
        "Mock LLM"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let model = request.model.as_deref().unwrap_or("mock-model");
        if self.missing_models.iter().any(|missing| missing == model) {
            return Err(AppError::new(
                ErrorCode::ResourceNotFound,
                format!("The model `{model}` does not exist"),
            ));
        }
        match &self.reply {
            Reply::Text(text) => Ok(ChatResponse {
                content: text.clone(),
                model: model.to_owned(),
            }),
            Reply::Error(code) => Err(AppError::new(*code, "scripted failure")),
        }
    }
}
