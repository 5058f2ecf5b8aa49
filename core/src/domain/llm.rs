// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM provider abstraction. Grounded on the orchestrator lineage's
// `domain::llm` module: one async trait the Agent Graph programs against,
// independent of which backend answers it.

use crate::domain::message::{Message, ToolCall};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes a tool the model may call, in OpenAI function-calling shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Knobs the caller may pass to a single `generate` call.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub tools: Vec<ToolDescriptor>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: None,
            temperature: None,
            tools: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The model's answer to one `generate` call: either plain text or one or
/// more tool-call requests, never both empty.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
    pub usage: TokenUsage,
    pub model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("network error talking to LLM provider: {0}")]
    Network(String),
    #[error("LLM provider authentication failed")]
    Authentication,
    #[error("LLM provider rate limit exceeded")]
    RateLimit,
    #[error("LLM provider returned an error: {0}")]
    Provider(String),
    #[error("invalid input to LLM provider: {0}")]
    InvalidInput(String),
    #[error("LLM provider response could not be parsed: {0}")]
    MalformedResponse(String),
}

/// A chat-completions backend. One implementation per provider; the Agent
/// Graph and Retry Runner depend only on this trait.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, LlmError>;

    /// Identifies the provider for logging/metrics, e.g. `"openai"`.
    fn name(&self) -> &str;
}
