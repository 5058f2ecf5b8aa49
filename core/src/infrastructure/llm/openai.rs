// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenAI-chat-compatible provider adapter. Grounded directly on
// `infrastructure::llm::openai::OpenAIAdapter` from the orchestrator
// lineage: a thin `reqwest` client, private wire-format structs that never
// leak past this module, and HTTP-status-to-domain-error mapping.

use crate::domain::llm::{
    FinishReason, GenerationOptions, GenerationResponse, LlmError, LlmProvider, TokenUsage,
};
use crate::domain::message::{Message, ToolCall};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAiTool>,
}

#[derive(Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OpenAiToolCall>,
}

#[derive(Serialize, Deserialize, Clone)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: OpenAiFunctionCall,
}

#[derive(Serialize, Deserialize, Clone)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    kind: String,
    function: OpenAiFunctionDef,
}

#[derive(Serialize)]
struct OpenAiFunctionDef {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    model: String,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: String,
}

#[derive(Deserialize, Default)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn to_wire_message(message: &Message) -> OpenAiMessage {
    match message {
        Message::System { content } => OpenAiMessage {
            role: "system".to_string(),
            content: Some(content.clone()),
            tool_call_id: None,
            tool_calls: Vec::new(),
        },
        Message::Human { content } => OpenAiMessage {
            role: "user".to_string(),
            content: Some(content.clone()),
            tool_call_id: None,
            tool_calls: Vec::new(),
        },
        Message::Ai { content, tool_calls } => OpenAiMessage {
            role: "assistant".to_string(),
            content: if content.is_empty() {
                None
            } else {
                Some(content.clone())
            },
            tool_call_id: None,
            tool_calls: tool_calls
                .iter()
                .map(|tc| OpenAiToolCall {
                    id: tc.id.clone(),
                    kind: "function".to_string(),
                    function: OpenAiFunctionCall {
                        name: tc.name.clone(),
                        arguments: tc.arguments.to_string(),
                    },
                })
                .collect(),
        },
        Message::Tool {
            tool_call_id,
            content,
            ..
        } => OpenAiMessage {
            role: "tool".to_string(),
            content: Some(content.clone()),
            tool_call_id: Some(tool_call_id.clone()),
            tool_calls: Vec::new(),
        },
    }
}

fn map_finish_reason(raw: &str) -> FinishReason {
    match raw {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "tool_calls" => FinishReason::ToolCalls,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, LlmError> {
        let request = OpenAiRequest {
            model: &self.model,
            messages: messages.iter().map(to_wire_message).collect(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            tools: options
                .tools
                .iter()
                .map(|t| OpenAiTool {
                    kind: "function".to_string(),
                    function: OpenAiFunctionDef {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.parameters.clone(),
                    },
                })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LlmError::Authentication);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider(format!("HTTP {status}: {body}")));
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedResponse("no choices in response".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|tc| -> Result<ToolCall, LlmError> {
                let arguments: Value = serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(Value::String(tc.function.arguments));
                Ok(ToolCall {
                    id: tc.id,
                    name: tc.function.name,
                    arguments,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let usage = parsed.usage.unwrap_or_default();

        Ok(GenerationResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            finish_reason: map_finish_reason(&choice.finish_reason),
            usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
            model: parsed.model,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}
