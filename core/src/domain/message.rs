// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Conversation messages exchanged between the agent graph's `agent` node
// and the LLM provider. Tagged enum rather than a dynamically-typed object
// bag (design note: explicit variants catch malformed transcripts at
// compile time instead of at prompt-serialization time).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single invocation of a tool requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// One turn in the conversation fed to and produced by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System { content: String },
    Human { content: String },
    /// An assistant turn. `tool_calls` is empty when the model answered in
    /// plain text instead of requesting tool use.
    Ai {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// The result of executing one `ToolCall`, correlated by id.
    Tool {
        tool_call_id: String,
        name: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Message::Human {
            content: content.into(),
        }
    }

    pub fn ai_text(content: impl Into<String>) -> Self {
        Message::Ai {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn ai_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Ai {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
        }
    }

    /// Whether this is an assistant turn that requested at least one tool.
    pub fn requests_tools(&self) -> bool {
        matches!(self, Message::Ai { tool_calls, .. } if !tool_calls.is_empty())
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Ai { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Message::System { content }
            | Message::Human { content }
            | Message::Ai { content, .. } => content,
            Message::Tool { content, .. } => content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_text_has_no_tool_calls() {
        let msg = Message::ai_text("hello");
        assert!(!msg.requests_tools());
        assert!(msg.tool_calls().is_empty());
    }

    #[test]
    fn ai_with_tool_calls_requests_tools() {
        let call = ToolCall {
            id: "call-1".into(),
            name: "get_pod_logs".into(),
            arguments: serde_json::json!({ "pod": "api-7f9" }),
        };
        let msg = Message::ai_with_tool_calls("", vec![call.clone()]);
        assert!(msg.requests_tools());
        assert_eq!(msg.tool_calls(), &[call]);
    }

    #[test]
    fn serializes_with_role_tag() {
        let msg = Message::human("pod is crashlooping");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "human");
        assert_eq!(value["content"], "pod is crashlooping");
    }

    #[test]
    fn tool_message_round_trips() {
        let msg = Message::tool_result("call-1", "get_pod_logs", "OOMKilled");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
