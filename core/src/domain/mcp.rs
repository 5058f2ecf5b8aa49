// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// MCP Tool Registry (C2) domain types. Grounded on `domain::mcp` from the
// orchestrator lineage: server identity, credential resolution, and a
// policy object that gates which tools an investigation may call before
// any invocation reaches a transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolServerId(pub Uuid);

impl ToolServerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ToolServerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ToolServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a tool server's credential is supplied. Only environment-variable
/// indirection is implemented; the `"env:VAR_NAME"` string syntax mirrors
/// the orchestrator's `resolve_api_key` convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRef {
    pub env_var: String,
}

impl CredentialRef {
    /// Parses a `"env:VAR_NAME"` reference. Any other shape is rejected —
    /// this registry does not speak to a secrets manager.
    pub fn parse(raw: &str) -> Result<Self, McpError> {
        match raw.strip_prefix("env:") {
            Some(var) if !var.is_empty() => Ok(Self {
                env_var: var.to_string(),
            }),
            _ => Err(McpError::InvalidCredentialRef(raw.to_string())),
        }
    }

    pub fn resolve(&self) -> Result<String, McpError> {
        std::env::var(&self.env_var)
            .map_err(|_| McpError::MissingCredential(self.env_var.clone()))
    }
}

/// Transport a tool server is reached over.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum ServerTransport {
    /// Spawned as a child process, spoken to over stdio.
    Stdio { command: String, args: Vec<String> },
    /// Reached over the MCP streamable-HTTP transport.
    Http { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolServerStatus {
    Stopped,
    Starting,
    Running,
    Unhealthy,
    Failed,
}

/// Static configuration for one MCP server, as loaded from the YAML
/// server map (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolServerConfig {
    pub name: String,
    pub transport: ServerTransport,
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub allowed_tools: Option<Vec<String>>,
    #[serde(default)]
    pub denied_tools: Vec<String>,
}

/// A tool as advertised by a running server, in OpenAI function shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub server: String,
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("invalid credential reference: {0}")]
    InvalidCredentialRef(String),
    #[error("missing environment variable for credential: {0}")]
    MissingCredential(String),
    #[error("tool server '{0}' not found")]
    ServerNotFound(String),
    #[error("tool '{tool}' not found on server '{server}'")]
    ToolNotFound { server: String, tool: String },
    #[error("policy violation: {0}")]
    PolicyViolation(#[from] PolicyViolation),
    #[error("transport error talking to server '{server}': {message}")]
    Transport { server: String, message: String },
    #[error("tool invocation timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("tool '{tool}' is advertised by both '{first_server}' and '{second_server}'; tool names must be unique across all connected servers")]
    DuplicateTool {
        tool: String,
        first_server: String,
        second_server: String,
    },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("tool '{0}' is not in the allow-list")]
    ToolNotAllowed(String),
    #[error("tool '{0}' is explicitly denied")]
    ToolExplicitlyDenied(String),
}

/// Gates which tools an investigation may call, independent of any
/// particular server's advertised tool list.
#[derive(Debug, Clone, Default)]
pub struct ToolPolicy {
    allowed: Option<HashSet<String>>,
    denied: HashSet<String>,
}

impl ToolPolicy {
    pub fn new(allowed: Option<Vec<String>>, denied: Vec<String>) -> Self {
        Self {
            allowed: allowed.map(|v| v.into_iter().collect()),
            denied: denied.into_iter().collect(),
        }
    }

    pub fn validate(&self, tool_name: &str) -> Result<(), PolicyViolation> {
        if self.denied.contains(tool_name) {
            return Err(PolicyViolation::ToolExplicitlyDenied(tool_name.to_string()));
        }
        if let Some(allowed) = &self.allowed {
            if !allowed.contains(tool_name) {
                return Err(PolicyViolation::ToolNotAllowed(tool_name.to_string()));
            }
        }
        Ok(())
    }
}

/// Registry of connected MCP tool servers. One implementation fans out
/// `invoke` to the right transport (stdio child process vs streamable
/// HTTP) behind this single trait object, per SPEC_FULL §4.2a.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// All tools currently advertised across every connected server.
    async fn list_tools(&self) -> Vec<Tool>;

    /// Invokes `tool_name` with `arguments`, returning its raw text result.
    async fn invoke(&self, tool_name: &str, arguments: Value) -> Result<String, McpError>;

    fn server_status(&self, server: &str) -> Option<ToolServerStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_env_credential_ref() {
        let cred = CredentialRef::parse("env:GITHUB_TOKEN").unwrap();
        assert_eq!(cred.env_var, "GITHUB_TOKEN");
    }

    #[test]
    fn rejects_non_env_credential_ref() {
        assert!(CredentialRef::parse("vault:secret/github").is_err());
        assert!(CredentialRef::parse("env:").is_err());
    }

    #[test]
    fn policy_denies_take_precedence_over_allow() {
        let policy = ToolPolicy::new(
            Some(vec!["get_pod_logs".to_string(), "restart_pod".to_string()]),
            vec!["restart_pod".to_string()],
        );
        assert!(policy.validate("get_pod_logs").is_ok());
        assert_eq!(
            policy.validate("restart_pod").unwrap_err(),
            PolicyViolation::ToolExplicitlyDenied("restart_pod".to_string())
        );
    }

    #[test]
    fn policy_without_allow_list_permits_anything_not_denied() {
        let policy = ToolPolicy::new(None, vec!["delete_namespace".to_string()]);
        assert!(policy.validate("get_pod_logs").is_ok());
        assert!(policy.validate("delete_namespace").is_err());
    }

    #[test]
    fn policy_with_allow_list_rejects_unknown_tools() {
        let policy = ToolPolicy::new(Some(vec!["get_pod_logs".to_string()]), Vec::new());
        assert_eq!(
            policy.validate("restart_pod").unwrap_err(),
            PolicyViolation::ToolNotAllowed("restart_pod".to_string())
        );
    }

    #[test]
    fn server_ids_are_unique() {
        assert_ne!(ToolServerId::new(), ToolServerId::new());
    }
}
