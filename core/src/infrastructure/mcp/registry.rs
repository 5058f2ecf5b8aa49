// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// MCP Tool Registry (C2) infrastructure: connects to the servers named in
// the YAML server map over either a spawned-child-process stdio
// transport or the MCP streamable-HTTP transport, using the `rmcp` client
// SDK. Grounded on the orchestrator lineage's pattern of one registry
// type owning every connection variant behind a single trait object
// (`application::tool_invocation_service::ToolInvocationService` dispatches
// on `ExecutionMode::Local` vs `Remote` the same way this dispatches on
// transport).

use crate::domain::mcp::{
    McpError, ServerTransport, Tool, ToolServerConfig, ToolServerStatus,
};
use async_trait::async_trait;
use rmcp::model::CallToolRequestParam;
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::{StreamableHttpClientTransport, TokioChildProcess};
use rmcp::ServiceExt;
use serde_json::Value;
use std::collections::HashMap;
use tokio::process::Command;
use tokio::sync::RwLock;

/// A live connection to one MCP server, whichever transport it uses.
enum ServerConnection {
    Stdio(RunningService<RoleClient, ()>),
    Http(RunningService<RoleClient, ()>),
}

struct ConnectedServer {
    name: String,
    connection: ServerConnection,
    status: ToolServerStatus,
    tools: Vec<Tool>,
}

/// Registry of connected MCP tool servers, implementing the domain
/// `ToolRegistry` trait the Agent Graph programs against.
pub struct McpToolRegistry {
    servers: RwLock<HashMap<String, ConnectedServer>>,
}

impl McpToolRegistry {
    pub fn new() -> Self {
        Self {
            servers: RwLock::new(HashMap::new()),
        }
    }

    /// Spawns or connects to every server in `configs`, recording its
    /// advertised tools. A server that fails to start is logged and left
    /// out of the registry entirely rather than aborting the whole
    /// connect pass — one misconfigured MCP server should not prevent an
    /// investigation from using the others. `server_status` therefore
    /// returns `None`, not `Failed`, for a server that never connected.
    ///
    /// Once every server that could connect has, tool names are checked
    /// for uniqueness across the whole registry: two servers advertising
    /// the same tool name is a configuration error, not something
    /// `invoke` should silently resolve by picking the first match.
    pub async fn connect_all(&self, configs: Vec<ToolServerConfig>) -> Result<(), McpError> {
        for config in configs {
            let name = config.name.clone();
            match self.connect_one(&config).await {
                Ok(connected) => {
                    self.servers.write().await.insert(name, connected);
                }
                Err(err) => {
                    tracing::error!(server = %name, error = %err, "failed to connect mcp server");
                }
            }
        }

        let servers = self.servers.read().await;
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for connected in servers.values() {
            for tool in &connected.tools {
                if let Some(first_server) = seen.get(tool.name.as_str()) {
                    return Err(McpError::DuplicateTool {
                        tool: tool.name.clone(),
                        first_server: first_server.to_string(),
                        second_server: connected.name.clone(),
                    });
                }
                seen.insert(tool.name.as_str(), connected.name.as_str());
            }
        }
        Ok(())
    }

    async fn connect_one(&self, config: &ToolServerConfig) -> Result<ConnectedServer, McpError> {
        let credential = config
            .credential
            .as_deref()
            .map(crate::domain::mcp::CredentialRef::parse)
            .transpose()?
            .map(|c| c.resolve())
            .transpose()?;

        match &config.transport {
            ServerTransport::Stdio { command, args } => {
                let mut cmd = Command::new(command);
                cmd.args(args);
                if let Some(token) = &credential {
                    cmd.env("MCP_AUTH_TOKEN", token);
                }
                let child = TokioChildProcess::new(cmd).map_err(|e| McpError::Transport {
                    server: config.name.clone(),
                    message: e.to_string(),
                })?;
                let client = ().serve(child).await.map_err(|e| McpError::Transport {
                    server: config.name.clone(),
                    message: e.to_string(),
                })?;
                let tools = list_tools(&client, &config.name).await?;
                Ok(ConnectedServer {
                    name: config.name.clone(),
                    connection: ServerConnection::Stdio(client),
                    status: ToolServerStatus::Running,
                    tools,
                })
            }
            ServerTransport::Http { url } => {
                if credential.is_some() {
                    tracing::debug!(server = %config.name, "http mcp server has a credential configured; \
forwarding it requires a transport-level auth header, not yet wired for streamable-http servers");
                }
                let transport = StreamableHttpClientTransport::from_uri(url.clone());
                let client = ().serve(transport).await.map_err(|e| McpError::Transport {
                    server: config.name.clone(),
                    message: e.to_string(),
                })?;
                let tools = list_tools(&client, &config.name).await?;
                Ok(ConnectedServer {
                    name: config.name.clone(),
                    connection: ServerConnection::Http(client),
                    status: ToolServerStatus::Running,
                    tools,
                })
            }
        }
    }
}

impl Default for McpToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

async fn list_tools(
    client: &RunningService<RoleClient, ()>,
    server_name: &str,
) -> Result<Vec<Tool>, McpError> {
    let response = client
        .list_tools(Default::default())
        .await
        .map_err(|e| McpError::Transport {
            server: server_name.to_string(),
            message: e.to_string(),
        })?;

    Ok(response
        .tools
        .into_iter()
        .map(|t| Tool {
            server: server_name.to_string(),
            name: t.name.to_string(),
            description: t.description.clone().unwrap_or_default().to_string(),
            parameters: serde_json::to_value(&t.input_schema).unwrap_or(Value::Null),
        })
        .collect())
}

#[async_trait]
impl crate::domain::mcp::ToolRegistry for McpToolRegistry {
    async fn list_tools(&self) -> Vec<Tool> {
        self.servers
            .read()
            .await
            .values()
            .flat_map(|s| s.tools.clone())
            .collect()
    }

    async fn invoke(&self, tool_name: &str, arguments: Value) -> Result<String, McpError> {
        let servers = self.servers.read().await;
        let server = servers
            .values()
            .find(|s| s.tools.iter().any(|t| t.name == tool_name))
            .ok_or_else(|| McpError::ToolNotFound {
                server: "unknown".to_string(),
                tool: tool_name.to_string(),
            })?;

        if server.status != ToolServerStatus::Running {
            return Err(McpError::Transport {
                server: server.name.clone(),
                message: "server is not running".to_string(),
            });
        }

        let arguments = arguments.as_object().cloned();
        let request = CallToolRequestParam {
            name: tool_name.to_string().into(),
            arguments,
        };

        let client = match &server.connection {
            ServerConnection::Stdio(c) | ServerConnection::Http(c) => c,
        };

        tracing::info!(tool = %tool_name, server = %server.name, "invoking tool");
        let started = std::time::Instant::now();

        let result = client.call_tool(request).await;
        let elapsed = started.elapsed();

        let result = result.map_err(|e| {
            tracing::warn!(
                tool = %tool_name,
                server = %server.name,
                duration_ms = elapsed.as_millis() as u64,
                error = %e,
                "tool invocation failed"
            );
            McpError::Transport {
                server: server.name.clone(),
                message: e.to_string(),
            }
        })?;

        let text = result
            .content
            .into_iter()
            .map(|c| c.as_text().map(|t| t.text.clone()).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n");

        tracing::info!(
            tool = %tool_name,
            server = %server.name,
            duration_ms = elapsed.as_millis() as u64,
            result_len = text.len(),
            "tool invocation finished"
        );

        Ok(text)
    }

    fn server_status(&self, server: &str) -> Option<ToolServerStatus> {
        self.servers.try_read().ok()?.get(server).map(|s| s.status)
    }
}
