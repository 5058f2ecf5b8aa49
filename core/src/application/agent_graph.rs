// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agent Graph (C3): the `agent` -> `tools` -> `agent` -> ... loop. Grounded
// on the orchestrator lineage's iteration-bounded execution loop
// (`domain::execution::Execution::start_iteration`/`complete_iteration`)
// but rebuilt around explicit graph nodes instead of a single method, per
// design note 2 (tagged messages, graph-node objects rather than
// closures).

use crate::domain::graph::{GraphState, StopReason};
use crate::domain::incident::{CollectedEvidence, Evidence, ToolCallRecord};
use crate::domain::llm::{GenerationOptions, LlmError, LlmProvider};
use crate::domain::mcp::{McpError, ToolPolicy, ToolRegistry};
use crate::domain::message::Message;
use crate::domain::retry::RetryPolicy;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum AgentGraphError {
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),
    #[error("cancelled before reaching a final answer")]
    Cancelled,
}

/// Result of driving the graph to completion (or to its iteration limit).
/// Evidence is not carried here: it lives in the `Arc<Mutex<Evidence>>`
/// handle passed into `run`, so the caller can still read whatever was
/// gathered even when `run`'s future is dropped before it resolves (e.g.
/// an enclosing `tokio::time::timeout` firing).
pub struct GraphOutcome {
    pub final_message: Option<Message>,
    pub stop_reason: StopReason,
}

/// Drives the agent/tools loop against a live LLM provider and tool
/// registry, honoring a retry policy for LLM calls and a tool policy for
/// tool calls.
pub struct AgentGraph {
    llm: Arc<dyn LlmProvider>,
    tools: Arc<dyn ToolRegistry>,
    policy: ToolPolicy,
    retry_policy: RetryPolicy,
}

impl AgentGraph {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        tools: Arc<dyn ToolRegistry>,
        policy: ToolPolicy,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            llm,
            tools,
            policy,
            retry_policy,
        }
    }

    /// Runs the loop until the agent produces a final answer, the
    /// iteration cap is hit, or `cancel` fires. `evidence` accumulates
    /// live as tool calls complete, so a caller holding the same handle
    /// can read whatever was gathered so far even if this future never
    /// returns (dropped on timeout) or returns an `Err`.
    pub async fn run(
        &self,
        mut state: GraphState,
        cancel: &CancellationToken,
        evidence: Arc<Mutex<Evidence>>,
    ) -> Result<GraphOutcome, AgentGraphError> {
        let tool_descriptors = crate::application::tool_bridge::to_generation_tools(
            self.tools.list_tools().await,
        );

        loop {
            if cancel.is_cancelled() {
                return Ok(GraphOutcome {
                    final_message: None,
                    stop_reason: StopReason::Cancelled,
                });
            }
            if state.has_reached_iteration_limit() {
                return Ok(GraphOutcome {
                    final_message: state.last_ai_message().cloned(),
                    stop_reason: StopReason::IterationLimitReached,
                });
            }

            let ai_message = self.call_agent_node(&state, &tool_descriptors).await?;
            state.iteration += 1;
            state.push(ai_message.clone());

            if !ai_message.requests_tools() {
                return Ok(GraphOutcome {
                    final_message: Some(ai_message),
                    stop_reason: StopReason::FinalAnswer,
                });
            }

            self.run_tools_node(&ai_message, &mut state, &evidence).await;
        }
    }

    /// The `agent` node: calls the LLM, retrying transient failures per
    /// the configured retry policy.
    async fn call_agent_node(
        &self,
        state: &GraphState,
        tool_descriptors: &[crate::domain::llm::ToolDescriptor],
    ) -> Result<Message, AgentGraphError> {
        let options = GenerationOptions {
            tools: tool_descriptors.to_vec(),
            ..Default::default()
        };

        let response = crate::infrastructure::retry_runner::run_with_retry(
            &self.retry_policy,
            || self.llm.generate(&state.messages, &options),
        )
        .await?;

        let message = if response.tool_calls.is_empty() {
            Message::ai_text(response.content)
        } else {
            Message::ai_with_tool_calls(response.content, response.tool_calls)
        };
        Ok(message)
    }

    /// The `tools` node: executes every tool call the agent requested,
    /// validating each against policy first, and appends a `Tool` message
    /// per call. Spec §4.4(6): every tool call is paired with exactly one
    /// non-empty `collected_evidence` entry, whether it succeeded or
    /// failed — a failure is evidence too, not a reason to abort the
    /// investigation.
    async fn run_tools_node(
        &self,
        ai_message: &Message,
        state: &mut GraphState,
        evidence: &Mutex<Evidence>,
    ) {
        for call in ai_message.tool_calls() {
            evidence.lock().unwrap().tool_calls.push(ToolCallRecord {
                tool: call.name.clone(),
                args: call.arguments.clone(),
                timestamp: Utc::now(),
            });

            let result = match self.policy.validate(&call.name) {
                Ok(()) => self.tools.invoke(&call.name, call.arguments.clone()).await,
                Err(violation) => Err(McpError::PolicyViolation(violation)),
            };

            let content = match result {
                Ok(text) => {
                    evidence.lock().unwrap().collected_evidence.push(CollectedEvidence {
                        source: call.name.clone(),
                        args: call.arguments.clone(),
                        content: text.clone(),
                        timestamp: Utc::now(),
                    });
                    text
                }
                Err(err) => {
                    tracing::warn!(tool = %call.name, error = %err, "tool invocation failed");
                    let content = format!("Error executing tool: {err}");
                    evidence.lock().unwrap().collected_evidence.push(CollectedEvidence {
                        source: call.name.clone(),
                        args: call.arguments.clone(),
                        content: content.clone(),
                        timestamp: Utc::now(),
                    });
                    content
                }
            };

            state.push(Message::tool_result(&call.id, &call.name, content));
        }
    }
}
