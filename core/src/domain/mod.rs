// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain layer: entities, value objects, and trait contracts with no
//! dependency on any concrete infrastructure.

pub mod graph;
pub mod incident;
pub mod llm;
pub mod mcp;
pub mod message;
pub mod repository;
pub mod retry;

pub use graph::{GraphState, StopReason};
pub use incident::{
    Confidence, Evidence, Incident, IncidentError, IncidentId, IncidentStatus, StepStatus,
};
pub use llm::{GenerationOptions, GenerationResponse, LlmError, LlmProvider, ToolDescriptor};
pub use mcp::{CredentialRef, McpError, PolicyViolation, Tool, ToolPolicy, ToolRegistry};
pub use message::{Message, ToolCall};
pub use repository::{IncidentRepository, RepositoryError};
pub use retry::{Retryable, RetryPolicy};
