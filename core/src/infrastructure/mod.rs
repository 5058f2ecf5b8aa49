// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer: concrete adapters for the domain's trait
//! contracts — LLM providers, MCP tool servers, and incident storage.

pub mod llm;
pub mod mcp;
pub mod repositories;
pub mod retry_runner;

pub use repositories::InMemoryIncidentRepository;
pub use retry_runner::run_with_retry;
