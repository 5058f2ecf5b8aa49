// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application layer: orchestrates domain objects and infrastructure
//! trait objects into the system's use cases (C1–C6).

pub mod agent_graph;
pub mod extraction;
pub mod incident_service;
pub mod investigation_runner;
pub mod job_scheduler;
pub mod tool_bridge;

pub use agent_graph::{AgentGraph, AgentGraphError, GraphOutcome};
pub use incident_service::IncidentService;
pub use investigation_runner::{InvestigationError, InvestigationRunner};
pub use job_scheduler::{JobScheduler, SchedulerError};
