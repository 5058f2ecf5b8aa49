// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! rootcause-core: the autonomous SRE investigation engine.
//!
//! Incidents are submitted as free-text descriptions of a production
//! problem and investigated by an LLM-driven agent that calls out to MCP
//! tool servers to gather evidence, bounded by a retry policy, an
//! iteration cap, and a wall-clock deadline. The crate is organized into
//! four layers:
//!
//! - `domain` — entities, value objects, and trait contracts with no
//!   dependency on any concrete infrastructure.
//! - `application` — the use cases (C1–C6) that orchestrate domain
//!   objects and infrastructure trait objects.
//! - `infrastructure` — concrete adapters: the OpenAI-compatible LLM
//!   client, the MCP tool registry, the in-memory incident store.
//! - `presentation` — the HTTP surface and startup-time config loaders.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
