// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Presentation layer: the HTTP surface and startup-time loaders that sit
//! in front of the application services.

pub mod api;
pub mod knowledge_graph;

pub use api::{app, AppState};
pub use knowledge_graph::KnowledgeGraph;
