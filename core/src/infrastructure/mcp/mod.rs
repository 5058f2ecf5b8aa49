// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod config;
pub mod registry;

pub use config::{load_server_map, McpConfigError};
pub use registry::McpToolRegistry;
