// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Small adapter between the MCP domain's `Tool` (what a server advertises)
// and the LLM domain's `ToolDescriptor` (what a provider's function-calling
// API expects). Kept as its own module so neither domain submodule needs
// to know about the other.

use crate::domain::llm::ToolDescriptor;
use crate::domain::mcp::Tool;

pub fn to_generation_tools(tools: Vec<Tool>) -> Vec<ToolDescriptor> {
    tools
        .into_iter()
        .map(|tool| ToolDescriptor {
            name: tool.name,
            description: tool.description,
            parameters: tool.parameters,
        })
        .collect()
}
