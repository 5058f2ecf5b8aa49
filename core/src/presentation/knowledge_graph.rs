// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Knowledge graph loader (SPEC_FULL §4.7). A flat lookup table read once
// at startup from an optional YAML file; not a scheduler, so cycles
// between nodes are simply data, never rejected.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub relationships: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    nodes: HashMap<String, KnowledgeNode>,
}

impl KnowledgeGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&KnowledgeNode> {
        self.nodes.get(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Loads the knowledge graph from `path`. A missing path yields an
    /// empty graph rather than an error — the knowledge graph is
    /// optional background context, never load-bearing.
    pub fn load(path: Option<&Path>) -> Result<Self, std::io::Error> {
        let Some(path) = path else {
            return Ok(Self::empty());
        };
        if !path.exists() {
            return Ok(Self::empty());
        }

        let raw = std::fs::read_to_string(path)?;
        let parsed: Vec<KnowledgeNode> = serde_yaml::from_str(&raw)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        Ok(Self {
            nodes: parsed.into_iter().map(|n| (n.name.clone(), n)).collect(),
        })
    }
}
