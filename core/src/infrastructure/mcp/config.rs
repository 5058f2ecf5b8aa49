// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// MCP server map loader (SPEC_FULL §6). YAML file describing each tool
// server; `${NAME}` placeholders anywhere in a string value are
// substituted from the process environment before parsing proceeds,
// mirroring the orchestrator lineage's hand-rolled secret-reference
// substitution rather than reaching for a templating crate for something
// this small.

use crate::domain::mcp::ToolServerConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum McpConfigError {
    #[error("failed to read mcp server map at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse mcp server map: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("environment variable '{0}' referenced in mcp server map is not set")]
    MissingEnvVar(String),
}

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([A-Z0-9_]+)\}").unwrap());

fn substitute_env(raw: &str) -> Result<String, McpConfigError> {
    let mut last_err = None;
    let substituted = PLACEHOLDER_RE.replace_all(raw, |caps: &regex::Captures| {
        let var_name = &caps[1];
        match std::env::var(var_name) {
            Ok(value) => value,
            Err(_) => {
                last_err = Some(McpConfigError::MissingEnvVar(var_name.to_string()));
                String::new()
            }
        }
    });
    if let Some(err) = last_err {
        return Err(err);
    }
    Ok(substituted.into_owned())
}

/// Loads the MCP server map from `path`, substituting `${VAR}` references
/// against the process environment.
pub fn load_server_map(path: &Path) -> Result<Vec<ToolServerConfig>, McpConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| McpConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let substituted = substitute_env(&raw)?;
    let servers: Vec<ToolServerConfig> = serde_yaml::from_str(&substituted)?;
    Ok(servers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_env_var() {
        std::env::set_var("ROOTCAUSE_TEST_TOKEN", "abc123");
        let result = substitute_env("token: ${ROOTCAUSE_TEST_TOKEN}").unwrap();
        assert_eq!(result, "token: abc123");
        std::env::remove_var("ROOTCAUSE_TEST_TOKEN");
    }

    #[test]
    fn errors_on_missing_env_var() {
        std::env::remove_var("ROOTCAUSE_DEFINITELY_UNSET");
        let err = substitute_env("token: ${ROOTCAUSE_DEFINITELY_UNSET}").unwrap_err();
        assert!(matches!(err, McpConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn leaves_plain_text_unchanged() {
        let result = substitute_env("name: k8s-server").unwrap();
        assert_eq!(result, "name: k8s-server");
    }
}
