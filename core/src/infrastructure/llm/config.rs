// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM provider configuration, read from environment variables per
// SPEC_FULL §6. Grounded on `infrastructure::llm::registry::ProviderRegistry`'s
// `"env:VAR"` api-key indirection, trimmed to the single OpenAI-compatible
// provider this system targets.

use crate::domain::llm::LlmError;
use crate::infrastructure::llm::openai::OpenAiProvider;

/// Resolved configuration for the one LLM provider this system talks to.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
}

impl LlmConfig {
    /// Reads `ROOTCAUSE_LLM_ENDPOINT`, `ROOTCAUSE_LLM_API_KEY`, and
    /// `ROOTCAUSE_LLM_MODEL` from the environment, per SPEC_FULL §6.
    pub fn from_env() -> Result<Self, LlmError> {
        let endpoint = std::env::var("ROOTCAUSE_LLM_ENDPOINT")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let api_key = std::env::var("ROOTCAUSE_LLM_API_KEY")
            .map_err(|_| LlmError::InvalidInput("ROOTCAUSE_LLM_API_KEY is not set".to_string()))?;
        let model = std::env::var("ROOTCAUSE_LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        Ok(Self {
            endpoint,
            api_key,
            model,
        })
    }

    pub fn build(self) -> OpenAiProvider {
        OpenAiProvider::new(self.endpoint, self.api_key, self.model)
    }
}
