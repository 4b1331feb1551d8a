//! LLM provider implementations

pub mod openai;

pub use openai::OpenAiClient;

use crate::config::{Protocol, ResolvedLlmConfig};
use crate::error::{ConfigError, Result};
use crate::llm::LlmClient;
use std::sync::Arc;

/// Create the client matching the configured protocol
pub fn create_client(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>> {
    match &config.protocol {
        Protocol::OpenAICompat => Ok(Arc::new(OpenAiClient::new(config)?)),
        Protocol::Custom(name) => Err(ConfigError::UnsupportedProtocol {
            protocol: name.clone(),
        }
        .into()),
    }
}
