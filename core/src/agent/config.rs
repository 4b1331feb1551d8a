//! Agent configuration and builder

use super::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::config::ResolvedLlmConfig;
use crate::error::Result;
use crate::llm::{ChatOptions, LlmClient};
use crate::output::{AgentOutput, NullOutput};
use crate::tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Upper bound on model calls per run; `None` keeps looping until the
    /// model stops requesting tools
    #[serde(default)]
    pub max_steps: Option<usize>,

    /// Names of the tools offered to the model
    pub tools: Vec<String>,

    /// Custom system prompt; the built-in instructions are used when unset
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Timeout applied to each model request
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl AgentConfig {
    /// The system prompt this agent seeds conversations with
    pub fn effective_system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Per-request timeout, if configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            tools: vec![
                "add".to_string(),
                "subtract".to_string(),
                "get_current_weather".to_string(),
            ],
            system_prompt: None,
            request_timeout_ms: None,
        }
    }
}

enum LlmSource {
    Config(ResolvedLlmConfig),
    Client(Arc<dyn LlmClient>),
}

/// Builder for creating agents
pub struct AgentBuilder {
    llm: LlmSource,
    agent_config: AgentConfig,
    chat_options: Option<ChatOptions>,
    tool_registry: Option<ToolRegistry>,
    output: Option<Box<dyn AgentOutput>>,
}

impl AgentBuilder {
    /// Create a builder that constructs its client from resolved LLM configuration
    pub fn new(llm_config: ResolvedLlmConfig) -> Self {
        Self::from_source(LlmSource::Config(llm_config))
    }

    /// Create a builder around an already constructed client
    pub fn with_client(client: Arc<dyn LlmClient>) -> Self {
        Self::from_source(LlmSource::Client(client))
    }

    fn from_source(llm: LlmSource) -> Self {
        Self {
            llm,
            agent_config: AgentConfig::default(),
            chat_options: None,
            tool_registry: None,
            output: None,
        }
    }

    /// Set agent configuration
    pub fn with_agent_config(mut self, agent_config: AgentConfig) -> Self {
        self.agent_config = agent_config;
        self
    }

    /// Set maximum steps
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.agent_config.max_steps = Some(max_steps);
        self
    }

    /// Set tools
    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.agent_config.tools = tools;
        self
    }

    /// Set system prompt
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.agent_config.system_prompt = system_prompt;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.agent_config.request_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Override the chat options sent with every request
    pub fn with_chat_options(mut self, options: ChatOptions) -> Self {
        self.chat_options = Some(options);
        self
    }

    /// Resolve tools from a custom registry instead of the built-in one
    pub fn with_tool_registry(mut self, registry: ToolRegistry) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    /// Set the output handler
    pub fn with_output(mut self, output: Box<dyn AgentOutput>) -> Self {
        self.output = Some(output);
        self
    }

    /// Build the agent
    pub fn build(self) -> Result<super::AgentCore> {
        let (llm_client, default_options) = match self.llm {
            LlmSource::Config(config) => (
                crate::llm::create_client(&config)?,
                ChatOptions::from(&config.params),
            ),
            LlmSource::Client(client) => (client, ChatOptions::default()),
        };

        let registry = self.tool_registry.unwrap_or_default();
        let tool_executor = registry.create_executor(&self.agent_config.tools)?;

        Ok(super::AgentCore::new(
            self.agent_config,
            llm_client,
            Arc::new(tool_executor),
            self.chat_options.unwrap_or(default_options),
            self.output.unwrap_or_else(|| Box::new(NullOutput)),
        ))
    }
}
