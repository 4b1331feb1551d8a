//! CLI command implementations

pub mod interactive;
pub mod run;
pub mod tools;

pub use interactive::interactive_command;
pub use run::run_command;
pub use tools::tools_command;

use crate::config::CliConfigLoader;
use crate::output::{CliOutputConfig, CliOutputHandler};
use anyhow::Result;
use fncall_core::{AgentBuilder, AgentCore};
use std::time::Duration;
use tracing::info;

/// Agent settings taken from command-line flags
#[derive(Debug, Clone, Default)]
pub struct AgentOptions {
    pub max_steps: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub system_prompt: Option<String>,
    pub debug_output: bool,
}

/// Resolve configuration and build the agent both modes share.
///
/// Any failure here happens before the first prompt is read.
pub async fn build_agent(
    config_loader: &CliConfigLoader,
    options: &AgentOptions,
) -> Result<AgentCore> {
    let llm_config = config_loader.load().await?;
    info!("Using protocol: {}", llm_config.protocol.as_str());
    info!("Using model: {}", llm_config.model);

    let mut builder = AgentBuilder::new(llm_config)
        .with_system_prompt(options.system_prompt.clone())
        .with_output(Box::new(CliOutputHandler::new(CliOutputConfig {
            show_tool_calls: options.debug_output,
        })));

    if let Some(max_steps) = options.max_steps {
        builder = builder.with_max_steps(max_steps);
    }
    if let Some(secs) = options.timeout_secs {
        builder = builder.with_request_timeout(Duration::from_secs(secs));
    }

    Ok(builder.build()?)
}
