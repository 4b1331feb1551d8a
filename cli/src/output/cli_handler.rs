//! CLI output handler implementation

use async_trait::async_trait;
use fncall_core::output::{AgentEvent, AgentOutput, ToolExecutionInfo};
use tracing::debug;

/// CLI output configuration
#[derive(Debug, Clone, Default)]
pub struct CliOutputConfig {
    /// Print model rounds and tool executions as they happen
    pub show_tool_calls: bool,
}

/// CLI output handler that formats events for terminal display.
///
/// The final answer is printed by the command itself; this handler only
/// covers what happens on the way there.
pub struct CliOutputHandler {
    config: CliOutputConfig,
}

impl CliOutputHandler {
    /// Create a new CLI output handler
    pub fn new(config: CliOutputConfig) -> Self {
        Self { config }
    }

    /// Lines to print for an event, if any
    pub fn render(&self, event: &AgentEvent) -> Vec<String> {
        if !self.config.show_tool_calls {
            return Vec::new();
        }

        match event {
            AgentEvent::ModelRequest { step, .. } if *step == 1 => {
                vec!["Agent thinking...".to_string()]
            }
            AgentEvent::ModelRequest { .. } => {
                vec!["Agent processing tool results...".to_string()]
            }
            AgentEvent::ToolExecutionCompleted { tool_info } => render_tool(tool_info),
            AgentEvent::ExecutionCompleted { steps, usage, .. } if usage.total_tokens > 0 => {
                vec![format!(
                    "Executed {} step(s), {} input + {} output = {} tokens",
                    steps, usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                )]
            }
            _ => Vec::new(),
        }
    }
}

fn render_tool(tool_info: &ToolExecutionInfo) -> Vec<String> {
    vec![
        format!("System executed function: {}...", tool_info.tool_name),
        format!(
            "Result (or Error): {}",
            tool_info.result.as_deref().unwrap_or_default()
        ),
    ]
}

#[async_trait]
impl AgentOutput for CliOutputHandler {
    async fn emit_event(
        &self,
        event: AgentEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match &event {
            AgentEvent::ExecutionStarted { run_id, prompt } => {
                debug!("Run {} started: {}", run_id, prompt);
            }
            AgentEvent::ToolExecutionStarted { tool_info } => {
                debug!("Calling {} with {}", tool_info.tool_name, tool_info.arguments);
            }
            _ => {}
        }

        for line in self.render(&event) {
            println!("{}", line);
        }

        Ok(())
    }
}
