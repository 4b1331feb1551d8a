//! Single task execution command

use super::{build_agent, AgentOptions};
use crate::config::CliConfigLoader;
use anyhow::Result;
use fncall_core::Agent;
use std::process::ExitCode;
use tracing::info;

/// Execute a single prompt and print the answer
pub async fn run_command(
    task: String,
    config_loader: CliConfigLoader,
    options: AgentOptions,
) -> Result<ExitCode> {
    info!("Executing task: {}", task);

    let agent = build_agent(&config_loader, &options).await?;

    match agent.execute_task(&task).await {
        Ok(execution) => {
            info!(
                "Task finished in {} step(s), {} ms",
                execution.steps_executed, execution.duration_ms
            );
            println!("Agent: {}", execution.final_result);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Agent run failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
