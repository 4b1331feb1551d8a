//! Base agent trait

use super::config::AgentConfig;
use super::execution::AgentExecution;
use crate::error::Result;
use async_trait::async_trait;

/// Result type for agent operations
pub type AgentResult<T> = Result<T>;

/// Base trait for all agents.
///
/// Takes `&self`: every task runs in its own conversation, so one agent can
/// serve several tasks at once.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Execute a task
    async fn execute_task(&self, task: &str) -> AgentResult<AgentExecution>;

    /// Get the agent's configuration
    fn config(&self) -> &AgentConfig;

    /// Get the agent's name/type
    fn agent_type(&self) -> &str;
}
