//! Agent execution result structures

use super::conversation::Conversation;
use crate::llm::Usage;
use serde::{Deserialize, Serialize};

/// Result of a completed agent run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecution {
    /// Text of the final assistant message
    pub final_result: String,

    /// Number of model calls made
    pub steps_executed: usize,

    /// Number of tool calls answered along the way
    pub tool_calls_executed: usize,

    /// Total execution time in milliseconds
    pub duration_ms: u64,

    /// Token usage summed over every model call
    pub usage: Usage,

    /// Full dialogue, final assistant message included
    pub conversation: Conversation,
}

impl AgentExecution {
    /// Whether any tool ran during the run
    pub fn used_tools(&self) -> bool {
        self.tool_calls_executed > 0
    }
}
