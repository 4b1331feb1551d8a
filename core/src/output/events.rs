//! Agent events and the output trait

use crate::llm::{ToolCallRequest, Usage};
use crate::tools::ToolResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Status of a single tool execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolExecutionStatus {
    Executing,
    Success,
    Error,
}

/// What front ends need to render a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecutionInfo {
    pub call_id: String,
    pub tool_name: String,
    /// Raw JSON arguments as sent by the model
    pub arguments: String,
    pub status: ToolExecutionStatus,
    pub result: Option<String>,
    pub duration_ms: Option<u64>,
}

impl ToolExecutionInfo {
    /// Info for a call that is about to run
    pub fn started(request: &ToolCallRequest) -> Self {
        Self {
            call_id: request.id.clone(),
            tool_name: request.name.clone(),
            arguments: request.arguments.clone(),
            status: ToolExecutionStatus::Executing,
            result: None,
            duration_ms: None,
        }
    }

    /// Info for a finished call
    pub fn completed(request: &ToolCallRequest, result: &ToolResult) -> Self {
        Self {
            status: if result.success {
                ToolExecutionStatus::Success
            } else {
                ToolExecutionStatus::Error
            },
            result: Some(result.content.clone()),
            duration_ms: result.duration_ms,
            ..Self::started(request)
        }
    }
}

/// Events emitted while the agent works on a prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    ExecutionStarted {
        run_id: String,
        prompt: String,
    },
    ModelRequest {
        step: usize,
        message_count: usize,
    },
    ToolExecutionStarted {
        tool_info: ToolExecutionInfo,
    },
    ToolExecutionCompleted {
        tool_info: ToolExecutionInfo,
    },
    ExecutionCompleted {
        run_id: String,
        steps: usize,
        usage: Usage,
        final_answer: String,
    },
}

/// Sink for agent events
#[async_trait]
pub trait AgentOutput: Send + Sync {
    async fn emit_event(
        &self,
        event: AgentEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Output that discards every event
pub struct NullOutput;

#[async_trait]
impl AgentOutput for NullOutput {
    async fn emit_event(
        &self,
        _event: AgentEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
