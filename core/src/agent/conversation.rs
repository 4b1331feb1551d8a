//! Conversation state for a single agent run

use crate::error::{AgentError, Result};
use crate::llm::{LlmMessage, MessageRole, ToolCallRequest};
use crate::tools::ToolResult;
use serde::{Deserialize, Serialize};

/// Ordered, append-only dialogue history sent with every model call.
///
/// Every tool call carried by an assistant message must be answered by
/// exactly one tool message, in request order, before the next model call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<LlmMessage>,
}

impl Conversation {
    /// Start a conversation from operating instructions and the user's prompt
    pub fn seed(system_prompt: &str, user_prompt: &str) -> Self {
        Self {
            messages: vec![
                LlmMessage::system(system_prompt),
                LlmMessage::user(user_prompt),
            ],
        }
    }

    /// Append an assistant response, tool-call requests included
    pub fn push_assistant(&mut self, message: LlmMessage) {
        debug_assert_eq!(message.role, MessageRole::Assistant);
        self.messages.push(message);
    }

    /// Append the result of one requested tool call
    pub fn push_tool_result(&mut self, request: &ToolCallRequest, result: &ToolResult) {
        self.messages.push(LlmMessage::tool(
            request.id.as_str(),
            request.name.as_str(),
            result.content.as_str(),
        ));
    }

    /// Tool calls of the latest assistant message that have no result yet
    pub fn pending_tool_calls(&self) -> Vec<&ToolCallRequest> {
        let Some(assistant_idx) = self
            .messages
            .iter()
            .rposition(|m| m.role == MessageRole::Assistant)
        else {
            return Vec::new();
        };

        let answered = self.messages[assistant_idx + 1..]
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect::<Vec<_>>();

        self.messages[assistant_idx]
            .tool_calls()
            .iter()
            .filter(|call| !answered.contains(&call.id.as_str()))
            .collect()
    }

    /// Fail if the conversation is not ready for another model call
    pub fn ensure_tool_calls_answered(&self) -> Result<()> {
        let pending = self.pending_tool_calls();
        if pending.is_empty() {
            Ok(())
        } else {
            Err(AgentError::UnansweredToolCalls {
                ids: pending.into_iter().map(|c| c.id.clone()).collect(),
            }
            .into())
        }
    }

    /// Check the pairing rule across the whole history: each assistant
    /// message with N tool calls is immediately followed by N tool messages
    /// answering those calls in the same order.
    pub fn verify_tool_pairing(&self) -> Result<()> {
        let mut idx = 0;
        while idx < self.messages.len() {
            let message = &self.messages[idx];
            idx += 1;

            if message.role == MessageRole::Tool {
                return Err(AgentError::UnansweredToolCalls {
                    ids: message.tool_call_id.iter().cloned().collect(),
                }
                .into());
            }

            for call in message.tool_calls() {
                match self.messages.get(idx) {
                    Some(answer)
                        if answer.role == MessageRole::Tool
                            && answer.tool_call_id.as_deref() == Some(call.id.as_str()) =>
                    {
                        idx += 1;
                    }
                    _ => {
                        return Err(AgentError::UnansweredToolCalls {
                            ids: vec![call.id.clone()],
                        }
                        .into())
                    }
                }
            }
        }
        Ok(())
    }

    /// The full message list, oldest first
    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<LlmMessage> {
        self.messages
    }
}
