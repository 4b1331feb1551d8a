//! Agent core logic and execution engine

pub mod base;
pub mod config;
pub mod conversation;
pub mod core;
pub mod execution;
pub mod prompt;

pub use base::{Agent, AgentResult};
pub use config::{AgentBuilder, AgentConfig};
pub use conversation::Conversation;
pub use core::{AgentCore, StepOutcome};
pub use execution::AgentExecution;
pub use prompt::DEFAULT_SYSTEM_PROMPT;
