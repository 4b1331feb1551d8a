//! Output abstraction for agent events
//!
//! Core emits [`AgentEvent`]s; front ends decide how (or whether) to show them.

pub mod events;

pub use events::{
    AgentEvent, AgentOutput, NullOutput, ToolExecutionInfo, ToolExecutionStatus,
};
