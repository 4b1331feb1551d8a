//! Tool system and built-in tools

pub mod base;
pub mod builtin;
pub mod registry;

pub use base::{format_number, Tool, ToolCall, ToolExample, ToolExecutor, ToolResult};
pub use registry::{ToolFactory, ToolRegistry};
