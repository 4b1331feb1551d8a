//! CLI-specific output implementations
//!
//! Renders core agent events for the terminal.

pub mod cli_handler;

pub use cli_handler::{CliOutputConfig, CliOutputHandler};
