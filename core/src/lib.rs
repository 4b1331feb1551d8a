//! # fncall Core
//!
//! Core library for fncall - a minimal function-calling conversational agent.
//!
//! A prompt goes to a hosted language model together with a set of locally
//! defined tools. Whenever the model asks for tool calls, they are executed
//! here and their results are fed back, until the model produces a final
//! natural-language answer.

// Core modules
pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod tools;

// Re-export commonly used types
pub use agent::{Agent, AgentBuilder, AgentConfig, AgentCore, AgentExecution, Conversation};
pub use config::{ModelParams, Protocol, ResolvedLlmConfig};
pub use error::{Error, Result};

/// Current version of the fncall-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
