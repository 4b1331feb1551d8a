//! Error types and handling for fncall core

use thiserror::Error;

/// Result type alias for fncall operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fncall core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported protocol: {protocol}")]
    UnsupportedProtocol { protocol: String },
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {}{message}", .status.map(|s| format!("{} - ", s)).unwrap_or_default())]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Model returned no choices")]
    EmptyResponse,
}

/// Tool execution errors.
///
/// None of these abort a run: the executor turns them into error-valued
/// tool results that are sent back to the model as conversation content.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Unknown tool: '{name}'. Available tools: {available}")]
    NotFound { name: String, available: String },

    #[error("Invalid JSON arguments for '{name}': {message}")]
    MalformedArguments { name: String, message: String },

    #[error(
        "Missing required argument(s) {} for the {tool} function. {} required. Please provide them.",
        quote_list(.missing),
        requirement(.required)
    )]
    MissingArguments {
        tool: String,
        missing: Vec<String>,
        required: Vec<String>,
    },

    #[error("Inputs must be numerical for the {tool} function: '{field}' was {value}")]
    NotNumeric {
        tool: String,
        field: String,
        value: String,
    },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },
}

/// Agent execution errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Maximum steps exceeded: {max_steps}")]
    MaxStepsExceeded { max_steps: usize },

    #[error("Tool calls without a matching result: {}", .ids.join(", "))]
    UnansweredToolCalls { ids: Vec<String> },

    #[error("Invalid task: {message}")]
    InvalidTask { message: String },
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn requirement(required: &[String]) -> String {
    match required {
        [only] => format!("'{}' is", only),
        [a, b] => format!("Both '{}' and '{}' are", a, b),
        all => format!("All of {} are", quote_list(all)),
    }
}
