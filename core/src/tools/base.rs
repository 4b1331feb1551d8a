//! Base tool traits and structures

use crate::error::{Error, Result, ToolError};
use crate::llm::{ToolCallRequest, ToolDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters
    async fn execute(&self, call: ToolCall) -> Result<ToolResult>;

    /// Get examples of how to use this tool
    fn examples(&self) -> Vec<ToolExample> {
        Vec::new()
    }
}

/// A call to a tool, with its arguments already decoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier of the model request this call came from
    pub id: String,

    /// Name of the tool to call
    pub name: String,

    /// Parameters to pass to the tool
    pub parameters: serde_json::Value,
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is a result for
    pub tool_call_id: String,

    /// Whether the execution was successful
    pub success: bool,

    /// Result content, exactly as it is sent back to the model
    pub content: String,

    /// Optional structured data
    pub data: Option<serde_json::Value>,

    /// Execution duration in milliseconds
    pub duration_ms: Option<u64>,
}

/// Example usage of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExample {
    /// Description of what this example does
    pub description: String,

    /// Example parameters
    pub parameters: serde_json::Value,

    /// Expected result description
    pub expected_result: String,
}

/// Tool executor holding the resolvable tool set.
///
/// Built once and read-only afterwards; share it behind an `Arc`.
pub struct ToolExecutor {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new<S: Into<String>>(id: S, name: S, parameters: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parameters,
        }
    }

    /// Decode the raw JSON arguments of a model request.
    ///
    /// An empty argument string counts as an empty object.
    pub fn from_request(request: &ToolCallRequest) -> std::result::Result<Self, ToolError> {
        let raw = request.arguments.trim();
        let parameters = if raw.is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            serde_json::from_str(raw).map_err(|e| ToolError::MalformedArguments {
                name: request.name.clone(),
                message: e.to_string(),
            })?
        };

        Ok(Self {
            id: request.id.clone(),
            name: request.name.clone(),
            parameters,
        })
    }

    /// Decode all parameters into a typed argument struct.
    ///
    /// Arguments are named, so only a JSON object is accepted; serde would
    /// otherwise read an array positionally into the struct fields.
    pub fn parse_arguments<T>(&self) -> std::result::Result<T, ToolError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if !self.parameters.is_object() {
            return Err(ToolError::InvalidParameters {
                message: format!(
                    "Invalid arguments for {}: expected a JSON object of named arguments, got {}",
                    self.name, self.parameters
                ),
            });
        }

        serde_json::from_value(self.parameters.clone()).map_err(|e| {
            ToolError::InvalidParameters {
                message: format!("Invalid arguments for {}: {}", self.name, e),
            }
        })
    }
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: true,
            content: content.into(),
            data: None,
            duration_ms: None,
        }
    }

    /// Create a successful numeric result, rendered as `8.0` rather than `8`
    pub fn number(tool_call_id: impl Into<String>, value: f64) -> Self {
        Self::success(tool_call_id, format_number(value)).with_data(serde_json::json!(value))
    }

    /// Create an error result
    pub fn error(tool_call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: false,
            content: format!("Error: {}", error.into()),
            data: None,
            duration_ms: None,
        }
    }

    /// Set structured data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set execution duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Render a float the way it reads in a conversation: integral values keep
/// one decimal place, everything else uses the shortest round-trip form.
pub fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

impl ToolExecutor {
    /// Create a new tool executor
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool
    pub fn register_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Resolve a tool by name
    pub fn resolve(&self, name: &str) -> std::result::Result<&dyn Tool, ToolError> {
        self.tools
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| ToolError::NotFound {
                name: name.to_string(),
                available: self.list_tools().join(", "),
            })
    }

    /// List all available tools, sorted by name
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Execute a tool-call request coming from the model.
    ///
    /// Never fails: malformed arguments, unknown tool names and tool errors
    /// all come back as error-valued results so the model can react to them.
    pub async fn execute(&self, request: &ToolCallRequest) -> ToolResult {
        let start_time = Instant::now();

        let outcome = match ToolCall::from_request(request) {
            Ok(call) => match self.resolve(&call.name) {
                Ok(tool) => tool.execute(call).await,
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        };
        let duration = start_time.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => result.with_duration(duration),
            Err(e) => {
                let message = match e {
                    Error::Tool(tool_error) => tool_error.to_string(),
                    other => other.to_string(),
                };
                tracing::warn!("Tool '{}' failed: {}", request.name, message);
                ToolResult::error(request.id.as_str(), message).with_duration(duration)
            }
        }
    }

    /// Get tool definitions for LLM function calling
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| {
                ToolDefinition::function(tool.name(), tool.description(), tool.parameters_schema())
            })
            .collect()
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}
