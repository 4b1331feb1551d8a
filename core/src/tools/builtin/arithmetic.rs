//! Arithmetic tools: `add` and `subtract`

use crate::error::{Result, ToolError};
use crate::impl_tool_factory;
use crate::tools::{Tool, ToolCall, ToolExample, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

const REQUIRED: [&str; 2] = ["a", "b"];

/// Arguments accepted by both arithmetic tools.
///
/// Fields stay untyped here so that an absent operand and a non-numeric
/// operand can be reported differently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArithmeticArgs {
    #[serde(default)]
    pub a: Option<Value>,
    #[serde(default)]
    pub b: Option<Value>,
}

/// Adds two numbers.
pub fn add(a: Option<&Value>, b: Option<&Value>) -> std::result::Result<f64, ToolError> {
    let (a, b) = operands("add", a, b)?;
    Ok(a + b)
}

/// Subtracts `b` from `a`.
pub fn subtract(a: Option<&Value>, b: Option<&Value>) -> std::result::Result<f64, ToolError> {
    let (a, b) = operands("subtract", a, b)?;
    Ok(a - b)
}

fn operands(
    tool: &str,
    a: Option<&Value>,
    b: Option<&Value>,
) -> std::result::Result<(f64, f64), ToolError> {
    let missing: Vec<String> = [("a", a), ("b", b)]
        .into_iter()
        .filter(|(_, value)| value.map_or(true, Value::is_null))
        .map(|(name, _)| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ToolError::MissingArguments {
            tool: tool.to_string(),
            missing,
            required: REQUIRED.iter().map(|s| s.to_string()).collect(),
        });
    }

    // Both present and non-null at this point
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    Ok((coerce(tool, "a", a)?, coerce(tool, "b", b)?))
}

/// Accept JSON numbers and strings that parse as a finite number
fn coerce(tool: &str, field: &str, value: &Value) -> std::result::Result<f64, ToolError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| ToolError::NotNumeric {
            tool: tool.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn arithmetic_schema(a_description: &str, b_description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "a": {
                "type": "number",
                "description": a_description
            },
            "b": {
                "type": "number",
                "description": b_description
            }
        },
        "required": REQUIRED
    })
}

/// Tool wrapper around [`add`]
pub struct AddTool;

impl AddTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AddTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Adds two numbers together. Use this for all addition operations."
    }

    fn parameters_schema(&self) -> Value {
        arithmetic_schema("The first number.", "The second number.")
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args: ArithmeticArgs = call.parse_arguments()?;
        let sum = add(args.a.as_ref(), args.b.as_ref())?;
        Ok(ToolResult::number(call.id, sum))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "Add 5 and 3".to_string(),
            parameters: json!({"a": 5, "b": 3}),
            expected_result: "8.0".to_string(),
        }]
    }
}

/// Tool wrapper around [`subtract`]
pub struct SubtractTool;

impl SubtractTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SubtractTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SubtractTool {
    fn name(&self) -> &str {
        "subtract"
    }

    fn description(&self) -> &str {
        "Subtracts one number from another. Use this for all subtraction operations."
    }

    fn parameters_schema(&self) -> Value {
        arithmetic_schema("The number to subtract from.", "The number to subtract.")
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args: ArithmeticArgs = call.parse_arguments()?;
        let difference = subtract(args.a.as_ref(), args.b.as_ref())?;
        Ok(ToolResult::number(call.id, difference))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "Subtract 44 from 456".to_string(),
            parameters: json!({"a": 456, "b": 44}),
            expected_result: "412.0".to_string(),
        }]
    }
}

impl_tool_factory!(
    AddToolFactory,
    AddTool,
    "add",
    "Adds two numbers together. Use this for all addition operations."
);

impl_tool_factory!(
    SubtractToolFactory,
    SubtractTool,
    "subtract",
    "Subtracts one number from another. Use this for all subtraction operations."
);
