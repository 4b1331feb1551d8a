//! Tools listing command

use anyhow::Result;
use fncall_core::tools::ToolRegistry;
use std::io::Write;
use tracing::info;

/// Show available tools
pub fn tools_command() -> Result<()> {
    info!("Listing available tools");

    let registry = ToolRegistry::default();
    let stdout = std::io::stdout();
    write_tool_listing(&registry, &mut stdout.lock())?;

    Ok(())
}

/// Describe every registered tool: name, summary, required parameters and
/// usage examples
pub fn write_tool_listing(registry: &ToolRegistry, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Available Tools\n")?;

    for name in registry.list_tools() {
        let Some(tool) = registry.create_tool(name) else {
            continue;
        };

        writeln!(out, "{}", tool.name())?;
        // First line of the description only, for brevity
        let description = tool.description();
        writeln!(out, "   {}", description.lines().next().unwrap_or(description))?;

        let schema = tool.parameters_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .map(|fields| fields.iter().filter_map(|f| f.as_str()).collect())
            .unwrap_or_default();
        if !required.is_empty() {
            writeln!(out, "   Required: {}", required.join(", "))?;
        }

        for example in tool.examples() {
            writeln!(
                out,
                "   e.g. {} -> {}",
                example.parameters, example.expected_result
            )?;
        }
        writeln!(out)?;
    }

    Ok(())
}
