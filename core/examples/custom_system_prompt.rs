//! Example: answer one prompt with a custom system prompt
//!
//! ```sh
//! OPENAI_API_KEY=sk-... cargo run -p fncall-core --example custom_system_prompt -- "What is 456 minus 44?"
//! ```

use fncall_core::{AgentBuilder, AgentConfig, Protocol, ResolvedLlmConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fncall_core::init_tracing();

    let api_key = std::env::var("OPENAI_API_KEY")?;
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is 5 plus 3?".to_string());

    let protocol = Protocol::OpenAICompat;
    let base_url = std::env::var("OPENAI_BASE_URL")
        .unwrap_or_else(|_| protocol.default_base_url().unwrap_or_default().to_string());
    let llm_config = ResolvedLlmConfig::new(protocol, base_url, api_key, "gpt-4o".to_string());

    // Arithmetic only, answered tersely
    let agent_config = AgentConfig {
        tools: vec!["add".to_string(), "subtract".to_string()],
        system_prompt: Some(
            "You are a terse calculator. Always use the add and subtract tools \
             and reply with the bare result."
                .to_string(),
        ),
        max_steps: Some(5),
        ..Default::default()
    };

    let agent = AgentBuilder::new(llm_config)
        .with_agent_config(agent_config)
        .build()?;

    let execution = agent.run(&prompt).await?;
    println!("Agent: {}", execution.final_result);
    println!(
        "({} step(s), {} tool call(s), {} tokens)",
        execution.steps_executed, execution.tool_calls_executed, execution.usage.total_tokens
    );

    Ok(())
}
