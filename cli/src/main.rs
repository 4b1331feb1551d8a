//! # fncall CLI
//!
//! Command-line interface for fncall - a minimal function-calling agent.
//!
//! ## Usage
//!
//! - `fncall` - Start interactive mode
//! - `fncall "What is 5 plus 3?"` - Answer a single prompt
//! - `fncall tools` - Show available tools

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;
mod output;

use commands::{interactive_command, run_command, tools_command, AgentOptions};
use config::CliConfigLoader;

/// fncall - A minimal function-calling conversational agent
#[derive(Parser)]
#[command(name = "fncall")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A minimal function-calling conversational agent")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Protocol to use (openai)
    #[arg(long)]
    protocol: Option<String>,

    /// API key override
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Maximum number of model calls per prompt
    #[arg(long)]
    max_steps: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Replace the built-in system prompt
    #[arg(long)]
    system_prompt: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Show model rounds and tool executions
    #[arg(short = 'd', long = "debug")]
    debug_output: bool,

    /// The prompt to answer (if provided, runs in single-shot mode)
    task: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available tools
    Tools,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(protocol) = &cli.protocol {
        loader = loader.with_protocol_override(protocol.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so the transcript on stdout stays clean
    let filter = if cli.verbose || cli.debug_output {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_loader = build_config_loader(&cli);
    let options = AgentOptions {
        max_steps: cli.max_steps,
        timeout_secs: cli.timeout,
        system_prompt: cli.system_prompt,
        debug_output: cli.debug_output,
    };

    match (cli.task, cli.command) {
        (Some(task), None) => run_command(task, config_loader, options).await,
        (Some(_), Some(_)) => {
            tracing::error!("Cannot specify both a prompt and a subcommand");
            Ok(ExitCode::FAILURE)
        }
        (None, Some(Commands::Tools)) => {
            tools_command()?;
            Ok(ExitCode::SUCCESS)
        }
        (None, None) => interactive_command(config_loader, options).await,
    }
}
