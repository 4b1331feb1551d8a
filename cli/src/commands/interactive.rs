//! Interactive mode command

use super::{build_agent, AgentOptions};
use crate::config::CliConfigLoader;
use anyhow::Result;
use fncall_core::Agent;
use std::process::ExitCode;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

/// One line of user input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// `exit` or `quit`, any case
    Exit,
    /// Blank line
    Skip,
    /// Anything else, trimmed
    Prompt(String),
}

impl InputCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Self::Skip
        } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            Self::Exit
        } else {
            Self::Prompt(trimmed.to_string())
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user quit or input ran out
    Quit,
    /// An agent run failed; the error was already shown
    RunFailed,
}

/// Start interactive mode
pub async fn interactive_command(
    config_loader: CliConfigLoader,
    options: AgentOptions,
) -> Result<ExitCode> {
    let agent = build_agent(&config_loader, &options).await?;
    debug!("Interactive session using {}", agent.agent_type());

    let stdin = BufReader::new(tokio::io::stdin());
    match run_repl(&agent, stdin, tokio::io::stdout()).await? {
        SessionEnd::Quit => Ok(ExitCode::SUCCESS),
        SessionEnd::RunFailed => Ok(ExitCode::FAILURE),
    }
}

/// Read prompts line by line and answer each one in a fresh conversation
pub async fn run_repl<R, W>(agent: &dyn Agent, reader: R, mut writer: W) -> Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(b"Agent is ready! Type 'exit' to quit.\n\n")
        .await?;

    let mut lines = reader.lines();
    let end = loop {
        writer.write_all(b"You: ").await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            writer.write_all(b"\nGoodbye!\n").await?;
            break SessionEnd::Quit;
        };

        match InputCommand::parse(&line) {
            InputCommand::Exit => {
                writer.write_all(b"Goodbye!\n").await?;
                break SessionEnd::Quit;
            }
            InputCommand::Skip => continue,
            InputCommand::Prompt(prompt) => match agent.execute_task(&prompt).await {
                Ok(execution) => {
                    let reply = format!("Agent: {}\n\n", execution.final_result);
                    writer.write_all(reply.as_bytes()).await?;
                }
                Err(e) => {
                    tracing::error!("Agent run failed: {}", e);
                    let reply = format!("Agent run failed: {}\n", e);
                    writer.write_all(reply.as_bytes()).await?;
                    break SessionEnd::RunFailed;
                }
            },
        }
    };

    writer.flush().await?;
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fncall_core::agent::{AgentExecution, AgentResult};
    use fncall_core::error::LlmError;
    use fncall_core::llm::Usage;
    use fncall_core::{AgentConfig, Conversation};
    use std::sync::Mutex;

    /// Echoes prompts back; fails on "boom"
    struct FakeAgent {
        config: AgentConfig,
        seen: Mutex<Vec<String>>,
    }

    impl FakeAgent {
        fn new() -> Self {
            Self {
                config: AgentConfig::default(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Agent for FakeAgent {
        async fn execute_task(&self, task: &str) -> AgentResult<AgentExecution> {
            self.seen.lock().unwrap().push(task.to_string());
            if task == "boom" {
                return Err(LlmError::RateLimit.into());
            }
            Ok(AgentExecution {
                final_result: format!("echo {}", task),
                steps_executed: 1,
                tool_calls_executed: 0,
                duration_ms: 0,
                usage: Usage::default(),
                conversation: Conversation::seed("sys", task),
            })
        }

        fn config(&self) -> &AgentConfig {
            &self.config
        }

        fn agent_type(&self) -> &str {
            "fake"
        }
    }

    async fn session(input: &str) -> (SessionEnd, String, Vec<String>) {
        let agent = FakeAgent::new();
        let mut out = Vec::new();
        let end = run_repl(&agent, input.as_bytes(), &mut out).await.unwrap();
        let seen = agent.seen.lock().unwrap().clone();
        (end, String::from_utf8(out).unwrap(), seen)
    }

    #[test]
    fn test_input_parsing() {
        assert_eq!(InputCommand::parse("  EXIT "), InputCommand::Exit);
        assert_eq!(InputCommand::parse("Quit"), InputCommand::Exit);
        assert_eq!(InputCommand::parse("   "), InputCommand::Skip);
        assert_eq!(
            InputCommand::parse("  What is 5 plus 3?\n"),
            InputCommand::Prompt("What is 5 plus 3?".to_string())
        );
        assert_eq!(
            InputCommand::parse("exit now"),
            InputCommand::Prompt("exit now".to_string())
        );
    }

    #[tokio::test]
    async fn test_prompts_then_exit() {
        let (end, out, seen) = session("What is 5 plus 3?\n\nhello\nexit\nignored\n").await;
        assert_eq!(end, SessionEnd::Quit);
        assert_eq!(seen, vec!["What is 5 plus 3?", "hello"]);
        assert!(out.starts_with("Agent is ready! Type 'exit' to quit.\n\n"));
        assert!(out.contains("Agent: echo What is 5 plus 3?\n\n"));
        assert!(out.contains("Agent: echo hello\n\n"));
        assert!(out.ends_with("You: Goodbye!\n"));
        assert!(!out.contains("ignored"));
    }

    #[tokio::test]
    async fn test_end_of_input_quits() {
        let (end, out, seen) = session("hello\n").await;
        assert_eq!(end, SessionEnd::Quit);
        assert_eq!(seen.len(), 1);
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_run_failure_ends_the_session() {
        let (end, out, seen) = session("boom\nhello\n").await;
        assert_eq!(end, SessionEnd::RunFailed);
        assert_eq!(seen, vec!["boom"]);
        assert!(out.contains("Agent run failed: LLM error: Rate limit exceeded"));
        assert!(!out.contains("Goodbye!"));
    }
}
