//! AgentCore implementation

use super::config::AgentConfig;
use super::conversation::Conversation;
use crate::agent::{Agent, AgentExecution, AgentResult};
use crate::error::{AgentError, Result};
use crate::llm::{ChatOptions, LlmClient, LlmMessage, LlmResponse, ToolDefinition, Usage};
use crate::output::{AgentEvent, AgentOutput, ToolExecutionInfo};
use crate::tools::ToolExecutor;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// What a single model round produced
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The model answered without requesting tools
    Final(String),
    /// The model requested this many tool calls, all of them now answered
    ToolsExecuted(usize),
}

/// Function-calling agent: drives the model until it stops requesting tools
pub struct AgentCore {
    config: AgentConfig,
    llm_client: Arc<dyn LlmClient>,
    tool_executor: Arc<ToolExecutor>,
    chat_options: ChatOptions,
    output: Box<dyn AgentOutput>,
}

impl AgentCore {
    /// Assemble an agent from its parts; see [`super::AgentBuilder`]
    pub fn new(
        config: AgentConfig,
        llm_client: Arc<dyn LlmClient>,
        tool_executor: Arc<ToolExecutor>,
        chat_options: ChatOptions,
        output: Box<dyn AgentOutput>,
    ) -> Self {
        Self {
            config,
            llm_client,
            tool_executor,
            chat_options,
            output,
        }
    }

    /// Get agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Tools this agent can run
    pub fn tool_executor(&self) -> &ToolExecutor {
        &self.tool_executor
    }

    /// Run one prompt to completion in a fresh conversation.
    ///
    /// Tool failures become conversation content; model service failures,
    /// timeouts and an exhausted step budget end the run with an error.
    pub async fn run(&self, prompt: &str) -> Result<AgentExecution> {
        if prompt.trim().is_empty() {
            return Err(AgentError::InvalidTask {
                message: "prompt is empty".to_string(),
            }
            .into());
        }

        let run_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "agent_run",
            run_id = %run_id,
            model = %self.llm_client.model_name()
        );

        self.run_conversation(prompt, run_id).instrument(span).await
    }

    async fn run_conversation(&self, prompt: &str, run_id: String) -> Result<AgentExecution> {
        let start_time = Instant::now();
        let mut conversation = Conversation::seed(self.config.effective_system_prompt(), prompt);
        let tools = self.tool_executor.get_tool_definitions();

        tracing::info!("Starting agent run with {} tool(s)", tools.len());
        self.emit(AgentEvent::ExecutionStarted {
            run_id: run_id.clone(),
            prompt: prompt.to_string(),
        })
        .await;

        let mut usage = Usage::default();
        let mut step = 0;
        let mut tool_calls_executed = 0;

        loop {
            if let Some(max_steps) = self.config.max_steps {
                if step >= max_steps {
                    tracing::warn!("Step budget of {} exhausted", max_steps);
                    return Err(AgentError::MaxStepsExceeded { max_steps }.into());
                }
            }
            step += 1;

            match self
                .execute_step(step, &mut conversation, &tools, &mut usage)
                .await?
            {
                StepOutcome::ToolsExecuted(count) => {
                    tracing::debug!("Step {} executed {} tool call(s)", step, count);
                    tool_calls_executed += count;
                }
                StepOutcome::Final(final_result) => {
                    let duration_ms = start_time.elapsed().as_millis() as u64;
                    tracing::info!(
                        steps = step,
                        tool_calls = tool_calls_executed,
                        duration_ms,
                        "Agent run completed"
                    );

                    self.emit(AgentEvent::ExecutionCompleted {
                        run_id,
                        steps: step,
                        usage,
                        final_answer: final_result.clone(),
                    })
                    .await;

                    return Ok(AgentExecution {
                        final_result,
                        steps_executed: step,
                        tool_calls_executed,
                        duration_ms,
                        usage,
                        conversation,
                    });
                }
            }
        }
    }

    /// One model round: request a completion, then either finish or answer
    /// every requested tool call, in request order, before returning.
    async fn execute_step(
        &self,
        step: usize,
        conversation: &mut Conversation,
        tools: &[ToolDefinition],
        usage: &mut Usage,
    ) -> Result<StepOutcome> {
        conversation.ensure_tool_calls_answered()?;

        self.emit(AgentEvent::ModelRequest {
            step,
            message_count: conversation.len(),
        })
        .await;

        let response = match self
            .request_completion(conversation.messages().to_vec(), tools)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("LLM request failed for step {}: {}", step, e);
                return Err(e);
            }
        };

        if let Some(step_usage) = &response.usage {
            usage.accumulate(step_usage);
        }

        let message = response.message;
        if !message.has_tool_calls() {
            let answer = message.get_text().unwrap_or_default().to_string();
            conversation.push_assistant(message);
            return Ok(StepOutcome::Final(answer));
        }

        let requests = message.tool_calls().to_vec();
        conversation.push_assistant(message);

        for request in &requests {
            tracing::debug!("Executing tool '{}' ({})", request.name, request.id);
            self.emit(AgentEvent::ToolExecutionStarted {
                tool_info: ToolExecutionInfo::started(request),
            })
            .await;

            let result = self.tool_executor.execute(request).await;

            self.emit(AgentEvent::ToolExecutionCompleted {
                tool_info: ToolExecutionInfo::completed(request, &result),
            })
            .await;

            conversation.push_tool_result(request, &result);
        }

        Ok(StepOutcome::ToolsExecuted(requests.len()))
    }

    async fn request_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let tools = if tools.is_empty() {
            None
        } else {
            Some(tools.to_vec())
        };
        let request =
            self.llm_client
                .chat_completion(messages, tools, Some(self.chat_options.clone()));

        match self.config.request_timeout() {
            Some(limit) => tokio::time::timeout(limit, request).await?,
            None => request.await,
        }
    }

    async fn emit(&self, event: AgentEvent) {
        if let Err(e) = self.output.emit_event(event).await {
            tracing::debug!("Failed to emit agent event: {}", e);
        }
    }
}

#[async_trait]
impl Agent for AgentCore {
    async fn execute_task(&self, task: &str) -> AgentResult<AgentExecution> {
        self.run(task).await
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn agent_type(&self) -> &str {
        "function_calling_agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentBuilder;
    use crate::error::{Error, LlmError};
    use crate::llm::{FinishReason, MessageRole, ToolCallRequest};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned responses and records every request it receives
    struct ScriptedClient {
        responses: Mutex<VecDeque<Result<LlmResponse>>>,
        requests: Mutex<Vec<(Vec<LlmMessage>, usize)>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<LlmResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<(Vec<LlmMessage>, usize)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn chat_completion(
            &self,
            messages: Vec<LlmMessage>,
            tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmResponse> {
            let tool_count = tools.map(|t| t.len()).unwrap_or(0);
            self.requests.lock().unwrap().push((messages, tool_count));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::EmptyResponse.into()))
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }

    /// Answers every prompt with the prompt itself, after a short delay
    struct EchoClient;

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn chat_completion(
            &self,
            messages: Vec<LlmMessage>,
            _tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmResponse> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let prompt = messages
                .iter()
                .find(|m| m.role == MessageRole::User)
                .and_then(|m| m.get_text())
                .unwrap_or_default()
                .to_string();
            Ok(final_answer(&prompt))
        }

        fn model_name(&self) -> &str {
            "echo"
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }

    struct SlowClient;

    #[async_trait]
    impl LlmClient for SlowClient {
        async fn chat_completion(
            &self,
            _messages: Vec<LlmMessage>,
            _tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmResponse> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(final_answer("too late"))
        }

        fn model_name(&self) -> &str {
            "slow"
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }

    struct RecordingOutput {
        events: Arc<Mutex<Vec<AgentEvent>>>,
    }

    #[async_trait]
    impl AgentOutput for RecordingOutput {
        async fn emit_event(
            &self,
            event: AgentEvent,
        ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    struct FailingOutput;

    #[async_trait]
    impl AgentOutput for FailingOutput {
        async fn emit_event(
            &self,
            _event: AgentEvent,
        ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err("display closed".into())
        }
    }

    fn usage() -> Usage {
        Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }
    }

    fn final_answer(text: &str) -> LlmResponse {
        LlmResponse {
            message: LlmMessage::assistant(text),
            usage: Some(usage()),
            model: "mock-model".to_string(),
            finish_reason: Some(FinishReason::Stop),
        }
    }

    fn tool_calls(calls: Vec<ToolCallRequest>) -> LlmResponse {
        LlmResponse {
            message: LlmMessage::assistant_with_tool_calls(None, calls),
            usage: Some(usage()),
            model: "mock-model".to_string(),
            finish_reason: Some(FinishReason::ToolCalls),
        }
    }

    fn agent(client: Arc<ScriptedClient>) -> AgentCore {
        AgentBuilder::with_client(client).build().unwrap()
    }

    #[tokio::test]
    async fn test_single_tool_round_trip() {
        let client = ScriptedClient::new(vec![
            Ok(tool_calls(vec![ToolCallRequest::new(
                "call_1",
                "add",
                r#"{"a": 5, "b": 3}"#,
            )])),
            Ok(final_answer("5 plus 3 is 8.")),
        ]);
        let agent = agent(client.clone());

        let execution = agent.run("What is 5 plus 3?").await.unwrap();
        assert!(execution.final_result.contains('8'));
        assert_eq!(execution.steps_executed, 2);
        assert_eq!(execution.tool_calls_executed, 1);
        assert_eq!(execution.usage.total_tokens, 30);

        let requests = client.requests();
        assert_eq!(requests.len(), 2);

        let (first, tool_count) = &requests[0];
        assert_eq!(*tool_count, 3);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].role, MessageRole::System);
        assert_eq!(first[1].get_text(), Some("What is 5 plus 3?"));

        let (second, _) = &requests[1];
        assert_eq!(second.len(), 4);
        let tool_message = &second[3];
        assert_eq!(tool_message.role, MessageRole::Tool);
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_message.name.as_deref(), Some("add"));
        assert_eq!(tool_message.get_text(), Some("8.0"));

        assert_eq!(execution.conversation.len(), 5);
        assert!(execution.conversation.verify_tool_pairing().is_ok());
    }

    #[tokio::test]
    async fn test_direct_answer_makes_one_call() {
        let client = ScriptedClient::new(vec![
            Ok(final_answer("Please give me two numbers to add.")),
            Ok(final_answer("never requested")),
        ]);
        let agent = agent(client.clone());

        let execution = agent.run("Add a number to 5").await.unwrap();
        assert_eq!(execution.final_result, "Please give me two numbers to add.");
        assert_eq!(execution.steps_executed, 1);
        assert!(!execution.used_tools());
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_multiple_calls_are_answered_in_request_order() {
        let client = ScriptedClient::new(vec![
            Ok(tool_calls(vec![
                ToolCallRequest::new("call_sub", "subtract", r#"{"a": 456, "b": 44}"#),
                ToolCallRequest::new("call_wx", "get_current_weather", r#"{"city": "Tokyo"}"#),
                ToolCallRequest::new("call_add", "add", r#"{"a": 1, "b": 2}"#),
            ])),
            Ok(final_answer("412, sunny in Tokyo, and 3.")),
        ]);
        let agent = agent(client.clone());

        let execution = agent.run("Do three things").await.unwrap();
        assert_eq!(execution.tool_calls_executed, 3);

        let (second, _) = &client.requests()[1];
        let answers: Vec<(&str, &str)> = second[3..]
            .iter()
            .map(|m| {
                (
                    m.tool_call_id.as_deref().unwrap(),
                    m.get_text().unwrap_or_default(),
                )
            })
            .collect();
        assert_eq!(answers[0], ("call_sub", "412.0"));
        assert_eq!(answers[1].0, "call_wx");
        assert!(answers[1].1.contains("15°celsius"));
        assert_eq!(answers[2], ("call_add", "3.0"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_the_model() {
        let client = ScriptedClient::new(vec![
            Ok(tool_calls(vec![ToolCallRequest::new(
                "call_1",
                "multiply",
                r#"{"a": 2, "b": 3}"#,
            )])),
            Ok(final_answer("I can only add and subtract.")),
        ]);
        let agent = agent(client.clone());

        let execution = agent.run("What is 2 times 3?").await.unwrap();
        assert_eq!(execution.final_result, "I can only add and subtract.");

        let (second, _) = &client.requests()[1];
        let content = second[3].get_text().unwrap();
        assert!(content.contains("Unknown"));
        assert!(content.contains("multiply"));
    }

    #[tokio::test]
    async fn test_malformed_and_missing_arguments_do_not_abort() {
        let client = ScriptedClient::new(vec![
            Ok(tool_calls(vec![
                ToolCallRequest::new("call_1", "add", "{not json"),
                ToolCallRequest::new("call_2", "subtract", r#"{"a": 456}"#),
            ])),
            Ok(final_answer("Something was missing.")),
        ]);
        let agent = agent(client.clone());

        let execution = agent.run("Subtract from 456").await.unwrap();
        assert_eq!(execution.final_result, "Something was missing.");

        let (second, _) = &client.requests()[1];
        assert!(second[3].get_text().unwrap().contains("Invalid JSON"));
        assert!(second[4].get_text().unwrap().contains("'b'"));
    }

    #[tokio::test]
    async fn test_service_failure_propagates() {
        let client = ScriptedClient::new(vec![Err(LlmError::Authentication {
            message: "bad key".to_string(),
        }
        .into())]);
        let agent = agent(client.clone());

        let err = agent.run("What is 5 plus 3?").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Llm(LlmError::Authentication { .. })
        ));
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_service_failure_after_tool_round_propagates() {
        let client = ScriptedClient::new(vec![
            Ok(tool_calls(vec![ToolCallRequest::new(
                "call_1",
                "add",
                r#"{"a": 1, "b": 1}"#,
            )])),
            Err(LlmError::RateLimit.into()),
        ]);
        let agent = agent(client);

        let err = agent.run("1 + 1").await.unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::RateLimit)));
    }

    #[test]
    fn test_step_budget() {
        let looping = || -> Result<LlmResponse> {
            Ok(tool_calls(vec![ToolCallRequest::new(
                "call",
                "add",
                r#"{"a": 1, "b": 1}"#,
            )]))
        };
        let client = ScriptedClient::new(vec![looping(), looping(), looping()]);
        let agent = AgentBuilder::with_client(client.clone())
            .with_max_steps(2)
            .build()
            .unwrap();

        let err = tokio_test::block_on(agent.run("keep adding")).unwrap_err();
        assert!(matches!(
            err,
            Error::Agent(AgentError::MaxStepsExceeded { max_steps: 2 })
        ));
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let agent = AgentBuilder::with_client(Arc::new(SlowClient))
            .with_request_timeout(Duration::from_millis(20))
            .build()
            .unwrap();

        let err = agent.run("hello").await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected_without_a_model_call() {
        let client = ScriptedClient::new(vec![Ok(final_answer("unused"))]);
        let agent = agent(client.clone());

        let err = agent.run("   ").await.unwrap_err();
        assert!(matches!(err, Error::Agent(AgentError::InvalidTask { .. })));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_custom_system_prompt_is_sent_first() {
        let client = ScriptedClient::new(vec![Ok(final_answer("ok"))]);
        let agent = AgentBuilder::with_client(client.clone())
            .with_system_prompt(Some("Be brief.".to_string()))
            .with_tools(vec!["add".to_string()])
            .build()
            .unwrap();

        agent.run("hi").await.unwrap();
        let (first, tool_count) = &client.requests()[0];
        assert_eq!(first[0].get_text(), Some("Be brief."));
        assert_eq!(*tool_count, 1);
    }

    #[tokio::test]
    async fn test_events_follow_the_run() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let client = ScriptedClient::new(vec![
            Ok(tool_calls(vec![ToolCallRequest::new(
                "call_1",
                "add",
                r#"{"a": 5, "b": 3}"#,
            )])),
            Ok(final_answer("8")),
        ]);
        let agent = AgentBuilder::with_client(client)
            .with_output(Box::new(RecordingOutput {
                events: events.clone(),
            }))
            .build()
            .unwrap();

        agent.run("What is 5 plus 3?").await.unwrap();

        let events = events.lock().unwrap();
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                AgentEvent::ExecutionStarted { .. } => "started",
                AgentEvent::ModelRequest { .. } => "model",
                AgentEvent::ToolExecutionStarted { .. } => "tool_started",
                AgentEvent::ToolExecutionCompleted { .. } => "tool_completed",
                AgentEvent::ExecutionCompleted { .. } => "completed",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["started", "model", "tool_started", "tool_completed", "model", "completed"]
        );

        match &events[3] {
            AgentEvent::ToolExecutionCompleted { tool_info } => {
                assert_eq!(tool_info.tool_name, "add");
                assert_eq!(tool_info.result.as_deref(), Some("8.0"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_output_failures_do_not_abort_the_run() {
        let client = ScriptedClient::new(vec![Ok(final_answer("fine"))]);
        let agent = AgentBuilder::with_client(client)
            .with_output(Box::new(FailingOutput))
            .build()
            .unwrap();

        assert_eq!(agent.run("hi").await.unwrap().final_result, "fine");
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_independent() {
        let agent = AgentBuilder::with_client(Arc::new(EchoClient))
            .build()
            .unwrap();

        let prompts: Vec<String> = (0..5).map(|i| format!("prompt {}", i)).collect();
        let runs = prompts.iter().map(|p| agent.execute_task(p));
        let results = futures::future::join_all(runs).await;

        for (prompt, result) in prompts.iter().zip(results) {
            let execution = result.unwrap();
            assert_eq!(&execution.final_result, prompt);
            assert_eq!(execution.conversation.len(), 3);
        }
    }

    #[test]
    fn test_agent_type() {
        let agent = agent(ScriptedClient::new(Vec::new()));
        assert_eq!(agent.agent_type(), "function_calling_agent");
        assert_eq!(Agent::config(&agent).tools.len(), 3);
    }
}
