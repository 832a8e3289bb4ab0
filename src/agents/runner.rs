//! ReAct-style agent runner (reason + act over the registered tools)

use std::sync::Arc;

use crate::agents::config::AgentConfig;
use crate::agents::domain::{
    AgentRunner, EventStream, EventStreamSender, Message, StepEvent, ToolDefinition,
};
use crate::agents::error::AgentError;
use crate::agents::llm::{CompletionRequest, LlmProvider};
use crate::domain::ToolPort;

/// Agent runner driving the reason/act loop against the tool registry.
///
/// Each round asks the model for a completion with the tool definitions
/// attached, publishes the model's message as an agent-phase event, then
/// executes any requested tool calls and publishes their results as a
/// tools-phase event before the next round. A round without tool calls
/// ends the invocation.
pub struct ReactRunner {
    config: AgentConfig,
    llm: Arc<dyn LlmProvider>,
    tools: Arc<dyn ToolPort>,
}

impl ReactRunner {
    /// Create a new runner
    pub fn new(config: AgentConfig, llm: Arc<dyn LlmProvider>, tools: Arc<dyn ToolPort>) -> Self {
        Self { config, llm, tools }
    }

    async fn run(
        config: AgentConfig,
        llm: Arc<dyn LlmProvider>,
        tools: Arc<dyn ToolPort>,
        seed: Vec<Message>,
        sender: EventStreamSender,
    ) {
        let mut messages = seed;
        let definitions = Self::tool_definitions(&tools).await;

        for _ in 0..config.max_iterations {
            let request = CompletionRequest {
                messages: messages.clone(),
                model: None,
                temperature: config.temperature,
                max_tokens: config.max_tokens,
                tools: if definitions.is_empty() {
                    None
                } else {
                    Some(definitions.clone())
                },
            };

            let response = match llm.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    let _ = sender.send_error(e.into()).await;
                    return;
                }
            };

            let assistant = response.message;
            let tool_calls = assistant.requested_calls().to_vec();

            if sender.send(StepEvent::agent(vec![assistant.clone()])).await.is_err() {
                return;
            }
            messages.push(assistant);

            if tool_calls.is_empty() {
                return;
            }

            let mut results = Vec::with_capacity(tool_calls.len());
            for call in &tool_calls {
                tracing::info!(tool = %call.name, "executing tool call");
                match tools.execute_tool(&call.name, call.arguments.clone()).await {
                    Ok(output) => {
                        results.push(Message::tool_result(&call.id, &call.name, &output));
                    }
                    Err(e) => {
                        let _ = sender
                            .send_error(AgentError::ToolExecution(e.to_string()))
                            .await;
                        return;
                    }
                }
            }

            messages.extend(results.iter().cloned());
            if sender.send(StepEvent::tools(results)).await.is_err() {
                return;
            }
        }

        // Iteration budget exhausted: close the stream and let the
        // classifier work with whatever the trace holds.
        tracing::warn!(
            max_iterations = config.max_iterations,
            "agent stopped without a final answer"
        );
    }

    async fn tool_definitions(tools: &Arc<dyn ToolPort>) -> Vec<ToolDefinition> {
        match tools.list_tools().await {
            Ok(tools) => tools
                .into_iter()
                .map(|t| ToolDefinition {
                    name: t.name,
                    description: t.description,
                    parameters: t.input_schema,
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl AgentRunner for ReactRunner {
    fn invoke(&self, seed: Vec<Message>) -> EventStream {
        let (sender, stream) = EventStream::channel(64);

        let config = self.config.clone();
        let llm = self.llm.clone();
        let tools = self.tools.clone();

        tokio::spawn(async move {
            Self::run(config, llm, tools, seed, sender).await;
        });

        stream
    }
}
