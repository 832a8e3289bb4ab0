//! Step events and the invocation event stream

use futures::Stream;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use super::Message;
use crate::agents::error::AgentError;

/// One unit of the agent's execution trace, tagged by phase.
///
/// The `agent` phase carries messages authored by the model in one round;
/// the `tools` phase carries the results of that round's tool executions.
/// Either phase may be absent. Deserialization is lenient: an event
/// missing both phase keys is an empty event, and a phase whose payload
/// is not the expected shape degrades to an absent phase rather than an
/// error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepEvent {
    /// Model-authored messages for this step
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_phase")]
    pub agent: Option<PhaseMessages>,
    /// Tool results for this step
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_phase")]
    pub tools: Option<PhaseMessages>,
}

/// The ordered message payload of one phase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseMessages {
    /// Messages emitted in this phase, in order
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<Message>,
}

impl StepEvent {
    /// Create an agent-phase event
    pub fn agent(messages: Vec<Message>) -> Self {
        Self {
            agent: Some(PhaseMessages { messages }),
            tools: None,
        }
    }

    /// Create a tools-phase event
    pub fn tools(messages: Vec<Message>) -> Self {
        Self {
            agent: None,
            tools: Some(PhaseMessages { messages }),
        }
    }

    /// Messages in the agent phase, empty if the phase is absent
    pub fn agent_messages(&self) -> &[Message] {
        self.agent.as_ref().map(|p| p.messages.as_slice()).unwrap_or(&[])
    }

    /// Messages in the tools phase, empty if the phase is absent
    pub fn tool_messages(&self) -> &[Message] {
        self.tools.as_ref().map(|p| p.messages.as_slice()).unwrap_or(&[])
    }
}

/// Accept a malformed phase payload by degrading it to `None`
fn lenient_phase<'de, D>(deserializer: D) -> Result<Option<PhaseMessages>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Accept a non-list `messages` payload by degrading it to an empty list
fn lenient_messages<'de, D>(deserializer: D) -> Result<Vec<Message>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Ordered stream of step events from one agent invocation
pub struct EventStream {
    receiver: mpsc::Receiver<Result<StepEvent, AgentError>>,
}

impl EventStream {
    /// Create an event stream from a channel receiver
    pub fn new(receiver: mpsc::Receiver<Result<StepEvent, AgentError>>) -> Self {
        Self { receiver }
    }

    /// Create a channel pair for building an event stream
    pub fn channel(buffer: usize) -> (EventStreamSender, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (EventStreamSender { sender: tx }, Self { receiver: rx })
    }

    /// Drain the stream to completion, returning the full trace in order.
    ///
    /// The first error produced by the invocation aborts the drain and
    /// propagates to the caller.
    pub async fn collect(mut self) -> Result<Vec<StepEvent>, AgentError> {
        let mut events = Vec::new();
        while let Some(result) = self.receiver.recv().await {
            events.push(result?);
        }
        Ok(events)
    }
}

impl Stream for EventStream {
    type Item = Result<StepEvent, AgentError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

/// Sender half for building an event stream
pub struct EventStreamSender {
    sender: mpsc::Sender<Result<StepEvent, AgentError>>,
}

impl EventStreamSender {
    /// Send a step event
    pub async fn send(
        &self,
        event: StepEvent,
    ) -> Result<(), mpsc::error::SendError<Result<StepEvent, AgentError>>> {
        self.sender.send(Ok(event)).await
    }

    /// Send an error
    pub async fn send_error(
        &self,
        error: AgentError,
    ) -> Result<(), mpsc::error::SendError<Result<StepEvent, AgentError>>> {
        self.sender.send(Err(error)).await
    }

    /// Check if the receiver is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
