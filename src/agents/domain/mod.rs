//! Domain types for the support agent
//!
//! Core abstractions: conversation messages, tool calls, and the step
//! events that make up one invocation's execution trace.

mod event;
mod message;
mod tool_call;

pub use event::*;
pub use message::*;
pub use tool_call::*;

/// Port trait for one agent invocation.
///
/// The event-stream shape produced by an invocation is an external
/// contract; keeping it behind this narrow interface lets the classifier
/// and the chat handler be exercised with synthetic event sequences.
pub trait AgentRunner: Send + Sync {
    /// Invoke the agent with a conversation seed, producing the ordered
    /// trace of step events for this invocation.
    fn invoke(&self, seed: Vec<Message>) -> EventStream;
}
