//! Reduction of an invocation trace to a chat outcome
//!
//! The agent interleaves "the model requested tool X" events with
//! "tool X returned Y" events across possibly multiple rounds. This
//! module collapses that trace to the pair the chat boundary reports:
//! which tool fired last, and the latest meaningful text.

use serde::{Deserialize, Serialize};

use super::domain::StepEvent;

/// Sentinel tool name reported when no tool was invoked
pub const NO_TOOL: &str = "None";

/// The outcome of classifying one invocation's event trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Name of the most recently requested tool, or [`NO_TOOL`]
    pub tool_called: String,
    /// Latest non-empty text emitted by the agent or a tool
    pub response: Option<String>,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            tool_called: NO_TOOL.to_string(),
            response: None,
        }
    }
}

/// Reduce an ordered event trace to a [`Classification`].
///
/// Last write wins, in event order:
/// - an agent message requesting tool calls sets the tool name to the
///   first requested call (and its text, if any, is ignored; such
///   messages carry a dispatch request, not final content);
/// - an agent message with non-empty text sets the response;
/// - a tools message with non-empty text unconditionally overwrites the
///   response, so a tool's literal output survives an earlier agent
///   restatement in the same round.
///
/// Malformed events have already been degraded to empty phases during
/// deserialization; this function never fails and keeps no state between
/// calls.
pub fn classify(events: &[StepEvent]) -> Classification {
    let mut outcome = Classification::default();

    for event in events {
        for message in event.agent_messages() {
            let calls = message.requested_calls();
            if let Some(first) = calls.first() {
                outcome.tool_called = first.name.clone();
            } else if !message.content.is_empty() {
                outcome.response = Some(message.content.clone());
            }
        }

        for message in event.tool_messages() {
            if !message.content.is_empty() {
                outcome.response = Some(message.content.clone());
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::domain::{Message, ToolCall};
    use serde_json::json;

    fn lookup_call(id: &str) -> ToolCall {
        ToolCall::new(
            id,
            "find_nearby_therapists_by_location",
            json!({ "location": "Kathmandu" }),
        )
    }

    #[test]
    fn empty_trace_yields_defaults() {
        let outcome = classify(&[]);
        assert_eq!(outcome.tool_called, NO_TOOL);
        assert_eq!(outcome.response, None);
    }

    #[test]
    fn events_without_phases_yield_defaults() {
        let events = vec![StepEvent::default(), StepEvent::default()];
        let outcome = classify(&events);
        assert_eq!(outcome.tool_called, NO_TOOL);
        assert_eq!(outcome.response, None);
    }

    #[test]
    fn tool_request_then_tool_result() {
        let directory = "Here are some therapists near Kathmandu, Kathmandu:";
        let events = vec![
            StepEvent::agent(vec![Message::assistant_with_tools(
                "",
                vec![lookup_call("call_1")],
            )]),
            StepEvent::tools(vec![Message::tool_result(
                "call_1",
                "find_nearby_therapists_by_location",
                &json!(directory),
            )]),
        ];

        let outcome = classify(&events);
        assert_eq!(outcome.tool_called, "find_nearby_therapists_by_location");
        assert_eq!(outcome.response.as_deref(), Some(directory));
    }

    #[test]
    fn plain_agent_text_without_tools() {
        let events = vec![StepEvent::agent(vec![Message::assistant("Hello")])];

        let outcome = classify(&events);
        assert_eq!(outcome.tool_called, NO_TOOL);
        assert_eq!(outcome.response.as_deref(), Some("Hello"));
    }

    #[test]
    fn agent_text_alongside_tool_request_is_ignored() {
        let events = vec![StepEvent::agent(vec![Message::assistant_with_tools(
            "Let me look that up for you.",
            vec![lookup_call("call_1")],
        )])];

        let outcome = classify(&events);
        assert_eq!(outcome.tool_called, "find_nearby_therapists_by_location");
        assert_eq!(outcome.response, None);
    }

    #[test]
    fn tool_text_overwrites_earlier_agent_text() {
        let events = vec![
            StepEvent::agent(vec![Message::assistant("Checking the directory.")]),
            StepEvent::agent(vec![Message::assistant_with_tools(
                "",
                vec![lookup_call("call_1")],
            )]),
            StepEvent::tools(vec![Message::tool_result(
                "call_1",
                "find_nearby_therapists_by_location",
                &json!("directory text"),
            )]),
        ];

        let outcome = classify(&events);
        assert_eq!(outcome.response.as_deref(), Some("directory text"));
    }

    #[test]
    fn later_agent_text_overwrites_tool_text() {
        let events = vec![
            StepEvent::agent(vec![Message::assistant_with_tools(
                "",
                vec![lookup_call("call_1")],
            )]),
            StepEvent::tools(vec![Message::tool_result(
                "call_1",
                "find_nearby_therapists_by_location",
                &json!("directory text"),
            )]),
            StepEvent::agent(vec![Message::assistant("Here is what I found.")]),
        ];

        let outcome = classify(&events);
        assert_eq!(outcome.tool_called, "find_nearby_therapists_by_location");
        assert_eq!(outcome.response.as_deref(), Some("Here is what I found."));
    }

    #[test]
    fn voiceless_tool_leaves_response_absent() {
        let events = vec![
            StepEvent::agent(vec![Message::assistant_with_tools(
                "",
                vec![ToolCall::new("call_1", "emergency_call_tool", json!({}))],
            )]),
            StepEvent::tools(vec![Message::tool_result(
                "call_1",
                "emergency_call_tool",
                &serde_json::Value::Null,
            )]),
        ];

        let outcome = classify(&events);
        assert_eq!(outcome.tool_called, "emergency_call_tool");
        assert_eq!(outcome.response, None);
    }

    #[test]
    fn first_listed_call_wins_within_a_message() {
        let events = vec![StepEvent::agent(vec![Message::assistant_with_tools(
            "",
            vec![
                ToolCall::new("call_1", "emergency_call_tool", json!({})),
                lookup_call("call_2"),
            ],
        )])];

        let outcome = classify(&events);
        assert_eq!(outcome.tool_called, "emergency_call_tool");
    }

    #[test]
    fn classification_is_idempotent() {
        let events = vec![
            StepEvent::agent(vec![Message::assistant_with_tools(
                "",
                vec![lookup_call("call_1")],
            )]),
            StepEvent::tools(vec![Message::tool_result(
                "call_1",
                "find_nearby_therapists_by_location",
                &json!("directory text"),
            )]),
        ];

        assert_eq!(classify(&events), classify(&events));
    }

    #[test]
    fn malformed_phase_payloads_degrade_silently() {
        // The phase key holds a string; "messages" holds a non-list.
        let raw = vec![
            json!({ "agent": "not an object" }),
            json!({ "tools": { "messages": 42 } }),
            json!({ "unrelated": { "messages": [] } }),
            json!({ "agent": { "messages": [{ "role": "assistant", "content": "Hi" }] } }),
        ];

        let events: Vec<StepEvent> = raw
            .into_iter()
            .map(|v| serde_json::from_value(v).expect("lenient decode"))
            .collect();

        let outcome = classify(&events);
        assert_eq!(outcome.tool_called, NO_TOOL);
        assert_eq!(outcome.response.as_deref(), Some("Hi"));
    }
}
