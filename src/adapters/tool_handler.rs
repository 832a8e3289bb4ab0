use crate::adapters::telephony::EmergencyDialer;
use crate::agents::llm::{CompletionRequest, LlmProvider};
use crate::agents::domain::Message;
use crate::domain::{Tool, ToolPort};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Tool routed to for general emotional or psychological queries
pub const SPECIALIST_TOOL: &str = "ask_mental_health_specialist";
/// Tool routed to when the user is in crisis
pub const EMERGENCY_TOOL: &str = "emergency_call_tool";
/// Tool routed to for local-therapist lookups
pub const THERAPIST_LOOKUP_TOOL: &str = "find_nearby_therapists_by_location";

const SPECIALIST_PERSONA: &str = "You are a warm, experienced therapist. Offer empathetic, \
                                  evidence-based guidance in a conversational tone. Keep the \
                                  reply focused on the user's concern.";

/// Format the fixed therapist directory for a location.
///
/// Pure and reproducible: identical input always yields the identical
/// string, byte for byte.
pub fn format_therapist_directory(location: &str) -> String {
    format!(
        "Here are some therapists near {}, {}:\n\
         - Dr. Ayesha Kapoor - +1 (555) 123-4567\n\
         - Dr. James Patel - +1 (555) 987-6543\n\
         - MindCare Counseling Center - +1 (555) 222-3333",
        location, location
    )
}

/// The three support tools exposed to the agent
pub struct SupportToolHandler {
    llm: Arc<dyn LlmProvider>,
    dialer: Arc<dyn EmergencyDialer>,
}

impl SupportToolHandler {
    pub fn new(llm: Arc<dyn LlmProvider>, dialer: Arc<dyn EmergencyDialer>) -> Self {
        Self { llm, dialer }
    }

    async fn answer_query(&self, query: &str) -> anyhow::Result<Value> {
        let request = CompletionRequest {
            messages: vec![Message::system(SPECIALIST_PERSONA), Message::user(query)],
            ..Default::default()
        };
        let response = self.llm.complete(request).await?;
        Ok(Value::String(response.message.content))
    }
}

#[async_trait]
impl ToolPort for SupportToolHandler {
    async fn execute_tool(&self, name: &str, args: Value) -> anyhow::Result<Value> {
        match name {
            SPECIALIST_TOOL => {
                let query = args.get("query").and_then(Value::as_str).unwrap_or_default();
                self.answer_query(query).await
            }
            EMERGENCY_TOOL => {
                self.dialer.place_call().await?;
                Ok(Value::Null)
            }
            THERAPIST_LOOKUP_TOOL => {
                let location = args
                    .get("location")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Ok(Value::String(format_therapist_directory(location)))
            }
            _ => Err(anyhow::anyhow!("Tool not found: {}", name)),
        }
    }

    async fn list_tools(&self) -> anyhow::Result<Vec<Tool>> {
        Ok(vec![
            Tool {
                name: SPECIALIST_TOOL.to_string(),
                description: "Generate a therapeutic response to the user's query. Use this for \
                              general emotional or mental health questions needing empathetic, \
                              evidence-based guidance in a conversational tone."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The user's question or concern"
                        }
                    },
                    "required": ["query"]
                }),
            },
            Tool {
                name: EMERGENCY_TOOL.to_string(),
                description: "Place an emergency call to the safety helpline. Use this only if \
                              the user expresses suicidal ideation, intent to self-harm, or \
                              describes a mental health emergency requiring immediate help."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            },
            Tool {
                name: THERAPIST_LOOKUP_TOOL.to_string(),
                description: "Find licensed therapists near the specified city or area. Returns \
                              a newline-separated list of therapist names and contact info."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "The city or area where the user is seeking therapy support"
                        }
                    },
                    "required": ["location"]
                }),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::telephony::TelephonyError;
    use crate::agents::error::LlmResult;
    use crate::agents::llm::{CompletionResponse, FinishReason};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedLlm(&'static str);

    #[async_trait]
    impl LlmProvider for CannedLlm {
        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned-model"
        }

        async fn complete(&self, _request: CompletionRequest) -> LlmResult<CompletionResponse> {
            Ok(CompletionResponse {
                message: Message::assistant(self.0),
                finish_reason: FinishReason::Stop,
                usage: None,
            })
        }
    }

    #[derive(Default)]
    struct CountingDialer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmergencyDialer for CountingDialer {
        async fn place_call(&self) -> Result<(), TelephonyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn handler_with(llm: &'static str, dialer: Arc<CountingDialer>) -> SupportToolHandler {
        SupportToolHandler::new(Arc::new(CannedLlm(llm)), dialer)
    }

    #[test]
    fn therapist_directory_is_reproducible() {
        let expected = "Here are some therapists near Kathmandu, Kathmandu:\n\
                        - Dr. Ayesha Kapoor - +1 (555) 123-4567\n\
                        - Dr. James Patel - +1 (555) 987-6543\n\
                        - MindCare Counseling Center - +1 (555) 222-3333";
        assert_eq!(format_therapist_directory("Kathmandu"), expected);
        assert_eq!(
            format_therapist_directory("Kathmandu"),
            format_therapist_directory("Kathmandu")
        );
    }

    #[tokio::test]
    async fn lookup_tool_returns_the_directory() {
        let handler = handler_with("unused", Arc::new(CountingDialer::default()));
        let result = handler
            .execute_tool(THERAPIST_LOOKUP_TOOL, json!({ "location": "Pokhara" }))
            .await
            .expect("lookup succeeds");

        assert_eq!(
            result,
            Value::String(format_therapist_directory("Pokhara"))
        );
    }

    #[tokio::test]
    async fn specialist_tool_delegates_to_the_llm() {
        let handler = handler_with(
            "It's okay to feel anxious...",
            Arc::new(CountingDialer::default()),
        );
        let result = handler
            .execute_tool(SPECIALIST_TOOL, json!({ "query": "I feel anxious" }))
            .await
            .expect("specialist succeeds");

        assert_eq!(result, Value::String("It's okay to feel anxious...".to_string()));
    }

    #[tokio::test]
    async fn emergency_tool_dials_and_returns_nothing() {
        let dialer = Arc::new(CountingDialer::default());
        let handler = handler_with("unused", dialer.clone());

        let result = handler
            .execute_tool(EMERGENCY_TOOL, json!({}))
            .await
            .expect("call succeeds");

        assert_eq!(result, Value::Null);
        assert_eq!(dialer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let handler = handler_with("unused", Arc::new(CountingDialer::default()));
        let result = handler.execute_tool("no_such_tool", json!({})).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn all_three_tools_are_listed() {
        let handler = handler_with("unused", Arc::new(CountingDialer::default()));
        let tools = handler.list_tools().await.expect("list succeeds");

        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![SPECIALIST_TOOL, EMERGENCY_TOOL, THERAPIST_LOOKUP_TOOL]
        );
    }
}
