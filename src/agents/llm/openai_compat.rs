//! Chat-completions provider for OpenAI-dialect APIs (Groq, OpenAI)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;

use super::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider, TokenUsage};
use crate::agents::config::LlmProviderConfig;
use crate::agents::domain::{Message, Role, ToolCall};
use crate::agents::error::{LlmError, LlmResult};

/// Provider for any endpoint speaking the OpenAI chat-completions dialect
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    name: &'static str,
    api_key_env: String,
    base_url: String,
    model: String,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
}

impl OpenAiCompatProvider {
    /// Create a provider pointed at Groq
    pub fn groq(config: &LlmProviderConfig) -> Self {
        Self::with_defaults(config, "groq", "GROQ_API_KEY", "https://api.groq.com/openai/v1")
    }

    /// Create a provider pointed at OpenAI
    pub fn openai(config: &LlmProviderConfig) -> Self {
        Self::with_defaults(config, "openai", "OPENAI_API_KEY", "https://api.openai.com/v1")
    }

    fn with_defaults(
        config: &LlmProviderConfig,
        name: &'static str,
        default_key_env: &str,
        default_base_url: &str,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            name,
            api_key_env: config
                .api_key_env
                .clone()
                .unwrap_or_else(|| default_key_env.to_string()),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| default_base_url.to_string()),
            model: config.model.clone(),
            default_temperature: config.temperature,
            default_max_tokens: config.max_tokens,
        }
    }

    /// Resolve the API key from the environment.
    ///
    /// Resolution happens per call so a missing credential surfaces as a
    /// delegate failure, not a startup one.
    fn api_key(&self) -> LlmResult<String> {
        env::var(&self.api_key_env).map_err(|_| {
            LlmError::Authentication(format!(
                "Environment variable {} not set",
                self.api_key_env
            ))
        })
    }

    /// Build the request body for the chat-completions endpoint
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": request.model.as_ref().unwrap_or(&self.model),
            "messages": self.convert_messages(&request.messages),
        });

        if let Some(temp) = request.temperature.or(self.default_temperature) {
            body["temperature"] = json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens.or(self.default_max_tokens) {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(tools) = &request.tools {
            if !tools.is_empty() {
                body["tools"] = json!(tools.iter().map(|t| {
                    // The endpoint requires at minimum {"type": "object"}
                    // for function parameters.
                    let params = if t.parameters.is_null()
                        || t.parameters.as_object().map_or(true, |o| o.is_empty())
                    {
                        json!({
                            "type": "object",
                            "properties": {},
                            "required": []
                        })
                    } else if t.parameters.get("type").is_none() {
                        let mut p = t.parameters.clone();
                        if let Some(obj) = p.as_object_mut() {
                            obj.insert("type".to_string(), json!("object"));
                        }
                        p
                    } else {
                        t.parameters.clone()
                    };
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": params
                        }
                    })
                }).collect::<Vec<_>>());
            }
        }

        body
    }

    /// Convert internal messages to the wire format
    fn convert_messages(&self, messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| {
                let mut msg = json!({
                    "role": match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                        Role::Tool => "tool",
                    },
                    "content": m.content,
                });

                if let Some(tool_calls) = &m.tool_calls {
                    msg["tool_calls"] = json!(tool_calls.iter().map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": serde_json::to_string(&tc.arguments).unwrap_or_default()
                            }
                        })
                    }).collect::<Vec<_>>());
                }

                if let Some(tool_call_id) = &m.tool_call_id {
                    msg["tool_call_id"] = json!(tool_call_id);
                }

                if let Some(name) = &m.name {
                    msg["name"] = json!(name);
                }

                msg
            })
            .collect()
    }

    fn parse_response(&self, response: &ChatCompletionResponse) -> LlmResult<CompletionResponse> {
        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::Parse("No choices in response".to_string()))?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .as_ref()
            .map(|tcs| {
                tcs.iter()
                    .map(|tc| ToolCall {
                        id: tc.id.clone(),
                        name: tc.function.name.clone(),
                        arguments: serde_json::from_str(&tc.function.arguments)
                            .unwrap_or(Value::Object(Default::default())),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let message = if tool_calls.is_empty() {
            Message::assistant(choice.message.content.clone().unwrap_or_default())
        } else {
            Message::assistant_with_tools(
                choice.message.content.clone().unwrap_or_default(),
                tool_calls,
            )
        };

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            Some("tool_calls") => FinishReason::ToolCalls,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let usage = response.usage.as_ref().map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(CompletionResponse {
            message,
            finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let api_key = self.api_key()?;
        let body = self.build_request_body(&request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse response: {}", e)))?;

        self.parse_response(&completion)
    }
}

// Wire-format response types

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatToolCall {
    id: String,
    function: ChatFunction,
}

#[derive(Debug, Deserialize)]
struct ChatFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::domain::ToolDefinition;

    fn provider() -> OpenAiCompatProvider {
        OpenAiCompatProvider::groq(&LlmProviderConfig::default())
    }

    #[test]
    fn tool_schemas_are_normalized() {
        let request = CompletionRequest {
            messages: vec![Message::user("hi")],
            tools: Some(vec![ToolDefinition::new("noop", "does nothing", Value::Null)]),
            ..Default::default()
        };

        let body = provider().build_request_body(&request);
        let params = &body["tools"][0]["function"]["parameters"];
        assert_eq!(params["type"], "object");
    }

    #[test]
    fn tool_call_arguments_are_encoded_as_strings() {
        let message = Message::assistant_with_tools(
            "",
            vec![ToolCall::new(
                "call_1",
                "find_nearby_therapists_by_location",
                serde_json::json!({ "location": "Kathmandu" }),
            )],
        );

        let wire = provider().convert_messages(&[message]);
        let arguments = wire[0]["tool_calls"][0]["function"]["arguments"]
            .as_str()
            .expect("arguments serialized as a JSON string");
        assert!(arguments.contains("Kathmandu"));
    }

    #[test]
    fn missing_api_key_is_an_authentication_error() {
        let config = LlmProviderConfig {
            api_key_env: Some("SOLACE_TEST_UNSET_KEY".to_string()),
            ..Default::default()
        };
        let provider = OpenAiCompatProvider::groq(&config);

        match provider.api_key() {
            Err(LlmError::Authentication(msg)) => assert!(msg.contains("SOLACE_TEST_UNSET_KEY")),
            other => panic!("expected authentication error, got {:?}", other.map(|_| ())),
        }
    }
}
