//! Configuration types for the support agent

use serde::{Deserialize, Serialize};

/// Configuration for the support agent
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// System prompt seeding every invocation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Maximum reason/act rounds per invocation
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Temperature override (if not set, uses LLM config default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Max tokens override (if not set, uses LLM config default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            max_iterations: default_max_iterations(),
            temperature: None,
            max_tokens: None,
        }
    }
}

fn default_system_prompt() -> String {
    "You are an AI engine supporting mental health conversations with warmth and vigilance.\n\
     You have access to three tools:\n\n\
     1. `ask_mental_health_specialist`: use this to answer emotional or psychological queries with therapeutic guidance.\n\
     2. `find_nearby_therapists_by_location`: use this if the user asks about nearby therapists or local professional help would be beneficial.\n\
     3. `emergency_call_tool`: use this immediately if the user expresses suicidal thoughts, self-harm intentions, or is in crisis.\n\n\
     Always take necessary action. Respond kindly, clearly, and supportively."
        .to_string()
}

fn default_max_iterations() -> u32 {
    10
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmProviderConfig {
    /// Provider type
    #[serde(default)]
    pub provider: LlmProviderType,
    /// Model name/identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable containing the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Custom base URL (for self-hosted or proxied endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Default temperature for completions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Default max tokens for completions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderType::default(),
            model: default_model(),
            api_key_env: None,
            base_url: None,
            temperature: Some(0.2),
            max_tokens: None,
        }
    }
}

fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

/// Supported LLM providers (both speak the OpenAI chat-completions dialect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// Groq (hosted open-weight models)
    #[default]
    Groq,
    /// OpenAI (GPT-4, GPT-3.5, etc.)
    OpenAI,
}

impl std::fmt::Display for LlmProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProviderType::Groq => write!(f, "groq"),
            LlmProviderType::OpenAI => write!(f, "openai"),
        }
    }
}
