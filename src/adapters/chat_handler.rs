//! Chat endpoint: forward one message to the agent, classify, reply

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapters::metrics_handler::MetricsCollector;
use crate::agents::classifier::{classify, NO_TOOL};
use crate::agents::domain::{AgentRunner, Message};

/// Shared state for the chat endpoint
#[derive(Clone)]
pub struct ChatState {
    pub runner: Arc<dyn AgentRunner>,
    pub system_prompt: String,
    pub metrics: Arc<MetricsCollector>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: Option<String>,
    pub tool_called: String,
}

/// Handle one chat message.
///
/// Builds the two-message conversation seed, blocks on the full agent
/// run, and returns the classified outcome. Upstream failures surface as
/// a plain 500 with the error text.
pub async fn ask(
    State(state): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    state.metrics.chat_requests.inc();

    let seed = vec![
        Message::system(&state.system_prompt),
        Message::user(&request.message),
    ];

    let events = state.runner.invoke(seed).collect().await.map_err(|e| {
        tracing::error!("agent invocation failed: {}", e);
        state.metrics.chat_errors.inc();
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let outcome = classify(&events);
    if outcome.tool_called != NO_TOOL {
        state
            .metrics
            .tool_invocations
            .with_label_values(&[&outcome.tool_called])
            .inc();
    }

    Ok(Json(ChatResponse {
        response: outcome.response,
        tool_called: outcome.tool_called,
    }))
}
