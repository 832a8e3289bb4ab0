//! # Solace - Mental-Health Support Agent Service
//!
//! Solace wires an LLM-driven agent to three callable tools - a
//! therapeutic-response generator, an emergency-call trigger, and a
//! static therapist lookup - behind a thin chat API, with an embedded
//! chat web UI.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use solace::config::Settings;
//!
//! fn main() -> anyhow::Result<()> {
//!     // Load configuration (solace.toml + SOLACE_* env overrides)
//!     let settings = Settings::new()?;
//!
//!     // Server will start on configured host:port
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: tool registry port and agent trace types
//! - **Agents**: the reason/act runner, LLM provider, and the trace
//!   classifier that reduces one invocation to `(tool_called, response)`
//! - **Adapters**: HTTP handlers, the three tools, telephony, UI
//! - **Config**: configuration management

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::chat_handler::{self, ChatState};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::metrics_handler::MetricsHandler;
use crate::adapters::ui_handler::UiHandler;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `chat_state` - Agent runner wiring for the chat endpoint
/// * `health_handler` - Health check handler
/// * `metrics_handler` - Metrics collection handler
///
/// # Returns
///
/// Configured Axum Router
pub fn create_app(
    chat_state: ChatState,
    health_handler: Arc<HealthHandler>,
    metrics_handler: Arc<MetricsHandler>,
) -> Router {
    // Health check endpoints
    let health_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    // Chat endpoint
    let chat_router = Router::new()
        .route("/ask", post(chat_handler::ask))
        .with_state(chat_state);

    let router = health_router
        .route("/metrics", get({
            let handler = metrics_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.metrics().await }
            }
        }))
        .merge(chat_router)
        // Chat UI
        .fallback(UiHandler::serve);

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
