use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct MetricsCollector {
    registry: Registry,

    // Chat metrics
    pub chat_requests: Counter,
    pub chat_errors: Counter,

    // Tool metrics
    pub tool_invocations: CounterVec,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let chat_requests = Counter::new("solace_chat_requests_total", "Total chat requests")?;
        registry.register(Box::new(chat_requests.clone()))?;

        let chat_errors = Counter::new(
            "solace_chat_errors_total",
            "Chat requests that failed in the agent invocation",
        )?;
        registry.register(Box::new(chat_errors.clone()))?;

        let tool_invocations = CounterVec::new(
            Opts::new("solace_tool_invocations_total", "Tool invocations reported per chat"),
            &["tool"],
        )?;
        registry.register(Box::new(tool_invocations.clone()))?;

        Ok(Self {
            registry,
            chat_requests,
            chat_errors,
            tool_invocations,
        })
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub struct MetricsHandler {
    collector: Arc<MetricsCollector>,
}

impl MetricsHandler {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }

    pub async fn metrics(&self) -> String {
        self.collector.encode().unwrap_or_else(|e| {
            tracing::error!("Failed to encode metrics: {}", e);
            String::from("# Error encoding metrics\n")
        })
    }
}
