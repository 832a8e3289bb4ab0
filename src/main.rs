use clap::Parser;
use solace::adapters::chat_handler::ChatState;
use solace::adapters::health_handler::HealthHandler;
use solace::adapters::metrics_handler::{MetricsCollector, MetricsHandler};
use solace::adapters::telephony::TwilioClient;
use solace::adapters::tool_handler::SupportToolHandler;
use solace::agents::llm::create_provider;
use solace::agents::runner::ReactRunner;
use solace::cli::Cli;
use solace::config::Settings;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting Solace support agent on {}:{}", host, port);

    // Construct the agent wiring once and inject it into the handlers
    let llm = create_provider(&settings.llm)?;
    let dialer = Arc::new(TwilioClient::new(settings.telephony.clone()));
    let tools = Arc::new(SupportToolHandler::new(llm.clone(), dialer));
    let runner = Arc::new(ReactRunner::new(settings.agent.clone(), llm, tools));

    let metrics = Arc::new(MetricsCollector::new()?);
    let chat_state = ChatState {
        runner,
        system_prompt: settings.agent.system_prompt.clone(),
        metrics: metrics.clone(),
    };
    let health_handler = Arc::new(HealthHandler::new(Arc::new(settings)));
    let metrics_handler = Arc::new(MetricsHandler::new(metrics));

    // Create application using the library function
    let app = solace::create_app(chat_state, health_handler, metrics_handler);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
