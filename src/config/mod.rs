use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::adapters::telephony::TelephonySettings;
use crate::agents::config::{AgentConfig, LlmProviderConfig};
use crate::cli::Cli;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub llm: LlmProviderConfig,
    #[serde(default)]
    pub telephony: TelephonySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Settings {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_file("solace.toml")
    }

    /// Load settings from an optional TOML file with SOLACE_* env overrides
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("SOLACE").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Create settings from CLI arguments (config file plus CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut settings = Self::from_file(&cli.config.to_string_lossy())?;

        if let Some(host) = &cli.host {
            settings.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            settings.server.port = port;
        }

        Ok(settings)
    }
}
