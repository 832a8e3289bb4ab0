use clap::Parser;
use std::path::PathBuf;

/// Solace - mental-health support agent service
#[derive(Parser, Debug, Clone)]
#[command(name = "solace", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "SOLACE_CONFIG", default_value = "solace.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "SOLACE_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "SOLACE_PORT")]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["solace"]);
        assert_eq!(cli.config, PathBuf::from("solace.toml"));
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "solace",
            "--config",
            "custom.toml",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.host, Some("0.0.0.0".to_string()));
        assert_eq!(cli.port, Some(8080));
    }
}
