use solace::agents::config::LlmProviderType;
use solace::config::Settings;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let solace_toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[agent]
system_prompt = "You are a supportive companion."
max_iterations = 4

[llm]
provider = "openai"
model = "gpt-4o-mini"
api_key_env = "MY_OPENAI_KEY"

[telephony]
contact_env = "SAFETY_CONTACT"
"#;
    let path = root.join("solace.toml");
    fs::write(&path, solace_toml)?;

    let settings = Settings::from_file(path.to_str().unwrap())?;

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.agent.system_prompt, "You are a supportive companion.");
    assert_eq!(settings.agent.max_iterations, 4);
    assert_eq!(settings.llm.provider, LlmProviderType::OpenAI);
    assert_eq!(settings.llm.model, "gpt-4o-mini");
    assert_eq!(settings.llm.api_key_env.as_deref(), Some("MY_OPENAI_KEY"));
    assert_eq!(settings.telephony.contact_env, "SAFETY_CONTACT");
    // Unspecified sections keep their defaults
    assert_eq!(settings.telephony.account_sid_env, "TWILIO_ACCOUNT_SID");

    Ok(())
}

#[test]
fn test_defaults_without_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("absent.toml");

    let settings = Settings::from_file(missing.to_str().unwrap())?;

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8000);
    assert_eq!(settings.llm.provider, LlmProviderType::Groq);
    assert_eq!(settings.llm.model, "llama-3.1-8b-instant");
    assert!(!settings.agent.system_prompt.is_empty());
    assert_eq!(settings.agent.max_iterations, 10);

    Ok(())
}
