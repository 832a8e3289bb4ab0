//! Outbound emergency calling via the Twilio REST API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Errors from the telephony provider
#[derive(Debug, Error)]
pub enum TelephonyError {
    /// A required credential env var is unset
    #[error("Environment variable {0} not set")]
    MissingCredential(String),

    /// The provider rejected the call
    #[error("Telephony API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Network error
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TelephonyError {
    fn from(err: reqwest::Error) -> Self {
        TelephonyError::Network(err.to_string())
    }
}

/// Port for placing the emergency call
#[async_trait]
pub trait EmergencyDialer: Send + Sync {
    /// Place an outbound call to the configured safety contact
    async fn place_call(&self) -> Result<(), TelephonyError>;
}

/// Telephony settings: env-var names for credentials plus the API host.
///
/// Credentials are resolved when a call is placed, so a missing value
/// surfaces as a delegate failure rather than blocking startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelephonySettings {
    #[serde(default = "default_account_sid_env")]
    pub account_sid_env: String,
    #[serde(default = "default_auth_token_env")]
    pub auth_token_env: String,
    #[serde(default = "default_from_number_env")]
    pub from_number_env: String,
    #[serde(default = "default_contact_env")]
    pub contact_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for TelephonySettings {
    fn default() -> Self {
        Self {
            account_sid_env: default_account_sid_env(),
            auth_token_env: default_auth_token_env(),
            from_number_env: default_from_number_env(),
            contact_env: default_contact_env(),
            base_url: default_base_url(),
        }
    }
}

fn default_account_sid_env() -> String {
    "TWILIO_ACCOUNT_SID".to_string()
}

fn default_auth_token_env() -> String {
    "TWILIO_AUTH_TOKEN".to_string()
}

fn default_from_number_env() -> String {
    "TWILIO_FROM_NUMBER".to_string()
}

fn default_contact_env() -> String {
    "EMERGENCY_CONTACT".to_string()
}

fn default_base_url() -> String {
    "https://api.twilio.com".to_string()
}

const EMERGENCY_TWIML: &str = "<Response><Say>This is an automated alert. A user may need \
                               immediate mental health support. Please respond.</Say></Response>";

/// Twilio-backed dialer
pub struct TwilioClient {
    client: reqwest::Client,
    settings: TelephonySettings,
}

impl TwilioClient {
    pub fn new(settings: TelephonySettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    fn credential(&self, env_var: &str) -> Result<String, TelephonyError> {
        env::var(env_var).map_err(|_| TelephonyError::MissingCredential(env_var.to_string()))
    }
}

#[async_trait]
impl EmergencyDialer for TwilioClient {
    async fn place_call(&self) -> Result<(), TelephonyError> {
        let account_sid = self.credential(&self.settings.account_sid_env)?;
        let auth_token = self.credential(&self.settings.auth_token_env)?;
        let from_number = self.credential(&self.settings.from_number_env)?;
        let contact = self.credential(&self.settings.contact_env)?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.settings.base_url, account_sid
        );
        let params = [
            ("To", contact.as_str()),
            ("From", from_number.as_str()),
            ("Twiml", EMERGENCY_TWIML),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&account_sid, Some(&auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TelephonyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!("emergency call placed to the safety contact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credentials_fail_at_call_time() {
        let settings = TelephonySettings {
            account_sid_env: "SOLACE_TEST_UNSET_SID".to_string(),
            ..Default::default()
        };
        let client = TwilioClient::new(settings);

        match client.place_call().await {
            Err(TelephonyError::MissingCredential(var)) => {
                assert_eq!(var, "SOLACE_TEST_UNSET_SID")
            }
            other => panic!("expected missing credential, got {:?}", other),
        }
    }
}
