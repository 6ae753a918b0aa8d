use std::time::Duration;

use dynform::{Credentials, FormResponse, FormSchema};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::BootstrapError;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://dynamic-form-generator-9rl7.onrender.com";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ALREADY_EXISTS: &str = "User already exists";
const REGISTER_FAILED: &str = "Failed to register";
const FETCH_FAILED: &str = "Couldn't get form";

/// Where and how to reach the form service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUser<'a> {
    roll_number: &'a str,
    name: &'a str,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// Registers users and fetches their form.
#[derive(Debug, Clone)]
pub struct BootstrapClient {
    base_url: String,
    http: reqwest::Client,
}

impl BootstrapClient {
    pub fn new(config: ClientConfig) -> Result<Self, BootstrapError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register the user. An already registered user is not an error.
    pub async fn register(&self, credentials: &Credentials) -> Result<(), BootstrapError> {
        let url = format!("{}/create-user", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&CreateUser {
                roll_number: &credentials.roll_number,
                name: &credentials.name,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(roll_number = %credentials.roll_number, "user registered");
            return Ok(());
        }

        let message = server_message(response).await;
        match message {
            Some(message) if message.contains(ALREADY_EXISTS) => {
                tracing::info!(roll_number = %credentials.roll_number, "user exists, fetching form");
                Ok(())
            }
            message => {
                tracing::warn!(%status, ?message, "registration failed");
                Err(BootstrapError::Register(
                    message.unwrap_or_else(|| REGISTER_FAILED.to_string()),
                ))
            }
        }
    }

    /// Fetch the form assigned to a roll number.
    pub async fn fetch_form(&self, roll_number: &str) -> Result<FormSchema, BootstrapError> {
        let url = format!("{}/get-form", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("rollNumber", roll_number)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = server_message(response).await;
            tracing::warn!(%status, ?message, "form fetch failed");
            return Err(BootstrapError::FetchForm(
                message.unwrap_or_else(|| FETCH_FAILED.to_string()),
            ));
        }

        let body = response.bytes().await?;
        let form: FormResponse = serde_json::from_slice(&body)?;
        tracing::info!(
            form_id = %form.form.form_id,
            sections = form.form.len(),
            message = %form.message,
            "form fetched"
        );
        Ok(form.form)
    }

    /// Check the credentials, register, and fetch the form.
    pub async fn bootstrap(&self, credentials: &Credentials) -> Result<FormSchema, BootstrapError> {
        credentials.check()?;
        self.register(credentials).await?;
        self.fetch_form(&credentials.roll_number).await
    }

    /// Like [`bootstrap`](Self::bootstrap), but gives up once `cancel` fires.
    pub async fn bootstrap_with_cancel(
        &self,
        credentials: &Credentials,
        cancel: CancellationToken,
    ) -> Result<FormSchema, BootstrapError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("bootstrap cancelled");
                Err(BootstrapError::Cancelled)
            }
            result = self.bootstrap(credentials) => result,
        }
    }
}

/// The `message` of an error body, if the body carries one.
async fn server_message(response: reqwest::Response) -> Option<String> {
    if response.status() == StatusCode::NO_CONTENT {
        return None;
    }
    let body = response.bytes().await.ok()?;
    serde_json::from_slice::<MessageBody>(&body)
        .ok()?
        .message
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let client =
            BootstrapClient::new(ClientConfig::default().with_base_url("http://localhost:8080/"))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn create_user_body_is_camel_case() {
        let body = serde_json::to_value(CreateUser {
            roll_number: "21CS001",
            name: "Ada",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "rollNumber": "21CS001", "name": "Ada" })
        );
    }
}
