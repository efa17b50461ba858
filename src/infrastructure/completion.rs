//! Completion client for OpenAI-compatible chat endpoints.

use std::time::Duration;

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::config::LlmSettings;
use crate::infrastructure::error::CompletionError;
use crate::infrastructure::traits::{ChatMessage, CompletionClient};

/// Configuration for the API completion client.
#[derive(Debug, Clone)]
pub struct ApiCompletionConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "gpt-4")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum attempts per completion
    pub max_retries: u32,
}

impl ApiCompletionConfig {
    /// Create config from loaded settings; a missing key is a config error.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, CompletionError> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            CompletionError::Config(
                "API key not configured (set TOPICSWIPE_LLM__API_KEY or OPENAI_API_KEY)"
                    .to_string(),
            )
        })?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries.max(1),
        })
    }
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
}

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

/// HTTP completion client with retry.
pub struct ApiCompletionClient {
    client: Client,
    config: ApiCompletionConfig,
}

impl ApiCompletionClient {
    pub fn new(config: ApiCompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Make a single API request.
    async fn make_request(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let request = OpenAIRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
        };

        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Api(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = format!("HTTP {}: {}", status, body);
            if status.is_client_error() {
                return Err(CompletionError::Rejected(message));
            }
            return Err(CompletionError::Api(message));
        }

        let body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CompletionError::Parse("No result in response".to_string()))
    }
}

#[async_trait]
impl CompletionClient for ApiCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(120)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, model = %self.config.model, "Calling completion API");

            match self.make_request(messages).await {
                Ok(response) => return Ok(response),
                Err(e @ (CompletionError::Parse(_) | CompletionError::Rejected(_))) => {
                    error!(error = %e, "Completion call not retryable");
                    return Err(e);
                }
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Completion call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_settings_without_key_when_building_config_then_config_error() {
        let settings = LlmSettings {
            api_key: None,
            ..LlmSettings::default()
        };
        assert!(matches!(
            ApiCompletionConfig::from_settings(&settings),
            Err(CompletionError::Config(_))
        ));
    }

    #[test]
    fn given_settings_with_trailing_slash_when_building_config_then_trimmed() {
        let settings = LlmSettings {
            api_key: Some(SecretString::from("k".to_string())),
            base_url: "http://localhost:9999/v1/".to_string(),
            max_retries: 0,
            ..LlmSettings::default()
        };
        let config = ApiCompletionConfig::from_settings(&settings).unwrap();
        assert_eq!(config.base_url, "http://localhost:9999/v1");
        assert_eq!(config.max_retries, 1);
    }
}
