use super::types::{ApiErrorResponse, MessagesRequest, MessagesResponse};
use crate::error::ProviderError;
use crate::Result;
use reqwest::{Client, StatusCode};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Lightweight Anthropic REST client.
///
/// No request timeout is configured; a call waits for the transport to finish
/// or fail.
pub struct AnthropicHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicHttpClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, Client::new())
    }

    pub fn new_with_client(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Calls the `messages` endpoint once.
    pub async fn create_message(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Anthropic: {}", e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            tracing::error!("Anthropic API error (status {}): {}", status, error_text);
            return Err(classify_error(status, &error_text).into());
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Anthropic response: {}\nBody: {}", e, body);
            ProviderError::Unknown {
                message: format!("Failed to parse Anthropic response: {}", e),
                error_type: None,
            }
            .into()
        })
    }
}

/// Map a failed provider response onto the provider error taxonomy.
pub fn classify_error(status: StatusCode, body: &str) -> ProviderError {
    let (error_type, message) = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => (Some(parsed.error.error_type), parsed.error.message),
        Err(_) => (None, body.trim().to_string()),
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        return ProviderError::RateLimited;
    }

    if status == StatusCode::BAD_REQUEST
        && error_type.as_deref() == Some("invalid_request_error")
    {
        let lowered = message.to_lowercase();
        if lowered.contains("credit") {
            return ProviderError::InsufficientCredits;
        }
        if lowered.contains("image") {
            return ProviderError::InvalidImage(message);
        }
    }

    let message = if message.is_empty() {
        format!("status {}", status)
    } else {
        message
    };
    ProviderError::Unknown {
        message,
        error_type,
    }
}
