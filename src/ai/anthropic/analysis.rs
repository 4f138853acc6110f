use super::client::AnthropicHttpClient;
use super::types::{ImageSource, Message, MessagesRequest, RequestBlock, ResponseBlock};
use crate::ai::{AnalysisService, NO_ANALYSIS_SENTINEL};
use crate::image::ImagePayload;
use crate::{prompts, Result};
use async_trait::async_trait;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const MAX_TOKENS: u32 = 1000;

/// Chart analysis backed by the Anthropic Messages API.
pub struct AnthropicChartClient {
    http: AnthropicHttpClient,
    model: String,
}

impl AnthropicChartClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: AnthropicHttpClient::new_with_client(api_key, client),
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, image: &ImagePayload) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    RequestBlock::Image {
                        source: ImageSource {
                            source_type: "base64".to_string(),
                            media_type: image.media_type().to_string(),
                            data: image.to_base64(),
                        },
                    },
                    RequestBlock::Text {
                        text: prompts::CHART_ANALYSIS.to_string(),
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl AnalysisService for AnthropicChartClient {
    async fn analyze_chart(&self, image: &ImagePayload) -> Result<String> {
        let request = self.build_request(image);

        tracing::debug!(
            "Sending chart to Anthropic (model {}, {} bytes, {})",
            self.model,
            image.len(),
            image.media_type()
        );

        let response = self.http.create_message(&request).await?;

        tracing::info!("Received response from Anthropic");

        // Only the first block counts; a non-text or empty block yields the sentinel.
        let text = match response.content.into_iter().next() {
            Some(ResponseBlock::Text { text }) if !text.is_empty() => text,
            _ => {
                tracing::warn!("Anthropic returned no text, using fallback");
                NO_ANALYSIS_SENTINEL.to_string()
            }
        };

        Ok(text)
    }
}
