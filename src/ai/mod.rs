//! AI service integration for chart analysis
//!
//! Sends a chart image plus a fixed instruction prompt to a multimodal
//! provider and hands back the model's raw text.

pub mod anthropic;
pub mod mock;

pub use anthropic::AnthropicChartClient;
pub use mock::MockAnalysisClient;

use crate::image::ImagePayload;
use crate::Result;
use async_trait::async_trait;

/// Returned in place of the analysis when the model produces no text.
pub const NO_ANALYSIS_SENTINEL: &str = "No analysis generated";

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Issue exactly one provider request for `image` and return the raw reply.
    async fn analyze_chart(&self, image: &ImagePayload) -> Result<String>;
}
