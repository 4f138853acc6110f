//! Data models and structures
//!
//! Defines the JSON envelope exchanged with browser clients and the process
//! configuration loaded from the environment.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageSourceKind {
    Sample,
    Upload,
    /// A local file analyzed from the command line.
    File,
}

/// Metadata about the analyzed image, attached to every successful envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageInfo {
    pub source: ImageSourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub size: usize,
    #[serde(rename = "type")]
    pub media_type: String,
}

/// JSON envelope returned by the analysis endpoint.
///
/// Success envelopes carry `analysis`, failure envelopes carry `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_info: Option<ImageInfo>,
}

impl AnalysisResponse {
    pub fn success(analysis: String, image_info: ImageInfo) -> Self {
        Self {
            success: true,
            analysis: Some(analysis),
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            image_info: Some(image_info),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }
}

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SAMPLE_CHART_PATH: &str = "public/test-chart.png";

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_base_url: String,
    pub model: String,
    pub bind_addr: SocketAddr,
    pub sample_chart_path: PathBuf,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| crate::Error::Config("ANTHROPIC_API_KEY not set".to_string()))?;

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|e| {
            crate::Error::Config(format!("Invalid BIND_ADDR '{}': {}", bind_addr, e))
        })?;

        Ok(Self {
            anthropic_api_key,
            anthropic_base_url: std::env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| crate::ai::anthropic::DEFAULT_BASE_URL.to_string()),
            model: std::env::var("ANALYSIS_MODEL")
                .unwrap_or_else(|_| crate::ai::anthropic::DEFAULT_MODEL.to_string()),
            bind_addr,
            sample_chart_path: std::env::var("SAMPLE_CHART_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SAMPLE_CHART_PATH)),
        })
    }
}
