//! Application orchestration for chart analysis requests.

use crate::ai::{AnalysisService, AnthropicChartClient};
use crate::image::{self, ImagePayload};
use crate::error::InputError;
use crate::models::{AnalysisResponse, Config, ImageInfo, ImageSourceKind};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// An image received from a client, before validation.
#[derive(Debug, Clone, Default)]
pub struct UploadedImage {
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Coordinates payload building and the provider call for both entry modes.
pub struct App {
    analyzer: Arc<dyn AnalysisService>,
    sample_path: PathBuf,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(analyzer: Arc<dyn AnalysisService>, sample_path: PathBuf) -> Self {
        Self {
            analyzer,
            sample_path,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn from_config(config: &Config) -> Self {
        info!(
            "Analysis provider: Anthropic (model: {}, endpoint: {})",
            config.model, config.anthropic_base_url
        );

        let analyzer =
            AnthropicChartClient::new(config.anthropic_api_key.clone(), config.model.clone())
                .with_base_url(config.anthropic_base_url.clone());

        Self::with_services(Arc::new(analyzer), config.sample_chart_path.clone())
    }

    pub fn sample_path(&self) -> &Path {
        &self.sample_path
    }

    /// Analyze the server-local sample chart.
    pub async fn analyze_sample(&self) -> Result<AnalysisResponse> {
        info!("Starting chart analysis with sample {}", self.sample_path.display());
        let (response, _) = self
            .analyze_path(&self.sample_path, ImageSourceKind::Sample)
            .await?;
        Ok(response)
    }

    /// Analyze an arbitrary local file; the payload is handed back for caching.
    pub async fn analyze_file(&self, path: &Path) -> Result<(AnalysisResponse, ImagePayload)> {
        info!("Starting chart analysis for {}", path.display());
        self.analyze_path(path, ImageSourceKind::File)
            .await
            .map_err(|e| match e {
                Error::Input(InputError::NotFound(path)) => InputError::FileNotFound(path).into(),
                other => other,
            })
    }

    /// Analyze an image uploaded by a client.
    pub async fn analyze_upload(&self, upload: UploadedImage) -> Result<AnalysisResponse> {
        info!("Starting chart analysis from uploaded image");

        let payload = image::from_upload(upload.bytes, upload.content_type.as_deref())?;
        let info = ImageInfo {
            source: ImageSourceKind::Upload,
            name: upload.name,
            size: payload.len(),
            media_type: payload.media_type().to_string(),
        };

        self.run(&payload, info).await
    }

    async fn analyze_path(
        &self,
        path: &Path,
        source: ImageSourceKind,
    ) -> Result<(AnalysisResponse, ImagePayload)> {
        let payload = image::from_path(path).await?;
        let info = ImageInfo {
            source,
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            size: payload.len(),
            media_type: payload.media_type().to_string(),
        };

        let response = self.run(&payload, info).await?;
        Ok((response, payload))
    }

    async fn run(&self, payload: &ImagePayload, info: ImageInfo) -> Result<AnalysisResponse> {
        info!(
            "Analyzing {} bytes ({}), base64 length {}",
            payload.len(),
            payload.media_type(),
            payload.len().div_ceil(3) * 4
        );

        let analysis = self.analyzer.analyze_chart(payload).await?;
        info!("Analysis complete ({} chars)", analysis.len());

        Ok(AnalysisResponse::success(analysis, info))
    }
}
