//! Last-result persistence for the presentation layer
//!
//! Mirrors what the browser page keeps in `localStorage`: the last envelope,
//! the last parsed record and a preview of the last image, each under a fixed
//! key, overwritten by every new result and erasable on demand.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::analysis::{parse_analysis, ChartAnalysis};
use crate::models::AnalysisResponse;
use crate::Result;

pub const LAST_RESULT_KEY: &str = "lastAnalysisResult";
pub const LAST_PARSED_KEY: &str = "lastParsedAnalysis";
pub const LAST_IMAGE_KEY: &str = "lastUploadedImage";

pub const CACHE_KEYS: &[&str] = &[LAST_RESULT_KEY, LAST_PARSED_KEY, LAST_IMAGE_KEY];

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Everything remembered about the last analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedResult {
    pub response: Option<AnalysisResponse>,
    pub analysis: Option<ChartAnalysis>,
    pub image_preview: Option<String>,
}

impl CachedResult {
    pub fn is_empty(&self) -> bool {
        self.response.is_none() && self.analysis.is_none() && self.image_preview.is_none()
    }
}

pub struct ResultCache<S> {
    store: S,
}

impl<S: KeyValueStore> ResultCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Remember a fresh envelope, parsing its analysis when it succeeded.
    ///
    /// Returns the parsed record, if any. A previous record or preview never
    /// outlives the envelope it belonged to.
    pub fn record(
        &self,
        response: &AnalysisResponse,
        image_preview: Option<&str>,
    ) -> Result<Option<ChartAnalysis>> {
        let analysis = match (response.success, response.analysis.as_deref()) {
            (true, Some(raw)) => parse_analysis(raw),
            _ => None,
        };

        self.store
            .set(LAST_RESULT_KEY, &serde_json::to_string(response)?)?;

        match &analysis {
            Some(parsed) => self
                .store
                .set(LAST_PARSED_KEY, &serde_json::to_string(parsed)?)?,
            None => self.store.remove(LAST_PARSED_KEY)?,
        }

        match image_preview {
            Some(preview) => self.store.set(LAST_IMAGE_KEY, preview)?,
            None => self.store.remove(LAST_IMAGE_KEY)?,
        }

        Ok(analysis)
    }

    /// Load whatever is cached; entries that no longer deserialize are skipped.
    pub fn load(&self) -> Result<CachedResult> {
        let response = self
            .store
            .get(LAST_RESULT_KEY)?
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(response) => Some(response),
                Err(e) => {
                    tracing::warn!("Failed to load saved result: {}", e);
                    None
                }
            });

        let analysis = self
            .store
            .get(LAST_PARSED_KEY)?
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    tracing::warn!("Failed to load saved analysis: {}", e);
                    None
                }
            });

        Ok(CachedResult {
            response,
            analysis,
            image_preview: self.store.get(LAST_IMAGE_KEY)?,
        })
    }

    pub fn clear(&self) -> Result<()> {
        for key in CACHE_KEYS {
            self.store.remove(key)?;
        }
        tracing::debug!("Cleared cached analysis");
        Ok(())
    }
}
