use super::AnalysisService;
use crate::error::ProviderError;
use crate::image::ImagePayload;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

const DEFAULT_ANALYSIS: &str = r#"{"pattern":"Ascending Triangle","confidence":"Medium","timeframe":"4H","trend":"Bullish","entryPoint":105.5,"stopLoss":101.0,"target":114.0,"riskReward":"1:2","explanation":"Higher lows pressing into flat resistance."}"#;

type MockResponse = std::result::Result<String, ProviderError>;

/// Scripted analysis service that records what it was asked to analyze.
#[derive(Clone)]
pub struct MockAnalysisClient {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    received: Arc<Mutex<Vec<(String, usize)>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockAnalysisClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            received: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_analysis(self, response: String) -> Self {
        self.responses.lock().unwrap().push(Ok(response));
        self
    }

    pub fn with_error(self, error: ProviderError) -> Self {
        self.responses.lock().unwrap().push(Err(error));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Media type and byte length of every payload seen so far.
    pub fn get_received(&self) -> Vec<(String, usize)> {
        self.received.lock().unwrap().clone()
    }
}

impl Default for MockAnalysisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisClient {
    async fn analyze_chart(&self, image: &ImagePayload) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        self.received
            .lock()
            .unwrap()
            .push((image.media_type().to_string(), image.len()));

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(DEFAULT_ANALYSIS.to_string())
        } else {
            let index = (*count - 1) % responses.len();
            responses[index].clone().map_err(Into::into)
        }
    }
}
