//! Structured chart analysis parsed from the model's raw reply.
//!
//! The model is asked for a JSON object but nothing forces it to comply, so
//! parsing is lenient about content and strict about structure: any field may
//! be missing, null or of an unexpected JSON type, unknown keys are kept, and
//! text that is not a JSON object yields no record at all.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Other(String),
}

impl Confidence {
    pub fn as_str(&self) -> &str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
            Confidence::Other(s) => s,
        }
    }
}

impl From<String> for Confidence {
    fn from(value: String) -> Self {
        match value.as_str() {
            "High" => Confidence::High,
            "Medium" => Confidence::Medium,
            "Low" => Confidence::Low,
            _ => Confidence::Other(value),
        }
    }
}

impl From<Confidence> for String {
    fn from(value: Confidence) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Trend {
    Bullish,
    Bearish,
    Sideways,
    Other(String),
}

impl Trend {
    pub fn as_str(&self) -> &str {
        match self {
            Trend::Bullish => "Bullish",
            Trend::Bearish => "Bearish",
            Trend::Sideways => "Sideways",
            Trend::Other(s) => s,
        }
    }
}

impl From<String> for Trend {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Bullish" => Trend::Bullish,
            "Bearish" => Trend::Bearish,
            "Sideways" => Trend::Sideways,
            _ => Trend::Other(value),
        }
    }
}

impl From<Trend> for String {
    fn from(value: Trend) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A price level as the model wrote it: usually a number, sometimes text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Level {
    Number(f64),
    Text(String),
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Number(n) => write!(f, "{}", n),
            Level::Text(s) => f.write_str(s),
        }
    }
}

/// Text form of any JSON value; `null` counts as absent.
fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Accept any JSON value for a text-like field.
fn lenient_text<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text).map(T::from))
}

/// Accept any JSON value for a price level; numbers stay numeric.
fn lenient_level<'de, D>(deserializer: D) -> Result<Option<Level>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => Some(Level::Number(f)),
            None => Some(Level::Text(n.to_string())),
        },
        Some(other) => value_to_text(other).map(Level::Text),
        None => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAnalysis {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub pattern: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence: Option<Confidence>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeframe: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub trend: Option<Trend>,
    #[serde(
        default,
        deserialize_with = "lenient_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_point: Option<Level>,
    #[serde(
        default,
        deserialize_with = "lenient_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_loss: Option<Level>,
    #[serde(
        default,
        deserialize_with = "lenient_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub target: Option<Level>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_reward: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub explanation: Option<String>,
    /// Keys the model added beyond the requested shape.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Parse raw model text into a [`ChartAnalysis`].
///
/// Returns `None` when the trimmed text is not a JSON object. Field values of
/// an unexpected type are kept as text. Markdown fences are not stripped.
pub fn parse_analysis(raw: &str) -> Option<ChartAnalysis> {
    let cleaned = raw.trim();
    match serde_json::from_str::<ChartAnalysis>(cleaned) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            tracing::warn!("Failed to parse analysis: {}", e);
            None
        }
    }
}
