pub mod analysis;
pub mod client;
pub mod types;

pub use analysis::{AnthropicChartClient, DEFAULT_MODEL, MAX_TOKENS};
pub use client::{AnthropicHttpClient, DEFAULT_BASE_URL};
