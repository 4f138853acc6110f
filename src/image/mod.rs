//! Image intake and normalization
//!
//! Validates chart screenshots coming from an upload or from a local file and
//! turns them into the payload forwarded to the analysis provider.

pub mod mime;
pub mod payload;

pub use payload::{check_declared_type, check_size, from_path, from_upload};

use base64::Engine as _;

/// Upper bound on image size, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Validated image bytes together with an allow-listed media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    media_type: &'static str,
}

impl ImagePayload {
    pub(crate) fn new(bytes: Vec<u8>, media_type: &'static str) -> Self {
        Self { bytes, media_type }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:` URL used for cached previews.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.to_base64())
    }
}
