//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! Input validation and provider failures get their own enums so the HTTP
//! layer can map each case to a distinct status.

use std::path::PathBuf;
use thiserror::Error;

/// Rejections produced while turning an upload or a file into an image payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("No image file provided")]
    MissingInput,

    #[error("File must be an image (got {0})")]
    InvalidType(String),

    #[error("File size too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Test chart not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Image file not found at {}", .0.display())]
    FileNotFound(PathBuf),
}

/// Failures reported by the analysis provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Insufficient provider credits")]
    InsufficientCredits,

    #[error("Provider rejected the image: {0}")]
    InvalidImage(String),

    #[error("Provider rate limit exceeded")]
    RateLimited,

    #[error("Provider error ({}): {message}", .error_type.as_deref().unwrap_or("unknown"))]
    Unknown {
        message: String,
        error_type: Option<String>,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
