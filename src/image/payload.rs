use super::mime;
use super::{ImagePayload, MAX_IMAGE_BYTES};
use crate::error::InputError;
use crate::{Error, Result};
use std::path::Path;

/// Reject anything whose declared content type is not `image/*`.
pub fn check_declared_type(content_type: Option<&str>) -> std::result::Result<(), InputError> {
    match content_type {
        Some(ct) if mime::is_image_type(ct) => Ok(()),
        Some(ct) => Err(InputError::InvalidType(ct.to_string())),
        None => Err(InputError::InvalidType("unknown content type".to_string())),
    }
}

pub fn check_size(size: usize) -> std::result::Result<(), InputError> {
    if size > MAX_IMAGE_BYTES {
        return Err(InputError::TooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Build a payload from uploaded bytes and the client-declared content type.
pub fn from_upload(
    bytes: Vec<u8>,
    content_type: Option<&str>,
) -> std::result::Result<ImagePayload, InputError> {
    if bytes.is_empty() {
        return Err(InputError::MissingInput);
    }
    check_declared_type(content_type)?;
    check_size(bytes.len())?;

    let declared = content_type.unwrap_or_default();
    let media_type = mime::normalize_media_type(declared)
        .ok_or_else(|| InputError::InvalidType(declared.to_string()))?;

    tracing::debug!(
        "Built upload payload: {} bytes, declared {}, media type {}",
        bytes.len(),
        declared,
        media_type
    );

    Ok(ImagePayload::new(bytes, media_type))
}

/// Build a payload from a server-local image file.
///
/// Existence is checked before anything else; the media type comes from the
/// extension, falling back to sniffing the file contents.
pub async fn from_path(path: &Path) -> Result<ImagePayload> {
    if !tokio::fs::try_exists(path).await? {
        return Err(InputError::NotFound(path.to_path_buf()).into());
    }

    let size = tokio::fs::metadata(path).await?.len();
    check_size(usize::try_from(size).unwrap_or(usize::MAX))?;

    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(InputError::MissingInput.into());
    }

    let media_type = mime::media_type_for_path(path)
        .or_else(|| mime::sniff_media_type(&bytes))
        .ok_or_else(|| {
            Error::from(InputError::InvalidType(format!(
                "unrecognized image file {}",
                path.display()
            )))
        })?;

    tracing::debug!(
        "Loaded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        media_type
    );

    Ok(ImagePayload::new(bytes, media_type))
}
