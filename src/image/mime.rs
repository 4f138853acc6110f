use image::ImageFormat;
use std::path::Path;

pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_JPEG: &str = "image/jpeg";

/// Media types the analysis provider is sent.
pub const ALLOWED_MEDIA_TYPES: &[&str] = &[IMAGE_PNG, IMAGE_JPEG];

/// Map a declared content type onto the allow-list.
///
/// Parameters (`; charset=...`) and case are ignored, and the common
/// non-standard JPEG aliases are folded into `image/jpeg`.
pub fn normalize_media_type(declared: &str) -> Option<&'static str> {
    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/png" => Some(IMAGE_PNG),
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(IMAGE_JPEG),
        _ => None,
    }
}

/// True when the declared content type is in the `image/*` family.
pub fn is_image_type(declared: &str) -> bool {
    declared.trim().to_ascii_lowercase().starts_with("image/")
}

pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(IMAGE_PNG),
        "jpg" | "jpeg" => Some(IMAGE_JPEG),
        _ => None,
    }
}

/// Detect PNG or JPEG from magic bytes; other formats are not accepted.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Some(IMAGE_PNG),
        Ok(ImageFormat::Jpeg) => Some(IMAGE_JPEG),
        Ok(other) => {
            tracing::warn!("Unsupported image format detected: {:?}", other);
            None
        }
        Err(_) => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?})",
                &bytes[..bytes.len().min(4)]
            );
            None
        }
    }
}
