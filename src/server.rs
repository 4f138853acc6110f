//! HTTP surface: routes, multipart intake and error-to-status mapping.

use crate::app::{App, UploadedImage};
use crate::error::{InputError, ProviderError};
use crate::image::{self, mime, MAX_IMAGE_BYTES};
use crate::models::AnalysisResponse;
use crate::{Error, Result};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Multipart form field carrying the chart.
pub const IMAGE_FIELD: &str = "image";

/// Request body cap; leaves room above the image limit so oversized files
/// are reported by the handler rather than cut off by the framework.
pub const UPLOAD_BODY_LIMIT: usize = 2 * MAX_IMAGE_BYTES;

pub type SharedApp = Arc<App>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

pub fn create_router(app: SharedApp) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/analyze", get(analyze_sample).post(analyze_upload))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .with_state(app)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn start_server(app: App, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(Arc::new(app));

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn analyze_sample(State(app): State<SharedApp>) -> Response {
    let span = tracing::info_span!("analyze", request_id = %Uuid::new_v4(), mode = "sample");
    async move { respond(app.analyze_sample().await) }
        .instrument(span)
        .await
}

async fn analyze_upload(
    State(app): State<SharedApp>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let span = tracing::info_span!("analyze", request_id = %Uuid::new_v4(), mode = "upload");
    async move {
        let result: Result<AnalysisResponse> = async {
            let multipart = multipart.map_err(|e| Error::Upload(e.body_text()))?;
            let upload = read_upload(multipart).await?;
            app.analyze_upload(upload).await
        }
        .await;
        respond(result)
    }
    .instrument(span)
    .await
}

fn respond(result: Result<AnalysisResponse>) -> Response {
    match result {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Pull the `image` field out of the form, reading at most one byte past the
/// size limit.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedImage> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let name = field.file_name().map(str::to_string);
        image::check_declared_type(content_type.as_deref())?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            image::check_size(bytes.len() + chunk.len())?;
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!(
            "Received upload {:?} ({} bytes, {:?})",
            name,
            bytes.len(),
            content_type
        );

        return Ok(UploadedImage {
            name,
            content_type,
            bytes,
        });
    }

    Err(InputError::MissingInput.into())
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return InputError::TooLarge {
            size: UPLOAD_BODY_LIMIT,
            limit: MAX_IMAGE_BYTES,
        }
        .into();
    }
    Error::Upload(e.body_text())
}

/// HTTP status for each failure class.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Input(InputError::NotFound(_) | InputError::FileNotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        Error::Input(_) => StatusCode::BAD_REQUEST,
        Error::Upload(_) => StatusCode::BAD_REQUEST,
        Error::Provider(ProviderError::InsufficientCredits) => StatusCode::PAYMENT_REQUIRED,
        Error::Provider(ProviderError::InvalidImage(_)) => StatusCode::BAD_REQUEST,
        Error::Provider(ProviderError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing envelope for a failure.
pub fn failure_envelope(err: &Error) -> AnalysisResponse {
    match err {
        Error::Input(InputError::MissingInput) => {
            AnalysisResponse::failure("No image file provided")
        }
        Error::Input(InputError::InvalidType(declared)) if mime::is_image_type(declared) => {
            AnalysisResponse::failure(
                "Unsupported image type. Please upload PNG, JPG, or JPEG files only.",
            )
            .with_details(declared.clone())
        }
        Error::Input(InputError::InvalidType(declared)) => {
            AnalysisResponse::failure("File must be an image").with_details(declared.clone())
        }
        Error::Input(InputError::TooLarge { size, .. }) => {
            AnalysisResponse::failure("File size too large. Maximum 5MB allowed.")
                .with_details(format!("Received at least {} bytes", size))
        }
        Error::Input(InputError::NotFound(path)) => AnalysisResponse::failure(format!(
            "Test chart not found. Please add {} to the server.",
            path.display()
        )),
        Error::Input(InputError::FileNotFound(path)) => {
            AnalysisResponse::failure(format!("Image file not found: {}", path.display()))
        }
        Error::Upload(message) => {
            AnalysisResponse::failure("Invalid upload").with_details(message.clone())
        }
        Error::Provider(ProviderError::InsufficientCredits) => AnalysisResponse::failure(
            "Insufficient credits. Please add credits to your Anthropic account.",
        ),
        Error::Provider(ProviderError::InvalidImage(message)) => AnalysisResponse::failure(
            "Could not process image. Please check image format and size.",
        )
        .with_details(message.clone()),
        Error::Provider(ProviderError::RateLimited) => {
            AnalysisResponse::failure("Rate limit exceeded. Please try again later.")
        }
        Error::Provider(ProviderError::Unknown {
            message,
            error_type,
        }) => AnalysisResponse::failure("Analysis failed")
            .with_details(message.clone())
            .with_error_type(error_type.as_deref().unwrap_or("unknown")),
        other => AnalysisResponse::failure("Analysis failed")
            .with_details(other.to_string())
            .with_error_type("unknown"),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!("Analysis error: {}", self);
        } else {
            tracing::warn!("Analysis rejected ({}): {}", status, self);
        }
        (status, Json(failure_envelope(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(Error, StatusCode)> = vec![
            (
                InputError::NotFound(PathBuf::from("x.png")).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                InputError::FileNotFound(PathBuf::from("mine.png")).into(),
                StatusCode::NOT_FOUND,
            ),
            (InputError::MissingInput.into(), StatusCode::BAD_REQUEST),
            (
                InputError::InvalidType("text/plain".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                InputError::TooLarge { size: 1, limit: 0 }.into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProviderError::InsufficientCredits.into(),
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                ProviderError::InvalidImage("bad".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProviderError::RateLimited.into(),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ProviderError::Unknown {
                    message: "x".into(),
                    error_type: None,
                }
                .into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::Io(std::io::Error::other("disk")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(status_for(&err), expected, "status for {:?}", err);
        }
    }

    #[test]
    fn test_invalid_image_envelope_keeps_provider_details() {
        let envelope = failure_envelope(&ProviderError::InvalidImage("too big".into()).into());
        assert!(!envelope.success);
        assert_eq!(envelope.details.as_deref(), Some("too big"));
        assert!(envelope.analysis.is_none());
    }

    #[test]
    fn test_unknown_envelope_defaults_error_type() {
        let envelope = failure_envelope(
            &ProviderError::Unknown {
                message: "boom".into(),
                error_type: None,
            }
            .into(),
        );
        assert_eq!(envelope.error.as_deref(), Some("Analysis failed"));
        assert_eq!(envelope.details.as_deref(), Some("boom"));
        assert_eq!(envelope.error_type.as_deref(), Some("unknown"));
    }

    #[test]
    fn test_missing_local_file_message_names_the_file() {
        let err: Error = InputError::FileNotFound(PathBuf::from("mine.png")).into();
        let envelope = failure_envelope(&err);
        assert_eq!(envelope.error.as_deref(), Some("Image file not found: mine.png"));
    }

    #[test]
    fn test_non_allow_listed_image_gets_specific_message() {
        let envelope = failure_envelope(&InputError::InvalidType("image/gif".into()).into());
        assert!(envelope.error.unwrap().contains("PNG, JPG, or JPEG"));
    }
}
