//! Public download endpoint.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use uuid::Uuid;

use tracklink_core::error::{AppError, ErrorKind};
use tracklink_proxy::filename::content_disposition;
use tracklink_service::{DownloadError, DownloadResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /download/{id}
///
/// Unauthenticated. Errors before the first byte are JSON; once the body
/// is streaming an upstream failure can only truncate it.
pub async fn download(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = Uuid::parse_str(&raw_id).map_err(|_| DownloadError::NotFound)?;

    let response = match state.download_orchestrator.serve(id).await? {
        DownloadResponse::Stream(stream) => {
            let mut builder = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, stream.content_type)
                .header(
                    header::CONTENT_DISPOSITION,
                    content_disposition(&stream.filename),
                );
            if let Some(len) = stream.content_length {
                builder = builder.header(header::CONTENT_LENGTH, len);
            }
            builder.body(Body::from_stream(stream.body))
        }
        DownloadResponse::Page { filename, body } => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body)),
        DownloadResponse::Redirect { location } => Response::builder()
            .status(StatusCode::FOUND)
            .header(header::LOCATION, location)
            .body(Body::empty()),
    };

    response.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, "Failed to build download response", e).into()
    })
}
