//! Mapping of service errors onto HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::debug;

use crate::core::{RenderError, StoreError};

/// Errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("not found")]
    NotFound,

    #[error("invalid form: {}", .0.body_text())]
    Form(#[from] MultipartError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Render(RenderError::EmptyInput) => StatusCode::BAD_REQUEST,
            Self::Render(RenderError::Stage { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(StoreError::NotFound(_)) | Self::NotFound => StatusCode::NOT_FOUND,
            // Keeps 413 for bodies over the upload limit
            Self::Form(e) => e.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Stage diagnostics were logged by the pipeline; absent artifacts are
        // a client condition, not a server fault.
        let body = match &self {
            Self::Store(StoreError::NotFound(id)) => {
                debug!(%id, "Artifact not found");
                "not found".to_string()
            }
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}
