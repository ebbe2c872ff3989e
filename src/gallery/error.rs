use crate::catalog::CatalogError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::any::Any;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CatalogError(#[from] CatalogError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    NotFound {
        message: String,
        path: Option<String>,
    },
}

impl GalleryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        GalleryError::NotFound {
            message: message.into(),
            path: None,
        }
    }
}

/// The JSON body used for unexpected failures.
pub fn error_envelope(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "message": message,
        "status": status.as_u16(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    (status, Json(body)).into_response()
}

/// Converts a handler panic into the 500 envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!("Handler panicked: {}", detail);
    error_envelope(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        match self {
            GalleryError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            GalleryError::NotFound { message, path } => {
                let body = match path {
                    Some(path) => json!({ "error": message, "path": path }),
                    None => json!({ "error": message }),
                };
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            GalleryError::CatalogError(CatalogError::PhotoNotFound(_)) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Photo not found" })),
            )
                .into_response(),
            other => {
                error!("Request failed: {}", other);
                error_envelope(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string())
            }
        }
    }
}
