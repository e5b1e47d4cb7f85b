//! Errors raised by the directory and the screen handlers.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::models::UserId;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Failed to access data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Unknown screen method: {0}")]
    UnknownMethod(String),

    #[error("Template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        let status = match &self {
            PanelError::UserNotFound(_) | PanelError::UnknownMethod(_) => StatusCode::NOT_FOUND,
            PanelError::Io(_) | PanelError::Json(_) | PanelError::Render(_) => {
                tracing::error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        // method names come from the URL and are not echoed back
        let message = match &self {
            PanelError::UserNotFound(_) => self.to_string(),
            PanelError::UnknownMethod(_) => "Unknown screen method".to_string(),
            _ => "Internal server error".to_string(),
        };
        let body = format!(
            "<!DOCTYPE html><html><body><h1>{}</h1><p>{}</p></body></html>",
            status.as_u16(),
            message
        );
        (status, Html(body)).into_response()
    }
}
