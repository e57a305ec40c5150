//! Structured errors for the feedline server.
//!
//! The feed endpoint never fails at the transport level; these cover the
//! archive page and startup.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Core(#[from] feedline_core::Error),

    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// The configured nonce secret cannot key an HMAC.
    #[error("INVALID_SECRET: {0}")]
    InvalidSecret(String),
}

impl ServerError {
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::Core(e) => e.code(),
            ServerError::NotFound(_) => "NOT_FOUND",
            ServerError::InvalidSecret(_) => "INVALID_SECRET",
        }
    }

    fn status(&self) -> StatusCode {
        match self.code() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "INVALID_INPUT" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody { error: ErrorDetail { code: self.code(), message: self.to_string() } };
        (status, Json(body)).into_response()
    }
}
