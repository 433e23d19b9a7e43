use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TessgateError {
    #[error("Invalid request")]
    NoImageProvided,

    #[error("{0}")]
    InvalidBody(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Fetch(String),

    #[error("{0}")]
    FileRead(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Failed to start OCR engine: {0}")]
    Spawn(String),

    /// The engine ran but exited non-zero; carries its stderr verbatim.
    #[error("{0}")]
    EngineFailure(String),

    #[error("OCR engine timed out after {0} seconds")]
    EngineTimeout(u64),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl TessgateError {
    pub fn status(&self) -> StatusCode {
        match self {
            TessgateError::NoImageProvided | TessgateError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            TessgateError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            TessgateError::Fetch(_)
            | TessgateError::FileRead(_)
            | TessgateError::Upload(_)
            | TessgateError::Spawn(_)
            | TessgateError::EngineFailure(_)
            | TessgateError::EngineTimeout(_)
            | TessgateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for TessgateError {
    fn from(err: reqwest::Error) -> Self {
        TessgateError::Fetch(err.to_string())
    }
}

impl IntoResponse for TessgateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Error: {}", message);
        }

        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, TessgateError>;
