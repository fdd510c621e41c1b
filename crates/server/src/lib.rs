//! Transcription server
//!
//! One multipart upload endpoint in front of the transcription pipeline,
//! plus a health check.

pub mod http;
pub mod state;
pub mod transcribe;

pub use http::create_router;
pub use state::AppState;
pub use transcribe::SHORT_AUDIO_SENTINEL;

use thiserror::Error;

/// Server errors, mapped onto the response contract
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("No audio file provided")]
    MissingAudio,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Failed to convert audio file")]
    Conversion(String),

    #[error("{0}")]
    Processing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<&ServerError> for axum::http::StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::MissingAudio => axum::http::StatusCode::BAD_REQUEST,
            ServerError::InvalidUpload(_) => axum::http::StatusCode::BAD_REQUEST,
            ServerError::Conversion(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Processing(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
