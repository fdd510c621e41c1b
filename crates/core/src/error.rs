//! Shared error type

use thiserror::Error;

/// Errors surfaced across crate boundaries
#[derive(Error, Debug)]
pub enum Error {
    #[error("audio conversion failed: {0}")]
    Conversion(String),

    #[error("audio decoding failed: {0}")]
    Decode(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("speech recognition failed: {0}")]
    Stt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
