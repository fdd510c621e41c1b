//! Core traits and types for the transcription service
//!
//! This crate provides the foundational pieces shared by the pipeline and
//! server crates:
//! - Audio frame types and sample-rate handling
//! - Transcript result type
//! - Trait seams for pluggable backends (STT engine, audio transcoder)
//! - Error types

pub mod audio;
pub mod error;
pub mod traits;
pub mod transcript;

pub use audio::{AudioFrame, SampleRate};
pub use error::{Error, Result};
pub use traits::{AudioTranscoder, SpeechToText};
pub use transcript::TranscriptResult;
