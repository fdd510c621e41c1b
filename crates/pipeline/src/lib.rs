//! Transcription pipeline
//!
//! This crate provides the per-request processing chain of the service:
//! - **Audio transcoding**: ffmpeg invocation producing mono 16 kHz PCM WAV
//! - **Waveform loading**: WAV decode with a lenient fallback reader
//! - **Inference**: wav2vec2 CTC acoustic model via ONNX Runtime
//! - **Transcript correction**: regex corrections for Indian-English
//!   place names and phonetic confusions
//!
//! The chain is strictly linear per request; the loaded model is the only
//! process-lifetime state and is shared read-only.

pub mod audio;
pub mod stt;
pub mod text;

pub use audio::loader::{load_waveform, MIN_SAMPLES};
pub use audio::transcoder::FfmpegTranscoder;
pub use stt::vocab::Vocabulary;
pub use stt::wav2vec2::Wav2Vec2Stt;
pub use text::corrector::TranscriptCorrector;

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("stt error: {0}")]
    Stt(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<PipelineError> for vaani_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Conversion(msg) => vaani_core::Error::Conversion(msg),
            PipelineError::Decode(msg) => vaani_core::Error::Decode(msg),
            PipelineError::Model(msg) => vaani_core::Error::Model(msg),
            PipelineError::Stt(msg) => vaani_core::Error::Stt(msg),
            PipelineError::Io(msg) => vaani_core::Error::Decode(msg),
        }
    }
}
