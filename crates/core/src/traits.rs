//! Trait seams for pluggable backends

use crate::audio::AudioFrame;
use crate::error::Result;
use crate::transcript::TranscriptResult;
use async_trait::async_trait;
use std::path::Path;

/// Speech-to-Text interface
///
/// Implementations:
/// - `Wav2Vec2Stt` - ONNX wav2vec2 CTC engine (pipeline crate)
/// - test fakes in the server integration suite
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Transcribe a complete utterance
    ///
    /// The frame is expected to be mono at the engine's native sample rate
    /// (16 kHz for the wav2vec2 engine).
    async fn transcribe(&self, audio: &AudioFrame) -> Result<TranscriptResult>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

/// External audio transcoding interface
///
/// Converts an arbitrary uploaded container into mono 16 kHz 16-bit PCM WAV.
#[async_trait]
pub trait AudioTranscoder: Send + Sync + 'static {
    /// Transcode `input` into a normalized WAV at `output`
    ///
    /// A failing or unavailable transcoder is reported as an error, never a
    /// panic; the caller maps it to a client-visible response.
    async fn transcode_to_pcm_wav(&self, input: &Path, output: &Path) -> Result<()>;
}
