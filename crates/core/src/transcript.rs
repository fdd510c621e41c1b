//! Transcript result type

use serde::{Deserialize, Serialize};

/// Result of transcribing one utterance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptResult {
    /// Decoded text
    pub text: String,
    /// Mean per-frame confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl TranscriptResult {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}
