//! Application state
//!
//! Shared state across all handlers. The engine and transcoder sit behind
//! trait objects so the HTTP layer can be exercised with fakes.

use std::sync::Arc;

use vaani_config::Settings;
use vaani_core::{AudioTranscoder, SpeechToText};
use vaani_pipeline::TranscriptCorrector;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration, fixed for the process lifetime
    pub config: Arc<Settings>,
    /// Loaded model state: initialized once, read-only afterwards
    pub stt: Arc<dyn SpeechToText>,
    /// External audio transcoder
    pub transcoder: Arc<dyn AudioTranscoder>,
    /// Transcript corrector
    pub corrector: Arc<TranscriptCorrector>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: Settings,
        stt: Arc<dyn SpeechToText>,
        transcoder: Arc<dyn AudioTranscoder>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            stt,
            transcoder,
            corrector: Arc::new(TranscriptCorrector::new()),
        }
    }
}
