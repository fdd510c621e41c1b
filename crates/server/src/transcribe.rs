//! Transcription endpoint
//!
//! Flow per request:
//! 1. Pull the `audio` part out of the multipart form
//! 2. Save it to a temporary file
//! 3. Transcode to mono 16 kHz PCM WAV via the external transcoder
//! 4. Load the waveform (short clips short-circuit with a sentinel)
//! 5. Run the acoustic model and correct the transcript
//!
//! Both temporary files are deletion-guarded, so they are removed on every
//! exit path, success or failure.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tempfile::TempPath;

use crate::state::AppState;
use crate::ServerError;
use vaani_core::{AudioTranscoder, SpeechToText};
use vaani_pipeline::{load_waveform, MIN_SAMPLES};

/// Returned for clips too short to be worth decoding; this is a successful
/// response, not an error
pub const SHORT_AUDIO_SENTINEL: &str = "Audio too short or empty";

/// Success payload
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcription: String,
}

/// Error payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handle a transcription request
pub async fn transcribe(State(state): State<AppState>, multipart: Multipart) -> Response {
    match run_pipeline(&state, multipart).await {
        Ok(transcription) => {
            (StatusCode::OK, Json(TranscribeResponse { transcription })).into_response()
        }
        Err(err) => {
            let status = StatusCode::from(&err);
            tracing::error!(status = %status, error = %err, "transcription request failed");
            (
                status,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Run the staged pipeline for one upload
async fn run_pipeline(state: &AppState, multipart: Multipart) -> Result<String, ServerError> {
    let audio = read_audio_part(multipart).await?;

    let original_path = save_upload(&audio).await?;
    let wav_path = make_temp_path(".wav")?;

    // Converted
    state
        .transcoder
        .transcode_to_pcm_wav(&original_path, &wav_path)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "audio conversion failed");
            ServerError::Conversion(e.to_string())
        })?;

    // Loaded
    let frame = load_waveform(&wav_path).map_err(|e| ServerError::Processing(e.to_string()))?;
    tracing::info!(
        samples = frame.len(),
        duration_ms = frame.duration_ms(),
        "waveform loaded"
    );

    // ShortCircuited
    if frame.len() < MIN_SAMPLES {
        tracing::info!(samples = frame.len(), "audio below minimum length, skipping inference");
        return Ok(SHORT_AUDIO_SENTINEL.to_string());
    }

    // Inferred
    let result = state
        .stt
        .transcribe(&frame)
        .await
        .map_err(|e| ServerError::Processing(e.to_string()))?;
    tracing::info!(
        raw = %result.text,
        confidence = format!("{:.2}", result.confidence),
        "raw transcription"
    );

    // PostProcessed
    let corrected = state.corrector.correct(&result.text);
    tracing::info!(transcription = %corrected, "processed transcription");

    Ok(corrected)
}

/// Uploaded audio part
struct AudioUpload {
    filename: Option<String>,
    bytes: Vec<u8>,
}

/// Extract the `audio` field from the form
async fn read_audio_part(mut multipart: Multipart) -> Result<AudioUpload, ServerError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ServerError::MissingAudio),
            Err(e) => return Err(ServerError::InvalidUpload(e.to_string())),
        };

        if field.name() != Some("audio") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::InvalidUpload(e.to_string()))?;

        tracing::info!(
            filename = filename.as_deref().unwrap_or("unknown"),
            content_type = content_type.as_deref().unwrap_or("unknown"),
            size = bytes.len(),
            "received audio file"
        );

        return Ok(AudioUpload {
            filename,
            bytes: bytes.to_vec(),
        });
    }
}

/// Persist the upload to a uniquely named temporary file
async fn save_upload(audio: &AudioUpload) -> Result<TempPath, ServerError> {
    // Keep the original extension when the browser supplied one; ffmpeg uses
    // it as a container hint
    let suffix = audio
        .filename
        .as_deref()
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| format!(".{}", ext)))
        .unwrap_or_else(|| ".webm".to_string());

    let path = make_temp_path(&suffix)?;
    tokio::fs::write(&path, &audio.bytes)
        .await
        .map_err(|e| ServerError::Internal(format!("failed to save upload: {}", e)))?;

    tracing::debug!(path = %path.display(), "saved original file");
    Ok(path)
}

/// Create a uniquely named temp file and take its deletion guard
fn make_temp_path(suffix: &str) -> Result<TempPath, ServerError> {
    let file = tempfile::Builder::new()
        .prefix("vaani_")
        .suffix(suffix)
        .tempfile()
        .map_err(|e| ServerError::Internal(format!("failed to create temp file: {}", e)))?;
    Ok(file.into_temp_path())
}
