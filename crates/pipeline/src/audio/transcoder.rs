//! External audio transcoder
//!
//! Wraps an ffmpeg invocation that converts an arbitrary uploaded container
//! into the fixed waveform format the model expects: single channel, 16 kHz,
//! 16-bit linear PCM.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use crate::PipelineError;
use vaani_core::AudioTranscoder;

/// Target sample rate for normalized audio
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// ffmpeg-backed transcoder
pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    /// Create a transcoder using `ffmpeg` from PATH
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    /// Create a transcoder using a specific binary
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Convert `input` into mono 16 kHz 16-bit PCM WAV at `output`
    ///
    /// Both a non-zero exit status and a failure to start the process are
    /// reported as [`PipelineError::Conversion`]; neither takes the service
    /// down.
    pub async fn convert_to_wav(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<(), PipelineError> {
        let result = Command::new(&self.program)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-ar", "16000", "-ac", "1", "-acodec", "pcm_s16le"])
            .arg(output)
            .output()
            .await
            .map_err(|e| {
                PipelineError::Conversion(format!("failed to start {}: {}", self.program, e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            tracing::error!(
                status = %result.status,
                stderr = %stderr,
                "ffmpeg conversion failed"
            );
            return Err(PipelineError::Conversion(format!(
                "{} exited with {}",
                self.program, result.status
            )));
        }

        tracing::debug!(output = %output.display(), "audio converted to normalized WAV");
        Ok(())
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn transcode_to_pcm_wav(&self, input: &Path, output: &Path) -> vaani_core::Result<()> {
        self.convert_to_wav(input, output).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_reported_not_fatal() {
        let transcoder = FfmpegTranscoder::with_program("definitely-not-a-transcoder");
        let err = transcoder
            .convert_to_wav(Path::new("in.webm"), Path::new("out.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Conversion(_)));
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported() {
        // `false` ignores its arguments and exits 1
        let transcoder = FfmpegTranscoder::with_program("false");
        let err = transcoder
            .convert_to_wav(Path::new("in.webm"), Path::new("out.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Conversion(_)));
    }
}
