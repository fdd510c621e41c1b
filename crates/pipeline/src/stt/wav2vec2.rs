//! wav2vec2 CTC inference engine
//!
//! Wraps an ONNX export of a wav2vec2 acoustic model: raw 16 kHz waveform in,
//! per-frame label logits out. Decoding is greedy argmax over the CTC
//! vocabulary; no beam search, no language-model rescoring.
//!
//! Model selection: the fine-tuned artifacts are tried first, and any load
//! failure falls back to fetching the named public baseline from the
//! HuggingFace hub, so the process can start without the fine-tuned files.

use async_trait::async_trait;
use ndarray::Array2;
use parking_lot::Mutex;
use std::path::Path;

use ort::{session::builder::GraphOptimizationLevel, session::Session, value::Tensor};

use crate::stt::vocab::Vocabulary;
use crate::PipelineError;
use vaani_config::ModelPaths;
use vaani_core::{AudioFrame, SampleRate, SpeechToText, TranscriptResult};

/// wav2vec2 CTC speech-to-text engine
pub struct Wav2Vec2Stt {
    session: Mutex<Session>,
    vocabulary: Vocabulary,
    model_name: String,
}

impl Wav2Vec2Stt {
    /// Load the engine per the configured model selection policy
    ///
    /// Tries the fine-tuned directory first; on any failure, falls back to
    /// the public baseline model.
    pub fn load(models: &ModelPaths) -> Result<Self, PipelineError> {
        match Self::from_dir(Path::new(&models.stt_dir)) {
            Ok(stt) => {
                tracing::info!(model = %models.stt_dir, "loaded fine-tuned model");
                Ok(stt)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = %models.stt_fallback_repo,
                    "failed to load fine-tuned model, using fallback"
                );
                let stt = Self::from_hub(&models.stt_fallback_repo)?;
                tracing::info!(model = %models.stt_fallback_repo, "loaded fallback model");
                Ok(stt)
            }
        }
    }

    /// Load from a directory holding `model.onnx` and `vocab.json`
    pub fn from_dir(model_dir: &Path) -> Result<Self, PipelineError> {
        Self::from_files(
            &model_dir.join("model.onnx"),
            &model_dir.join("vocab.json"),
            &model_dir.display().to_string(),
        )
    }

    /// Fetch a baseline model from the HuggingFace hub
    fn from_hub(repo_id: &str) -> Result<Self, PipelineError> {
        let api = hf_hub::api::sync::Api::new()
            .map_err(|e| PipelineError::Model(format!("hub client init failed: {}", e)))?;
        let repo = api.model(repo_id.to_string());

        let model_path = repo
            .get("model.onnx")
            .map_err(|e| PipelineError::Model(format!("failed to fetch model.onnx: {}", e)))?;
        let vocab_path = repo
            .get("vocab.json")
            .map_err(|e| PipelineError::Model(format!("failed to fetch vocab.json: {}", e)))?;

        Self::from_files(&model_path, &vocab_path, repo_id)
    }

    fn from_files(
        model_path: &Path,
        vocab_path: &Path,
        model_name: &str,
    ) -> Result<Self, PipelineError> {
        let session = Self::load_session(model_path)?;
        let vocabulary = Vocabulary::from_file(vocab_path)?;

        Ok(Self {
            session: Mutex::new(session),
            vocabulary,
            model_name: model_name.to_string(),
        })
    }

    fn load_session(path: &Path) -> Result<Session, PipelineError> {
        let mut builder = Session::builder()
            .map_err(|e| PipelineError::Model(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PipelineError::Model(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e| PipelineError::Model(e.to_string()))?;

        // Accelerator placement is a deployment concern: with the provider
        // registered, ONNX Runtime silently falls back to CPU when no device
        // is present, and decoded output is identical either way.
        #[cfg(feature = "cuda")]
        let mut builder = builder
            .with_execution_providers([
                ort::execution_providers::CUDAExecutionProvider::default().build(),
            ])
            .map_err(|e| PipelineError::Model(e.to_string()))?;

        builder
            .commit_from_file(path)
            .map_err(|e| PipelineError::Model(format!("failed to load {}: {}", path.display(), e)))
    }

    /// Transcribe a mono 16 kHz sample array
    pub fn transcribe_samples(&self, samples: &[f32]) -> Result<TranscriptResult, PipelineError> {
        let start = std::time::Instant::now();

        let input = normalize_input(samples);
        let n_samples = input.len();

        let input_array = Array2::from_shape_vec((1, n_samples), input)
            .map_err(|e| PipelineError::Stt(format!("failed to shape input: {}", e)))?;
        let input_tensor =
            Tensor::from_array(input_array).map_err(|e| PipelineError::Model(e.to_string()))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs!["input_values" => input_tensor])
            .map_err(|e| PipelineError::Model(format!("forward pass failed: {}", e)))?;

        let logits = outputs
            .get("logits")
            .ok_or_else(|| PipelineError::Model("missing 'logits' output".to_string()))?
            .try_extract_array::<f32>()
            .map_err(|e| PipelineError::Model(e.to_string()))?;

        let shape = logits.shape().to_vec();
        if shape.len() < 2 {
            return Err(PipelineError::Model(format!(
                "unexpected logits shape: {:?}",
                shape
            )));
        }

        // [batch, frames, vocab] from the standard export, [frames, vocab]
        // from squeezed ones
        let (n_frames, vocab_size) = if shape.len() > 2 {
            (shape[1], shape[2])
        } else {
            (shape[0], shape[1])
        };

        let mut ids = Vec::with_capacity(n_frames);
        let mut confidence_sum = 0.0f32;

        for frame_idx in 0..n_frames {
            let frame_logits: Vec<f32> = if shape.len() > 2 {
                (0..vocab_size).map(|v| logits[[0, frame_idx, v]]).collect()
            } else {
                (0..vocab_size).map(|v| logits[[frame_idx, v]]).collect()
            };

            let (best_id, confidence) = frame_argmax(&frame_logits);
            ids.push(best_id as u32);
            confidence_sum += confidence;
        }

        let text = self.vocabulary.decode_greedy(&ids);
        let confidence = if n_frames > 0 {
            confidence_sum / n_frames as f32
        } else {
            0.0
        };

        tracing::debug!(
            samples = n_samples,
            frames = n_frames,
            confidence = format!("{:.2}", confidence),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "forward pass complete"
        );

        Ok(TranscriptResult::new(text, confidence))
    }

    /// Vocabulary used by the decoder
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

/// Zero-mean unit-variance feature normalization of the raw waveform
fn normalize_input(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let n = samples.len() as f32;
    let mean: f32 = samples.iter().sum::<f32>() / n;
    let variance: f32 = samples.iter().map(|&x| (x - mean) * (x - mean)).sum::<f32>() / n;
    let denom = (variance + 1e-7).sqrt();

    samples.iter().map(|&x| (x - mean) / denom).collect()
}

/// Highest-scoring label for one frame, with its softmax probability
fn frame_argmax(logits: &[f32]) -> (usize, f32) {
    if logits.is_empty() {
        return (0, 0.0);
    }

    let mut best_idx = 0;
    let mut best_logit = f32::NEG_INFINITY;
    for (i, &l) in logits.iter().enumerate() {
        if l > best_logit {
            best_logit = l;
            best_idx = i;
        }
    }

    // Softmax of the winning logit (log-sum-exp for stability)
    let exp_sum: f32 = logits.iter().map(|&x| (x - best_logit).exp()).sum();
    let confidence = if exp_sum > 0.0 { 1.0 / exp_sum } else { 0.0 };

    (best_idx, confidence.clamp(0.0, 1.0))
}

#[async_trait]
impl SpeechToText for Wav2Vec2Stt {
    async fn transcribe(&self, audio: &AudioFrame) -> vaani_core::Result<TranscriptResult> {
        if audio.sample_rate != SampleRate::Hz16000 {
            tracing::warn!(
                sample_rate = audio.sample_rate.as_u32(),
                "engine expects 16 kHz input"
            );
        }
        self.transcribe_samples(&audio.samples).map_err(Into::into)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_zero_mean_unit_variance() {
        let samples = vec![0.1, 0.5, -0.2, 0.3, -0.7];
        let normalized = normalize_input(&samples);

        let mean: f32 = normalized.iter().sum::<f32>() / normalized.len() as f32;
        let var: f32 =
            normalized.iter().map(|&x| (x - mean) * (x - mean)).sum::<f32>() / normalized.len() as f32;

        assert!(mean.abs() < 1e-5);
        assert!((var - 1.0).abs() < 1e-3);
    }

    #[test]
    fn normalization_handles_empty_input() {
        assert!(normalize_input(&[]).is_empty());
    }

    #[test]
    fn argmax_picks_highest_logit() {
        let (idx, confidence) = frame_argmax(&[0.1, 3.0, -1.0, 0.5]);
        assert_eq!(idx, 1);
        assert!(confidence > 0.5 && confidence <= 1.0);
    }

    #[test]
    fn argmax_confidence_is_uniform_for_flat_logits() {
        let (_, confidence) = frame_argmax(&[1.0, 1.0, 1.0, 1.0]);
        assert!((confidence - 0.25).abs() < 1e-5);
    }
}
