//! Audio frame types and utilities

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// PCM16 normalization constant (i16 full scale)
const PCM16_NORMALIZE: f32 = 32768.0;

/// Supported audio sample rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SampleRate {
    /// 8kHz - Telephony
    Hz8000,
    /// 16kHz - Standard speech recognition
    #[default]
    Hz16000,
    /// 22.05kHz - Consumer audio
    Hz22050,
    /// 44.1kHz - CD quality
    Hz44100,
    /// 48kHz - Professional audio
    Hz48000,
}

impl SampleRate {
    /// Get sample rate as u32
    pub fn as_u32(&self) -> u32 {
        match self {
            SampleRate::Hz8000 => 8000,
            SampleRate::Hz16000 => 16000,
            SampleRate::Hz22050 => 22050,
            SampleRate::Hz44100 => 44100,
            SampleRate::Hz48000 => 48000,
        }
    }

    /// Map a raw rate in Hz to a known variant
    pub fn from_hz(hz: u32) -> Option<Self> {
        match hz {
            8000 => Some(SampleRate::Hz8000),
            16000 => Some(SampleRate::Hz16000),
            22050 => Some(SampleRate::Hz22050),
            44100 => Some(SampleRate::Hz44100),
            48000 => Some(SampleRate::Hz48000),
            _ => None,
        }
    }
}

/// A mono audio buffer with its sampling rate
///
/// Samples are f32, nominally in [-1.0, 1.0]. Decoders that produce
/// out-of-range amplitudes go through [`AudioFrame::normalized`] before the
/// frame reaches the model.
#[derive(Clone)]
pub struct AudioFrame {
    /// Raw audio samples
    pub samples: Arc<[f32]>,
    /// Sample rate
    pub sample_rate: SampleRate,
}

impl std::fmt::Debug for AudioFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioFrame")
            .field("samples_len", &self.samples.len())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

impl AudioFrame {
    /// Create a new audio frame from f32 samples
    pub fn new(samples: Vec<f32>, sample_rate: SampleRate) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// Convert from PCM16 bytes (little-endian)
    pub fn from_pcm16(bytes: &[u8], sample_rate: SampleRate) -> Self {
        let samples: Vec<f32> = bytes
            .chunks_exact(2)
            .map(|chunk| {
                let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
                sample as f32 / PCM16_NORMALIZE
            })
            .collect();

        Self::new(samples, sample_rate)
    }

    /// Number of samples in the frame
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the frame holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Frame duration
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate.as_u32() as f64)
    }

    /// Frame duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.duration().as_millis() as u64
    }

    /// Peak absolute amplitude
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    /// Rescale so the peak absolute amplitude is at most 1.0
    ///
    /// Frames already within [-1.0, 1.0] are returned unchanged.
    pub fn normalized(self) -> Self {
        let peak = self.peak();
        if peak <= 1.0 {
            return self;
        }

        tracing::debug!(peak = peak, "rescaling out-of-range waveform by its peak");
        let samples: Vec<f32> = self.samples.iter().map(|s| s / peak).collect();
        Self::new(samples, self.sample_rate)
    }
}

/// Resample a mono signal between arbitrary rates
///
/// Uses Rubato's FFT resampler; very short inputs and resampler failures fall
/// back to linear interpolation.
pub fn resample(samples: &[f32], from_hz: u32, to_hz: u32) -> Vec<f32> {
    use rubato::{FftFixedIn, Resampler};

    if from_hz == to_hz || samples.is_empty() {
        return samples.to_vec();
    }

    // Rubato needs a reasonable chunk to work with
    if samples.len() < 64 {
        return resample_linear(samples, from_hz, to_hz);
    }

    let chunk_size = samples.len().min(1024);
    let samples_f64: Vec<f64> = samples.iter().map(|&s| s as f64).collect();

    match FftFixedIn::<f64>::new(from_hz as usize, to_hz as usize, chunk_size, 2, 1) {
        Ok(mut resampler) => {
            let input_frames = vec![samples_f64];
            match resampler.process(&input_frames, None) {
                Ok(output_frames) => output_frames[0].iter().map(|&s| s as f32).collect(),
                Err(e) => {
                    tracing::warn!("rubato processing failed, using linear fallback: {}", e);
                    resample_linear(samples, from_hz, to_hz)
                }
            }
        }
        Err(e) => {
            tracing::warn!("rubato init failed, using linear fallback: {}", e);
            resample_linear(samples, from_hz, to_hz)
        }
    }
}

/// Linear interpolation fallback for edge cases
fn resample_linear(samples: &[f32], from_hz: u32, to_hz: u32) -> Vec<f32> {
    if samples.len() <= 1 {
        return samples.to_vec();
    }

    let ratio = to_hz as f64 / from_hz as f64;
    let new_len = ((samples.len() as f64 * ratio) as usize).max(1);
    let max_idx = samples.len() - 1;

    let mut resampled = Vec::with_capacity(new_len);
    for i in 0..new_len {
        let src_idx = i as f64 / ratio;
        let idx_floor = (src_idx.floor() as usize).min(max_idx);
        let idx_ceil = (idx_floor + 1).min(max_idx);
        let frac = (src_idx - idx_floor as f64) as f32;

        let sample = samples[idx_floor] * (1.0 - frac) + samples[idx_ceil] * frac;
        resampled.push(sample);
    }

    resampled
}
