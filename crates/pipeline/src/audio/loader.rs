//! Waveform loading
//!
//! Reads a normalized WAV file into an f32 sample array. The primary reader
//! is `hound`; when it rejects a file (format quirks, corrupt header) a
//! lenient RIFF scan takes over. Both paths deliver mono 16 kHz output, and
//! out-of-range amplitudes are rescaled by the peak before the frame is
//! handed to inference.

use std::path::Path;

use crate::audio::transcoder::TARGET_SAMPLE_RATE;
use crate::PipelineError;
use vaani_core::audio::resample;
use vaani_core::{AudioFrame, SampleRate};

/// Waveforms shorter than this are not worth running through the model;
/// the request handler short-circuits with a sentinel response instead.
pub const MIN_SAMPLES: usize = 100;

/// Load a waveform file into a mono 16 kHz frame
pub fn load_waveform(path: &Path) -> Result<AudioFrame, PipelineError> {
    match load_with_hound(path) {
        Ok(frame) => Ok(frame.normalized()),
        Err(primary) => {
            tracing::warn!(
                path = %path.display(),
                error = %primary,
                "primary WAV reader failed, trying lenient fallback"
            );
            match load_lenient(path) {
                Ok(frame) => Ok(frame.normalized()),
                Err(fallback) => Err(PipelineError::Decode(format!(
                    "both waveform readers failed: {}; {}",
                    primary, fallback
                ))),
            }
        }
    }
}

/// Container-aware decode via hound
fn load_with_hound(path: &Path) -> Result<AudioFrame, PipelineError> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| PipelineError::Decode(format!("failed to open WAV: {}", e)))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| PipelineError::Decode(e.to_string()))?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<_, _>>()
            .map_err(|e| PipelineError::Decode(e.to_string()))?,
        (hound::SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_608.0))
            .collect::<Result<_, _>>()
            .map_err(|e| PipelineError::Decode(e.to_string()))?,
        (hound::SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect::<Result<_, _>>()
            .map_err(|e| PipelineError::Decode(e.to_string()))?,
        (format, bits) => {
            return Err(PipelineError::Decode(format!(
                "unsupported sample format: {:?}/{} bits",
                format, bits
            )))
        }
    };

    let mono = downmix(samples, spec.channels as usize);
    Ok(to_target_rate(mono, spec.sample_rate))
}

/// Lenient RIFF scan used when hound rejects the file
///
/// Locates the `fmt ` and `data` chunks directly and treats the payload as
/// PCM16, which is what the transcoder emits.
fn load_lenient(path: &Path) -> Result<AudioFrame, PipelineError> {
    let bytes =
        std::fs::read(path).map_err(|e| PipelineError::Io(format!("failed to read WAV: {}", e)))?;

    if bytes.len() < 44 {
        return Err(PipelineError::Decode("WAV file too short".to_string()));
    }

    let mut channels = 1usize;
    let mut sample_rate = TARGET_SAMPLE_RATE;
    let mut data: Option<&[u8]> = None;

    // Skip the RIFF header, then walk chunks (word-aligned)
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let chunk_id = &bytes[pos..pos + 4];
        let chunk_size = u32::from_le_bytes([
            bytes[pos + 4],
            bytes[pos + 5],
            bytes[pos + 6],
            bytes[pos + 7],
        ]) as usize;
        let body_start = pos + 8;

        match chunk_id {
            b"fmt " if chunk_size >= 16 && body_start + 16 <= bytes.len() => {
                channels =
                    u16::from_le_bytes([bytes[body_start + 2], bytes[body_start + 3]]) as usize;
                sample_rate = u32::from_le_bytes([
                    bytes[body_start + 4],
                    bytes[body_start + 5],
                    bytes[body_start + 6],
                    bytes[body_start + 7],
                ]);
            }
            b"data" => {
                let body_end = (body_start + chunk_size).min(bytes.len());
                data = Some(&bytes[body_start..body_end]);
            }
            _ => {}
        }

        pos = body_start + chunk_size + (chunk_size & 1);
    }

    let data = data
        .ok_or_else(|| PipelineError::Decode("could not find data chunk in WAV".to_string()))?;

    let samples: Vec<f32> = data
        .chunks_exact(2)
        .map(|chunk| {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            sample as f32 / 32768.0
        })
        .collect();

    if channels == 0 {
        return Err(PipelineError::Decode("fmt chunk declares 0 channels".to_string()));
    }

    let mono = downmix(samples, channels);
    Ok(to_target_rate(mono, sample_rate))
}

/// Average interleaved channels down to mono
fn downmix(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }

    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Coerce to the model's 16 kHz rate
///
/// The transcoder already pins the rate, so this only triggers for files
/// that reached the loader some other way.
fn to_target_rate(samples: Vec<f32>, source_rate: u32) -> AudioFrame {
    if source_rate == TARGET_SAMPLE_RATE {
        return AudioFrame::new(samples, SampleRate::Hz16000);
    }

    tracing::debug!(
        source_rate = source_rate,
        target_rate = TARGET_SAMPLE_RATE,
        "resampling waveform to model rate"
    );
    let resampled = resample(&samples, source_rate, TARGET_SAMPLE_RATE);
    AudioFrame::new(resampled, SampleRate::Hz16000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_wav(path: &Path, spec: hound::WavSpec, samples: &[i16]) {
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn loads_pcm16_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_wav(&path, spec, &[0, 16384, -16384, 0]);

        let frame = load_waveform(&path).unwrap();
        assert_eq!(frame.len(), 4);
        assert_eq!(frame.sample_rate, SampleRate::Hz16000);
        assert!((frame.samples[1] - 0.5).abs() < 1e-3);
        assert!((frame.samples[2] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn downmixes_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_wav(&path, spec, &[16384, 0, 0, 16384]);

        let frame = load_waveform(&path).unwrap();
        assert_eq!(frame.len(), 2);
        assert!((frame.samples[0] - 0.25).abs() < 1e-3);
        assert!((frame.samples[1] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn resamples_to_sixteen_khz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("8k.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_wav(&path, spec, &vec![100i16; 800]);

        let frame = load_waveform(&path).unwrap();
        assert_eq!(frame.sample_rate, SampleRate::Hz16000);
        assert!((frame.len() as i64 - 1600).abs() < 160);
    }

    #[test]
    fn fallback_reads_nonstandard_format_tag() {
        // Hand-built WAV with format tag 0xFFFE (extensible), which hound
        // rejects; the payload is still plain PCM16.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extensible.wav");

        let samples: Vec<i16> = vec![0, 8192, -8192, 0];
        let mut data = Vec::new();
        for s in &samples {
            data.extend_from_slice(&s.to_le_bytes());
        }

        let mut fmt = Vec::new();
        fmt.extend_from_slice(&0xFFFEu16.to_le_bytes()); // format tag
        fmt.extend_from_slice(&1u16.to_le_bytes()); // channels
        fmt.extend_from_slice(&16000u32.to_le_bytes()); // sample rate
        fmt.extend_from_slice(&32000u32.to_le_bytes()); // byte rate
        fmt.extend_from_slice(&2u16.to_le_bytes()); // block align
        fmt.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&((4 + 8 + fmt.len() + 8 + data.len()) as u32).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&(fmt.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&fmt);
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&data);

        std::fs::File::create(&path)
            .unwrap()
            .write_all(&bytes)
            .unwrap();

        let frame = load_waveform(&path).unwrap();
        assert_eq!(frame.len(), 4);
        assert!((frame.samples[1] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"this is not audio at all, not even close!!!!").unwrap();

        let err = load_waveform(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn short_threshold_is_sane() {
        // 100 samples at 16 kHz is 6.25ms, well below any real utterance
        assert_eq!(MIN_SAMPLES, 100);
    }
}
