//! Microphone capture via `cpal`.
//!
//! Captures from the default input device, down-mixes to mono and resamples
//! to 16 kHz. Samples arriving while the speaker gate is raised are dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use rubato::{FftFixedIn, Resampler as _};

use crate::error::VoiceError;
use crate::gate::SpeakerGate;

/// Sample rate of stored recordings.
pub const RECORDING_SAMPLE_RATE: u32 = 16_000;

/// Microphone capture. Lives on the audio thread.
pub struct AudioCapture {
    /// The active cpal input stream (None when not recording).
    stream: Option<Stream>,

    /// Raw interleaved samples at the device rate.
    buffer: Arc<Mutex<Vec<f32>>>,

    is_recording: Arc<AtomicBool>,
    gate: SpeakerGate,
    device_sample_rate: u32,
    device_channels: u16,
}

impl AudioCapture {
    /// Probe the default input device.
    pub fn new(gate: SpeakerGate) -> Result<Self, VoiceError> {
        let (device, config) = default_input()?;
        let device_sample_rate = config.sample_rate().0;
        let device_channels = config.channels();

        tracing::info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = device_sample_rate,
            channels = device_channels,
            "Audio capture initialized"
        );

        Ok(Self {
            stream: None,
            buffer: Arc::new(Mutex::new(Vec::new())),
            is_recording: Arc::new(AtomicBool::new(false)),
            gate,
            device_sample_rate,
            device_channels,
        })
    }

    /// Whether an input device is reachable. Desktop platforms have no
    /// separate permission prompt; the OS refuses the stream instead.
    pub fn probe() -> Result<(), VoiceError> {
        default_input().map(|_| ())
    }

    pub fn start_recording(&mut self) -> Result<(), VoiceError> {
        if self.is_recording.load(Ordering::SeqCst) {
            return Err(VoiceError::DeviceBusy);
        }

        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let (device, config) = default_input()?;
        let stream = self.build_input_stream(&device, &config)?;
        stream.play().map_err(|e| match e {
            cpal::PlayStreamError::DeviceNotAvailable => VoiceError::NoInputDevice,
            other => VoiceError::InputStreamError(other.to_string()),
        })?;

        self.stream = Some(stream);
        self.is_recording.store(true, Ordering::SeqCst);
        tracing::debug!("Audio recording started");
        Ok(())
    }

    /// Stop recording and return 16 kHz mono samples.
    pub fn stop_recording(&mut self) -> Result<Vec<f32>, VoiceError> {
        self.is_recording.store(false, Ordering::SeqCst);
        self.stream = None;

        let raw = std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner));

        tracing::debug!(
            raw_samples = raw.len(),
            device_rate = self.device_sample_rate,
            "Audio recording stopped"
        );

        let mono = if self.device_channels > 1 {
            downmix(&raw, self.device_channels)
        } else {
            raw
        };

        if self.device_sample_rate == RECORDING_SAMPLE_RATE {
            Ok(mono)
        } else {
            resample(&mono, self.device_sample_rate, RECORDING_SAMPLE_RATE)
        }
    }

    /// Stop recording and drop what was captured.
    pub fn abort_recording(&mut self) {
        self.is_recording.store(false, Ordering::SeqCst);
        self.stream = None;
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn build_input_stream(
        &self,
        device: &Device,
        config: &cpal::SupportedStreamConfig,
    ) -> Result<Stream, VoiceError> {
        let stream_config: StreamConfig = config.clone().into();
        let sample_format = config.sample_format();

        let err_fn = |err: cpal::StreamError| {
            tracing::error!(%err, "Audio input stream error");
        };

        let stream = match sample_format {
            SampleFormat::F32 => {
                let sink = self.sample_sink();
                device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| sink.push(data.iter().copied()),
                    err_fn,
                    None,
                )
            }
            SampleFormat::I16 => {
                let sink = self.sample_sink();
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        sink.push(data.iter().map(|&s| f32::from(s) / 32768.0));
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::I32 => {
                let sink = self.sample_sink();
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i32], _: &cpal::InputCallbackInfo| {
                        #[allow(clippy::cast_precision_loss)]
                        sink.push(data.iter().map(|&s| s as f32 / 2_147_483_648.0));
                    },
                    err_fn,
                    None,
                )
            }
            _ => {
                return Err(VoiceError::InputStreamError(format!(
                    "Unsupported sample format: {sample_format:?}"
                )));
            }
        };

        stream.map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => VoiceError::MicrophonePermissionDenied,
            other => VoiceError::InputStreamError(other.to_string()),
        })
    }

    fn sample_sink(&self) -> SampleSink {
        SampleSink {
            buffer: Arc::clone(&self.buffer),
            is_recording: Arc::clone(&self.is_recording),
            gate: self.gate.clone(),
        }
    }
}

/// What the cpal callback writes into.
struct SampleSink {
    buffer: Arc<Mutex<Vec<f32>>>,
    is_recording: Arc<AtomicBool>,
    gate: SpeakerGate,
}

impl SampleSink {
    fn push(&self, samples: impl Iterator<Item = f32>) {
        if !self.is_recording.load(Ordering::Relaxed) || self.gate.is_raised() {
            return;
        }
        if let Ok(mut buf) = self.buffer.lock() {
            buf.extend(samples);
        }
    }
}

fn default_input() -> Result<(Device, cpal::SupportedStreamConfig), VoiceError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(VoiceError::NoInputDevice)?;
    let config = device
        .default_input_config()
        .map_err(|e| VoiceError::InputStreamError(e.to_string()))?;
    Ok((device, config))
}

/// Convert interleaved multi-channel audio to mono by averaging channels.
fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    let channels = usize::from(channels);
    #[allow(clippy::cast_precision_loss)]
    let divisor = channels as f32;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / divisor)
        .collect()
}

/// Resample mono audio with an FFT resampler, padding the final chunk.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, VoiceError> {
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let mut resampler = FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, 1024, 2, 1)
        .map_err(|e| VoiceError::ResampleError(e.to_string()))?;
    // The resampler rounds the requested chunk to a multiple of the rate ratio
    let chunk_size = resampler.input_frames_next();

    let mut output = Vec::with_capacity(samples.len() * to_rate as usize / from_rate as usize + 1);

    let mut chunks = samples.chunks_exact(chunk_size);
    for chunk in &mut chunks {
        let result = resampler
            .process(&[chunk], None)
            .map_err(|e| VoiceError::ResampleError(e.to_string()))?;
        if let Some(channel) = result.first() {
            output.extend_from_slice(channel);
        }
    }

    let remaining = chunks.remainder();
    if !remaining.is_empty() {
        let mut padded = vec![0.0f32; chunk_size];
        padded[..remaining.len()].copy_from_slice(remaining);

        let result = resampler
            .process(&[&padded], None)
            .map_err(|e| VoiceError::ResampleError(e.to_string()))?;
        if let Some(channel) = result.first() {
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            let take = ((remaining.len() as f64 * f64::from(to_rate) / f64::from(from_rate)).ceil()
                as usize)
                .min(channel.len());
            output.extend_from_slice(&channel[..take]);
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_frames() {
        let mono = downmix(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn resample_empty_is_empty() {
        assert!(resample(&[], 48_000, 16_000).unwrap().is_empty());
    }

    #[test]
    fn resample_48k_to_16k_thirds_the_length() {
        let input = vec![0.0f32; 4800];
        let output = resample(&input, 48_000, 16_000).unwrap();
        // FFT resampler adds a short delay; allow slack
        assert!((1400..=1700).contains(&output.len()), "{}", output.len());
    }
}
