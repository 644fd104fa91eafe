//! Microphone capture for the record screen.
//!
//! Handles audio input device management and PCM sample capture. Audio is
//! captured from the configured input device, folded to mono, and encoded to
//! WebM/Opus for upload when recording stops.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::WavWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{alsa, encoder};

/// Records audio from a specified or default input device.
///
/// Multi-channel input is folded to mono in the capture callback; the final
/// WebM/Opus encode happens when recording stops. Pausing keeps the stream
/// alive but drops incoming samples.
pub struct AudioRecorder {
    /// Actual recording sample rate from device
    sample_rate: u32,
    /// Recorded audio samples (i16 PCM mono)
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active audio input stream (kept alive during recording)
    stream: Option<cpal::Stream>,
    /// Whether recording is currently paused
    is_paused: Arc<Mutex<bool>>,
    /// Device name or "default" to use the system default device
    device_name: String,
}

impl AudioRecorder {
    /// Creates a new audio recorder.
    ///
    /// The requested sample rate is advisory; the device's native rate wins.
    /// Call `sample_rate()` after `start_recording()` for the actual rate.
    pub fn new(requested_sample_rate: u32, device_name: String) -> Self {
        Self {
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            is_paused: Arc::new(Mutex::new(false)),
            device_name,
        }
    }

    /// Starts recording from the configured input device.
    ///
    /// # Errors
    /// - If the specified device is not available
    /// - If device configuration fails
    /// - If audio stream creation fails
    pub fn start_recording(&mut self) -> Result<()> {
        let device = alsa::with_silenced_stderr(|| self.resolve_device())?;

        tracing::info!(
            "Recording device: {}",
            device.name().as_deref().unwrap_or("Unknown device")
        );

        let device_config = device.default_input_config()?;
        let device_rate = device_config.sample_rate().0;
        let channels = device_config.channels() as usize;

        if device_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.sample_rate,
                device_rate
            );
        }
        tracing::debug!("Device configuration: {device_rate}Hz, {channels} channels");

        self.sample_rate = device_rate;

        let samples = Arc::clone(&self.samples);
        let paused = Arc::clone(&self.is_paused);

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if !*paused.lock().unwrap() {
                    fold_to_mono(data, channels, &mut samples.lock().unwrap());
                }
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!("Audio stream started");
        Ok(())
    }

    /// Resolves the configured device spec to an input device.
    ///
    /// Accepts "default", a numeric index from `storytime list-devices`, or a
    /// device name.
    fn resolve_device(&self) -> Result<cpal::Device> {
        let host = cpal::default_host();

        if self.device_name == "default" {
            return host
                .default_input_device()
                .ok_or_else(|| anyhow!("No audio input device available"));
        }

        let devices: Vec<cpal::Device> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if let Ok(index) = self.device_name.parse::<usize>() {
            let count = devices.len();
            return devices.into_iter().nth(index).ok_or_else(|| {
                anyhow!(
                    "Device index {index} is out of range (0-{})",
                    count.saturating_sub(1)
                )
            });
        }

        devices
            .into_iter()
            .find(|d| d.name().is_ok_and(|name| name == self.device_name))
            .ok_or_else(|| {
                anyhow!(
                    "Audio input device '{}' not found. Use 'storytime list-devices' to see available devices.",
                    self.device_name
                )
            })
    }

    /// Stops recording and saves the audio as WebM/Opus at the given path.
    ///
    /// The audio is first written as a temporary WAV file, then encoded via
    /// ffmpeg. Passing `None` discards the recording.
    ///
    /// # Errors
    /// - If temporary WAV creation fails
    /// - If ffmpeg encoding fails
    pub fn stop_recording(
        &mut self,
        output_path: Option<PathBuf>,
        opus_options: &str,
    ) -> Result<()> {
        // Drop the stream to stop capture
        self.stream = None;

        let samples = self.samples.lock().unwrap().clone();
        if samples.is_empty() {
            tracing::warn!("Recording stopped with no samples captured");
            return Ok(());
        }

        tracing::info!(
            "Recording stopped: {:.2}s ({} samples at {}Hz)",
            samples.len() as f32 / self.sample_rate as f32,
            samples.len(),
            self.sample_rate
        );

        let Some(output_file) = output_path else {
            return Ok(());
        };

        let temp_wav = std::env::temp_dir().join(format!("storytime_{}.wav", std::process::id()));
        self.write_wav(&samples, &temp_wav)?;
        let encode_result = encoder::encode_webm(&temp_wav, &output_file, opus_options);

        if let Err(e) = std::fs::remove_file(&temp_wav) {
            tracing::debug!("Failed to remove temp file: {}", e);
        }
        encode_result?;

        let file_size = std::fs::metadata(&output_file)?.len();
        tracing::info!(
            "Audio saved: {} ({} bytes)",
            output_file.display(),
            file_size
        );
        Ok(())
    }

    /// Writes samples as an uncompressed PCM WAV intermediate file.
    fn write_wav(&self, samples: &[i16], path: &Path) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        tracing::debug!("Temporary WAV created: {}", path.display());
        Ok(())
    }

    /// Returns a clone of all recorded samples.
    pub fn samples(&self) -> Vec<i16> {
        self.samples.lock().unwrap().clone()
    }

    /// Returns the number of recorded samples.
    pub fn sample_count(&self) -> usize {
        self.samples.lock().unwrap().len()
    }

    /// Returns the actual sample rate of the recording.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns whether recording is currently paused.
    pub fn is_paused(&self) -> bool {
        *self.is_paused.lock().unwrap()
    }

    /// Toggles between paused and recording states.
    pub fn toggle_pause(&self) {
        let mut paused = self.is_paused.lock().unwrap();
        *paused = !*paused;
        tracing::debug!(
            "Recording {}",
            if *paused { "paused" } else { "resumed" }
        );
    }
}

/// Folds interleaved multi-channel frames to mono by averaging each frame.
fn fold_to_mono(data: &[i16], channels: usize, out: &mut Vec<i16>) {
    if channels <= 1 {
        out.extend_from_slice(data);
        return;
    }

    out.reserve(data.len() / channels);
    for frame in data.chunks_exact(channels) {
        let sum: i32 = frame.iter().map(|&s| s as i32).sum();
        out.push((sum / channels as i32) as i16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_passes_through() {
        let mut out = Vec::new();
        fold_to_mono(&[1, 2, 3], 1, &mut out);
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_stereo_frames_average() {
        let mut out = Vec::new();
        fold_to_mono(&[100, 200, -50, 50], 2, &mut out);
        assert_eq!(out, vec![150, 0]);
    }

    #[test]
    fn test_trailing_partial_frame_is_dropped() {
        let mut out = Vec::new();
        fold_to_mono(&[10, 20, 30], 2, &mut out);
        assert_eq!(out, vec![15]);
    }
}
