#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use sentinel_contracts::alert::SensorUnavailable;
use sentinel_contracts::audio::AudioFrame;

/// Samples retained between ticks. Only the newest window feeds a
/// frame, so the buffer stays small regardless of tick jitter.
const CAPTURE_BUFFER_SAMPLES: usize = 4_096;

/// Microphone capture via the default input device. The stream writes
/// into a shared buffer from the audio thread; `capture_frame` turns
/// the newest window into one analyser-style byte spectrum per tick.
///
/// Construction is the only fallible step. A missing device or denied
/// permission surfaces once as `SensorUnavailable`; the caller then
/// runs the engine on zero audio.
pub struct MicCapture {
    _stream: cpal::Stream,
    shared: Arc<Mutex<Vec<f32>>>,
    sample_rate_hz: u32,
    bins: usize,
}

impl MicCapture {
    pub fn start(bins: usize) -> Result<Self, SensorUnavailable> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(SensorUnavailable {
            sensor: "microphone",
            reason: "no default input device".to_string(),
        })?;
        let supported = device.default_input_config().map_err(|err| SensorUnavailable {
            sensor: "microphone",
            reason: format!("input config unavailable: {err}"),
        })?;
        let sample_format = supported.sample_format();
        let channels = usize::from(supported.channels());
        let sample_rate_hz = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        let shared = Arc::new(Mutex::new(Vec::new()));
        let writer = Arc::clone(&shared);
        let on_error = |err| eprintln!("sentinel_adapter: input stream error: {err}");

        let stream = match sample_format {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    push_samples(&writer, data, channels);
                },
                on_error,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<f32> =
                        data.iter().map(|&s| f32::from(s) / 32_768.0).collect();
                    push_samples(&writer, &converted, channels);
                },
                on_error,
                None,
            ),
            other => {
                return Err(SensorUnavailable {
                    sensor: "microphone",
                    reason: format!("unsupported sample format {other:?}"),
                })
            }
        }
        .map_err(|err| SensorUnavailable {
            sensor: "microphone",
            reason: format!("input stream build failed: {err}"),
        })?;
        stream.play().map_err(|err| SensorUnavailable {
            sensor: "microphone",
            reason: format!("input stream start failed: {err}"),
        })?;

        Ok(Self {
            _stream: stream,
            shared,
            sample_rate_hz,
            bins,
        })
    }

    /// One frame from the newest `2 * bins` samples, or `None` when not
    /// enough audio has accumulated since the last tick.
    pub fn capture_frame(&self) -> Option<AudioFrame> {
        let window = 2 * self.bins;
        let samples: Vec<f32> = {
            let mut buf = self.shared.lock().ok()?;
            if buf.len() < window {
                return None;
            }
            let split_at = buf.len() - window;
            let tail = buf.split_off(split_at);
            buf.clear();
            tail
        };
        let spectrum = byte_spectrum(&samples, self.bins);
        AudioFrame::v1(self.sample_rate_hz, spectrum).ok()
    }
}

// Downmixes interleaved channels to mono and bounds the buffer.
fn push_samples(shared: &Arc<Mutex<Vec<f32>>>, data: &[f32], channels: usize) {
    let channels = channels.max(1);
    if let Ok(mut buf) = shared.lock() {
        for frame in data.chunks_exact(channels) {
            let mono = frame.iter().sum::<f32>() / channels as f32;
            buf.push(mono);
        }
        if buf.len() > CAPTURE_BUFFER_SAMPLES {
            let excess = buf.len() - CAPTURE_BUFFER_SAMPLES;
            buf.drain(..excess);
        }
    }
}

/// Coarse DFT over the half-spectrum, scaled to byte magnitudes the
/// way browser analyser nodes report them. Bin `k` of `bins` covers
/// frequency `k * sample_rate / (2 * bins)`.
fn byte_spectrum(samples: &[f32], bins: usize) -> Vec<u8> {
    let n = samples.len().max(1);
    let mut out = Vec::with_capacity(bins);
    for k in 0..bins {
        let mut re = 0.0_f64;
        let mut im = 0.0_f64;
        for (i, &s) in samples.iter().enumerate() {
            let angle = std::f64::consts::TAU * k as f64 * i as f64 / n as f64;
            re += f64::from(s) * angle.cos();
            im -= f64::from(s) * angle.sin();
        }
        let magnitude = (re * re + im * im).sqrt() * 2.0 / n as f64;
        out.push((magnitude * 255.0).clamp(0.0, 255.0) as u8);
    }
    out
}
