#![forbid(unsafe_code)]

use crate::ring::RingBuffer;
use sentinel_contracts::audio::{AudioFeatures, AudioFrame};
use sentinel_contracts::ContractViolation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSamplerConfig {
    pub spike_threshold: f64,
    pub heightened_spike_threshold: f64,
    pub heightened_gain: f64,
    pub pitch_window: usize,
}

impl AudioSamplerConfig {
    pub fn mvp_v1() -> Self {
        Self {
            spike_threshold: 0.7,
            heightened_spike_threshold: 0.35,
            heightened_gain: 2.0,
            pitch_window: 50,
        }
    }
}

/// Rolling-state audio feature extractor. Owns the pitch window and the
/// leaky spike counter; the heightened-sensitivity flag is a runtime
/// parameter, never a reconstruction.
#[derive(Debug, Clone)]
pub struct AudioSampler {
    config: AudioSamplerConfig,
    started: bool,
    heightened: bool,
    spike_count: u32,
    pitch_window: RingBuffer,
}

impl AudioSampler {
    pub fn new(config: AudioSamplerConfig) -> Result<Self, ContractViolation> {
        if config.pitch_window == 0 || config.pitch_window > 1_024 {
            return Err(ContractViolation::InvalidValue {
                field: "audio_sampler_config.pitch_window",
                reason: "must be within 1..=1024",
            });
        }
        if !(0.0..=1.0).contains(&config.spike_threshold)
            || !(0.0..=1.0).contains(&config.heightened_spike_threshold)
        {
            return Err(ContractViolation::InvalidValue {
                field: "audio_sampler_config.spike_threshold",
                reason: "thresholds must be within 0..=1",
            });
        }
        if config.heightened_gain < 1.0 {
            return Err(ContractViolation::InvalidValue {
                field: "audio_sampler_config.heightened_gain",
                reason: "must be >= 1.0",
            });
        }
        let pitch_window = RingBuffer::new(config.pitch_window);
        Ok(Self {
            config,
            started: false,
            heightened: false,
            spike_count: 0,
            pitch_window,
        })
    }

    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn stop(&mut self) {
        self.started = false;
        self.spike_count = 0;
        self.pitch_window.clear();
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn set_heightened_sensitivity(&mut self, enabled: bool) {
        self.heightened = enabled;
    }

    pub fn heightened_sensitivity(&self) -> bool {
        self.heightened
    }

    /// One sampling tick. Returns zero-features without touching any
    /// rolling state when the sampler is stopped or no frame arrived;
    /// steady-state polling never errors.
    pub fn sample(&mut self, frame: Option<&AudioFrame>) -> AudioFeatures {
        let frame = match (self.started, frame) {
            (true, Some(f)) => f,
            _ => return AudioFeatures::zero(),
        };
        if frame.bins.is_empty() {
            return AudioFeatures::zero();
        }

        let len = frame.bins.len();
        let mut sum_sq = 0.0_f64;
        let mut max_value = 0u8;
        let mut max_index = 0usize;
        for (i, &bin) in frame.bins.iter().enumerate() {
            let normalized = f64::from(bin) / 255.0;
            sum_sq += normalized * normalized;
            if bin > max_value {
                max_value = bin;
                max_index = i;
            }
        }
        let rms = (sum_sq / len as f64).sqrt();
        let rms = if self.heightened {
            (rms * self.config.heightened_gain).min(1.0)
        } else {
            rms
        };

        let threshold = if self.heightened {
            self.config.heightened_spike_threshold
        } else {
            self.config.spike_threshold
        };
        if rms > threshold {
            self.spike_count = self.spike_count.saturating_add(1);
        } else {
            self.spike_count = self.spike_count.saturating_sub(1);
        }

        let pitch_hz = (max_index as f64) * f64::from(frame.sample_rate_hz) / (2.0 * len as f64);
        self.pitch_window.push(pitch_hz);
        let pitch_variance = normalized_pitch_variance(&self.pitch_window);

        let stress = (rms * 0.5)
            + (pitch_variance * 0.3)
            + ((f64::from(self.spike_count) / 5.0).min(1.0) * 0.2);

        AudioFeatures {
            schema_version: sentinel_contracts::audio::AUDIO_CONTRACT_VERSION,
            rms,
            pitch_hz,
            pitch_variance,
            spike_count: self.spike_count,
            stress: stress.min(1.0),
        }
    }
}

fn normalized_pitch_variance(window: &RingBuffer) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (variance / 10_000.0).min(1.0)
}
