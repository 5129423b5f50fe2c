#![forbid(unsafe_code)]

use crate::common::{validate_non_negative, validate_unit_interval};
use crate::{ContractViolation, SchemaVersion, Validate};

pub const AUDIO_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const MAX_AUDIO_FRAME_BINS: usize = 16_384;

/// One analyser-style magnitude spectrum captured on a sampling tick.
/// Bins are byte magnitudes (0..=255) over the half-spectrum, so the
/// dominant-bin frequency is `index * sample_rate / (2 * bins.len())`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    pub schema_version: SchemaVersion,
    pub sample_rate_hz: u32,
    pub bins: Vec<u8>,
}

impl AudioFrame {
    pub fn v1(sample_rate_hz: u32, bins: Vec<u8>) -> Result<Self, ContractViolation> {
        let f = Self {
            schema_version: AUDIO_CONTRACT_VERSION,
            sample_rate_hz,
            bins,
        };
        f.validate()?;
        Ok(f)
    }
}

impl Validate for AudioFrame {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != AUDIO_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "audio_frame.schema_version",
                reason: "must match AUDIO_CONTRACT_VERSION",
            });
        }
        if self.sample_rate_hz == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "audio_frame.sample_rate_hz",
                reason: "must be > 0",
            });
        }
        if self.bins.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "audio_frame.bins",
                reason: "must not be empty",
            });
        }
        if self.bins.len() > MAX_AUDIO_FRAME_BINS {
            return Err(ContractViolation::InvalidValue {
                field: "audio_frame.bins",
                reason: "must be <= MAX_AUDIO_FRAME_BINS entries",
            });
        }
        Ok(())
    }
}

/// Normalized ambient-audio feature vector, recomputed every tick.
/// `spike_count` is a leaky counter: it decays by one per quiet tick
/// and grows without cap on loud ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFeatures {
    pub schema_version: SchemaVersion,
    pub rms: f64,
    pub pitch_hz: f64,
    pub pitch_variance: f64,
    pub spike_count: u32,
    pub stress: f64,
}

impl AudioFeatures {
    pub fn v1(
        rms: f64,
        pitch_hz: f64,
        pitch_variance: f64,
        spike_count: u32,
        stress: f64,
    ) -> Result<Self, ContractViolation> {
        let f = Self {
            schema_version: AUDIO_CONTRACT_VERSION,
            rms,
            pitch_hz,
            pitch_variance,
            spike_count,
            stress,
        };
        f.validate()?;
        Ok(f)
    }

    /// The value samplers return when not started or denied permission.
    pub fn zero() -> Self {
        Self {
            schema_version: AUDIO_CONTRACT_VERSION,
            rms: 0.0,
            pitch_hz: 0.0,
            pitch_variance: 0.0,
            spike_count: 0,
            stress: 0.0,
        }
    }
}

impl Validate for AudioFeatures {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != AUDIO_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "audio_features.schema_version",
                reason: "must match AUDIO_CONTRACT_VERSION",
            });
        }
        validate_unit_interval("audio_features.rms", self.rms)?;
        validate_non_negative("audio_features.pitch_hz", self.pitch_hz)?;
        validate_unit_interval("audio_features.pitch_variance", self.pitch_variance)?;
        validate_unit_interval("audio_features.stress", self.stress)?;
        Ok(())
    }
}
