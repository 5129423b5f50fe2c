#![forbid(unsafe_code)]

use crate::common::{validate_non_negative, validate_unit_interval};
use crate::{ContractViolation, SchemaVersion, Validate};

pub const MOTION_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// One raw device-motion event (linear acceleration, m/s^2 per axis).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    pub schema_version: SchemaVersion,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionEvent {
    pub fn v1(x: f64, y: f64, z: f64) -> Result<Self, ContractViolation> {
        let e = Self {
            schema_version: MOTION_CONTRACT_VERSION,
            x,
            y,
            z,
        };
        e.validate()?;
        Ok(e)
    }
}

impl Validate for MotionEvent {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != MOTION_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "motion_event.schema_version",
                reason: "must match MOTION_CONTRACT_VERSION",
            });
        }
        for (field, v) in [
            ("motion_event.x", self.x),
            ("motion_event.y", self.y),
            ("motion_event.z", self.z),
        ] {
            if !v.is_finite() {
                return Err(ContractViolation::NotFinite { field });
            }
        }
        Ok(())
    }
}

/// Motion feature vector derived per raw event. `jitter` is the mean
/// absolute first difference over the magnitude window; `shake` the
/// mean absolute per-axis delta since the previous event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionFeatures {
    pub schema_version: SchemaVersion,
    pub acceleration_magnitude: f64,
    pub jitter: f64,
    pub shake: f64,
    pub intensity: f64,
}

impl MotionFeatures {
    pub fn v1(
        acceleration_magnitude: f64,
        jitter: f64,
        shake: f64,
        intensity: f64,
    ) -> Result<Self, ContractViolation> {
        let f = Self {
            schema_version: MOTION_CONTRACT_VERSION,
            acceleration_magnitude,
            jitter,
            shake,
            intensity,
        };
        f.validate()?;
        Ok(f)
    }

    pub fn zero() -> Self {
        Self {
            schema_version: MOTION_CONTRACT_VERSION,
            acceleration_magnitude: 0.0,
            jitter: 0.0,
            shake: 0.0,
            intensity: 0.0,
        }
    }
}

impl Validate for MotionFeatures {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != MOTION_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "motion_features.schema_version",
                reason: "must match MOTION_CONTRACT_VERSION",
            });
        }
        validate_non_negative(
            "motion_features.acceleration_magnitude",
            self.acceleration_magnitude,
        )?;
        validate_non_negative("motion_features.jitter", self.jitter)?;
        validate_non_negative("motion_features.shake", self.shake)?;
        validate_unit_interval("motion_features.intensity", self.intensity)?;
        Ok(())
    }
}
