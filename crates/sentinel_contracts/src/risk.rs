#![forbid(unsafe_code)]

use crate::{ContractViolation, SchemaVersion, Validate};
use serde::Serialize;

pub const RISK_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const AUDIO_SCORE_CAP: f64 = 35.0;
pub const MOTION_SCORE_CAP: f64 = 25.0;
pub const TIME_SCORE_CAP: f64 = 20.0;
pub const LOCATION_SCORE_CAP: f64 = 20.0;
pub const TOTAL_SCORE_CAP: f64 = 100.0;

pub const MEDIUM_RISK_THRESHOLD: f64 = 25.0;
pub const HIGH_RISK_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioRisk {
    pub stress: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionRisk {
    pub intensity: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorScore {
    pub factor: f64,
    pub score: f64,
}

/// One fused risk evaluation. Pure function of the current inputs plus
/// wall-clock hour; carries no history and is overwritten every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskSnapshot {
    #[serde(skip)]
    pub schema_version: SchemaVersion,
    pub audio: AudioRisk,
    pub motion: MotionRisk,
    pub time: FactorScore,
    pub location: FactorScore,
    pub total: f64,
    pub level: RiskLevel,
}

impl RiskSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn v1(
        audio: AudioRisk,
        motion: MotionRisk,
        time: FactorScore,
        location: FactorScore,
        total: f64,
        level: RiskLevel,
    ) -> Result<Self, ContractViolation> {
        let s = Self {
            schema_version: RISK_CONTRACT_VERSION,
            audio,
            motion,
            time,
            location,
            total,
            level,
        };
        s.validate()?;
        Ok(s)
    }
}

fn validate_capped(field: &'static str, value: f64, cap: f64) -> Result<(), ContractViolation> {
    if !value.is_finite() {
        return Err(ContractViolation::NotFinite { field });
    }
    if !(0.0..=cap).contains(&value) {
        return Err(ContractViolation::InvalidRange {
            field,
            min: 0.0,
            max: cap,
            got: value,
        });
    }
    Ok(())
}

impl Validate for RiskSnapshot {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != RISK_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "risk_snapshot.schema_version",
                reason: "must match RISK_CONTRACT_VERSION",
            });
        }
        validate_capped("risk_snapshot.audio.score", self.audio.score, AUDIO_SCORE_CAP)?;
        validate_capped(
            "risk_snapshot.motion.score",
            self.motion.score,
            MOTION_SCORE_CAP,
        )?;
        validate_capped("risk_snapshot.time.score", self.time.score, TIME_SCORE_CAP)?;
        validate_capped(
            "risk_snapshot.location.score",
            self.location.score,
            LOCATION_SCORE_CAP,
        )?;
        validate_capped("risk_snapshot.total", self.total, TOTAL_SCORE_CAP)?;
        Ok(())
    }
}
