#![forbid(unsafe_code)]

use crate::common::validate_id;
use crate::risk::TOTAL_SCORE_CAP;
use crate::zone::GeoPoint;
use crate::{ContractViolation, MonotonicTimeNs, SchemaVersion, Validate};
use serde::Serialize;

pub const ALERT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// Wire names match the backend record: user-initiated alerts are
/// `manual`, engine-initiated ones are `ai`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TriggerKind {
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "ai")]
    Auto,
}

/// Single process-wide escalation cell. At most one Armed/Fired cycle
/// is active at a time; a new arming is only possible from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationState {
    Idle,
    Armed {
        kind: TriggerKind,
        deadline: MonotonicTimeNs,
    },
    Fired,
}

impl EscalationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, EscalationState::Idle)
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, EscalationState::Armed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertId(String);

impl AlertId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = Self(id.into());
        v.validate()?;
        Ok(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for AlertId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_id("alert_id", &self.0, 128)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorBreakdown {
    pub audio: f64,
    pub motion: f64,
    pub time: f64,
    pub location: f64,
}

/// The payload handed to the external transport when an alert fires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRequest {
    #[serde(skip)]
    pub schema_version: SchemaVersion,
    pub risk_score: f64,
    pub factors: FactorBreakdown,
    pub location: Option<GeoPoint>,
    pub trigger_type: TriggerKind,
}

impl AlertRequest {
    pub fn v1(
        risk_score: f64,
        factors: FactorBreakdown,
        location: Option<GeoPoint>,
        trigger_type: TriggerKind,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: ALERT_CONTRACT_VERSION,
            risk_score,
            factors,
            location,
            trigger_type,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for AlertRequest {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ALERT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "alert_request.schema_version",
                reason: "must match ALERT_CONTRACT_VERSION",
            });
        }
        if !self.risk_score.is_finite() {
            return Err(ContractViolation::NotFinite {
                field: "alert_request.risk_score",
            });
        }
        if !(0.0..=TOTAL_SCORE_CAP).contains(&self.risk_score) {
            return Err(ContractViolation::InvalidRange {
                field: "alert_request.risk_score",
                min: 0.0,
                max: TOTAL_SCORE_CAP,
                got: self.risk_score,
            });
        }
        if let Some(p) = &self.location {
            p.validate()?;
        }
        Ok(())
    }
}

/// Raised once at sampler setup when the platform denies permission or
/// lacks the device. Steady-state polling never raises it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorUnavailable {
    pub sensor: &'static str,
    pub reason: String,
}

impl core::fmt::Display for SensorUnavailable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} unavailable: {}", self.sensor, self.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitErrorKind {
    Network,
    Auth,
    Status(u16),
    Malformed,
}

/// Transport failure on fire or zone fetch. Recoverable: the countdown
/// controller releases its fire latch and returns to idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitError {
    pub kind: SubmitErrorKind,
    pub detail: String,
}

impl SubmitError {
    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            kind: SubmitErrorKind::Network,
            detail: detail.into(),
        }
    }

    pub fn auth(detail: impl Into<String>) -> Self {
        Self {
            kind: SubmitErrorKind::Auth,
            detail: detail.into(),
        }
    }

    pub fn status(code: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: SubmitErrorKind::Status(code),
            detail: detail.into(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self {
            kind: SubmitErrorKind::Malformed,
            detail: detail.into(),
        }
    }
}

/// Periodic telemetry subset streamed to observers while monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiveFeedFrame {
    pub rms: f64,
    pub pitch_hz: f64,
    pub stress: f64,
    pub acceleration_magnitude: f64,
    pub shake: f64,
    pub total_risk: f64,
}
