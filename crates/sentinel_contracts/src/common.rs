#![forbid(unsafe_code)]

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion(pub u32);

/// Monotonic engine time. All cooldown and deadline arithmetic is done
/// on this clock; wall-clock only contributes the time-of-day factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonotonicTimeNs(pub u64);

impl MonotonicTimeNs {
    pub fn saturating_add_ms(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms.saturating_mul(1_000_000)))
    }

    pub fn saturating_elapsed_since(self, earlier: MonotonicTimeNs) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Local wall-clock hour, 0..=23. Input to the time-of-day risk factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalHour(u8);

impl LocalHour {
    pub fn new(hour: u8) -> Result<Self, ContractViolation> {
        if hour > 23 {
            return Err(ContractViolation::InvalidValue {
                field: "local_hour",
                reason: "must be within 0..=23",
            });
        }
        Ok(Self(hour))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContractViolation {
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
        got: f64,
    },
    NotFinite {
        field: &'static str,
    },
}

pub trait Validate {
    fn validate(&self) -> Result<(), ContractViolation>;
}

pub(crate) fn validate_unit_interval(
    field: &'static str,
    value: f64,
) -> Result<(), ContractViolation> {
    if !value.is_finite() {
        return Err(ContractViolation::NotFinite { field });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ContractViolation::InvalidRange {
            field,
            min: 0.0,
            max: 1.0,
            got: value,
        });
    }
    Ok(())
}

pub(crate) fn validate_non_negative(
    field: &'static str,
    value: f64,
) -> Result<(), ContractViolation> {
    if !value.is_finite() {
        return Err(ContractViolation::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ContractViolation::InvalidRange {
            field,
            min: 0.0,
            max: f64::MAX,
            got: value,
        });
    }
    Ok(())
}

pub(crate) fn validate_id(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), ContractViolation> {
    if value.trim().is_empty() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must not be empty",
        });
    }
    if value.len() > max_len {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must be <= max id length",
        });
    }
    Ok(())
}
