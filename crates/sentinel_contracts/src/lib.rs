#![forbid(unsafe_code)]

pub mod alert;
pub mod audio;
pub mod common;
pub mod motion;
pub mod risk;
pub mod zone;

pub use common::{ContractViolation, LocalHour, MonotonicTimeNs, SchemaVersion, Validate};
