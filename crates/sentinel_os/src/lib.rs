#![forbid(unsafe_code)]

pub mod countdown;
pub mod escalate;
pub mod kernel;
pub mod transport;
pub mod zones;
