#![forbid(unsafe_code)]

//! Edge adapter: microphone capture, HTTP transport to the alert
//! backend, and environment-driven configuration for the watch binary.
//! Everything deterministic lives below this crate; the adapter only
//! converts between the outside world and the engine contracts.

pub mod config;
pub mod http;
pub mod mic;
pub mod submit;

pub use config::WatchConfig;
pub use http::{HttpAlertTransport, HttpTransportConfig};
pub use mic::MicCapture;
pub use submit::{SubmitOutcome, SubmitWorker};
