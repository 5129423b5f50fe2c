#![forbid(unsafe_code)]

use sentinel_contracts::alert::{AlertId, AlertRequest, SubmitError};
use sentinel_contracts::zone::RiskZone;

/// Seam to the external alert backend. The engine treats both calls as
/// recoverable: a failed submission releases the fire latch, a failed
/// zone fetch leaves the previous zone set in place.
pub trait AlertTransport {
    fn submit_alert(&mut self, request: &AlertRequest) -> Result<AlertId, SubmitError>;
    fn fetch_zones(&mut self) -> Result<Vec<RiskZone>, SubmitError>;
}
