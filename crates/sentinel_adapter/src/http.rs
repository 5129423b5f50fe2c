#![forbid(unsafe_code)]

use std::time::Duration;

use sentinel_contracts::alert::{AlertId, AlertRequest, SubmitError};
use sentinel_contracts::zone::{GeoPoint, RiskZone, ZoneId, ZoneKind};
use sentinel_os::transport::AlertTransport;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl HttpTransportConfig {
    pub fn mvp_v1(base_url: String, auth_token: Option<String>) -> Self {
        Self {
            base_url,
            auth_token,
            connect_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
        }
    }
}

/// Blocking HTTP transport against the campus alert backend.
/// `POST {base}/sos` submits a fired alert, `GET {base}/risk-zones`
/// pulls the zone catalogue. Both are treated as recoverable by the
/// engine layer.
pub struct HttpAlertTransport {
    config: HttpTransportConfig,
    agent: ureq::Agent,
}

impl HttpAlertTransport {
    pub fn new(config: HttpTransportConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(config.connect_timeout_ms))
            .timeout_read(Duration::from_millis(config.request_timeout_ms))
            .timeout_write(Duration::from_millis(config.request_timeout_ms))
            .build();
        Self { config, agent }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let mut req = self
            .agent
            .request(method, &url)
            .set("content-type", "application/json");
        if let Some(token) = &self.config.auth_token {
            req = req.set("authorization", &format!("Bearer {token}"));
        }
        req
    }
}

impl AlertTransport for HttpAlertTransport {
    fn submit_alert(&mut self, request: &AlertRequest) -> Result<AlertId, SubmitError> {
        let payload = serde_json::to_string(request)
            .map_err(|err| SubmitError::malformed(format!("alert encode failed: {err}")))?;
        match self.request("POST", "/sos").send_string(&payload) {
            Ok(resp) => {
                let body = resp
                    .into_string()
                    .map_err(|err| SubmitError::network(format!("alert response read: {err}")))?;
                parse_alert_created(&body)
            }
            Err(ureq::Error::Status(401 | 403, _)) => {
                Err(SubmitError::auth("alert submission rejected"))
            }
            Err(ureq::Error::Status(code, _)) => Err(SubmitError::status(
                code,
                format!("alert submission failed with http status {code}"),
            )),
            Err(ureq::Error::Transport(err)) => {
                Err(SubmitError::network(format!("alert transport error: {err}")))
            }
        }
    }

    fn fetch_zones(&mut self) -> Result<Vec<RiskZone>, SubmitError> {
        match self.request("GET", "/risk-zones").call() {
            Ok(resp) => {
                let body = resp
                    .into_string()
                    .map_err(|err| SubmitError::network(format!("zone response read: {err}")))?;
                let (zones, skipped) = parse_zone_records(&body)?;
                if skipped > 0 {
                    eprintln!("sentinel_adapter: skipped {skipped} malformed zone record(s)");
                }
                Ok(zones)
            }
            Err(ureq::Error::Status(401 | 403, _)) => Err(SubmitError::auth("zone fetch rejected")),
            Err(ureq::Error::Status(code, _)) => Err(SubmitError::status(
                code,
                format!("zone fetch failed with http status {code}"),
            )),
            Err(ureq::Error::Transport(err)) => {
                Err(SubmitError::network(format!("zone transport error: {err}")))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlertCreatedRecord {
    id: String,
}

fn parse_alert_created(body: &str) -> Result<AlertId, SubmitError> {
    let record: AlertCreatedRecord = serde_json::from_str(body)
        .map_err(|err| SubmitError::malformed(format!("alert response decode: {err}")))?;
    AlertId::new(record.id)
        .map_err(|_| SubmitError::malformed("alert response carried an invalid id"))
}

#[derive(Debug, Deserialize)]
struct ZoneRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    polygon: PolygonRecord,
}

#[derive(Debug, Deserialize)]
struct PolygonRecord {
    #[serde(rename = "type")]
    kind: String,
    // GeoJSON rings of [lng, lat] pairs; ring 0 is the outer boundary.
    coordinates: Vec<Vec<[f64; 2]>>,
}

/// Decodes the zone catalogue. A malformed individual record is
/// skipped and counted, not fatal; a body that is not a zone array is.
fn parse_zone_records(body: &str) -> Result<(Vec<RiskZone>, usize), SubmitError> {
    let records: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|err| SubmitError::malformed(format!("zone catalogue decode: {err}")))?;
    let mut zones = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for value in records {
        match zone_from_value(value) {
            Some(zone) => zones.push(zone),
            None => skipped += 1,
        }
    }
    Ok((zones, skipped))
}

fn zone_from_value(value: serde_json::Value) -> Option<RiskZone> {
    let record: ZoneRecord = serde_json::from_value(value).ok()?;
    if record.polygon.kind != "Polygon" {
        return None;
    }
    let kind = match record.kind.as_str() {
        "high" => ZoneKind::High,
        "low" => ZoneKind::Low,
        _ => return None,
    };
    let outer = record.polygon.coordinates.first()?;
    let mut ring = Vec::with_capacity(outer.len());
    for &[lng, lat] in outer {
        ring.push(GeoPoint::new(lat, lng).ok()?);
    }
    RiskZone::v1(ZoneId::new(record.id).ok()?, record.name, kind, ring).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_contracts::alert::SubmitErrorKind;

    #[test]
    fn at_http_01_zone_catalogue_parses_geojson_rings() {
        let body = r#"[
            {
                "id": "z1",
                "name": "North Parking",
                "type": "high",
                "polygon": {
                    "type": "Polygon",
                    "coordinates": [[[10.0, 50.0], [10.1, 50.0], [10.1, 50.1], [10.0, 50.1]]]
                },
                "multiplier": 1.5,
                "description": null
            }
        ]"#;
        let (zones, skipped) = parse_zone_records(body).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].id.as_str(), "z1");
        assert_eq!(zones[0].kind, ZoneKind::High);
        // [lng, lat] pairs map into lat/lng points.
        assert!((zones[0].polygon[0].lat - 50.0).abs() < 1e-12);
        assert!((zones[0].polygon[0].lng - 10.0).abs() < 1e-12);
    }

    #[test]
    fn at_http_02_malformed_records_are_skipped_not_fatal() {
        let body = r#"[
            {"id": "ok", "name": "Quad", "type": "low", "polygon": {
                "type": "Polygon",
                "coordinates": [[[1.0, 1.0], [2.0, 1.0], [2.0, 2.0]]]
            }},
            {"id": "bad-kind", "name": "x", "type": "extreme", "polygon": {
                "type": "Polygon",
                "coordinates": [[[1.0, 1.0], [2.0, 1.0], [2.0, 2.0]]]
            }},
            {"id": "bad-geom", "name": "y", "type": "high", "polygon": {
                "type": "LineString",
                "coordinates": [[[1.0, 1.0], [2.0, 1.0]]]
            }},
            {"id": "bad-range", "name": "z", "type": "high", "polygon": {
                "type": "Polygon",
                "coordinates": [[[1.0, 99.0], [2.0, 1.0], [2.0, 2.0]]]
            }}
        ]"#;
        let (zones, skipped) = parse_zone_records(body).unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(skipped, 3);
        assert_eq!(zones[0].id.as_str(), "ok");
    }

    #[test]
    fn at_http_03_non_array_catalogue_is_malformed() {
        let err = parse_zone_records("{\"oops\": true}").unwrap_err();
        assert_eq!(err.kind, SubmitErrorKind::Malformed);
    }

    #[test]
    fn at_http_04_alert_response_yields_id() {
        let body = r#"{"id": "sos-123", "status": "new", "risk_score": 86.25}"#;
        let id = parse_alert_created(body).unwrap();
        assert_eq!(id.as_str(), "sos-123");

        let err = parse_alert_created("not json").unwrap_err();
        assert_eq!(err.kind, SubmitErrorKind::Malformed);
    }
}
