#![forbid(unsafe_code)]

use crate::common::validate_id;
use crate::{ContractViolation, SchemaVersion, Validate};

pub const ZONE_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// Minimum vertices for a usable outer ring. Rings below this are
/// degenerate geometry and are skipped by loaders, never fatal.
pub const MIN_RING_VERTICES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = Self(id.into());
        v.validate()?;
        Ok(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for ZoneId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_id("zone_id", &self.0, 64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ContractViolation> {
        let p = Self { lat, lng };
        p.validate()?;
        Ok(p)
    }
}

impl Validate for GeoPoint {
    fn validate(&self) -> Result<(), ContractViolation> {
        if !self.lat.is_finite() {
            return Err(ContractViolation::NotFinite {
                field: "geo_point.lat",
            });
        }
        if !self.lng.is_finite() {
            return Err(ContractViolation::NotFinite {
                field: "geo_point.lng",
            });
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(ContractViolation::InvalidRange {
                field: "geo_point.lat",
                min: -90.0,
                max: 90.0,
                got: self.lat,
            });
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(ContractViolation::InvalidRange {
                field: "geo_point.lng",
                min: -180.0,
                max: 180.0,
                got: self.lng,
            });
        }
        Ok(())
    }
}

/// A polygon-defined risk zone. Immutable once loaded for a session;
/// the zone-set cache owns the loaded collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskZone {
    pub schema_version: SchemaVersion,
    pub id: ZoneId,
    pub name: String,
    pub kind: ZoneKind,
    pub polygon: Vec<GeoPoint>,
}

impl RiskZone {
    pub fn v1(
        id: ZoneId,
        name: String,
        kind: ZoneKind,
        polygon: Vec<GeoPoint>,
    ) -> Result<Self, ContractViolation> {
        let z = Self {
            schema_version: ZONE_CONTRACT_VERSION,
            id,
            name,
            kind,
            polygon,
        };
        z.validate()?;
        Ok(z)
    }

    pub fn ring_is_degenerate(&self) -> bool {
        self.polygon.len() < MIN_RING_VERTICES
    }
}

impl Validate for RiskZone {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ZONE_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "risk_zone.schema_version",
                reason: "must match ZONE_CONTRACT_VERSION",
            });
        }
        self.id.validate()?;
        if self.name.trim().is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "risk_zone.name",
                reason: "must not be empty",
            });
        }
        // Degenerate rings are representable; matchers skip them.
        for p in &self.polygon {
            p.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneMatch {
    pub id: ZoneId,
    pub name: String,
    pub kind: ZoneKind,
}

impl ZoneMatch {
    pub fn from_zone(zone: &RiskZone) -> Self {
        Self {
            id: zone.id.clone(),
            name: zone.name.clone(),
            kind: zone.kind,
        }
    }
}

/// Derived location view, recomputed whenever either the device
/// position or the zone set changes. Never authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationContext {
    pub point: GeoPoint,
    pub matched_zone: Option<ZoneMatch>,
    pub is_normal_zone: bool,
}

impl LocationContext {
    pub fn new(point: GeoPoint, matched_zone: Option<ZoneMatch>) -> Self {
        let is_normal_zone = matched_zone.is_none();
        Self {
            point,
            matched_zone,
            is_normal_zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0).unwrap(),
            GeoPoint::new(0.0, 1.0).unwrap(),
            GeoPoint::new(1.0, 1.0).unwrap(),
        ]
    }

    #[test]
    fn at_zone_01_geo_point_bounds() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn at_zone_02_degenerate_ring_is_representable_not_an_error() {
        let z = RiskZone::v1(
            ZoneId::new("z1").unwrap(),
            "stub".to_string(),
            ZoneKind::Low,
            vec![GeoPoint::new(0.0, 0.0).unwrap()],
        )
        .unwrap();
        assert!(z.ring_is_degenerate());

        let ok = RiskZone::v1(
            ZoneId::new("z2").unwrap(),
            "quad".to_string(),
            ZoneKind::High,
            ring(),
        )
        .unwrap();
        assert!(!ok.ring_is_degenerate());
    }

    #[test]
    fn at_zone_03_zone_requires_id_and_name() {
        assert!(ZoneId::new("  ").is_err());
        let z = RiskZone::v1(
            ZoneId::new("z3").unwrap(),
            "   ".to_string(),
            ZoneKind::Low,
            ring(),
        );
        assert!(z.is_err());
    }

    #[test]
    fn at_zone_04_location_context_normal_flag_tracks_match() {
        let p = GeoPoint::new(10.0, 20.0).unwrap();
        let ctx = LocationContext::new(p, None);
        assert!(ctx.is_normal_zone);

        let zone = RiskZone::v1(
            ZoneId::new("z4").unwrap(),
            "plaza".to_string(),
            ZoneKind::High,
            ring(),
        )
        .unwrap();
        let ctx = LocationContext::new(p, Some(ZoneMatch::from_zone(&zone)));
        assert!(!ctx.is_normal_zone);
    }
}
