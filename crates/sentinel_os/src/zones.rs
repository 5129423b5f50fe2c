#![forbid(unsafe_code)]

use sentinel_contracts::zone::{GeoPoint, LocationContext, RiskZone, ZoneMatch};
use sentinel_engines::zone_match::match_zone;

/// Session cache for the loaded zone set. Refreshes replace the whole
/// collection in one assignment; readers never observe a partial set.
#[derive(Debug, Clone, Default)]
pub struct ZoneSet {
    zones: Vec<RiskZone>,
    skipped_degenerate: usize,
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic replace. Degenerate rings are dropped and counted here so
    /// the matcher never sees them; invalid geometry is a skip, not an
    /// error.
    pub fn replace(&mut self, zones: Vec<RiskZone>) -> usize {
        let (kept, skipped): (Vec<RiskZone>, Vec<RiskZone>) =
            zones.into_iter().partition(|z| !z.ring_is_degenerate());
        self.skipped_degenerate = skipped.len();
        self.zones = kept;
        self.skipped_degenerate
    }

    pub fn zones(&self) -> &[RiskZone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn skipped_degenerate(&self) -> usize {
        self.skipped_degenerate
    }

    /// Recomputes the derived location view for a position fix.
    pub fn derive_context(&self, point: GeoPoint) -> LocationContext {
        let matched = match_zone(&point, &self.zones).map(ZoneMatch::from_zone);
        LocationContext::new(point, matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_contracts::zone::{ZoneId, ZoneKind};

    fn square(id: &str, kind: ZoneKind, min: f64, max: f64) -> RiskZone {
        RiskZone::v1(
            ZoneId::new(id).unwrap(),
            format!("zone {id}"),
            kind,
            vec![
                GeoPoint::new(min, min).unwrap(),
                GeoPoint::new(min, max).unwrap(),
                GeoPoint::new(max, max).unwrap(),
                GeoPoint::new(max, min).unwrap(),
            ],
        )
        .unwrap()
    }

    fn degenerate(id: &str) -> RiskZone {
        RiskZone::v1(
            ZoneId::new(id).unwrap(),
            "line".to_string(),
            ZoneKind::High,
            vec![GeoPoint::new(0.0, 0.0).unwrap(), GeoPoint::new(1.0, 1.0).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn at_zones_01_replace_drops_and_counts_degenerate_rings() {
        let mut set = ZoneSet::new();
        let skipped = set.replace(vec![
            square("a", ZoneKind::Low, 0.0, 10.0),
            degenerate("bad"),
        ]);
        assert_eq!(skipped, 1);
        assert_eq!(set.len(), 1);
        assert_eq!(set.skipped_degenerate(), 1);
    }

    #[test]
    fn at_zones_02_replace_is_wholesale() {
        let mut set = ZoneSet::new();
        set.replace(vec![square("a", ZoneKind::Low, 0.0, 10.0)]);
        set.replace(vec![square("b", ZoneKind::High, 20.0, 30.0)]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.zones()[0].id.as_str(), "b");
    }

    #[test]
    fn at_zones_03_derive_context_matches_and_flags_normal() {
        let mut set = ZoneSet::new();
        set.replace(vec![square("a", ZoneKind::High, 0.0, 10.0)]);

        let inside = set.derive_context(GeoPoint::new(5.0, 5.0).unwrap());
        assert!(!inside.is_normal_zone);
        assert_eq!(inside.matched_zone.as_ref().unwrap().id.as_str(), "a");

        let outside = set.derive_context(GeoPoint::new(50.0, 50.0).unwrap());
        assert!(outside.is_normal_zone);
        assert!(outside.matched_zone.is_none());
    }
}
