#![forbid(unsafe_code)]

use sentinel_contracts::zone::{GeoPoint, RiskZone, ZoneKind};

/// Ray-casting point-in-ring test against the outer ring. Vertices are
/// (lng, lat) pairs in the x/y sense of the crossing test.
pub fn point_in_ring(point: &GeoPoint, ring: &[GeoPoint]) -> bool {
    if ring.len() < sentinel_contracts::zone::MIN_RING_VERTICES {
        return false;
    }
    let x = point.lng;
    let y = point.lat;

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let xi = ring[i].lng;
        let yi = ring[i].lat;
        let xj = ring[j].lng;
        let yj = ring[j].lat;

        let crosses = (yi > y) != (yj > y) && x < ((xj - xi) * (y - yi)) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Resolves the zone containing `point`, if any. Degenerate rings are
/// skipped. When several zones contain the point, the first High zone
/// in iteration order wins, otherwise the first containing zone; the
/// overlap ambiguity is accepted rather than resolved by area.
pub fn match_zone<'a>(point: &GeoPoint, zones: &'a [RiskZone]) -> Option<&'a RiskZone> {
    let mut first_hit: Option<&RiskZone> = None;
    for zone in zones {
        if zone.ring_is_degenerate() {
            continue;
        }
        if !point_in_ring(point, &zone.polygon) {
            continue;
        }
        if zone.kind == ZoneKind::High {
            return Some(zone);
        }
        if first_hit.is_none() {
            first_hit = Some(zone);
        }
    }
    first_hit
}
