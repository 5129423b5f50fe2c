#![forbid(unsafe_code)]

use sentinel_contracts::risk::{RiskLevel, RiskSnapshot};
use sentinel_contracts::zone::LocationContext;
use sentinel_contracts::LocalHour;

/// Deterministic reason lines for a snapshot, ordered by factor weight.
/// Mirrors the dashboard's "why is my risk elevated" panel.
pub fn explain(
    snapshot: &RiskSnapshot,
    location: Option<&LocationContext>,
    hour: LocalHour,
) -> Vec<String> {
    let mut lines = Vec::new();

    if snapshot.audio.score > 20.0 {
        lines.push("Sustained loud or distressed audio is the dominant factor".to_string());
    } else if snapshot.audio.score > 10.0 {
        lines.push("Elevated ambient audio activity detected".to_string());
    }

    if snapshot.motion.score > 15.0 {
        lines.push("Violent or erratic device motion detected".to_string());
    } else if snapshot.motion.score > 8.0 {
        lines.push("Device motion is above the resting baseline".to_string());
    }

    let h = hour.get();
    if h < 4 {
        lines.push("Late-night hours carry the maximum time-of-day weight".to_string());
    } else if (20..24).contains(&h) {
        lines.push("Evening hours raise the time-of-day weight".to_string());
    }

    match location.and_then(|ctx| ctx.matched_zone.as_ref()) {
        Some(m) => lines.push(format!("Current position is inside the \"{}\" zone", m.name)),
        None => {
            if location.is_some() {
                lines.push("Current position is in a normal area".to_string());
            } else {
                lines.push("No location fix; location risk held at baseline".to_string());
            }
        }
    }

    match snapshot.level {
        RiskLevel::High => lines.push("Combined score is in the HIGH band".to_string()),
        RiskLevel::Medium => lines.push("Combined score is in the MEDIUM band".to_string()),
        RiskLevel::Low => lines.push("Combined score is in the LOW band".to_string()),
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuse::fuse;
    use sentinel_contracts::audio::{AudioFeatures, AUDIO_CONTRACT_VERSION};
    use sentinel_contracts::motion::MotionFeatures;
    use sentinel_contracts::zone::{GeoPoint, ZoneId, ZoneKind, ZoneMatch};

    fn hour(h: u8) -> LocalHour {
        LocalHour::new(h).unwrap()
    }

    #[test]
    fn at_explain_01_quiet_daytime_reads_low() {
        let s = fuse(
            &AudioFeatures::zero(),
            &MotionFeatures::zero(),
            None,
            false,
            hour(10),
        );
        let lines = explain(&s, None, hour(10));
        assert!(lines.iter().any(|l| l.contains("LOW band")));
        assert!(lines.iter().any(|l| l.contains("No location fix")));
    }

    #[test]
    fn at_explain_02_zone_name_appears_in_reasons() {
        let ctx = LocationContext::new(
            GeoPoint::new(1.0, 1.0).unwrap(),
            Some(ZoneMatch {
                id: ZoneId::new("z9").unwrap(),
                name: "North Parking".to_string(),
                kind: ZoneKind::High,
            }),
        );
        let s = fuse(
            &AudioFeatures::zero(),
            &MotionFeatures::zero(),
            Some(&ctx),
            false,
            hour(2),
        );
        let lines = explain(&s, Some(&ctx), hour(2));
        assert!(lines.iter().any(|l| l.contains("North Parking")));
        assert!(lines.iter().any(|l| l.contains("Late-night")));
    }

    #[test]
    fn at_explain_03_loud_audio_is_called_out() {
        let a = AudioFeatures {
            schema_version: AUDIO_CONTRACT_VERSION,
            rms: 1.0,
            pitch_hz: 900.0,
            pitch_variance: 0.8,
            spike_count: 12,
            stress: 0.95,
        };
        let s = fuse(&a, &MotionFeatures::zero(), None, false, hour(10));
        let lines = explain(&s, None, hour(10));
        assert!(lines.iter().any(|l| l.contains("dominant factor")));
    }

    #[test]
    fn at_explain_04_output_is_deterministic() {
        let s = fuse(
            &AudioFeatures::zero(),
            &MotionFeatures::zero(),
            None,
            false,
            hour(21),
        );
        assert_eq!(explain(&s, None, hour(21)), explain(&s, None, hour(21)));
    }
}
