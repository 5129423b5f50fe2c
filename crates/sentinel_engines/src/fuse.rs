#![forbid(unsafe_code)]

use sentinel_contracts::audio::AudioFeatures;
use sentinel_contracts::motion::MotionFeatures;
use sentinel_contracts::risk::{
    AudioRisk, FactorScore, MotionRisk, RiskLevel, RiskSnapshot, AUDIO_SCORE_CAP,
    HIGH_RISK_THRESHOLD, LOCATION_SCORE_CAP, MEDIUM_RISK_THRESHOLD, MOTION_SCORE_CAP,
    RISK_CONTRACT_VERSION, TIME_SCORE_CAP,
};
use sentinel_contracts::zone::{LocationContext, ZoneKind};
use sentinel_contracts::LocalHour;

pub const LOCATION_SCORE_HIGH_ZONE: f64 = 20.0;
pub const LOCATION_SCORE_LOW_ZONE: f64 = 12.0;
pub const LOCATION_SCORE_NO_ZONE: f64 = 10.0;

/// Weighted audio sub-score, capped at 35.
pub fn audio_score(features: &AudioFeatures) -> f64 {
    let stress = (features.rms * 0.5)
        + (features.pitch_variance * 0.3)
        + ((f64::from(features.spike_count) / 5.0).min(1.0) * 0.2);
    (stress * AUDIO_SCORE_CAP).min(AUDIO_SCORE_CAP)
}

/// Weighted motion sub-score, capped at 25.
pub fn motion_score(features: &MotionFeatures) -> f64 {
    let intensity =
        ((features.acceleration_magnitude / 30.0) * 0.6 + (features.jitter / 20.0) * 0.4).min(1.0);
    (intensity * MOTION_SCORE_CAP).min(MOTION_SCORE_CAP)
}

/// Piecewise time-of-day factor: daytime 0.2, evening 0.6, small hours
/// 1.0, pre-dawn 0.4.
pub fn time_risk_factor(hour: LocalHour) -> f64 {
    let h = hour.get();
    if (6..20).contains(&h) {
        0.2
    } else if (20..24).contains(&h) {
        0.6
    } else if h < 4 {
        1.0
    } else {
        0.4
    }
}

/// Zone-derived location sub-score. Presentation mode pins the score
/// to the high-zone value regardless of the matched zone.
pub fn location_score(location: Option<&LocationContext>, presentation_mode: bool) -> f64 {
    if presentation_mode {
        return LOCATION_SCORE_HIGH_ZONE;
    }
    match location.and_then(|ctx| ctx.matched_zone.as_ref()) {
        Some(m) if m.kind == ZoneKind::High => LOCATION_SCORE_HIGH_ZONE,
        Some(_) => LOCATION_SCORE_LOW_ZONE,
        None => LOCATION_SCORE_NO_ZONE,
    }
}

/// Half-open classification bands: `<25` Low, `[25,50)` Medium,
/// `>=50` High.
pub fn risk_level(total: f64) -> RiskLevel {
    if total < MEDIUM_RISK_THRESHOLD {
        RiskLevel::Low
    } else if total < HIGH_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Fuses one tick's worth of inputs into a snapshot. Pure and
/// deterministic: identical inputs always produce identical output.
pub fn fuse(
    audio: &AudioFeatures,
    motion: &MotionFeatures,
    location: Option<&LocationContext>,
    presentation_mode: bool,
    hour: LocalHour,
) -> RiskSnapshot {
    let audio_sub = audio_score(audio);
    let motion_sub = motion_score(motion);
    let time_factor = time_risk_factor(hour);
    let time_sub = time_factor * TIME_SCORE_CAP;
    let location_sub = location_score(location, presentation_mode);

    let total = audio_sub + motion_sub + time_sub + location_sub;

    RiskSnapshot {
        schema_version: RISK_CONTRACT_VERSION,
        audio: AudioRisk {
            stress: audio.stress,
            score: audio_sub,
        },
        motion: MotionRisk {
            intensity: motion.intensity,
            score: motion_sub,
        },
        time: FactorScore {
            factor: time_factor,
            score: time_sub,
        },
        location: FactorScore {
            factor: location_sub / LOCATION_SCORE_CAP,
            score: location_sub,
        },
        total,
        level: risk_level(total),
    }
}
