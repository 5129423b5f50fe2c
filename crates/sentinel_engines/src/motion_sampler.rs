#![forbid(unsafe_code)]

use crate::ring::RingBuffer;
use sentinel_contracts::motion::{MotionEvent, MotionFeatures, MOTION_CONTRACT_VERSION};

pub const MOTION_MAGNITUDE_WINDOW: usize = 20;

/// Event-driven motion feature extractor. Keeps the last ≤20 magnitude
/// samples for jitter and the previous event for per-axis shake.
#[derive(Debug, Clone)]
pub struct MotionSampler {
    started: bool,
    last_axes: Option<(f64, f64, f64)>,
    magnitudes: RingBuffer,
}

impl MotionSampler {
    pub fn new() -> Self {
        Self {
            started: false,
            last_axes: None,
            magnitudes: RingBuffer::new(MOTION_MAGNITUDE_WINDOW),
        }
    }

    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn stop(&mut self) {
        self.started = false;
        self.last_axes = None;
        self.magnitudes.clear();
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// One raw accelerometer delivery. Returns zero-features while the
    /// sampler is stopped; never errors in steady state.
    pub fn on_raw_event(&mut self, event: &MotionEvent) -> MotionFeatures {
        if !self.started {
            return MotionFeatures::zero();
        }

        let (x, y, z) = (event.x, event.y, event.z);
        let magnitude = (x * x + y * y + z * z).sqrt();

        self.magnitudes.push(magnitude);
        let jitter = mean_abs_first_difference(&self.magnitudes);

        let shake = match self.last_axes {
            Some((px, py, pz)) => ((x - px).abs() + (y - py).abs() + (z - pz).abs()) / 3.0,
            None => 0.0,
        };
        self.last_axes = Some((x, y, z));

        let intensity = ((magnitude / 30.0) * 0.6 + (jitter / 20.0) * 0.4).min(1.0);

        MotionFeatures {
            schema_version: MOTION_CONTRACT_VERSION,
            acceleration_magnitude: magnitude,
            jitter,
            shake,
            intensity,
        }
    }
}

impl Default for MotionSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn mean_abs_first_difference(window: &RingBuffer) -> f64 {
    if window.len() < 2 {
        return 0.0;
    }
    let values: Vec<f64> = window.iter().collect();
    let sum: f64 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    sum / (values.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(x: f64, y: f64, z: f64) -> MotionEvent {
        MotionEvent::v1(x, y, z).unwrap()
    }

    #[test]
    fn at_motion_sampler_01_zero_features_while_stopped() {
        let mut s = MotionSampler::new();
        assert_eq!(s.on_raw_event(&event(5.0, 5.0, 5.0)), MotionFeatures::zero());
    }

    #[test]
    fn at_motion_sampler_02_magnitude_is_euclidean() {
        let mut s = MotionSampler::new();
        s.start();
        let out = s.on_raw_event(&event(3.0, 4.0, 0.0));
        assert!((out.acceleration_magnitude - 5.0).abs() < 1e-12);
    }

    #[test]
    fn at_motion_sampler_03_jitter_is_mean_abs_first_difference() {
        let mut s = MotionSampler::new();
        s.start();
        s.on_raw_event(&event(3.0, 4.0, 0.0)); // magnitude 5
        s.on_raw_event(&event(0.0, 0.0, 9.0)); // magnitude 9
        let out = s.on_raw_event(&event(0.0, 0.0, 1.0)); // magnitude 1
        // |9-5| = 4, |1-9| = 8 -> mean 6
        assert!((out.jitter - 6.0).abs() < 1e-12);
    }

    #[test]
    fn at_motion_sampler_04_shake_is_mean_per_axis_delta() {
        let mut s = MotionSampler::new();
        s.start();
        let first = s.on_raw_event(&event(1.0, 2.0, 3.0));
        assert_eq!(first.shake, 0.0);
        let second = s.on_raw_event(&event(4.0, 0.0, 3.0));
        // (|3| + |-2| + |0|) / 3
        assert!((second.shake - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn at_motion_sampler_05_intensity_caps_at_one() {
        let mut s = MotionSampler::new();
        s.start();
        s.on_raw_event(&event(80.0, 0.0, 0.0));
        let out = s.on_raw_event(&event(0.0, 0.0, 0.1));
        assert!(out.intensity <= 1.0);
    }

    #[test]
    fn at_motion_sampler_06_window_is_bounded() {
        let mut s = MotionSampler::new();
        s.start();
        for i in 0..200 {
            let v = f64::from(i % 7);
            s.on_raw_event(&event(v, 0.0, 0.0));
        }
        // Rolling window never exceeds 20 entries; jitter stays finite.
        let out = s.on_raw_event(&event(1.0, 0.0, 0.0));
        assert!(out.jitter.is_finite());
    }

    #[test]
    fn at_motion_sampler_07_stop_clears_history() {
        let mut s = MotionSampler::new();
        s.start();
        s.on_raw_event(&event(9.0, 9.0, 9.0));
        s.stop();
        s.start();
        let out = s.on_raw_event(&event(1.0, 0.0, 0.0));
        assert_eq!(out.shake, 0.0);
        assert_eq!(out.jitter, 0.0);
    }
}
