#![forbid(unsafe_code)]

use crate::countdown::{ArmOutcome, CancelOutcome, CountdownConfig, CountdownController};
use crate::escalate::{AutoEscalation, AutoEscalationConfig};
use crate::zones::ZoneSet;
use sentinel_contracts::alert::{
    AlertRequest, EscalationState, FactorBreakdown, LiveFeedFrame, TriggerKind,
    ALERT_CONTRACT_VERSION,
};
use sentinel_contracts::audio::{AudioFeatures, AudioFrame};
use sentinel_contracts::motion::{MotionEvent, MotionFeatures};
use sentinel_contracts::risk::RiskSnapshot;
use sentinel_contracts::zone::{GeoPoint, LocationContext, RiskZone};
use sentinel_contracts::{ContractViolation, LocalHour, MonotonicTimeNs};
use sentinel_engines::audio_sampler::{AudioSampler, AudioSamplerConfig};
use sentinel_engines::explain::explain;
use sentinel_engines::fuse::fuse;
use sentinel_engines::motion_sampler::MotionSampler;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelConfig {
    pub audio: AudioSamplerConfig,
    pub escalation: AutoEscalationConfig,
    pub countdown: CountdownConfig,
    /// Live-feed cadence in sampling ticks (2 ticks ~= 400 ms at the
    /// 200 ms sampling rate).
    pub live_feed_every_ticks: u64,
}

impl KernelConfig {
    pub fn mvp_v1() -> Self {
        Self {
            audio: AudioSamplerConfig::mvp_v1(),
            escalation: AutoEscalationConfig::mvp_v1(),
            countdown: CountdownConfig::mvp_v1(),
            live_feed_every_ticks: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutput {
    AutoArmed { deadline: MonotonicTimeNs },
    FireAlert(AlertRequest),
    LiveFeed(LiveFeedFrame),
}

/// The engine behind the dashboard: owns the samplers, the zone cache,
/// the escalation monitor and the countdown cell, and runs the strict
/// per-tick pipeline (countdown exit check, capture, fusion,
/// escalation check) against one consistent set of inputs. The UI only
/// observes; all transitions go through explicit methods here.
#[derive(Debug, Clone)]
pub struct SentinelKernel {
    config: KernelConfig,
    audio_sampler: AudioSampler,
    motion_sampler: MotionSampler,
    zone_set: ZoneSet,
    escalation: AutoEscalation,
    countdown: CountdownController,
    presentation_mode: bool,
    location: Option<LocationContext>,
    latest_audio: AudioFeatures,
    latest_motion: MotionFeatures,
    last_snapshot: Option<RiskSnapshot>,
    last_hour: Option<LocalHour>,
    tick_count: u64,
}

impl SentinelKernel {
    pub fn new(config: KernelConfig) -> Result<Self, ContractViolation> {
        if config.live_feed_every_ticks == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "kernel_config.live_feed_every_ticks",
                reason: "must be > 0",
            });
        }
        Ok(Self {
            config,
            audio_sampler: AudioSampler::new(config.audio)?,
            motion_sampler: MotionSampler::new(),
            zone_set: ZoneSet::new(),
            escalation: AutoEscalation::new(config.escalation)?,
            countdown: CountdownController::new(config.countdown)?,
            presentation_mode: false,
            location: None,
            latest_audio: AudioFeatures::zero(),
            latest_motion: MotionFeatures::zero(),
            last_snapshot: None,
            last_hour: None,
            tick_count: 0,
        })
    }

    pub fn start_sensors(&mut self) {
        self.audio_sampler.start();
        self.motion_sampler.start();
    }

    pub fn stop_sensors(&mut self) {
        self.audio_sampler.stop();
        self.motion_sampler.stop();
        self.latest_audio = AudioFeatures::zero();
        self.latest_motion = MotionFeatures::zero();
    }

    /// One ~200 ms sampling tick. Order is fixed: countdown exit check
    /// first, then capture, fusion and the escalation decision, all
    /// against this tick's inputs. A tick that fires can never also
    /// arm, so double-arming within a tick is structurally impossible.
    pub fn tick(
        &mut self,
        now: MonotonicTimeNs,
        hour: LocalHour,
        frame: Option<&AudioFrame>,
    ) -> Vec<TickOutput> {
        let mut outputs = Vec::new();

        if let Some(cmd) = self.countdown.tick(now) {
            outputs.push(TickOutput::FireAlert(self.alert_request(cmd.kind)));
        }

        let audio = self.audio_sampler.sample(frame);
        let motion = self.latest_motion;
        let snapshot = fuse(
            &audio,
            &motion,
            self.location.as_ref(),
            self.presentation_mode,
            hour,
        );
        self.latest_audio = audio;
        self.last_snapshot = Some(snapshot);
        self.last_hour = Some(hour);

        let state = self.countdown.state();
        if self.escalation.evaluate(now, snapshot.level, &state) {
            if let ArmOutcome::Armed { deadline } = self.countdown.arm(TriggerKind::Auto, now) {
                outputs.push(TickOutput::AutoArmed { deadline });
            }
        }

        self.tick_count += 1;
        if self.tick_count % self.config.live_feed_every_ticks == 0 {
            outputs.push(TickOutput::LiveFeed(self.live_feed_frame()));
        }

        outputs
    }

    /// Raw accelerometer delivery between ticks; the resulting features
    /// are consumed by the next fusion pass.
    pub fn on_motion_event(&mut self, event: &MotionEvent) -> MotionFeatures {
        let features = self.motion_sampler.on_raw_event(event);
        self.latest_motion = features;
        features
    }

    /// Position update, or `None` when the fix is lost. Without a fix
    /// the fusion scores location at the no-zone baseline.
    pub fn on_location_update(&mut self, point: Option<GeoPoint>) {
        self.location = point.map(|p| self.zone_set.derive_context(p));
    }

    /// Wholesale zone refresh; returns how many degenerate rings were
    /// skipped. The derived location context is recomputed immediately.
    pub fn load_zones(&mut self, zones: Vec<RiskZone>) -> usize {
        let skipped = self.zone_set.replace(zones);
        if let Some(ctx) = self.location.take() {
            self.location = Some(self.zone_set.derive_context(ctx.point));
        }
        skipped
    }

    pub fn arm_manual(&mut self, now: MonotonicTimeNs) -> ArmOutcome {
        self.countdown.arm(TriggerKind::Manual, now)
    }

    /// User cancel. A cancelled Auto arming restarts the monitor's
    /// cooldown and clears its latch, otherwise the next High tick
    /// would immediately re-arm.
    pub fn cancel(&mut self, now: MonotonicTimeNs) -> CancelOutcome {
        let outcome = self.countdown.cancel(now);
        if let CancelOutcome::Cancelled {
            kind: TriggerKind::Auto,
        } = outcome
        {
            self.escalation.on_cancelled(now);
        }
        outcome
    }

    /// User "send now". Returns the alert to submit, or `None` when
    /// nothing is armed or the fire latch was already taken.
    pub fn send_now(&mut self, now: MonotonicTimeNs) -> Option<AlertRequest> {
        self.countdown
            .send_now(now)
            .map(|cmd| self.alert_request(cmd.kind))
    }

    /// Resolution of the asynchronous submission of a fired alert.
    pub fn resolve_submission(&mut self, now: MonotonicTimeNs, submitted_ok: bool) {
        use crate::countdown::SubmissionResolution;
        match self.countdown.resolve_submission(submitted_ok) {
            SubmissionResolution::NotFired => {}
            _ => self.escalation.on_fired(now, submitted_ok),
        }
    }

    pub fn set_heightened_sensitivity(&mut self, enabled: bool) {
        self.audio_sampler.set_heightened_sensitivity(enabled);
    }

    /// The presentation toggle drives both knobs the way the dashboard
    /// does: heightened audio sensitivity and the forced location score.
    pub fn set_presentation_mode(&mut self, enabled: bool) {
        self.presentation_mode = enabled;
        self.audio_sampler.set_heightened_sensitivity(enabled);
    }

    pub fn presentation_mode(&self) -> bool {
        self.presentation_mode
    }

    pub fn current_snapshot(&self) -> Option<&RiskSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn escalation_state(&self) -> EscalationState {
        self.countdown.state()
    }

    pub fn remaining_secs(&self, now: MonotonicTimeNs) -> Option<u32> {
        self.countdown.remaining_secs(now)
    }

    pub fn location_context(&self) -> Option<&LocationContext> {
        self.location.as_ref()
    }

    pub fn explanation(&self) -> Vec<String> {
        match (&self.last_snapshot, self.last_hour) {
            (Some(snapshot), Some(hour)) => explain(snapshot, self.location.as_ref(), hour),
            _ => Vec::new(),
        }
    }

    pub fn live_feed_frame(&self) -> LiveFeedFrame {
        LiveFeedFrame {
            rms: self.latest_audio.rms,
            pitch_hz: self.latest_audio.pitch_hz,
            stress: self.latest_audio.stress,
            acceleration_magnitude: self.latest_motion.acceleration_magnitude,
            shake: self.latest_motion.shake,
            total_risk: self.last_snapshot.map(|s| s.total).unwrap_or(0.0),
        }
    }

    // The request is built from the snapshot current at fire time; a
    // manual fire before the first tick falls back to zero factors.
    fn alert_request(&self, kind: TriggerKind) -> AlertRequest {
        let (risk_score, factors) = match &self.last_snapshot {
            Some(s) => (
                s.total,
                FactorBreakdown {
                    audio: s.audio.score,
                    motion: s.motion.score,
                    time: s.time.score,
                    location: s.location.score,
                },
            ),
            None => (
                0.0,
                FactorBreakdown {
                    audio: 0.0,
                    motion: 0.0,
                    time: 0.0,
                    location: 0.0,
                },
            ),
        };
        AlertRequest {
            schema_version: ALERT_CONTRACT_VERSION,
            risk_score,
            factors,
            location: self.location.as_ref().map(|ctx| ctx.point),
            trigger_type: kind,
        }
    }
}
