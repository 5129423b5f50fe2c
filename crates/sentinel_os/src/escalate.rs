#![forbid(unsafe_code)]

use sentinel_contracts::alert::EscalationState;
use sentinel_contracts::risk::RiskLevel;
use sentinel_contracts::{ContractViolation, MonotonicTimeNs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoEscalationConfig {
    pub cooldown_ms: u64,
}

impl AutoEscalationConfig {
    pub fn mvp_v1() -> Self {
        Self { cooldown_ms: 10_000 }
    }
}

/// Watches the snapshot stream and decides when an autonomous arming is
/// allowed. Owns the cooldown clock and the auto-trigger latch; it can
/// only ever push the escalation cell *into* Armed(Auto), never out.
#[derive(Debug, Clone)]
pub struct AutoEscalation {
    config: AutoEscalationConfig,
    last_event_at: Option<MonotonicTimeNs>,
    auto_triggered: bool,
}

impl AutoEscalation {
    pub fn new(config: AutoEscalationConfig) -> Result<Self, ContractViolation> {
        if config.cooldown_ms == 0 || config.cooldown_ms > 600_000 {
            return Err(ContractViolation::InvalidValue {
                field: "auto_escalation_config.cooldown_ms",
                reason: "must be within 1..=600000",
            });
        }
        Ok(Self {
            config,
            last_event_at: None,
            auto_triggered: false,
        })
    }

    pub fn auto_triggered(&self) -> bool {
        self.auto_triggered
    }

    fn cooldown_elapsed(&self, now: MonotonicTimeNs) -> bool {
        match self.last_event_at {
            None => true,
            Some(t) => {
                now.saturating_elapsed_since(t) >= self.config.cooldown_ms.saturating_mul(1_000_000)
            }
        }
    }

    /// Per-tick decision. True only when the level is High, the cell is
    /// Idle, nothing is latched, and the cooldown has elapsed. A true
    /// result stamps the cooldown clock and latches, so the caller must
    /// arm on it. Once latched, later score dips are ignored until the
    /// countdown resolves or the user cancels.
    pub fn evaluate(
        &mut self,
        now: MonotonicTimeNs,
        level: RiskLevel,
        state: &EscalationState,
    ) -> bool {
        if level != RiskLevel::High {
            return false;
        }
        if !state.is_idle() {
            return false;
        }
        if self.auto_triggered {
            return false;
        }
        if !self.cooldown_elapsed(now) {
            return false;
        }
        self.auto_triggered = true;
        self.last_event_at = Some(now);
        true
    }

    /// A cancelled Auto arming clears the latch and restarts the
    /// cooldown, so the very next High tick cannot immediately re-arm.
    pub fn on_cancelled(&mut self, now: MonotonicTimeNs) {
        self.auto_triggered = false;
        self.last_event_at = Some(now);
    }

    /// Resolution of a fired countdown. The cooldown clock is stamped
    /// only on a successful submission; a transport failure must not
    /// suppress the retry path.
    pub fn on_fired(&mut self, now: MonotonicTimeNs, submitted_ok: bool) {
        self.auto_triggered = false;
        if submitted_ok {
            self.last_event_at = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_contracts::alert::TriggerKind;

    const SEC: u64 = 1_000_000_000;

    fn monitor() -> AutoEscalation {
        AutoEscalation::new(AutoEscalationConfig::mvp_v1()).unwrap()
    }

    fn t(secs: u64) -> MonotonicTimeNs {
        MonotonicTimeNs(secs * SEC)
    }

    #[test]
    fn at_escalate_01_arms_on_first_high_from_idle() {
        let mut m = monitor();
        assert!(m.evaluate(t(1), RiskLevel::High, &EscalationState::Idle));
        assert!(m.auto_triggered());
    }

    #[test]
    fn at_escalate_02_never_arms_below_high() {
        let mut m = monitor();
        assert!(!m.evaluate(t(1), RiskLevel::Medium, &EscalationState::Idle));
        assert!(!m.evaluate(t(1), RiskLevel::Low, &EscalationState::Idle));
    }

    #[test]
    fn at_escalate_03_never_arms_from_non_idle() {
        let mut m = monitor();
        let armed = EscalationState::Armed {
            kind: TriggerKind::Manual,
            deadline: t(20),
        };
        assert!(!m.evaluate(t(1), RiskLevel::High, &armed));
        assert!(!m.evaluate(t(1), RiskLevel::High, &EscalationState::Fired));
    }

    #[test]
    fn at_escalate_04_cooldown_blocks_until_boundary() {
        let mut m = monitor();
        assert!(m.evaluate(t(1), RiskLevel::High, &EscalationState::Idle));
        m.on_fired(t(2), true);

        // High snapshots inside the window stay suppressed.
        assert!(!m.evaluate(t(5), RiskLevel::High, &EscalationState::Idle));
        assert!(!m.evaluate(MonotonicTimeNs(12 * SEC - 1), RiskLevel::High, &EscalationState::Idle));
        // Exactly cooldown_ms after the stamp is permitted.
        assert!(m.evaluate(t(12), RiskLevel::High, &EscalationState::Idle));
    }

    #[test]
    fn at_escalate_05_cancel_restarts_cooldown() {
        let mut m = monitor();
        assert!(m.evaluate(t(1), RiskLevel::High, &EscalationState::Idle));
        m.on_cancelled(t(4));
        assert!(!m.auto_triggered());
        assert!(!m.evaluate(t(9), RiskLevel::High, &EscalationState::Idle));
        assert!(m.evaluate(t(14), RiskLevel::High, &EscalationState::Idle));
    }

    #[test]
    fn at_escalate_06_latch_suppresses_rearming_while_active() {
        let mut m = monitor();
        assert!(m.evaluate(t(1), RiskLevel::High, &EscalationState::Idle));
        // Even if the cell were observed Idle again, the latch holds
        // until an explicit cancel/fire resolution.
        assert!(!m.evaluate(t(30), RiskLevel::High, &EscalationState::Idle));
        m.on_fired(t(31), true);
        assert!(m.evaluate(t(41), RiskLevel::High, &EscalationState::Idle));
    }

    #[test]
    fn at_escalate_07_failed_submission_does_not_stamp_cooldown() {
        let mut m = monitor();
        assert!(m.evaluate(t(20), RiskLevel::High, &EscalationState::Idle));
        m.on_fired(t(21), false);
        // Stamp is still the arm at t=20, so t=30 is past the window.
        assert!(m.evaluate(t(30), RiskLevel::High, &EscalationState::Idle));
    }

    #[test]
    fn at_escalate_08_config_bounds() {
        assert!(AutoEscalation::new(AutoEscalationConfig { cooldown_ms: 0 }).is_err());
        assert!(AutoEscalation::new(AutoEscalationConfig { cooldown_ms: 700_000 }).is_err());
    }
}
