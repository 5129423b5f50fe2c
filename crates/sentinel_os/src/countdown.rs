#![forbid(unsafe_code)]

use sentinel_contracts::alert::{EscalationState, TriggerKind};
use sentinel_contracts::{ContractViolation, MonotonicTimeNs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownConfig {
    pub countdown_secs: u32,
}

impl CountdownConfig {
    pub fn mvp_v1() -> Self {
        Self { countdown_secs: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    Armed { deadline: MonotonicTimeNs },
    AlreadyActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled { kind: TriggerKind },
    NotArmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionResolution {
    Submitted,
    RetryReleased,
    NotFired,
}

/// Instruction to the wiring layer to perform the irreversible submit.
/// At most one is emitted per arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireCommand {
    pub kind: TriggerKind,
}

/// Sole owner of the escalation cell's exits. Deadlines are wall-clock
/// anchored: a paused host that resumes past the deadline fires on the
/// next tick rather than silently extending the countdown.
#[derive(Debug, Clone)]
pub struct CountdownController {
    config: CountdownConfig,
    state: EscalationState,
    alert_sent: bool,
}

impl CountdownController {
    pub fn new(config: CountdownConfig) -> Result<Self, ContractViolation> {
        if config.countdown_secs == 0 || config.countdown_secs > 600 {
            return Err(ContractViolation::InvalidValue {
                field: "countdown_config.countdown_secs",
                reason: "must be within 1..=600",
            });
        }
        Ok(Self {
            config,
            state: EscalationState::Idle,
            alert_sent: false,
        })
    }

    pub fn state(&self) -> EscalationState {
        self.state
    }

    /// Arms the countdown. Only legal from `Idle`; an active cycle is
    /// reported, not clobbered.
    pub fn arm(&mut self, kind: TriggerKind, now: MonotonicTimeNs) -> ArmOutcome {
        if !self.state.is_idle() {
            return ArmOutcome::AlreadyActive;
        }
        let deadline = now.saturating_add_ms(u64::from(self.config.countdown_secs) * 1_000);
        self.alert_sent = false;
        self.state = EscalationState::Armed { kind, deadline };
        ArmOutcome::Armed { deadline }
    }

    /// Whole seconds left while armed; monotonically decreasing.
    pub fn remaining_secs(&self, now: MonotonicTimeNs) -> Option<u32> {
        match self.state {
            EscalationState::Armed { deadline, .. } => {
                let remaining_ns = deadline.0.saturating_sub(now.0);
                Some((remaining_ns / 1_000_000_000) as u32)
            }
            _ => None,
        }
    }

    /// Expiry path: fires when the deadline has passed.
    pub fn tick(&mut self, now: MonotonicTimeNs) -> Option<FireCommand> {
        match self.state {
            EscalationState::Armed { kind, deadline } if now >= deadline => self.fire(kind),
            _ => None,
        }
    }

    /// Explicit user fire path; same single-latch guarantee as expiry.
    pub fn send_now(&mut self, _now: MonotonicTimeNs) -> Option<FireCommand> {
        match self.state {
            EscalationState::Armed { kind, .. } => self.fire(kind),
            _ => None,
        }
    }

    // The latch is checked and set synchronously here, so a same-tick
    // race between expiry and send-now yields exactly one command.
    fn fire(&mut self, kind: TriggerKind) -> Option<FireCommand> {
        if self.alert_sent {
            return None;
        }
        self.alert_sent = true;
        self.state = EscalationState::Fired;
        Some(FireCommand { kind })
    }

    /// Discards the arming without firing. Effective immediately: no
    /// later tick can fire the cancelled arming.
    pub fn cancel(&mut self, _now: MonotonicTimeNs) -> CancelOutcome {
        match self.state {
            EscalationState::Armed { kind, .. } => {
                self.state = EscalationState::Idle;
                CancelOutcome::Cancelled { kind }
            }
            _ => CancelOutcome::NotArmed,
        }
    }

    /// Resolves the in-flight submission of a fired alert. Failure
    /// releases the latch and returns to Idle so the user can
    /// re-initiate exactly one retry cycle.
    pub fn resolve_submission(&mut self, submitted_ok: bool) -> SubmissionResolution {
        if self.state != EscalationState::Fired {
            return SubmissionResolution::NotFired;
        }
        self.state = EscalationState::Idle;
        if submitted_ok {
            SubmissionResolution::Submitted
        } else {
            self.alert_sent = false;
            SubmissionResolution::RetryReleased
        }
    }
}
