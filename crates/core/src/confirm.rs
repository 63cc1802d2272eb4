//! The "Press for Yes" hold-to-confirm gate, client side.
//!
//! Activation of a contract is gated on every collaborator sustaining a
//! press gesture for the full hold duration. [`HoldGate`] is the pure state
//! machine behind that gesture: it is fed timestamps (milliseconds from any
//! monotonic clock) rather than reading time itself, so the timing rules are
//! directly testable. A release before the threshold aborts the attempt with
//! no side effect; a sustained hold yields exactly one confirm request.
//!
//! The server side of the gate lives in the collaborator repository, which
//! owns idempotence and the all-parties-confirmed activation check.

/// Required hold duration in milliseconds.
pub const HOLD_DURATION_MS: u64 = 3000;

/// Outcome of releasing (or cancelling) a hold attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldOutcome {
    /// Held long enough: submit exactly one confirm request now.
    Confirm,
    /// Released early or no attempt in progress; nothing to submit.
    Aborted,
}

/// State of the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    Idle,
    Holding { pressed_at_ms: u64 },
    /// A confirm request was already produced; further gestures are no-ops.
    Completed,
}

/// One collaborator's hold-to-confirm gesture for one contract.
///
/// At most one attempt is in flight at a time; pressing while already
/// holding is ignored. Once completed, the gate never produces a second
/// confirm request (the server treats re-confirms as no-op successes, but
/// the client does not issue them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldGate {
    state: HoldState,
}

impl Default for HoldGate {
    fn default() -> Self {
        Self::new()
    }
}

impl HoldGate {
    /// A gate with no attempt in progress.
    pub const fn new() -> Self {
        Self {
            state: HoldState::Idle,
        }
    }

    /// Begin a hold attempt at `now_ms`. Returns `true` if a new attempt
    /// started, `false` if one was already in progress or the gate is done.
    pub fn press(&mut self, now_ms: u64) -> bool {
        match self.state {
            HoldState::Idle => {
                self.state = HoldState::Holding {
                    pressed_at_ms: now_ms,
                };
                true
            }
            HoldState::Holding { .. } | HoldState::Completed => false,
        }
    }

    /// End the hold attempt at `now_ms`.
    ///
    /// Returns [`HoldOutcome::Confirm`] exactly once, when the press was
    /// sustained for at least [`HOLD_DURATION_MS`]. An early release resets
    /// to idle so the user can retry; there is no partial credit.
    pub fn release(&mut self, now_ms: u64) -> HoldOutcome {
        match self.state {
            HoldState::Holding { pressed_at_ms }
                if now_ms.saturating_sub(pressed_at_ms) >= HOLD_DURATION_MS =>
            {
                self.state = HoldState::Completed;
                HoldOutcome::Confirm
            }
            HoldState::Holding { .. } => {
                self.state = HoldState::Idle;
                HoldOutcome::Aborted
            }
            HoldState::Idle | HoldState::Completed => HoldOutcome::Aborted,
        }
    }

    /// Abort any in-flight attempt (navigation away, gesture cancel).
    /// Never produces a confirm request.
    pub fn cancel(&mut self) {
        if matches!(self.state, HoldState::Holding { .. }) {
            self.state = HoldState::Idle;
        }
    }

    /// Whether a press is currently being held.
    pub const fn is_holding(&self) -> bool {
        matches!(self.state, HoldState::Holding { .. })
    }

    /// Whether this gate already produced its confirm request.
    pub const fn is_completed(&self) -> bool {
        matches!(self.state, HoldState::Completed)
    }

    /// Milliseconds still required at `now_ms`, or `None` when not holding.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        match self.state {
            HoldState::Holding { pressed_at_ms } => {
                Some(HOLD_DURATION_MS.saturating_sub(now_ms.saturating_sub(pressed_at_ms)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_release_aborts_with_no_confirm() {
        let mut gate = HoldGate::new();
        assert!(gate.press(0));
        assert_eq!(gate.release(2999), HoldOutcome::Aborted);
        assert!(!gate.is_completed());
    }

    #[test]
    fn test_release_at_threshold_confirms() {
        let mut gate = HoldGate::new();
        gate.press(1000);
        assert_eq!(gate.release(1000 + HOLD_DURATION_MS), HoldOutcome::Confirm);
        assert!(gate.is_completed());
    }

    #[test]
    fn test_release_after_threshold_confirms() {
        let mut gate = HoldGate::new();
        gate.press(0);
        assert_eq!(gate.release(10_000), HoldOutcome::Confirm);
    }

    #[test]
    fn test_confirm_produced_at_most_once() {
        let mut gate = HoldGate::new();
        gate.press(0);
        assert_eq!(gate.release(3000), HoldOutcome::Confirm);

        // A second full gesture on a completed gate yields nothing.
        assert!(!gate.press(5000));
        assert_eq!(gate.release(10_000), HoldOutcome::Aborted);
    }

    #[test]
    fn test_retry_after_early_release_succeeds() {
        let mut gate = HoldGate::new();
        gate.press(0);
        assert_eq!(gate.release(500), HoldOutcome::Aborted);

        assert!(gate.press(1000));
        assert_eq!(gate.release(4000), HoldOutcome::Confirm);
    }

    #[test]
    fn test_press_while_holding_is_ignored() {
        let mut gate = HoldGate::new();
        assert!(gate.press(0));
        assert!(!gate.press(100));
        // The original press time still governs the threshold.
        assert_eq!(gate.release(3000), HoldOutcome::Confirm);
    }

    #[test]
    fn test_cancel_aborts_attempt() {
        let mut gate = HoldGate::new();
        gate.press(0);
        gate.cancel();
        assert!(!gate.is_holding());
        assert_eq!(gate.release(10_000), HoldOutcome::Aborted);
    }

    #[test]
    fn test_release_without_press_is_a_noop() {
        let mut gate = HoldGate::new();
        assert_eq!(gate.release(3000), HoldOutcome::Aborted);
    }

    #[test]
    fn test_remaining_ms_counts_down() {
        let mut gate = HoldGate::new();
        assert_eq!(gate.remaining_ms(0), None);
        gate.press(0);
        assert_eq!(gate.remaining_ms(0), Some(3000));
        assert_eq!(gate.remaining_ms(1200), Some(1800));
        assert_eq!(gate.remaining_ms(9999), Some(0));
    }

    #[test]
    fn test_hold_duration_is_three_seconds() {
        assert_eq!(HOLD_DURATION_MS, 3000);
    }
}
