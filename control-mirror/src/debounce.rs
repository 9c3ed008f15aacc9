//! Trigger debouncer
//!
//! Per-slot state machine for trigger-classified controls: the first
//! notification lights the slot and starts a one-shot timer; notifications
//! while the timer is pending are ignored and never move its deadline.

use crate::events::TimerToken;

/// Phase of a trigger slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerPhase {
    #[default]
    Idle,
    /// Lit, waiting for the timer identified by the token
    Active(TimerToken),
}

/// Non-retriggering one-shot
#[derive(Debug, Clone, Default)]
pub struct TriggerDebouncer {
    phase: TriggerPhase,
}

impl TriggerDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, TriggerPhase::Active(_))
    }

    /// Pending timer, if any
    pub fn pending(&self) -> Option<TimerToken> {
        match self.phase {
            TriggerPhase::Active(token) => Some(token),
            TriggerPhase::Idle => None,
        }
    }

    /// Handle a change notification
    ///
    /// Returns the token to schedule when this notification starts a new
    /// on-period, or `None` when one is already running.
    pub fn notify(&mut self, token: TimerToken) -> Option<TimerToken> {
        match self.phase {
            TriggerPhase::Idle => {
                self.phase = TriggerPhase::Active(token);
                Some(token)
            }
            TriggerPhase::Active(_) => None,
        }
    }

    /// Handle a timer expiry; returns true when it ends the on-period
    pub fn expire(&mut self, token: &TimerToken) -> bool {
        match self.phase {
            TriggerPhase::Active(pending) if pending == *token => {
                self.phase = TriggerPhase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Forget any pending timer (rebind or shutdown)
    pub fn discard(&mut self) {
        self.phase = TriggerPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(seq: u64) -> TimerToken {
        TimerToken {
            slot: 2,
            generation: 1,
            seq,
        }
    }

    #[test]
    fn test_idle_to_active_to_idle() {
        let mut debouncer = TriggerDebouncer::new();
        assert_eq!(debouncer.notify(token(1)), Some(token(1)));
        assert!(debouncer.is_active());

        assert!(debouncer.expire(&token(1)));
        assert_eq!(debouncer.phase(), TriggerPhase::Idle);
    }

    #[test]
    fn test_notify_while_active_is_ignored() {
        let mut debouncer = TriggerDebouncer::new();
        debouncer.notify(token(1));

        assert_eq!(debouncer.notify(token(2)), None);
        assert_eq!(debouncer.pending(), Some(token(1)));

        // Only the original timer ends the on-period
        assert!(!debouncer.expire(&token(2)));
        assert!(debouncer.expire(&token(1)));
    }

    #[test]
    fn test_stale_expiry_after_discard() {
        let mut debouncer = TriggerDebouncer::new();
        debouncer.notify(token(1));
        debouncer.discard();

        assert!(!debouncer.expire(&token(1)));
        assert_eq!(debouncer.notify(token(3)), Some(token(3)));
    }
}
