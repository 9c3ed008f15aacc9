//! Virtual-clock scheduler
//!
//! Timers only fire when the owner advances the clock, so trigger timing can
//! be checked to the nanosecond without sleeping.

use super::Scheduler;
use crate::events::TimerToken;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    deadline: Duration,
    token: TimerToken,
}

/// Scheduler driven by explicit clock advances
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    pending: Vec<PendingTimer>,
    scheduled_total: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Timers scheduled but not yet fired
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Timers ever scheduled
    pub fn scheduled_total(&self) -> usize {
        self.scheduled_total
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|timer| timer.deadline).min()
    }

    /// Move the clock forward to `time` and return the expired tokens
    ///
    /// Tokens come back in deadline order; ties keep scheduling order. Moving
    /// backwards is ignored.
    pub fn advance_to(&mut self, time: Duration) -> Vec<TimerToken> {
        if time > self.now {
            self.now = time;
        }

        let now = self.now;
        let (mut expired, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|timer| timer.deadline <= now);
        self.pending = pending;

        // Stable sort keeps insertion order for equal deadlines
        expired.sort_by_key(|timer| timer.deadline);
        expired.into_iter().map(|timer| timer.token).collect()
    }

    /// Move the clock forward by `delta`
    pub fn advance_by(&mut self, delta: Duration) -> Vec<TimerToken> {
        let target = self.now + delta;
        self.advance_to(target)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, token: TimerToken) {
        self.scheduled_total += 1;
        self.pending.push(PendingTimer {
            deadline: self.now + delay,
            token,
        });
    }
}
