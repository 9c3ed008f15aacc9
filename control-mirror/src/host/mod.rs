//! Host collaborators
//!
//! The engine talks to its host through three seams: the object space
//! (see [`crate::resolver`]), a [`Scheduler`] for one-shot timers and an
//! [`IndicatorPanel`] for slot outputs. This module defines the last two and
//! ships in-memory implementations of all three for tests and simulation.

use crate::events::TimerToken;
use crate::types::{IndicatorState, SlotIndex};
use std::time::Duration;

pub mod memory;
pub mod panel;
pub mod scheduler;

pub use memory::{MemoryComponent, MemorySpace};
pub use panel::PanelRecorder;
pub use scheduler::ManualScheduler;

/// One-shot timer service
///
/// An expiry is delivered back to the engine as
/// [`EngineEvent::TimerExpired`](crate::events::EngineEvent::TimerExpired)
/// carrying the same token. Timers are never cancelled.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration, token: TimerToken);
}

/// Per-slot indicator outputs
pub trait IndicatorPanel {
    /// Number of visible indicators changed
    fn resize(&mut self, _count: usize) {}

    /// Update one slot's indicator
    fn show(&mut self, slot: SlotIndex, state: IndicatorState);
}
