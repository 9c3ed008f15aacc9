//! Engine event queue
//!
//! Everything the engine reacts to (configuration changes, change
//! notifications, timer expiries) arrives as an [`EngineEvent`] on a single
//! queue and is handled to completion before the next one.

use crate::config::DebugLevel;
use crate::types::SlotIndex;
use std::sync::mpsc::Sender;

/// Identifies one scheduled trigger expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    /// Slot whose trigger started the timer
    pub slot: SlotIndex,
    /// Binding generation the timer belongs to
    pub generation: u64,
    /// Engine-wide sequence number
    pub seq: u64,
}

/// Input to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A slot's identifier text changed
    IdentifierChanged { slot: SlotIndex, identifier: String },
    /// The slot count changed
    CountChanged(usize),
    /// The trigger feedback period changed (seconds)
    TriggerFeedbackChanged(f64),
    /// The diagnostic level changed
    DebugLevelChanged(DebugLevel),
    /// A bound control reported a change
    Changed { slot: SlotIndex, generation: u64 },
    /// A trigger feedback timer fired
    TimerExpired(TimerToken),
}

/// Clonable handle for posting events to an engine's queue
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<EngineEvent>,
}

impl EventSender {
    pub(crate) fn new(tx: Sender<EngineEvent>) -> Self {
        Self { tx }
    }

    /// Queue an event; returns false if the engine is gone
    pub fn post(&self, event: EngineEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Change-notification target handed to [`Observable::subscribe`]
///
/// [`Observable::subscribe`]: crate::resolver::Observable::subscribe
#[derive(Debug, Clone)]
pub struct ChangeSink {
    sender: EventSender,
    slot: SlotIndex,
    generation: u64,
}

impl ChangeSink {
    pub(crate) fn new(sender: EventSender, slot: SlotIndex, generation: u64) -> Self {
        Self {
            sender,
            slot,
            generation,
        }
    }

    /// Slot this sink reports for
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Report that the observed control changed; dropped once the engine is gone
    pub fn notify(&self) {
        self.sender.post(EngineEvent::Changed {
            slot: self.slot,
            generation: self.generation,
        });
    }
}
