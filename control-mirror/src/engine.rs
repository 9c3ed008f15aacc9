//! Rebind controller and event mirror
//!
//! [`MirrorEngine`] owns the binding table and processes one event at a
//! time: configuration changes trigger a full rebind of every slot, change
//! notifications are mirrored directly (continuous controls) or through the
//! trigger debouncer, and timer expiries end trigger on-periods.

use crate::binding::{BindingTable, Slot, SlotSnapshot};
use crate::config::{clamp_count, clamp_trigger_feedback, DebugLevel, EngineConfig};
use crate::diagnostics::Diagnostics;
use crate::events::{ChangeSink, EngineEvent, EventSender, TimerToken};
use crate::host::{IndicatorPanel, Scheduler};
use crate::identifier::parse_identifier;
use crate::resolver::{resolve, ObjectSpace};
use crate::types::{BindError, Classification, MirrorError, Result, SlotIndex};
use std::sync::mpsc::{self, Receiver};

/// The binding/resolution/mirroring engine
///
/// # Example
/// ```
/// use control_mirror::host::{ManualScheduler, MemorySpace, PanelRecorder};
/// use control_mirror::{EngineConfig, IndicatorState, MirrorEngine, TypeTag};
///
/// let mut space = MemorySpace::new();
/// space.add_component("Mixer").with_control("mute", TypeTag::Button, false);
///
/// let config = EngineConfig::new().with_count(2);
/// let mut engine = MirrorEngine::new(config, space, ManualScheduler::new(), PanelRecorder::new());
/// engine.set_identifier(1, "Mixer.mute").unwrap();
/// engine.start();
///
/// engine.space_mut().set_value("Mixer", "mute", true).unwrap();
/// engine.process_pending();
/// assert_eq!(engine.panel().state(1), Some(IndicatorState::valid(true)));
/// assert_eq!(engine.panel().state(2), Some(IndicatorState::INDETERMINATE));
/// ```
pub struct MirrorEngine<S, T, P>
where
    S: ObjectSpace,
    T: Scheduler,
    P: IndicatorPanel,
{
    config: EngineConfig,
    diag: Diagnostics,
    space: S,
    scheduler: T,
    panel: P,
    table: BindingTable,
    /// Identifier text per slot; positions beyond the count are discarded
    identifiers: Vec<String>,
    generation: u64,
    next_timer: u64,
    started: bool,
    sender: EventSender,
    queue: Receiver<EngineEvent>,
}

impl<S, T, P> MirrorEngine<S, T, P>
where
    S: ObjectSpace,
    T: Scheduler,
    P: IndicatorPanel,
{
    /// Create an engine; nothing is bound until [`start`](Self::start)
    pub fn new(config: EngineConfig, space: S, scheduler: T, panel: P) -> Self {
        let config = config.sanitized();
        let (tx, rx) = mpsc::channel();
        Self {
            diag: Diagnostics::new(config.debug_level),
            table: BindingTable::new(config.count),
            identifiers: vec![String::new(); config.count],
            config,
            space,
            scheduler,
            panel,
            generation: 0,
            next_timer: 0,
            started: false,
            sender: EventSender::new(tx),
            queue: rx,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn space(&self) -> &S {
        &self.space
    }

    /// Host-side access to the object space (writes notify subscribers)
    pub fn space_mut(&mut self) -> &mut S {
        &mut self.space
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Current binding generation; bumped by every rebind and by shutdown
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Handle for queueing events from the host
    pub fn event_sender(&self) -> EventSender {
        self.sender.clone()
    }

    pub fn slot_count(&self) -> usize {
        self.table.len()
    }

    pub fn slot(&self, index: SlotIndex) -> Option<&Slot> {
        self.table.get(index)
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    pub fn snapshot(&self) -> Vec<SlotSnapshot> {
        self.table.snapshot()
    }

    /// Stored identifier text for a slot
    pub fn identifier(&self, index: SlotIndex) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.identifiers.get(i))
            .map(String::as_str)
    }

    /// Initial bind of every slot
    pub fn start(&mut self) {
        self.diag.trace_call("start");
        self.started = true;
        self.rebind();
    }

    /// Tear down every subscription and pending timer
    pub fn shutdown(&mut self) {
        self.diag.trace_call("shutdown");
        self.table.detach_all();
        self.generation += 1;
        self.started = false;
        self.publish_all();
        self.diag.debug(format_args!("Engine shut down"));
    }

    /// Store a slot's identifier and rebind if started
    pub fn set_identifier(
        &mut self,
        index: SlotIndex,
        identifier: impl Into<String>,
    ) -> Result<()> {
        self.diag.trace_call("set_identifier");
        let count = self.table.len();
        if index == 0 || index > count {
            return Err(MirrorError::SlotOutOfRange { slot: index, count });
        }
        self.identifiers[index - 1] = identifier.into();
        if self.started {
            self.rebind();
        }
        Ok(())
    }

    /// Change the slot count (clamped to 1..=100) and rebind if started
    pub fn set_count(&mut self, count: usize) {
        self.diag.trace_call("set_count");
        self.config.count = clamp_count(count);
        // Slots dropped by a shrink come back empty
        self.identifiers.resize(self.config.count, String::new());
        if self.started {
            self.rebind();
        } else {
            self.table.resize(self.config.count);
        }
    }

    /// Change the trigger feedback period; applies to timers started later
    pub fn set_trigger_feedback(&mut self, seconds: f64) {
        self.diag.trace_call("set_trigger_feedback");
        self.config.trigger_feedback_seconds = clamp_trigger_feedback(seconds);
    }

    pub fn set_debug_level(&mut self, level: DebugLevel) {
        self.config.debug_level = level;
        self.diag.set_level(level);
        self.diag.trace_call("set_debug_level");
    }

    /// Handle every queued event; returns how many were handled
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.queue.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Handle one event to completion
    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::IdentifierChanged { slot, identifier } => {
                if let Err(e) = self.set_identifier(slot, identifier) {
                    self.diag.error(format_args!("{}", e));
                }
            }
            EngineEvent::CountChanged(count) => self.set_count(count),
            EngineEvent::TriggerFeedbackChanged(seconds) => self.set_trigger_feedback(seconds),
            EngineEvent::DebugLevelChanged(level) => self.set_debug_level(level),
            EngineEvent::Changed { slot, generation } => self.on_change(slot, generation),
            EngineEvent::TimerExpired(token) => self.on_timer(token),
        }
    }

    /// Full teardown and rebuild of all slots
    pub fn rebind(&mut self) {
        self.diag.trace_call("rebind");

        self.table.detach_all();
        self.generation += 1;
        self.table.resize(self.config.count);
        self.panel.resize(self.config.count);

        for index in 1..=self.config.count {
            self.bind_slot(index);
        }

        self.publish_all();
        self.diag.debug(format_args!(
            "Rebind complete (generation {}): {}/{} slots valid",
            self.generation,
            self.table.iter().filter(|slot| slot.is_valid()).count(),
            self.table.len()
        ));
    }

    fn bind_slot(&mut self, index: SlotIndex) {
        self.diag.trace_call("bind_slot");
        let identifier = self.identifiers[index - 1].clone();
        let sink = ChangeSink::new(self.sender.clone(), index, self.generation);
        let Some(slot) = self.table.get_mut(index) else {
            return;
        };
        slot.set_identifier(identifier.clone());

        if identifier.is_empty() {
            self.diag.debug(format_args!("Slot {}: no identifier", index));
            return;
        }

        let resolved = parse_identifier(&identifier, self.config.separator)
            .map_err(BindError::from)
            .and_then(|parsed| {
                resolve(&self.space, &parsed)
                    .map(|handle| (parsed, handle))
                    .map_err(BindError::from)
            });

        match resolved {
            Ok((parsed, handle)) => {
                let type_tag = handle.type_tag();
                let classification = Classification::of(&type_tag);
                let subscription = handle.subscribe(sink);
                slot.attach(parsed, handle, classification, subscription);
                self.diag.debug(format_args!(
                    "Slot {}: bound {:?} ({}, {}), lit={}",
                    index,
                    identifier,
                    type_tag,
                    classification,
                    slot.is_lit()
                ));
            }
            Err(e) => {
                self.diag.error(format_args!("Slot {}: {}", index, e));
                slot.record_failure(e);
            }
        }
    }

    fn on_change(&mut self, index: SlotIndex, generation: u64) {
        self.diag.trace_call("on_change");
        if generation != self.generation {
            self.diag.debug(format_args!(
                "Slot {}: ignoring notification from generation {}",
                index, generation
            ));
            return;
        }
        let Some(slot) = self.table.get_mut(index) else {
            return;
        };
        if !slot.is_valid() {
            return;
        }

        match slot.classification() {
            Some(Classification::Continuous) => {
                let value = slot.source_value().unwrap_or(false);
                slot.set_lit(value);
                self.diag.debug(format_args!("Slot {}: mirrored {}", index, value));
            }
            Some(Classification::Trigger) => {
                let token = TimerToken {
                    slot: index,
                    generation,
                    seq: self.next_timer,
                };
                match slot.trigger_mut().notify(token) {
                    Some(token) => {
                        self.next_timer += 1;
                        slot.set_lit(true);
                        self.scheduler.schedule(self.config.trigger_feedback(), token);
                        self.diag.debug(format_args!(
                            "Slot {}: triggered, lit for {}s",
                            index, self.config.trigger_feedback_seconds
                        ));
                    }
                    None => {
                        self.diag.debug(format_args!("Slot {}: trigger already active", index));
                    }
                }
            }
            None => return,
        }

        self.publish(index);
    }

    fn on_timer(&mut self, token: TimerToken) {
        self.diag.trace_call("on_timer");
        if token.generation != self.generation {
            self.diag.debug(format_args!(
                "Slot {}: discarding timer from generation {}",
                token.slot, token.generation
            ));
            return;
        }
        let Some(slot) = self.table.get_mut(token.slot) else {
            return;
        };
        if slot.trigger_mut().expire(&token) {
            slot.set_lit(false);
            self.diag.debug(format_args!("Slot {}: trigger feedback ended", token.slot));
            self.publish(token.slot);
        }
    }

    fn publish(&mut self, index: SlotIndex) {
        if let Some(slot) = self.table.get(index) {
            self.panel.show(index, slot.indicator_state());
        }
    }

    fn publish_all(&mut self) {
        for slot in self.table.iter() {
            self.panel.show(slot.index(), slot.indicator_state());
        }
    }
}
