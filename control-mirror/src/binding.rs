//! Binding table
//!
//! Owns every slot's resolved handle, subscription, classification, validity
//! and mirrored state. Slots are addressed 1..=N.

use crate::debounce::TriggerDebouncer;
use crate::identifier::ParsedIdentifier;
use crate::resolver::{ObservableRef, Subscription};
use crate::types::{BindError, Classification, IndicatorState, SlotIndex};
use serde::Serialize;

/// One monitored position
pub struct Slot {
    index: SlotIndex,
    identifier: String,
    parsed: Option<ParsedIdentifier>,
    handle: Option<ObservableRef>,
    subscription: Option<Box<dyn Subscription>>,
    classification: Option<Classification>,
    valid: bool,
    lit: bool,
    trigger: TriggerDebouncer,
    last_error: Option<BindError>,
}

impl Slot {
    fn new(index: SlotIndex) -> Self {
        Self {
            index,
            identifier: String::new(),
            parsed: None,
            handle: None,
            subscription: None,
            classification: None,
            valid: false,
            lit: false,
            trigger: TriggerDebouncer::new(),
            last_error: None,
        }
    }

    pub fn index(&self) -> SlotIndex {
        self.index
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn parsed(&self) -> Option<&ParsedIdentifier> {
        self.parsed.as_ref()
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn trigger(&self) -> &TriggerDebouncer {
        &self.trigger
    }

    pub fn last_error(&self) -> Option<&BindError> {
        self.last_error.as_ref()
    }

    /// Boolean value of the bound control
    pub fn source_value(&self) -> Option<bool> {
        self.handle.as_ref().map(|handle| handle.boolean())
    }

    pub fn indicator_state(&self) -> IndicatorState {
        if self.valid {
            IndicatorState::valid(self.lit)
        } else {
            IndicatorState::INDETERMINATE
        }
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        let state = self.indicator_state();
        SlotSnapshot {
            index: self.index,
            identifier: self.identifier.clone(),
            component: self.parsed.as_ref().map(|p| p.component.clone()),
            control: self.parsed.as_ref().map(|p| p.control.clone()),
            classification: self.classification,
            valid: self.valid,
            lit: state.lit,
            indeterminate: state.indeterminate,
            trigger_active: self.trigger.is_active(),
            error: self.last_error.as_ref().map(|e| e.to_string()),
        }
    }

    pub(crate) fn trigger_mut(&mut self) -> &mut TriggerDebouncer {
        &mut self.trigger
    }

    pub(crate) fn set_identifier(&mut self, identifier: String) {
        self.identifier = identifier;
    }

    /// Mirrored state; ignored while the slot is not valid
    pub(crate) fn set_lit(&mut self, lit: bool) {
        self.lit = self.valid && lit;
    }

    /// Drop the subscription and handle and go indeterminate
    pub(crate) fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.handle = None;
        self.parsed = None;
        self.classification = None;
        self.valid = false;
        self.lit = false;
        self.trigger.discard();
        self.last_error = None;
    }

    /// Install a resolved binding; the slot must be detached
    pub(crate) fn attach(
        &mut self,
        parsed: ParsedIdentifier,
        handle: ObservableRef,
        classification: Classification,
        subscription: Box<dyn Subscription>,
    ) {
        debug_assert!(self.subscription.is_none(), "slot {} attached twice", self.index);
        self.lit = match classification {
            Classification::Continuous => handle.boolean(),
            Classification::Trigger => false,
        };
        self.parsed = Some(parsed);
        self.handle = Some(handle);
        self.classification = Some(classification);
        self.subscription = Some(subscription);
        self.valid = true;
    }

    pub(crate) fn record_failure(&mut self, error: BindError) {
        self.last_error = Some(error);
    }
}

/// Serializable view of a slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSnapshot {
    pub index: SlotIndex,
    pub identifier: String,
    pub component: Option<String>,
    pub control: Option<String>,
    pub classification: Option<Classification>,
    pub valid: bool,
    pub lit: bool,
    pub indeterminate: bool,
    pub trigger_active: bool,
    pub error: Option<String>,
}

/// Slots 1..=N
pub struct BindingTable {
    slots: Vec<Slot>,
}

impl BindingTable {
    pub fn new(count: usize) -> Self {
        let mut table = Self { slots: Vec::new() };
        table.resize(count);
        table
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: SlotIndex) -> Option<&Slot> {
        index.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    pub(crate) fn get_mut(&mut self, index: SlotIndex) -> Option<&mut Slot> {
        index.checked_sub(1).and_then(move |i| self.slots.get_mut(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Live subscriptions held by the table
    pub fn subscription_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_subscribed()).count()
    }

    /// Detach every slot
    pub(crate) fn detach_all(&mut self) {
        for slot in &mut self.slots {
            slot.detach();
        }
    }

    /// Keep exactly `count` slots; removed slots are detached first
    pub(crate) fn resize(&mut self, count: usize) {
        for slot in self.slots.iter_mut().skip(count) {
            slot.detach();
        }
        self.slots.truncate(count);
        while self.slots.len() < count {
            let index = self.slots.len() + 1;
            self.slots.push(Slot::new(index));
        }
    }

    pub fn snapshot(&self) -> Vec<SlotSnapshot> {
        self.slots.iter().map(Slot::snapshot).collect()
    }
}

impl Drop for BindingTable {
    fn drop(&mut self) {
        self.detach_all();
    }
}
