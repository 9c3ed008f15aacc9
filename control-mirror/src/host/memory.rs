//! In-memory object space
//!
//! Components hold named members; a member is either a control (type tag,
//! boolean value, subscribers) or a plain property that does not resolve as
//! a control. Components can be marked inaccessible to model objects that
//! exist but cannot be read.

use crate::events::ChangeSink;
use crate::resolver::{Component, ObjectSpace, Observable, ObservableRef, Subscription};
use crate::types::{ResolutionError, TypeTag};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

#[derive(Debug)]
struct ControlCell {
    type_tag: TypeTag,
    value: bool,
    subscribers: Vec<(u64, ChangeSink)>,
    next_subscriber: u64,
}

impl ControlCell {
    fn notify_all(&self) {
        for (_, sink) in &self.subscribers {
            sink.notify();
        }
    }
}

#[derive(Debug)]
enum Member {
    Control(Rc<RefCell<ControlCell>>),
    Property(String),
}

/// A named object in a [`MemorySpace`]
#[derive(Debug)]
pub struct MemoryComponent {
    name: String,
    accessible: bool,
    members: HashMap<String, Member>,
}

impl MemoryComponent {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            accessible: true,
            members: HashMap::new(),
        }
    }

    /// Add (or replace) a control member
    pub fn with_control(&mut self, name: &str, type_tag: TypeTag, value: bool) -> &mut Self {
        let cell = ControlCell {
            type_tag,
            value,
            subscribers: Vec::new(),
            next_subscriber: 0,
        };
        self.members
            .insert(name.to_string(), Member::Control(Rc::new(RefCell::new(cell))));
        self
    }

    /// Add a member that is not a control
    pub fn with_property(&mut self, name: &str, value: &str) -> &mut Self {
        self.members
            .insert(name.to_string(), Member::Property(value.to_string()));
        self
    }

    /// Value of a non-control member
    pub fn property(&self, name: &str) -> Option<&str> {
        match self.members.get(name) {
            Some(Member::Property(value)) => Some(value),
            _ => None,
        }
    }

    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    fn cell(&self, control: &str) -> Option<&Rc<RefCell<ControlCell>>> {
        match self.members.get(control) {
            Some(Member::Control(cell)) => Some(cell),
            _ => None,
        }
    }

    /// Safe read of the component; fails when it cannot be reached
    fn probe(&self) -> Result<(), ResolutionError> {
        if !self.accessible {
            return Err(ResolutionError::ComponentNotFound {
                component: self.name.clone(),
            });
        }
        Ok(())
    }
}

impl Component for MemoryComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn control(&self, name: &str) -> Result<ObservableRef, ResolutionError> {
        match self.members.get(name) {
            Some(Member::Control(cell)) => Ok(Box::new(MemoryControlRef {
                cell: Rc::clone(cell),
            })),
            // Properties exist but are not observable controls
            Some(Member::Property(_)) | None => Err(self.control_not_found(name)),
        }
    }
}

impl MemoryComponent {
    fn control_not_found(&self, control: &str) -> ResolutionError {
        ResolutionError::ControlNotFound {
            component: self.name.clone(),
            control: control.to_string(),
        }
    }
}

/// Object space backed by a hash map
#[derive(Debug, Default)]
pub struct MemorySpace {
    components: HashMap<String, MemoryComponent>,
}

impl MemorySpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component, or return the existing one with that name
    pub fn add_component(&mut self, name: &str) -> &mut MemoryComponent {
        self.components
            .entry(name.to_string())
            .or_insert_with(|| MemoryComponent::new(name))
    }

    pub fn component(&self, name: &str) -> Option<&MemoryComponent> {
        self.components.get(name)
    }

    /// Remove a component; existing references keep working but stop
    /// receiving host writes
    pub fn remove_component(&mut self, name: &str) -> bool {
        self.components.remove(name).is_some()
    }

    /// Mark a component reachable or not; returns false if it does not exist
    pub fn set_accessible(&mut self, name: &str, accessible: bool) -> bool {
        match self.components.get_mut(name) {
            Some(component) => {
                component.accessible = accessible;
                true
            }
            None => false,
        }
    }

    /// Write a control's value and notify its subscribers
    ///
    /// Every write notifies, even when the value is unchanged.
    pub fn set_value(
        &mut self,
        component: &str,
        control: &str,
        value: bool,
    ) -> Result<(), ResolutionError> {
        let cell = self.find_cell(component, control)?;
        let mut cell = cell.borrow_mut();
        cell.value = value;
        cell.notify_all();
        Ok(())
    }

    /// Notify subscribers without changing the value (a trigger firing)
    pub fn pulse(&mut self, component: &str, control: &str) -> Result<(), ResolutionError> {
        let cell = self.find_cell(component, control)?;
        cell.borrow().notify_all();
        Ok(())
    }

    /// Current value of a control
    pub fn value(&self, component: &str, control: &str) -> Option<bool> {
        self.find_cell(component, control)
            .ok()
            .map(|cell| cell.borrow().value)
    }

    /// Live subscriptions on a control
    pub fn subscriber_count(&self, component: &str, control: &str) -> usize {
        self.find_cell(component, control)
            .map(|cell| cell.borrow().subscribers.len())
            .unwrap_or(0)
    }

    /// Live subscriptions across the whole space
    pub fn total_subscribers(&self) -> usize {
        self.components
            .values()
            .flat_map(|component| component.members.values())
            .map(|member| match member {
                Member::Control(cell) => cell.borrow().subscribers.len(),
                Member::Property(_) => 0,
            })
            .sum()
    }

    fn find_cell(
        &self,
        component: &str,
        control: &str,
    ) -> Result<Rc<RefCell<ControlCell>>, ResolutionError> {
        let found = self.components.get(component).ok_or_else(|| {
            ResolutionError::ComponentNotFound {
                component: component.to_string(),
            }
        })?;
        found
            .cell(control)
            .cloned()
            .ok_or_else(|| found.control_not_found(control))
    }
}

impl ObjectSpace for MemorySpace {
    fn try_resolve(&self, component: &str) -> Result<&dyn Component, ResolutionError> {
        let found = self.components.get(component).ok_or_else(|| {
            ResolutionError::ComponentNotFound {
                component: component.to_string(),
            }
        })?;
        found.probe()?;
        Ok(found)
    }
}

struct MemoryControlRef {
    cell: Rc<RefCell<ControlCell>>,
}

impl Observable for MemoryControlRef {
    fn type_tag(&self) -> TypeTag {
        self.cell.borrow().type_tag.clone()
    }

    fn boolean(&self) -> bool {
        self.cell.borrow().value
    }

    fn subscribe(&self, sink: ChangeSink) -> Box<dyn Subscription> {
        let mut cell = self.cell.borrow_mut();
        let id = cell.next_subscriber;
        cell.next_subscriber += 1;
        cell.subscribers.push((id, sink));
        Box::new(MemorySubscription {
            cell: Rc::downgrade(&self.cell),
            id,
        })
    }
}

struct MemorySubscription {
    cell: Weak<RefCell<ControlCell>>,
    id: u64,
}

impl Subscription for MemorySubscription {
    fn unsubscribe(self: Box<Self>) {
        if let Some(cell) = self.cell.upgrade() {
            cell.borrow_mut().subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}
