//! Reference resolution against the host's object space
//!
//! The host decides what "exists" means. An object that is present but not
//! reachable must come back as `ComponentNotFound` from
//! [`ObjectSpace::try_resolve`]; callers never probe objects themselves.

use crate::events::ChangeSink;
use crate::identifier::ParsedIdentifier;
use crate::types::{ResolutionError, TypeTag};

/// Resolved reference to an external control
pub type ObservableRef = Box<dyn Observable>;

/// Name lookup over the host's runtime objects
pub trait ObjectSpace {
    /// Look up an accessible component by exact name
    fn try_resolve(&self, component: &str) -> Result<&dyn Component, ResolutionError>;
}

/// A named runtime object holding controls
pub trait Component {
    fn name(&self) -> &str;

    /// Look up a member that is typed as a control
    fn control(&self, name: &str) -> Result<ObservableRef, ResolutionError>;
}

/// Read-only view of a control
pub trait Observable {
    /// Reported control type, used for classification
    fn type_tag(&self) -> TypeTag;

    /// Current boolean value
    fn boolean(&self) -> bool;

    /// Start delivering change notifications to `sink`
    fn subscribe(&self, sink: ChangeSink) -> Box<dyn Subscription>;
}

/// Live change subscription; disposing it stops notifications
pub trait Subscription {
    fn unsubscribe(self: Box<Self>);
}

/// Resolve a parsed identifier to a control reference
pub fn resolve(
    space: &dyn ObjectSpace,
    identifier: &ParsedIdentifier,
) -> Result<ObservableRef, ResolutionError> {
    let component = space.try_resolve(&identifier.component)?;
    component.control(&identifier.control)
}
