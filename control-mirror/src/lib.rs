//! Control Mirror Library
//!
//! Mirrors the state of arbitrary external controls, named by
//! `"component.control"` identifiers, onto local indicator slots.
//!
//! # Architecture
//!
//! - Identifiers are split into component and control names
//! - Names are resolved against a host-provided [`ObjectSpace`]
//! - Resolved controls are classified as trigger (momentary) or continuous
//! - The engine subscribes to each control and keeps a per-slot lit state,
//!   holding trigger slots lit for a fixed, non-retriggering period
//! - Slots whose identifier does not resolve are shown indeterminate
//!
//! The library does NOT:
//! - Write to the monitored controls
//! - Persist anything across restarts
//! - Load configuration files or set up logging (see control-mirror-cli)
//!
//! # Example Usage
//!
//! ```
//! use control_mirror::host::{ManualScheduler, MemorySpace, PanelRecorder};
//! use control_mirror::{EngineConfig, EngineEvent, MirrorEngine, TypeTag};
//! use std::time::Duration;
//!
//! let mut space = MemorySpace::new();
//! space.add_component("Snapshots").with_control("load", TypeTag::Trigger, false);
//!
//! let config = EngineConfig::new().with_count(1).with_trigger_feedback(1.5);
//! let mut engine = MirrorEngine::new(config, space, ManualScheduler::new(), PanelRecorder::new());
//! engine.set_identifier(1, "Snapshots.load").unwrap();
//! engine.start();
//!
//! engine.space_mut().pulse("Snapshots", "load").unwrap();
//! engine.process_pending();
//! assert!(engine.slot(1).unwrap().is_lit());
//!
//! for token in engine.scheduler_mut().advance_by(Duration::from_millis(1500)) {
//!     engine.handle_event(EngineEvent::TimerExpired(token));
//! }
//! assert!(!engine.slot(1).unwrap().is_lit());
//! ```

// Public modules
pub mod binding;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod events;
pub mod host;
pub mod identifier;
pub mod resolver;
pub mod types;

// Re-export main types for convenience
pub use binding::{BindingTable, Slot, SlotSnapshot};
pub use config::{DebugLevel, EngineConfig, MAX_SLOTS, MIN_SLOTS};
pub use engine::MirrorEngine;
pub use events::{ChangeSink, EngineEvent, EventSender, TimerToken};
pub use identifier::{parse_identifier, ParsedIdentifier};
pub use resolver::{resolve, Component, ObjectSpace, Observable, ObservableRef, Subscription};
pub use types::{
    BindError, Classification, IndicatorState, MirrorError, ParseError, ResolutionError,
    Result, SlotIndex, TypeTag,
};

// Internal modules (not exposed in public API)
mod diagnostics;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
