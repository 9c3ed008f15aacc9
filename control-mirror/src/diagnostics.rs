//! Leveled diagnostic stream
//!
//! Errors always go out at `error`. Debugging messages (`debug`) and
//! function-call traces (`trace`) are gated by the operator's
//! [`DebugLevel`] on top of whatever the `log` backend filters.

use crate::config::DebugLevel;
use std::fmt;

#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    level: DebugLevel,
}

impl Diagnostics {
    pub fn new(level: DebugLevel) -> Self {
        Self { level }
    }

    pub fn set_level(&mut self, level: DebugLevel) {
        self.level = level;
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        log::error!("{}", args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        if self.level.shows_debugging() {
            log::debug!("{}", args);
        }
    }

    /// Trace entry into an engine operation
    pub fn trace_call(&self, function: &str) {
        if self.level.shows_function_calls() {
            log::trace!("{}()", function);
        }
    }
}
