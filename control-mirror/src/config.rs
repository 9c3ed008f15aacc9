//! Engine configuration types
//!
//! The host owns these values (they are its exposed properties); the engine
//! clamps anything out of range instead of rejecting it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Smallest configurable slot count
pub const MIN_SLOTS: usize = 1;

/// Largest configurable slot count
pub const MAX_SLOTS: usize = 100;

/// Longest trigger feedback period in seconds
pub const MAX_TRIGGER_FEEDBACK_SECONDS: f64 = 300.0;

/// Diagnostic verbosity selected by the operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugLevel {
    /// Errors only
    #[default]
    None,
    /// Errors and debugging messages
    Debugging,
    /// Errors and function-call traces
    FunctionCalls,
    /// Everything
    All,
}

impl DebugLevel {
    /// Whether debugging messages are emitted
    pub fn shows_debugging(self) -> bool {
        matches!(self, DebugLevel::Debugging | DebugLevel::All)
    }

    /// Whether function-call traces are emitted
    pub fn shows_function_calls(self) -> bool {
        matches!(self, DebugLevel::FunctionCalls | DebugLevel::All)
    }
}

/// Configuration for the mirror engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of slots (1-100)
    #[serde(default = "default_count")]
    pub count: usize,

    /// How long a trigger-classified slot stays lit, in seconds (0-300)
    #[serde(default = "default_trigger_feedback")]
    pub trigger_feedback_seconds: f64,

    /// Diagnostic verbosity
    #[serde(default)]
    pub debug_level: DebugLevel,

    /// Character separating component and control names
    #[serde(default = "default_separator")]
    pub separator: char,
}

fn default_count() -> usize {
    8
}

fn default_trigger_feedback() -> f64 {
    0.5
}

fn default_separator() -> char {
    '.'
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            trigger_feedback_seconds: default_trigger_feedback(),
            debug_level: DebugLevel::default(),
            separator: default_separator(),
        }
    }
}

impl EngineConfig {
    /// Create a new engine configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the slot count
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Builder method: set the trigger feedback period in seconds
    pub fn with_trigger_feedback(mut self, seconds: f64) -> Self {
        self.trigger_feedback_seconds = seconds;
        self
    }

    /// Builder method: set the diagnostic level
    pub fn with_debug_level(mut self, level: DebugLevel) -> Self {
        self.debug_level = level;
        self
    }

    /// Builder method: set the identifier separator
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Return a copy with every value forced into its legal range
    pub fn sanitized(mut self) -> Self {
        self.count = clamp_count(self.count);
        self.trigger_feedback_seconds = clamp_trigger_feedback(self.trigger_feedback_seconds);
        self
    }

    /// Trigger feedback period as a duration
    pub fn trigger_feedback(&self) -> Duration {
        Duration::from_secs_f64(clamp_trigger_feedback(self.trigger_feedback_seconds))
    }
}

/// Clamp a slot count into 1..=100
pub fn clamp_count(count: usize) -> usize {
    let clamped = count.clamp(MIN_SLOTS, MAX_SLOTS);
    if clamped != count {
        log::warn!("Slot count {} out of range, using {}", count, clamped);
    }
    clamped
}

/// Clamp a feedback period into 0..=300 seconds
pub fn clamp_trigger_feedback(seconds: f64) -> f64 {
    if !seconds.is_finite() {
        log::warn!("Trigger feedback {} is not a number, using default", seconds);
        return default_trigger_feedback();
    }
    let clamped = seconds.clamp(0.0, MAX_TRIGGER_FEEDBACK_SECONDS);
    if clamped != seconds {
        log::warn!("Trigger feedback {}s out of range, using {}s", seconds, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::new()
            .with_count(5)
            .with_trigger_feedback(1.5)
            .with_debug_level(DebugLevel::All)
            .with_separator(':');

        assert_eq!(config.count, 5);
        assert_eq!(config.trigger_feedback(), Duration::from_millis(1500));
        assert_eq!(config.debug_level, DebugLevel::All);
        assert_eq!(config.separator, ':');
    }

    #[test]
    fn test_sanitize_clamps_ranges() {
        let config = EngineConfig::new()
            .with_count(0)
            .with_trigger_feedback(-2.0)
            .sanitized();
        assert_eq!(config.count, 1);
        assert_eq!(config.trigger_feedback_seconds, 0.0);

        let config = EngineConfig::new()
            .with_count(250)
            .with_trigger_feedback(1000.0)
            .sanitized();
        assert_eq!(config.count, MAX_SLOTS);
        assert_eq!(config.trigger_feedback_seconds, MAX_TRIGGER_FEEDBACK_SECONDS);

        let config = EngineConfig::new().with_trigger_feedback(f64::NAN).sanitized();
        assert_eq!(config.trigger_feedback_seconds, 0.5);
    }

    #[test]
    fn test_debug_level_gating() {
        assert!(!DebugLevel::None.shows_debugging());
        assert!(!DebugLevel::None.shows_function_calls());
        assert!(DebugLevel::Debugging.shows_debugging());
        assert!(!DebugLevel::Debugging.shows_function_calls());
        assert!(!DebugLevel::FunctionCalls.shows_debugging());
        assert!(DebugLevel::FunctionCalls.shows_function_calls());
        assert!(DebugLevel::All.shows_debugging());
        assert!(DebugLevel::All.shows_function_calls());
    }
}
