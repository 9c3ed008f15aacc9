//! Core types for the control mirror engine
//!
//! This module defines the vocabulary shared by the parser, resolver, binding
//! table and engine: slot indices, control type tags, classifications,
//! indicator states and the error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 1-based slot position (1..=N)
pub type SlotIndex = usize;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Type reported by a resolved control
///
/// Names match the host's control type strings exactly (case-sensitive).
/// Anything the engine does not know about is carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    Button,
    Knob,
    Indicator,
    Text,
    Trigger,
    Enum,
    Array,
    Other(String),
}

impl TypeTag {
    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::Button => "Button",
            TypeTag::Knob => "Knob",
            TypeTag::Indicator => "Indicator",
            TypeTag::Text => "Text",
            TypeTag::Trigger => "Trigger",
            TypeTag::Enum => "Enum",
            TypeTag::Array => "Array",
            TypeTag::Other(name) => name,
        }
    }
}

impl FromStr for TypeTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "Button" => TypeTag::Button,
            "Knob" => TypeTag::Knob,
            "Indicator" => TypeTag::Indicator,
            "Text" => TypeTag::Text,
            "Trigger" => TypeTag::Trigger,
            "Enum" => TypeTag::Enum,
            "Array" => TypeTag::Array,
            other => TypeTag::Other(other.to_string()),
        })
    }
}

impl From<String> for TypeTag {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(tag) => tag,
            Err(never) => match never {},
        }
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How change notifications from a control are mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Momentary events: light for the feedback period, non-retriggering
    Trigger,
    /// Durable state: the control's boolean is mirrored directly
    Continuous,
}

impl Classification {
    /// Control types whose notifications are momentary events
    pub const TRIGGER_TYPES: [TypeTag; 4] =
        [TypeTag::Trigger, TypeTag::Text, TypeTag::Enum, TypeTag::Array];

    /// Classify a control by its type tag
    pub fn of(tag: &TypeTag) -> Self {
        if Self::TRIGGER_TYPES.contains(tag) {
            Classification::Trigger
        } else {
            Classification::Continuous
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Trigger => write!(f, "trigger"),
            Classification::Continuous => write!(f, "continuous"),
        }
    }
}

/// What a slot's indicator shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndicatorState {
    /// Boolean output
    pub lit: bool,
    /// Indeterminate flag (identifier did not resolve to a usable control)
    pub indeterminate: bool,
}

impl IndicatorState {
    pub const INDETERMINATE: IndicatorState = IndicatorState {
        lit: false,
        indeterminate: true,
    };

    pub fn valid(lit: bool) -> Self {
        Self {
            lit,
            indeterminate: false,
        }
    }
}

impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.indeterminate {
            write!(f, "INDETERMINATE")
        } else if self.lit {
            write!(f, "ON")
        } else {
            write!(f, "off")
        }
    }
}

/// Identifier could not be split into component and control
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("identifier {identifier:?} has no '{separator}' separator after a component name")]
    NoSeparator { identifier: String, separator: char },
}

/// Identifier parsed but did not name a reachable control
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("component not found: {component:?}")]
    ComponentNotFound { component: String },

    #[error("control not found: {control:?} in component {component:?}")]
    ControlNotFound { component: String, control: String },
}

/// Why a single slot failed to bind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Errors returned by the engine API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MirrorError {
    #[error("slot {slot} is out of range (1..={count})")]
    SlotOutOfRange { slot: SlotIndex, count: usize },

    #[error(transparent)]
    Bind(#[from] BindError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_by_type() {
        assert_eq!(Classification::of(&TypeTag::Trigger), Classification::Trigger);
        assert_eq!(Classification::of(&TypeTag::Text), Classification::Trigger);
        assert_eq!(Classification::of(&TypeTag::Enum), Classification::Trigger);
        assert_eq!(Classification::of(&TypeTag::Array), Classification::Trigger);

        assert_eq!(Classification::of(&TypeTag::Button), Classification::Continuous);
        assert_eq!(Classification::of(&TypeTag::Knob), Classification::Continuous);
        assert_eq!(
            Classification::of(&TypeTag::Other("Meter".to_string())),
            Classification::Continuous
        );
    }

    #[test]
    fn test_type_tag_is_case_sensitive() {
        assert_eq!("Trigger".parse::<TypeTag>().unwrap(), TypeTag::Trigger);
        assert_eq!(
            "trigger".parse::<TypeTag>().unwrap(),
            TypeTag::Other("trigger".to_string())
        );
        // A lowercase "trigger" is not a trigger type
        assert_eq!(
            Classification::of(&"trigger".parse::<TypeTag>().unwrap()),
            Classification::Continuous
        );
    }

    #[test]
    fn test_indicator_state_display() {
        assert_eq!(format!("{}", IndicatorState::INDETERMINATE), "INDETERMINATE");
        assert_eq!(format!("{}", IndicatorState::valid(true)), "ON");
        assert_eq!(format!("{}", IndicatorState::valid(false)), "off");
    }

    #[test]
    fn test_error_messages() {
        let err = BindError::from(ResolutionError::ControlNotFound {
            component: "Mixer".to_string(),
            control: "mute".to_string(),
        });
        assert_eq!(err.to_string(), "control not found: \"mute\" in component \"Mixer\"");
    }
}
