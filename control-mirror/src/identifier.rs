//! Identifier parsing
//!
//! Splits a raw `"component.control"` string on the first separator. No
//! trimming or case folding is applied.

use crate::types::ParseError;
use serde::Serialize;

/// A split identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedIdentifier {
    /// Name looked up in the object space
    pub component: String,
    /// Member name looked up within the component
    pub control: String,
}

/// Split `identifier` on the first `separator`
///
/// The separator must appear after at least one character. Everything after
/// it, further separators included, is the control name.
///
/// # Example
/// ```
/// use control_mirror::parse_identifier;
///
/// let parsed = parse_identifier("Mixer.ch1.mute", '.').unwrap();
/// assert_eq!(parsed.component, "Mixer");
/// assert_eq!(parsed.control, "ch1.mute");
/// ```
pub fn parse_identifier(identifier: &str, separator: char) -> Result<ParsedIdentifier, ParseError> {
    match identifier.split_once(separator) {
        Some((component, control)) if !component.is_empty() => Ok(ParsedIdentifier {
            component: component.to_string(),
            control: control.to_string(),
        }),
        _ => Err(ParseError::NoSeparator {
            identifier: identifier.to_string(),
            separator,
        }),
    }
}
