//! Report generation
//!
//! Renders scenario samples as an aligned TXT table or as JSON.

use crate::runner::Sample;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use control_mirror::SlotSnapshot;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub scenario: String,
    pub generated: String,
    pub samples: Vec<Sample>,
}

impl Report {
    pub fn new(scenario: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            scenario: scenario.into(),
            generated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            samples,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_txt(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Control Mirror Report");
        let _ = writeln!(out, "Scenario:  {}", self.scenario);
        let _ = writeln!(out, "Generated: {}", self.generated);

        for sample in &self.samples {
            let _ = writeln!(out);
            let _ = writeln!(out, "[t={:>8.3}s] {}", sample.at, sample.label);

            let width = sample
                .slots
                .iter()
                .map(|slot| display_identifier(slot).chars().count())
                .max()
                .unwrap_or(0);

            for slot in &sample.slots {
                let _ = writeln!(out, "{}", slot_line(slot, width).trim_end());
            }
        }
        out
    }
}

fn display_identifier(slot: &SlotSnapshot) -> &str {
    if slot.identifier.is_empty() {
        "-"
    } else {
        &slot.identifier
    }
}

fn slot_line(slot: &SlotSnapshot, width: usize) -> String {
    let state = if slot.indeterminate {
        "INDETERMINATE"
    } else if slot.lit {
        "ON"
    } else {
        "off"
    };

    let detail = match (&slot.error, slot.classification) {
        (Some(error), _) => format!("error: {}", error),
        (None, Some(classification)) if slot.trigger_active => {
            format!("{} (active)", classification)
        }
        (None, Some(classification)) => classification.to_string(),
        (None, None) => String::new(),
    };

    format!(
        "  {:>3}  {:<width$}  {:<13}  {}",
        slot.index,
        display_identifier(slot),
        state,
        detail,
        width = width
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use control_mirror::Classification;

    fn snapshot(index: usize, identifier: &str) -> SlotSnapshot {
        SlotSnapshot {
            index,
            identifier: identifier.to_string(),
            component: None,
            control: None,
            classification: None,
            valid: false,
            lit: false,
            indeterminate: true,
            trigger_active: false,
            error: None,
        }
    }

    fn report() -> Report {
        let mut bound = snapshot(1, "Mixer.mute");
        bound.classification = Some(Classification::Continuous);
        bound.valid = true;
        bound.lit = true;
        bound.indeterminate = false;

        let mut broken = snapshot(2, "Nope.x");
        broken.error = Some("component not found: \"Nope\"".to_string());

        Report {
            scenario: "studio.toml".to_string(),
            generated: "2024-01-01T00:00:00Z".to_string(),
            samples: vec![Sample {
                at: 0.0,
                label: "start".to_string(),
                slots: vec![bound, broken, snapshot(3, "")],
            }],
        }
    }

    #[test]
    fn test_txt_report() {
        let txt = report().to_txt();
        let lines: Vec<&str> = txt.lines().collect();

        assert_eq!(lines[0], "Control Mirror Report");
        assert_eq!(lines[4], "[t=   0.000s] start");
        assert_eq!(lines[5], "    1  Mixer.mute  ON             continuous");
        assert_eq!(
            lines[6],
            "    2  Nope.x      INDETERMINATE  error: component not found: \"Nope\""
        );
        assert_eq!(lines[7], "    3  -           INDETERMINATE");
    }

    #[test]
    fn test_json_report() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["scenario"], "studio.toml");
        let slots = &value["samples"][0]["slots"];
        assert_eq!(slots[0]["classification"], "continuous");
        assert_eq!(slots[0]["lit"], true);
        assert_eq!(slots[1]["indeterminate"], true);
        assert!(slots[2]["error"].is_null());
    }
}
