//! Scenario loading and parsing

use anyhow::{bail, Context, Result};
use control_mirror::host::MemorySpace;
use control_mirror::{DebugLevel, EngineConfig, TypeTag};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// A simulated host: engine settings, objects, slot inputs and a script
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Scenario {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
    #[serde(default)]
    pub slots: Vec<SlotConfig>,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComponentConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub accessible: bool,
    #[serde(default)]
    pub controls: Vec<ControlConfig>,
    /// Members that exist but are not controls
    #[serde(default)]
    pub properties: Vec<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    #[serde(default)]
    pub value: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlotConfig {
    pub index: usize,
    #[serde(default)]
    pub identifier: String,
}

/// One timed host event
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScriptStep {
    /// Seconds since start
    pub at: f64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    /// Write a control value (notifies subscribers)
    Set { target: String, value: bool },
    /// Fire a control without changing its value
    Pulse { target: String },
    /// Make a component reachable or not
    Accessible { component: String, value: bool },
    /// Add a control, creating its component if needed
    Create {
        target: String,
        #[serde(rename = "type")]
        type_tag: TypeTag,
        #[serde(default)]
        value: bool,
    },
    /// Edit a slot's identifier text
    Identifier { slot: usize, value: String },
    /// Change the slot count
    Count { value: usize },
    /// Change the trigger feedback period
    Feedback { seconds: f64 },
    /// Change the diagnostic level
    Debug { level: DebugLevel },
    /// Record the indicator states
    Sample {
        #[serde(default)]
        label: Option<String>,
    },
}

impl Scenario {
    /// Build the in-memory object space described by `components`
    pub fn build_space(&self) -> MemorySpace {
        let mut space = MemorySpace::new();
        for component in &self.components {
            let entry = space.add_component(&component.name);
            for control in &component.controls {
                entry.with_control(&control.name, control.type_tag.clone(), control.value);
            }
            for property in &component.properties {
                entry.with_property(property, "");
            }
            if !component.accessible {
                space.set_accessible(&component.name, false);
            }
        }
        space
    }

    /// Check what the engine cannot clamp on its own
    pub fn validate(&self) -> Result<()> {
        for step in &self.script {
            if !step.at.is_finite() || step.at < 0.0 {
                bail!("Script step time must be a non-negative number of seconds, got {}", step.at);
            }
            Duration::try_from_secs_f64(step.at)
                .with_context(|| format!("Script step time {}s is too large", step.at))?;
        }
        for slot in &self.slots {
            if slot.index == 0 {
                bail!("Slot indices start at 1");
            }
        }
        Ok(())
    }

    /// Script steps ordered by time; steps at the same time keep file order
    pub fn ordered_script(&self) -> Vec<ScriptStep> {
        let mut steps = self.script.clone();
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        steps
    }
}

/// Load a scenario from a TOML file
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {:?}", path))?;

    let scenario: Scenario = toml::from_str(&content)
        .with_context(|| format!("Failed to parse scenario file: {:?}", path))?;

    scenario
        .validate()
        .with_context(|| format!("Invalid scenario file: {:?}", path))?;

    Ok(scenario)
}
