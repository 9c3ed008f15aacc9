//! Scenario execution on a virtual clock
//!
//! Each script step first advances the clock to its time (delivering every
//! timer that expires on the way), then applies its action. Engine events
//! raised by a step are handled before the next step runs.

use crate::config::{Scenario, ScriptAction, ScriptStep};
use anyhow::{bail, Context, Result};
use control_mirror::host::{ManualScheduler, MemorySpace, PanelRecorder};
use control_mirror::{
    parse_identifier, EngineEvent, MirrorEngine, ParsedIdentifier, SlotSnapshot,
};
use serde::Serialize;
use std::time::Duration;

pub type SimEngine = MirrorEngine<MemorySpace, ManualScheduler, PanelRecorder>;

/// Indicator states captured at one point in the script
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    /// Seconds since start
    pub at: f64,
    pub label: String,
    pub slots: Vec<SlotSnapshot>,
}

pub struct ScenarioRunner {
    engine: SimEngine,
    separator: char,
    samples: Vec<Sample>,
}

impl ScenarioRunner {
    /// Build the simulated host, store slot identifiers and start the engine
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let mut engine = MirrorEngine::new(
            scenario.engine.clone(),
            scenario.build_space(),
            ManualScheduler::new(),
            PanelRecorder::new(),
        );

        for slot in &scenario.slots {
            engine
                .set_identifier(slot.index, slot.identifier.clone())
                .with_context(|| format!("Invalid slot configuration for slot {}", slot.index))?;
        }

        engine.start();
        log::info!(
            "Engine started: {} slots, {} bound",
            engine.slot_count(),
            engine.table().subscription_count()
        );

        let mut runner = Self {
            engine,
            separator: scenario.engine.separator,
            samples: Vec::new(),
        };
        runner.sample(0.0, "start".to_string());
        Ok(runner)
    }

    pub fn engine(&self) -> &SimEngine {
        &self.engine
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Run every step in order, then take a closing sample
    pub fn run(&mut self, steps: &[ScriptStep]) -> Result<()> {
        let mut now = 0.0;
        for (i, step) in steps.iter().enumerate() {
            self.advance_to(step.at)
                .with_context(|| format!("Script step {} cannot be scheduled", i + 1))?;
            now = step.at;
            self.apply(step)
                .with_context(|| format!("Script step {} (t={}s) failed", i + 1, step.at))?;
        }
        self.sample(now, "end".to_string());
        Ok(())
    }

    /// Move the virtual clock and handle expired timers
    pub fn advance_to(&mut self, seconds: f64) -> Result<()> {
        let target = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("Invalid time {}s", seconds))?;
        let expired = self.engine.scheduler_mut().advance_to(target);
        for token in expired {
            self.engine.handle_event(EngineEvent::TimerExpired(token));
        }
        self.engine.process_pending();
        Ok(())
    }

    fn apply(&mut self, step: &ScriptStep) -> Result<()> {
        log::debug!("t={}s: {:?}", step.at, step.action);
        let sender = self.engine.event_sender();

        match &step.action {
            ScriptAction::Set { target, value } => {
                let target = self.target(target)?;
                self.engine
                    .space_mut()
                    .set_value(&target.component, &target.control, *value)?;
            }
            ScriptAction::Pulse { target } => {
                let target = self.target(target)?;
                self.engine
                    .space_mut()
                    .pulse(&target.component, &target.control)?;
            }
            ScriptAction::Accessible { component, value } => {
                if !self.engine.space_mut().set_accessible(component, *value) {
                    bail!("Unknown component {:?}", component);
                }
            }
            ScriptAction::Create {
                target,
                type_tag,
                value,
            } => {
                let target = self.target(target)?;
                self.engine
                    .space_mut()
                    .add_component(&target.component)
                    .with_control(&target.control, type_tag.clone(), *value);
            }
            ScriptAction::Identifier { slot, value } => {
                sender.post(EngineEvent::IdentifierChanged {
                    slot: *slot,
                    identifier: value.clone(),
                });
            }
            ScriptAction::Count { value } => {
                sender.post(EngineEvent::CountChanged(*value));
            }
            ScriptAction::Feedback { seconds } => {
                sender.post(EngineEvent::TriggerFeedbackChanged(*seconds));
            }
            ScriptAction::Debug { level } => {
                sender.post(EngineEvent::DebugLevelChanged(*level));
            }
            ScriptAction::Sample { label } => {
                let label = label
                    .clone()
                    .unwrap_or_else(|| format!("t={:.3}s", step.at));
                self.sample(step.at, label);
            }
        }

        let handled = self.engine.process_pending();
        log::trace!("Handled {} engine events", handled);
        Ok(())
    }

    fn target(&self, target: &str) -> Result<ParsedIdentifier> {
        parse_identifier(target, self.separator)
            .with_context(|| format!("Invalid script target {:?}", target))
    }

    fn sample(&mut self, at: f64, label: String) {
        self.samples.push(Sample {
            at,
            label,
            slots: self.engine.snapshot(),
        });
    }
}

/// Run a whole scenario and return its samples
pub fn run_scenario(scenario: &Scenario) -> Result<Vec<Sample>> {
    let mut runner = ScenarioRunner::new(scenario)?;
    runner.run(&scenario.ordered_script())?;
    log::info!(
        "Scenario finished: {} samples, binding generation {}",
        runner.samples().len(),
        runner.engine().generation()
    );
    Ok(runner.into_samples())
}
