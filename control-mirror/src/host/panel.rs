//! Recording indicator panel

use super::IndicatorPanel;
use crate::types::{IndicatorState, SlotIndex};

/// Indicator panel that keeps the current outputs and every update
#[derive(Debug, Default)]
pub struct PanelRecorder {
    states: Vec<IndicatorState>,
    history: Vec<(SlotIndex, IndicatorState)>,
}

impl PanelRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visible indicators
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Current output of a slot (1-based)
    pub fn state(&self, slot: SlotIndex) -> Option<IndicatorState> {
        slot.checked_sub(1).and_then(|i| self.states.get(i)).copied()
    }

    /// Every update in arrival order
    pub fn history(&self) -> &[(SlotIndex, IndicatorState)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl IndicatorPanel for PanelRecorder {
    fn resize(&mut self, count: usize) {
        self.states.resize(count, IndicatorState::INDETERMINATE);
    }

    fn show(&mut self, slot: SlotIndex, state: IndicatorState) {
        let Some(i) = slot.checked_sub(1) else {
            return;
        };
        if i >= self.states.len() {
            self.states.resize(i + 1, IndicatorState::INDETERMINATE);
        }
        self.states[i] = state;
        self.history.push((slot, state));
    }
}
