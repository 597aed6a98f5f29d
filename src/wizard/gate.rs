//! Render guard for a single step and its back/advance controls

use super::controller::StepsController;

/// A render guard bound to one step number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepGate {
    step: usize,
}

/// Transition controls shown under every step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Back,
    Advance,
}

/// What pressing a control resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The controller moved back one step
    MovedBack,
    /// The caller must run its own `on_next_step`; the gate never advances
    AdvanceRequested,
    /// The control was disabled or the gate is not the active step
    Ignored,
}

/// Enabled state of the controls, for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlsState {
    pub back_enabled: bool,
    pub advance_enabled: bool,
    pub is_last: bool,
}

impl StepGate {
    pub fn new(step: usize) -> Self {
        Self { step }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_active(&self, controller: &StepsController) -> bool {
        controller.current_step() == self.step
    }

    /// Produce the subtree only when this gate's step is current.
    ///
    /// Inactive steps produce nothing at all, so any transient state built
    /// inside `child` is dropped on navigation.
    pub fn render<T>(&self, controller: &StepsController, child: impl FnOnce() -> T) -> Option<T> {
        if self.is_active(controller) {
            Some(child())
        } else {
            None
        }
    }

    pub fn controls(&self, controller: &StepsController, is_saving: bool) -> ControlsState {
        ControlsState {
            back_enabled: !controller.is_first(),
            advance_enabled: !is_saving,
            is_last: controller.is_last(),
        }
    }

    /// Handle a control press.
    ///
    /// Back goes straight to the controller; Advance is handed back to the
    /// caller, whose save routine decides whether the controller moves.
    pub fn press(
        &self,
        controller: &mut StepsController,
        control: Control,
        is_saving: bool,
    ) -> ControlOutcome {
        if !self.is_active(controller) {
            return ControlOutcome::Ignored;
        }
        let state = self.controls(controller, is_saving);
        match control {
            Control::Back if state.back_enabled => {
                controller.prev_step();
                ControlOutcome::MovedBack
            }
            Control::Advance if state.advance_enabled => ControlOutcome::AdvanceRequested,
            _ => ControlOutcome::Ignored,
        }
    }
}
