//! Step pointer for a wizard session.
//!
//! The controller only knows about integers: it has no notion of sections,
//! saving or validation. Guarded advancement lives in [`crate::wizard::save`].

use tracing::debug;

/// Current step (1-based) and the fixed step count of a wizard session.
///
/// `1 <= current_step <= total_steps` holds after every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepsController {
    current: usize,
    total: usize,
}

impl StepsController {
    /// Start at step 1. A zero step count is treated as a single step.
    pub fn new(total_steps: usize) -> Self {
        Self {
            current: 1,
            total: total_steps.max(1),
        }
    }

    /// Start at `start`, clamped into `1..=total_steps`
    pub fn starting_at(total_steps: usize, start: usize) -> Self {
        let mut controller = Self::new(total_steps);
        controller.current = start.clamp(1, controller.total);
        controller
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn total_steps(&self) -> usize {
        self.total
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total
    }

    /// Move forward one step. No-op at the last step; returns whether it moved.
    pub fn next_step(&mut self) -> bool {
        if self.current >= self.total {
            return false;
        }
        self.current += 1;
        debug!(step = self.current, "advanced to step");
        true
    }

    /// Move back one step. No-op at the first step; returns whether it moved.
    pub fn prev_step(&mut self) -> bool {
        if self.current <= 1 {
            return false;
        }
        self.current -= 1;
        debug!(step = self.current, "went back to step");
        true
    }

    /// Jump directly to `step` without any validation gate.
    ///
    /// Steps outside `1..=total_steps` are ignored so the bounds invariant holds.
    pub fn go_to_step(&mut self, step: usize) -> bool {
        if step == 0 || step > self.total || step == self.current {
            return false;
        }
        self.current = step;
        debug!(step, "jumped to step");
        true
    }
}
