//! Weekly activity allocation for the programming step

use thiserror::Error;
use tracing::debug;

use crate::sections::{ActivityAllocation, ActivityHours, WeeklyProgramme};

/// Monotonic activity ids, owned by one editing session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityIdGenerator {
    next: u64,
}

impl Default for ActivityIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Generator whose first id is greater than `max_existing`
    pub fn seeded_after(max_existing: u64) -> Self {
        Self {
            next: max_existing.saturating_add(1),
        }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("la semana {0} no forma parte de la programación")]
    UnknownWeek(u32),

    #[error("la actividad {id} no existe en la semana {week}")]
    UnknownActivity { week: u32, id: u64 },

    #[error("la semana {week} ya usa sus {available} horas disponibles")]
    WeekFull { week: u32, available: u8 },

    #[error("La semana {week} solo tiene {available} horas disponibles; con este cambio sumaría {total}.")]
    LimitExceeded { week: u32, available: u8, total: u32 },
}

/// Edits one programme while keeping every week within its hour budget.
///
/// Rejected mutations leave the programme untouched.
pub struct WeeklyAllocator<'a> {
    programme: &'a mut WeeklyProgramme,
    ids: &'a mut ActivityIdGenerator,
    on_limit_exceeded: Option<Box<dyn FnMut(&str) + 'a>>,
}

impl<'a> WeeklyAllocator<'a> {
    pub fn new(programme: &'a mut WeeklyProgramme, ids: &'a mut ActivityIdGenerator) -> Self {
        Self {
            programme,
            ids,
            on_limit_exceeded: None,
        }
    }

    /// Observer called with a descriptive message when an hour change is rejected
    pub fn on_limit_exceeded(mut self, observer: impl FnMut(&str) + 'a) -> Self {
        self.on_limit_exceeded = Some(Box::new(observer));
        self
    }

    /// Current hours of an activity
    pub fn hours(&self, week: u32, activity_id: u64) -> Option<ActivityHours> {
        self.programme
            .week(week)?
            .activities
            .iter()
            .find(|a| a.id == activity_id)
            .map(|a| a.hours)
    }

    /// Whether one more 1-hour activity fits in `week`
    pub fn can_add(&self, week: u32) -> bool {
        self.programme
            .week(week)
            .map(|w| w.allocated_hours() + u32::from(ActivityHours::One.value()) <= u32::from(w.hours_available))
            .unwrap_or(false)
    }

    /// Append a 1-hour activity to `week` and return its id.
    ///
    /// Refused without notifying the observer when the week is already full;
    /// the UI shows the add affordance as disabled instead.
    pub fn add_activity(&mut self, week: u32, name: &str) -> Result<u64, AllocationError> {
        if !self.can_add(week) {
            let plan = self
                .programme
                .week(week)
                .ok_or(AllocationError::UnknownWeek(week))?;
            return Err(AllocationError::WeekFull {
                week,
                available: plan.hours_available,
            });
        }

        let id = self.ids.next_id();
        let name = if name.trim().is_empty() {
            format!("Actividad {}", id)
        } else {
            name.trim().to_string()
        };
        let plan = self
            .programme
            .week_mut(week)
            .ok_or(AllocationError::UnknownWeek(week))?;
        plan.activities.push(ActivityAllocation {
            id,
            name,
            hours: ActivityHours::One,
        });
        debug!(week, id, "activity added");
        Ok(id)
    }

    /// Set an activity's hours, refusing totals above the week's budget
    pub fn change_hours(
        &mut self,
        week: u32,
        activity_id: u64,
        hours: ActivityHours,
    ) -> Result<(), AllocationError> {
        let plan = self
            .programme
            .week(week)
            .ok_or(AllocationError::UnknownWeek(week))?;
        let current = plan
            .activities
            .iter()
            .find(|a| a.id == activity_id)
            .ok_or(AllocationError::UnknownActivity {
                week,
                id: activity_id,
            })?;

        let total = plan.allocated_hours() - u32::from(current.hours.value())
            + u32::from(hours.value());
        if total > u32::from(plan.hours_available) {
            let err = AllocationError::LimitExceeded {
                week,
                available: plan.hours_available,
                total,
            };
            if let Some(observer) = self.on_limit_exceeded.as_mut() {
                observer(&err.to_string());
            }
            debug!(week, activity_id, total, "hour change rejected");
            return Err(err);
        }

        if let Some(activity) = self
            .programme
            .week_mut(week)
            .and_then(|w| w.activities.iter_mut().find(|a| a.id == activity_id))
        {
            activity.hours = hours;
        }
        Ok(())
    }

    /// Remove an activity; returns it if it existed
    pub fn remove_activity(&mut self, week: u32, activity_id: u64) -> Option<ActivityAllocation> {
        let plan = self.programme.week_mut(week)?;
        let index = plan.activities.iter().position(|a| a.id == activity_id)?;
        debug!(week, activity_id, "activity removed");
        Some(plan.activities.remove(index))
    }
}
