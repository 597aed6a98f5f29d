//! Step 8: weekly programming of learning activities

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{FieldFocus, ValidationError};

/// Hours a single activity may take in one week
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ActivityHours {
    #[default]
    One,
    Two,
    Three,
}

impl ActivityHours {
    pub fn value(self) -> u8 {
        match self {
            ActivityHours::One => 1,
            ActivityHours::Two => 2,
            ActivityHours::Three => 3,
        }
    }

    /// One hour more, saturating at three
    pub fn increased(self) -> Self {
        match self {
            ActivityHours::One => ActivityHours::Two,
            ActivityHours::Two | ActivityHours::Three => ActivityHours::Three,
        }
    }

    /// One hour less, saturating at one
    pub fn decreased(self) -> Self {
        match self {
            ActivityHours::Three => ActivityHours::Two,
            ActivityHours::Two | ActivityHours::One => ActivityHours::One,
        }
    }
}

impl TryFrom<u8> for ActivityHours {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ActivityHours::One),
            2 => Ok(ActivityHours::Two),
            3 => Ok(ActivityHours::Three),
            other => Err(format!("activity hours must be 1, 2 or 3 (got {})", other)),
        }
    }
}

impl From<ActivityHours> for u8 {
    fn from(hours: ActivityHours) -> Self {
        hours.value()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityAllocation {
    pub id: u64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "horas")]
    pub hours: ActivityHours,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPlan {
    #[serde(rename = "semana")]
    pub week: u32,
    #[serde(rename = "horas_disponibles")]
    pub hours_available: u8,
    /// Insertion order is display order
    #[serde(rename = "actividades", default)]
    pub activities: Vec<ActivityAllocation>,
}

impl WeekPlan {
    pub fn allocated_hours(&self) -> u32 {
        self.activities.iter().map(|a| u32::from(a.hours.value())).sum()
    }

    pub fn remaining_hours(&self) -> u32 {
        u32::from(self.hours_available).saturating_sub(self.allocated_hours())
    }

    pub fn is_balanced(&self) -> bool {
        self.allocated_hours() == u32::from(self.hours_available)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyProgramme {
    #[serde(rename = "semanas", default)]
    pub weeks: Vec<WeekPlan>,
}

impl WeeklyProgramme {
    /// Empty plan for the given weeks, each with the same hour budget
    pub fn scaffold(weeks: impl IntoIterator<Item = u32>, hours_available: u8) -> Self {
        Self {
            weeks: weeks
                .into_iter()
                .map(|week| WeekPlan {
                    week,
                    hours_available,
                    activities: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn week(&self, week: u32) -> Option<&WeekPlan> {
        self.weeks.iter().find(|w| w.week == week)
    }

    pub fn week_mut(&mut self, week: u32) -> Option<&mut WeekPlan> {
        self.weeks.iter_mut().find(|w| w.week == week)
    }

    pub fn hours_available(&self, week: u32) -> Option<u8> {
        self.week(week).map(|w| w.hours_available)
    }

    /// Highest activity id present, used to seed the id generator
    pub fn max_activity_id(&self) -> u64 {
        self.weeks
            .iter()
            .flat_map(|w| w.activities.iter())
            .map(|a| a.id)
            .max()
            .unwrap_or(0)
    }

    /// Align the plan with the weeks the units cover.
    ///
    /// Weeks outside `weeks` are dropped and missing ones are added empty, in
    /// week order. With `hours_available`, every week takes that budget;
    /// without it, added weeks borrow the largest existing budget. Returns
    /// whether the plan changed.
    pub fn reconcile(&mut self, weeks: &BTreeSet<u32>, hours_available: Option<u8>) -> bool {
        let before = self.clone();
        let fallback = self.weeks.iter().map(|w| w.hours_available).max().unwrap_or(0);
        let budget = hours_available.unwrap_or(fallback);

        let mut existing: Vec<WeekPlan> = std::mem::take(&mut self.weeks);
        self.weeks = weeks
            .iter()
            .map(|&week| {
                match existing.iter().position(|w| w.week == week) {
                    Some(i) => {
                        let mut plan = existing.swap_remove(i);
                        if let Some(hours) = hours_available {
                            plan.hours_available = hours;
                        }
                        plan
                    }
                    None => WeekPlan {
                        week,
                        hours_available: budget,
                        activities: Vec::new(),
                    },
                }
            })
            .collect();

        *self != before
    }

    /// Every week must use exactly its available hours
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.weeks.is_empty() {
            return Err(ValidationError::new(
                "No hay semanas para programar: define las unidades en el paso 4.",
            ));
        }

        if let Some(week) = self.weeks.iter().find(|w| w.hours_available == 0) {
            return Err(ValidationError::new(format!(
                "La semana {} no tiene horas disponibles: define las horas semanales en el paso 1.",
                week.week
            ))
            .at(FieldFocus::Week(week.week)));
        }

        if let Some(week) = self.weeks.iter().find(|w| !w.is_balanced()) {
            return Err(ValidationError::new(format!(
                "Distribuye las horas exactas de cada semana: la semana {} tiene {} de {} horas asignadas.",
                week.week,
                week.allocated_hours(),
                week.hours_available
            ))
            .at(FieldFocus::Week(week.week)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: u64, hours: ActivityHours) -> ActivityAllocation {
        ActivityAllocation {
            id,
            name: format!("Actividad {}", id),
            hours,
        }
    }

    #[test]
    fn test_hours_wire_format() {
        let a = activity(7, ActivityHours::Two);
        let value = serde_json::to_value(&a).unwrap();
        assert_eq!(value["horas"], 2);

        let bad = serde_json::json!({"id": 1, "nombre": "x", "horas": 4});
        assert!(serde_json::from_value::<ActivityAllocation>(bad).is_err());
    }

    #[test]
    fn test_hours_saturate() {
        assert_eq!(ActivityHours::Three.increased(), ActivityHours::Three);
        assert_eq!(ActivityHours::One.decreased(), ActivityHours::One);
        assert_eq!(ActivityHours::One.increased().value(), 2);
    }

    #[test]
    fn test_under_allocation_blocks() {
        let mut programme = WeeklyProgramme::scaffold([1], 4);
        programme.weeks[0]
            .activities
            .push(activity(1, ActivityHours::Three));
        let err = programme.validate().unwrap_err();
        assert!(err.message.contains("horas exactas"));
        assert_eq!(err.focus, Some(FieldFocus::Week(1)));
    }

    #[test]
    fn test_every_week_must_balance() {
        let mut programme = WeeklyProgramme::scaffold([1, 2], 2);
        programme.weeks[0].activities.push(activity(1, ActivityHours::Two));
        assert!(programme.validate().is_err());
        programme.weeks[1].activities.push(activity(2, ActivityHours::One));
        programme.weeks[1].activities.push(activity(3, ActivityHours::One));
        assert!(programme.validate().is_ok());
        assert_eq!(programme.max_activity_id(), 3);
    }

    #[test]
    fn test_reconcile_follows_unit_weeks_and_budget() {
        let mut programme = WeeklyProgramme::scaffold([1, 5], 2);
        programme.weeks[0].activities.push(activity(1, ActivityHours::Two));
        programme.weeks[1].activities.push(activity(2, ActivityHours::One));

        let weeks: BTreeSet<u32> = [1, 2, 3].into_iter().collect();
        assert!(programme.reconcile(&weeks, Some(3)));

        let numbers: Vec<u32> = programme.weeks.iter().map(|w| w.week).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(programme.weeks.iter().all(|w| w.hours_available == 3));
        // Week 1 keeps its activity; week 5 is gone with its own
        assert_eq!(programme.weeks[0].activities.len(), 1);
        assert_eq!(programme.max_activity_id(), 1);
        assert!(programme.validate().is_err());

        assert!(!programme.reconcile(&weeks, Some(3)));
    }

    #[test]
    fn test_reconcile_without_hours_keeps_budgets() {
        let mut programme = WeeklyProgramme::scaffold([1], 1);
        programme.weeks[0].activities.push(activity(1, ActivityHours::One));
        assert!(programme.validate().is_ok());

        let weeks: BTreeSet<u32> = [1, 2, 3].into_iter().collect();
        assert!(programme.reconcile(&weeks, None));
        assert_eq!(programme.hours_available(3), Some(1));
        let err = programme.validate().unwrap_err();
        assert_eq!(err.focus, Some(FieldFocus::Week(2)));
    }

    #[test]
    fn test_zero_hour_week_blocks() {
        let programme = WeeklyProgramme::scaffold([1], 0);
        let err = programme.validate().unwrap_err();
        assert!(err.message.contains("paso 1"));
    }

    #[test]
    fn test_no_weeks_blocks() {
        assert!(WeeklyProgramme::default().validate().is_err());
    }
}
