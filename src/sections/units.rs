//! Step 4: learning units and the weeks they span

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{FieldFocus, ValidationError};

/// Last week a unit may reach in one academic term
pub const MAX_WEEKS: u32 = 18;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "semana_inicio")]
    pub start_week: u32,
    #[serde(rename = "semana_fin")]
    pub end_week: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitList {
    #[serde(rename = "unidades", default)]
    pub units: Vec<Unit>,
}

impl UnitList {
    pub fn new(units: Vec<Unit>) -> Self {
        Self { units }
    }

    /// Parse editor text, one unit per line: `Nombre | 1-4`.
    ///
    /// Lines that don't parse keep their name with week 0 so validation
    /// reports them instead of silently dropping them.
    pub fn from_text(text: &str) -> Self {
        let units = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(parse_unit_line)
            .collect();
        Self { units }
    }

    pub fn to_text(&self) -> String {
        self.units
            .iter()
            .map(|u| format!("{} | {}-{}", u.name, u.start_week, u.end_week))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Every week covered by some unit, ascending
    pub fn weeks(&self) -> BTreeSet<u32> {
        self.units
            .iter()
            .filter(|u| u.start_week >= 1 && u.start_week <= u.end_week)
            .flat_map(|u| u.start_week..=u.end_week.min(MAX_WEEKS))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.units.is_empty() {
            return Err(
                ValidationError::new("Agrega al menos una unidad antes de continuar.")
                    .at(FieldFocus::Line(0)),
            );
        }

        for (i, unit) in self.units.iter().enumerate() {
            if unit.name.trim().is_empty() {
                return Err(ValidationError::new(format!(
                    "La unidad {} no tiene nombre.",
                    i + 1
                ))
                .at(FieldFocus::Line(i)));
            }
            if unit.start_week == 0 || unit.start_week > unit.end_week {
                return Err(ValidationError::new(format!(
                    "La unidad \"{}\" tiene un rango de semanas inválido (usa el formato Nombre | 1-4).",
                    unit.name.trim()
                ))
                .at(FieldFocus::Line(i)));
            }
            if unit.end_week > MAX_WEEKS {
                return Err(ValidationError::new(format!(
                    "La unidad \"{}\" termina en la semana {}; el ciclo tiene {} semanas.",
                    unit.name.trim(),
                    unit.end_week,
                    MAX_WEEKS
                ))
                .at(FieldFocus::Line(i)));
            }
        }

        let mut order: Vec<usize> = (0..self.units.len()).collect();
        order.sort_by_key(|&i| self.units[i].start_week);
        for pair in order.windows(2) {
            let (a, b) = (&self.units[pair[0]], &self.units[pair[1]]);
            if b.start_week <= a.end_week {
                return Err(ValidationError::new(format!(
                    "Las unidades \"{}\" y \"{}\" se superponen en la semana {}.",
                    a.name.trim(),
                    b.name.trim(),
                    b.start_week
                ))
                .at(FieldFocus::Line(pair[1])));
            }
        }

        Ok(())
    }
}

fn parse_unit_line(line: &str) -> Unit {
    let (name, range) = match line.rsplit_once('|') {
        Some((name, range)) => (name.trim(), range.trim()),
        None => (line.trim(), ""),
    };

    let (start_week, end_week) = range
        .split_once('-')
        .and_then(|(s, e)| Some((s.trim().parse().ok()?, e.trim().parse().ok()?)))
        .or_else(|| range.parse().ok().map(|w| (w, w)))
        .unwrap_or((0, 0));

    Unit {
        name: name.to_string(),
        start_week,
        end_week,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, start: u32, end: u32) -> Unit {
        Unit {
            name: name.to_string(),
            start_week: start,
            end_week: end,
        }
    }

    #[test]
    fn test_parse_editor_text() {
        let list = UnitList::from_text("Límites | 1-4\n\nDerivadas | 5-8\nIntegrales | 9");
        assert_eq!(
            list.units,
            vec![
                unit("Límites", 1, 4),
                unit("Derivadas", 5, 8),
                unit("Integrales", 9, 9)
            ]
        );
        assert_eq!(UnitList::from_text(&list.to_text()), list);
    }

    #[test]
    fn test_unparsable_range_fails_validation() {
        let list = UnitList::from_text("Límites | pronto");
        let err = list.validate().unwrap_err();
        assert_eq!(err.focus, Some(FieldFocus::Line(0)));
    }

    #[test]
    fn test_overlap_detected_regardless_of_order() {
        let list = UnitList::new(vec![unit("B", 4, 6), unit("A", 1, 4)]);
        let err = list.validate().unwrap_err();
        assert!(err.message.contains("se superponen"));
        assert_eq!(err.focus, Some(FieldFocus::Line(0)));
    }

    #[test]
    fn test_weeks_union() {
        let list = UnitList::new(vec![unit("A", 1, 2), unit("B", 4, 5)]);
        assert_eq!(list.weeks().into_iter().collect::<Vec<_>>(), vec![1, 2, 4, 5]);
        assert!(list.validate().is_ok());
    }

    #[test]
    fn test_empty_list_fails() {
        assert!(UnitList::default().validate().is_err());
    }

    #[test]
    fn test_weeks_beyond_term_are_rejected() {
        let list = UnitList::from_text("U | 1-4000000000");
        let err = list.validate().unwrap_err();
        assert!(err.message.contains("18 semanas"));
        assert_eq!(err.focus, Some(FieldFocus::Line(0)));
        assert_eq!(list.weeks().len(), MAX_WEEKS as usize);

        assert!(UnitList::from_text("U | 1-18").validate().is_ok());
        assert!(UnitList::from_text("U | 19").validate().is_err());
    }
}
