//! Step 1: general course data

use serde::{Deserialize, Serialize};

use super::{FieldFocus, ValidationError};

/// Upper bound for weekly contact hours
pub const MAX_WEEKLY_HOURS: u8 = 12;

/// General course data; the first save of this section creates the syllabus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralInfo {
    #[serde(rename = "nombre_curso", default)]
    pub course_name: String,
    #[serde(rename = "semestre", default)]
    pub semester: String,
    #[serde(rename = "creditos", default)]
    pub credits: u8,
    /// Contact hours per week; drives the weekly programming step
    #[serde(rename = "horas_semanales", default)]
    pub weekly_hours: u8,
    #[serde(rename = "docente", default)]
    pub teacher: String,
}

impl GeneralInfo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.course_name.trim().is_empty() {
            return Err(
                ValidationError::new("El nombre del curso no puede estar vacío.")
                    .at(FieldFocus::Field("course_name")),
            );
        }
        if self.weekly_hours == 0 || self.weekly_hours > MAX_WEEKLY_HOURS {
            return Err(ValidationError::new(format!(
                "Las horas semanales deben estar entre 1 y {}.",
                MAX_WEEKLY_HOURS
            ))
            .at(FieldFocus::Field("weekly_hours")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GeneralInfo {
        GeneralInfo {
            course_name: "Cálculo I".to_string(),
            semester: "2026-II".to_string(),
            credits: 4,
            weekly_hours: 4,
            teacher: "R. Quispe".to_string(),
        }
    }

    #[test]
    fn test_valid_general_info() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_blank_course_name_focuses_field() {
        let mut info = valid();
        info.course_name = "   ".to_string();
        let err = info.validate().unwrap_err();
        assert_eq!(err.focus, Some(FieldFocus::Field("course_name")));
    }

    #[test]
    fn test_weekly_hours_bounds() {
        let mut info = valid();
        info.weekly_hours = 0;
        assert!(info.validate().is_err());
        info.weekly_hours = MAX_WEEKLY_HOURS + 1;
        assert!(info.validate().is_err());
        info.weekly_hours = MAX_WEEKLY_HOURS;
        assert!(info.validate().is_ok());
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(valid()).unwrap();
        assert_eq!(value["nombre_curso"], "Cálculo I");
        assert_eq!(value["horas_semanales"], 4);
    }
}
