//! Syllabus sections: one per wizard step
//!
//! Each section is persisted by the backend under its own key
//! (e.g. `estrategias_metodologicas`) and has its own payload shape,
//! validation rule and identity policy.

mod general;
mod lines;
mod programme;
mod resources;
mod text;
mod units;

pub use general::{GeneralInfo, MAX_WEEKLY_HOURS};
pub use lines::LineList;
pub use programme::{ActivityAllocation, ActivityHours, WeekPlan, WeeklyProgramme};
pub use resources::{ResourceGroup, ResourceGroups};
pub use text::TextBlock;
pub use units::{Unit, UnitList, MAX_WEEKS};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message shown when a step needs an existing syllabus record
pub const MISSING_IDENTITY_MESSAGE: &str =
    "Completa primero el paso 1 (datos generales) para crear el sílabo.";

/// How a step behaves when no syllabus id exists yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Create the syllabus record (POST) if no id exists, update otherwise
    CreateIfAbsent,
    /// Block advancement until an earlier step has created the record
    RequireExisting,
}

/// The sections of a syllabus, in wizard order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    GeneralInfo,
    Summary,
    Competencies,
    Units,
    Strategies,
    Resources,
    Evaluation,
    Programming,
    References,
}

/// Total number of wizard steps
pub const TOTAL_SECTIONS: usize = 9;

impl SectionKind {
    pub fn all() -> &'static [SectionKind; TOTAL_SECTIONS] {
        &[
            SectionKind::GeneralInfo,
            SectionKind::Summary,
            SectionKind::Competencies,
            SectionKind::Units,
            SectionKind::Strategies,
            SectionKind::Resources,
            SectionKind::Evaluation,
            SectionKind::Programming,
            SectionKind::References,
        ]
    }

    /// Section for a 1-based step number
    pub fn from_step(step: usize) -> Option<SectionKind> {
        step.checked_sub(1)
            .and_then(|i| SectionKind::all().get(i))
            .copied()
    }

    /// 1-based step number
    pub fn step(self) -> usize {
        SectionKind::all()
            .iter()
            .position(|k| *k == self)
            .map_or(1, |i| i + 1)
    }

    /// Backend path segment for this section
    pub fn key(self) -> &'static str {
        match self {
            SectionKind::GeneralInfo => "datos_generales",
            SectionKind::Summary => "sumilla",
            SectionKind::Competencies => "competencias",
            SectionKind::Units => "unidades",
            SectionKind::Strategies => "estrategias_metodologicas",
            SectionKind::Resources => "recursos_didacticos",
            SectionKind::Evaluation => "evaluacion",
            SectionKind::Programming => "programacion",
            SectionKind::References => "referencias",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::GeneralInfo => "Datos generales",
            SectionKind::Summary => "Sumilla",
            SectionKind::Competencies => "Competencias",
            SectionKind::Units => "Unidades",
            SectionKind::Strategies => "Estrategias metodológicas",
            SectionKind::Resources => "Recursos didácticos",
            SectionKind::Evaluation => "Evaluación",
            SectionKind::Programming => "Programación semanal",
            SectionKind::References => "Referencias",
        }
    }

    pub fn identity_policy(self) -> IdentityPolicy {
        match self {
            SectionKind::GeneralInfo | SectionKind::Strategies | SectionKind::Resources => {
                IdentityPolicy::CreateIfAbsent
            }
            _ => IdentityPolicy::RequireExisting,
        }
    }

    /// Recommended text shown in the editor when the server has nothing yet
    pub fn canonical_default(self) -> Option<SectionPayload> {
        match self {
            SectionKind::Strategies => Some(SectionPayload::Lines(lines::default_strategies())),
            SectionKind::Evaluation => Some(SectionPayload::Text(text::default_evaluation())),
            _ => None,
        }
    }

    /// Empty payload of the right shape for this section
    pub fn empty_payload(self) -> SectionPayload {
        match self {
            SectionKind::GeneralInfo => SectionPayload::General(GeneralInfo::default()),
            SectionKind::Summary | SectionKind::Evaluation => {
                SectionPayload::Text(TextBlock::default())
            }
            SectionKind::Competencies | SectionKind::Strategies | SectionKind::References => {
                SectionPayload::Lines(LineList::default())
            }
            SectionKind::Units => SectionPayload::Units(UnitList::default()),
            SectionKind::Resources => SectionPayload::Resources(ResourceGroups::default()),
            SectionKind::Programming => SectionPayload::Programme(WeeklyProgramme::default()),
        }
    }

    /// Decode a backend payload into this section's shape
    pub fn decode(self, value: Value) -> Result<SectionPayload, serde_json::Error> {
        Ok(match self {
            SectionKind::GeneralInfo => SectionPayload::General(serde_json::from_value(value)?),
            SectionKind::Summary | SectionKind::Evaluation => {
                SectionPayload::Text(serde_json::from_value(value)?)
            }
            SectionKind::Competencies | SectionKind::Strategies | SectionKind::References => {
                SectionPayload::Lines(serde_json::from_value(value)?)
            }
            SectionKind::Units => SectionPayload::Units(serde_json::from_value(value)?),
            SectionKind::Resources => SectionPayload::Resources(serde_json::from_value(value)?),
            SectionKind::Programming => SectionPayload::Programme(serde_json::from_value(value)?),
        })
    }

    /// Run this section's local validation rule
    pub fn validate(self, payload: &SectionPayload) -> Result<(), ValidationError> {
        match (self, payload) {
            (SectionKind::GeneralInfo, SectionPayload::General(info)) => info.validate(),
            (SectionKind::Summary, SectionPayload::Text(block)) => {
                block.validate("Escribe la sumilla del curso antes de continuar.")
            }
            (SectionKind::Evaluation, SectionPayload::Text(block)) => {
                block.validate("Describe el sistema de evaluación antes de continuar.")
            }
            (SectionKind::Competencies, SectionPayload::Lines(list)) => {
                list.validate("Agrega al menos una competencia antes de continuar.")
            }
            (SectionKind::Strategies, SectionPayload::Lines(list)) => list.validate(
                "Agrega al menos una estrategia metodológica antes de continuar.",
            ),
            (SectionKind::References, SectionPayload::Lines(list)) => {
                list.validate("Agrega al menos una referencia bibliográfica antes de continuar.")
            }
            (SectionKind::Units, SectionPayload::Units(units)) => units.validate(),
            (SectionKind::Resources, SectionPayload::Resources(groups)) => groups.validate(),
            (SectionKind::Programming, SectionPayload::Programme(programme)) => {
                programme.validate()
            }
            (kind, other) => Err(ValidationError::new(format!(
                "Contenido inesperado para {}: {}",
                kind.title(),
                other.shape()
            ))),
        }
    }
}

/// Payload of a single section, shaped per section kind
#[derive(Debug, Clone, PartialEq)]
pub enum SectionPayload {
    General(GeneralInfo),
    Text(TextBlock),
    Lines(LineList),
    Units(UnitList),
    Resources(ResourceGroups),
    Programme(WeeklyProgramme),
}

impl SectionPayload {
    /// Encode for the backend
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            SectionPayload::General(v) => serde_json::to_value(v),
            SectionPayload::Text(v) => serde_json::to_value(v),
            SectionPayload::Lines(v) => serde_json::to_value(v),
            SectionPayload::Units(v) => serde_json::to_value(v),
            SectionPayload::Resources(v) => serde_json::to_value(v),
            SectionPayload::Programme(v) => serde_json::to_value(v),
        }
    }

    /// Whether the payload carries no user content
    pub fn is_empty(&self) -> bool {
        match self {
            SectionPayload::General(v) => *v == GeneralInfo::default(),
            SectionPayload::Text(v) => v.content.trim().is_empty(),
            SectionPayload::Lines(v) => v.non_empty().next().is_none(),
            SectionPayload::Units(v) => v.units.is_empty(),
            SectionPayload::Resources(v) => v.total_resources() == 0,
            SectionPayload::Programme(v) => v.weeks.is_empty(),
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            SectionPayload::General(_) => "datos generales",
            SectionPayload::Text(_) => "texto",
            SectionPayload::Lines(_) => "lista",
            SectionPayload::Units(_) => "unidades",
            SectionPayload::Resources(_) => "recursos",
            SectionPayload::Programme(_) => "programación",
        }
    }
}

/// Which input a validation failure points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFocus {
    /// Named form field
    Field(&'static str),
    /// Zero-based line in a list editor
    Line(usize),
    /// Week number in the programming step
    Week(u32),
}

/// Local validation failure; never sent to the backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub focus: Option<FieldFocus>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            focus: None,
        }
    }

    pub fn at(mut self, focus: FieldFocus) -> Self {
        self.focus = Some(focus);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_numbers_round_trip_in_order() {
        for (i, kind) in SectionKind::all().iter().enumerate() {
            assert_eq!(kind.step(), i + 1);
            assert_eq!(SectionKind::from_step(i + 1), Some(*kind));
        }
        assert_eq!(SectionKind::from_step(0), None);
        assert_eq!(SectionKind::from_step(TOTAL_SECTIONS + 1), None);
    }

    #[test]
    fn test_strategies_is_step_five() {
        assert_eq!(SectionKind::Strategies.step(), 5);
        assert_eq!(SectionKind::Strategies.key(), "estrategias_metodologicas");
    }

    #[test]
    fn test_identity_policies() {
        assert_eq!(
            SectionKind::GeneralInfo.identity_policy(),
            IdentityPolicy::CreateIfAbsent
        );
        assert_eq!(
            SectionKind::Summary.identity_policy(),
            IdentityPolicy::RequireExisting
        );
        assert_eq!(
            SectionKind::Programming.identity_policy(),
            IdentityPolicy::RequireExisting
        );
    }

    #[test]
    fn test_only_strategies_and_evaluation_have_defaults() {
        let with_defaults: Vec<_> = SectionKind::all()
            .iter()
            .filter(|k| k.canonical_default().is_some())
            .collect();
        assert_eq!(
            with_defaults,
            vec![&SectionKind::Strategies, &SectionKind::Evaluation]
        );
    }

    #[test]
    fn test_decode_lines_payload() {
        let payload = SectionKind::Competencies
            .decode(json!({"items": ["Analiza", "Diseña"]}))
            .unwrap();
        match payload {
            SectionPayload::Lines(list) => assert_eq!(list.items.len(), 2),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_empty_strategies_message() {
        let err = SectionKind::Strategies
            .validate(&SectionPayload::Lines(LineList::default()))
            .unwrap_err();
        assert_eq!(
            err.message,
            "Agrega al menos una estrategia metodológica antes de continuar."
        );
    }

    #[test]
    fn test_mismatched_payload_is_rejected() {
        let err = SectionKind::Units
            .validate(&SectionPayload::Text(TextBlock::default()))
            .unwrap_err();
        assert!(err.message.contains("Unidades"));
    }

    #[test]
    fn test_empty_payloads_report_empty() {
        for kind in SectionKind::all() {
            assert!(kind.empty_payload().is_empty(), "{:?}", kind);
        }
    }
}
