//! Fetching a section's draft when its step mounts

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::save::StepError;
use super::SectionDraft;
use crate::api::SyllabusBackend;
use crate::sections::{SectionKind, SectionPayload, WeeklyProgramme};

/// Load the draft for `kind`.
///
/// Without a syllabus id there is nothing to fetch and the section starts
/// from its default. The programming section always follows the units' week
/// range and the weekly hours: it is scaffolded from them when the server has
/// none, and a stored plan is reconciled with them.
pub async fn load_section(
    backend: &dyn SyllabusBackend,
    syllabus_id: Option<u64>,
    kind: SectionKind,
) -> Result<SectionDraft, StepError> {
    let Some(id) = syllabus_id else {
        debug!(section = kind.key(), "no syllabus yet, using defaults");
        return Ok(SectionDraft::from_server(kind, None));
    };

    let server = fetch_payload(backend, id, kind).await?;
    debug!(
        section = kind.key(),
        syllabus_id = id,
        found = server.is_some(),
        "section loaded"
    );

    if kind == SectionKind::Programming {
        return load_programme(backend, id, server).await;
    }

    Ok(SectionDraft::from_server(kind, server))
}

async fn load_programme(
    backend: &dyn SyllabusBackend,
    syllabus_id: u64,
    server: Option<SectionPayload>,
) -> Result<SectionDraft, StepError> {
    let kind = SectionKind::Programming;
    let Some((weeks, hours)) = programme_frame(backend, syllabus_id).await? else {
        return Ok(SectionDraft::from_server(kind, server));
    };

    match server {
        Some(SectionPayload::Programme(stored)) if !stored.weeks.is_empty() => {
            let mut programme = stored.clone();
            let mut draft = SectionDraft::from_server(kind, Some(SectionPayload::Programme(stored)));
            if programme.reconcile(&weeks, hours) {
                info!(
                    syllabus_id,
                    weeks = programme.weeks.len(),
                    "programme reconciled with units"
                );
                draft.set(SectionPayload::Programme(programme));
            }
            Ok(draft)
        }
        _ => {
            let programme = WeeklyProgramme::scaffold(weeks, hours.unwrap_or(0));
            info!(
                syllabus_id,
                weeks = programme.weeks.len(),
                "programme scaffolded from units"
            );
            Ok(SectionDraft::defaulted(kind, SectionPayload::Programme(programme)))
        }
    }
}

async fn fetch_payload(
    backend: &dyn SyllabusBackend,
    syllabus_id: u64,
    kind: SectionKind,
) -> Result<Option<SectionPayload>, StepError> {
    match backend.fetch_section(syllabus_id, kind).await? {
        Some(value) => kind
            .decode(value)
            .map(Some)
            .map_err(|e| StepError::Unexpected(format!("{}: {}", kind.title(), e))),
        None => Ok(None),
    }
}

/// Weeks covered by the units and the weekly hours, when units exist
async fn programme_frame(
    backend: &dyn SyllabusBackend,
    syllabus_id: u64,
) -> Result<Option<(BTreeSet<u32>, Option<u8>)>, StepError> {
    let units = match fetch_payload(backend, syllabus_id, SectionKind::Units).await? {
        Some(SectionPayload::Units(units)) => units,
        _ => return Ok(None),
    };
    let weeks = units.weeks();
    if weeks.is_empty() {
        return Ok(None);
    }
    let hours = match fetch_payload(backend, syllabus_id, SectionKind::GeneralInfo).await? {
        Some(SectionPayload::General(info)) if info.weekly_hours > 0 => Some(info.weekly_hours),
        _ => None,
    };
    Ok(Some((weeks, hours)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockBackend};
    use crate::wizard::DraftState;
    use serde_json::json;

    #[tokio::test]
    async fn test_no_identity_defaults_without_fetching() {
        let backend = MockBackend::new();
        let draft = load_section(&backend, None, SectionKind::Strategies)
            .await
            .unwrap();
        assert!(draft.is_defaulted());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_404_uses_canonical_default() {
        let backend = MockBackend::new().with_syllabus(1, "MAT101");
        let draft = load_section(&backend, Some(1), SectionKind::Evaluation)
            .await
            .unwrap();
        assert_eq!(
            Some(draft.value().clone()),
            SectionKind::Evaluation.canonical_default()
        );
    }

    #[tokio::test]
    async fn test_server_value_loaded() {
        let backend = MockBackend::new().with_section(
            1,
            SectionKind::Summary,
            json!({"contenido": "Curso de análisis"}),
        );
        let draft = load_section(&backend, Some(1), SectionKind::Summary)
            .await
            .unwrap();
        assert!(matches!(draft.state(), DraftState::Loaded(_)));
    }

    #[tokio::test]
    async fn test_fetch_error_surfaces_message() {
        let backend = MockBackend::new();
        backend.fail_next_fetch(ApiError::from_response(500, "{\"error\":\"caído\"}"));
        let err = load_section(&backend, Some(1), SectionKind::Summary)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "caído");
    }

    #[tokio::test]
    async fn test_programme_scaffolded_from_units() {
        let backend = MockBackend::new()
            .with_section(
                4,
                SectionKind::GeneralInfo,
                json!({"nombre_curso": "Álgebra", "horas_semanales": 4}),
            )
            .with_section(
                4,
                SectionKind::Units,
                json!({"unidades": [
                    {"nombre": "U1", "semana_inicio": 1, "semana_fin": 2},
                    {"nombre": "U2", "semana_inicio": 3, "semana_fin": 3}
                ]}),
            );
        let draft = load_section(&backend, Some(4), SectionKind::Programming)
            .await
            .unwrap();
        assert!(draft.is_defaulted());
        match draft.value() {
            SectionPayload::Programme(p) => {
                assert_eq!(p.weeks.len(), 3);
                assert_eq!(p.hours_available(2), Some(4));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stored_programme_follows_changed_units() {
        let backend = MockBackend::new()
            .with_section(
                6,
                SectionKind::Units,
                json!({"unidades": [{"nombre": "U1", "semana_inicio": 1, "semana_fin": 3}]}),
            )
            .with_section(
                6,
                SectionKind::Programming,
                json!({"semanas": [{
                    "semana": 1,
                    "horas_disponibles": 1,
                    "actividades": [{"id": 1, "nombre": "Clase", "horas": 1}]
                }]}),
            );

        let draft = load_section(&backend, Some(6), SectionKind::Programming)
            .await
            .unwrap();
        assert!(draft.is_edited());
        let SectionPayload::Programme(programme) = draft.value() else {
            panic!("unexpected payload {:?}", draft.value());
        };
        let weeks: Vec<u32> = programme.weeks.iter().map(|w| w.week).collect();
        assert_eq!(weeks, vec![1, 2, 3]);
        let err = SectionKind::Programming.validate(draft.value()).unwrap_err();
        assert!(err.message.contains("semana 2"));
    }

    #[tokio::test]
    async fn test_stored_programme_takes_current_weekly_hours() {
        let backend = MockBackend::new()
            .with_section(
                6,
                SectionKind::GeneralInfo,
                json!({"nombre_curso": "Física", "horas_semanales": 2}),
            )
            .with_section(
                6,
                SectionKind::Units,
                json!({"unidades": [{"nombre": "U1", "semana_inicio": 1, "semana_fin": 1}]}),
            )
            .with_section(
                6,
                SectionKind::Programming,
                json!({"semanas": [{
                    "semana": 1,
                    "horas_disponibles": 1,
                    "actividades": [{"id": 1, "nombre": "Clase", "horas": 1}]
                }]}),
            );

        let draft = load_section(&backend, Some(6), SectionKind::Programming)
            .await
            .unwrap();
        let SectionPayload::Programme(programme) = draft.value() else {
            panic!("unexpected payload {:?}", draft.value());
        };
        assert_eq!(programme.hours_available(1), Some(2));
        assert!(SectionKind::Programming.validate(draft.value()).is_err());
    }

    #[tokio::test]
    async fn test_balanced_programme_matching_units_stays_loaded() {
        let backend = MockBackend::new()
            .with_section(
                6,
                SectionKind::GeneralInfo,
                json!({"nombre_curso": "Física", "horas_semanales": 1}),
            )
            .with_section(
                6,
                SectionKind::Units,
                json!({"unidades": [{"nombre": "U1", "semana_inicio": 1, "semana_fin": 1}]}),
            )
            .with_section(
                6,
                SectionKind::Programming,
                json!({"semanas": [{
                    "semana": 1,
                    "horas_disponibles": 1,
                    "actividades": [{"id": 1, "nombre": "Clase", "horas": 1}]
                }]}),
            );

        let draft = load_section(&backend, Some(6), SectionKind::Programming)
            .await
            .unwrap();
        assert!(matches!(draft.state(), DraftState::Loaded(_)));
        assert!(SectionKind::Programming.validate(draft.value()).is_ok());
    }
}
