//! Coordinator review of submitted syllabi

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Review state of a syllabus as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Borrador,
    EnRevision,
    Aprobado,
    Observado,
}

impl ReviewStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReviewStatus::Borrador => "borrador",
            ReviewStatus::EnRevision => "en revisión",
            ReviewStatus::Aprobado => "aprobado",
            ReviewStatus::Observado => "observado",
        }
    }
}

/// A syllabus waiting in the coordinator's queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: u64,
    #[serde(rename = "codigo")]
    pub course_code: String,
    #[serde(rename = "nombre_curso", default)]
    pub course_name: String,
    #[serde(rename = "docente", default)]
    pub teacher: String,
    #[serde(rename = "estado")]
    pub status: ReviewStatus,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Indica el motivo del rechazo en el comentario.")]
    MissingComment,
}

/// Decision recorded by a coordinator; serialized as the request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDecision {
    #[serde(rename = "estado")]
    status: ReviewStatus,
    #[serde(rename = "comentario", skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl ReviewDecision {
    pub fn approve(comment: Option<String>) -> Self {
        Self {
            status: ReviewStatus::Aprobado,
            comment: comment.filter(|c| !c.trim().is_empty()),
        }
    }

    /// A rejection must explain itself
    pub fn reject(comment: &str) -> Result<Self, ReviewError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ReviewError::MissingComment);
        }
        Ok(Self {
            status: ReviewStatus::Observado,
            comment: Some(comment.to_string()),
        })
    }

    pub fn status(&self) -> ReviewStatus {
        self.status
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reject_requires_comment() {
        assert_eq!(
            ReviewDecision::reject("   "),
            Err(ReviewError::MissingComment)
        );
        let decision = ReviewDecision::reject(" Falta bibliografía ").unwrap();
        assert_eq!(decision.comment(), Some("Falta bibliografía"));
        assert_eq!(decision.status(), ReviewStatus::Observado);
    }

    #[test]
    fn test_decision_body() {
        let body = serde_json::to_value(ReviewDecision::approve(None)).unwrap();
        assert_eq!(body, json!({"estado": "aprobado"}));

        let body = serde_json::to_value(ReviewDecision::reject("Revisar unidades").unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"estado": "observado", "comentario": "Revisar unidades"})
        );
    }

    #[test]
    fn test_review_item_decodes() {
        let item: ReviewItem = serde_json::from_value(json!({
            "id": 7,
            "codigo": "MAT101",
            "nombre_curso": "Matemática I",
            "estado": "en_revision"
        }))
        .unwrap();
        assert_eq!(item.status, ReviewStatus::EnRevision);
        assert_eq!(item.teacher, "");
    }
}
