//! Syllabus backend client
//!
//! This module provides:
//! - The `SyllabusBackend` trait consumed by the wizard and the CLI
//! - An HTTP implementation over reqwest
//! - An in-memory implementation with a call log, for tests and offline use

pub mod error;
mod http;
mod mock;

pub use error::ApiError;
pub use http::HttpBackend;
pub use mock::{BackendCall, MockBackend};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::review::{ReviewDecision, ReviewItem};
use crate::sections::SectionKind;

/// Response of a create call; extra fields are ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSyllabus {
    pub id: u64,
}

/// Course catalogue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseInfo {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nombre")]
    pub name: String,
}

/// Remote persistence for syllabus sections.
///
/// Payloads are plain JSON so implementations stay unaware of section shapes.
#[async_trait]
pub trait SyllabusBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// `GET /syllabus/{id}/{section}`; a 404 is `Ok(None)`
    async fn fetch_section(
        &self,
        syllabus_id: u64,
        kind: SectionKind,
    ) -> Result<Option<Value>, ApiError>;

    /// `POST /syllabus/{section}` for a syllabus that has no id yet
    async fn create_section(
        &self,
        kind: SectionKind,
        payload: &Value,
        course_code: Option<&str>,
    ) -> Result<CreatedSyllabus, ApiError>;

    /// `PUT /syllabus/{id}/{section}`; returns the stored payload when the
    /// backend echoes it
    async fn update_section(
        &self,
        syllabus_id: u64,
        kind: SectionKind,
        payload: &Value,
    ) -> Result<Option<Value>, ApiError>;

    /// `GET /cursos/{codigo}`; a 404 is `Ok(None)`
    async fn fetch_course(&self, course_code: &str) -> Result<Option<CourseInfo>, ApiError>;

    /// `POST /syllabus/{id}/enviar`
    async fn submit_for_review(&self, syllabus_id: u64) -> Result<(), ApiError>;

    /// `GET /syllabus/revision`
    async fn list_for_review(&self) -> Result<Vec<ReviewItem>, ApiError>;

    /// `PUT /syllabus/{id}/revision`
    async fn record_review(
        &self,
        syllabus_id: u64,
        decision: &ReviewDecision,
    ) -> Result<(), ApiError>;
}
