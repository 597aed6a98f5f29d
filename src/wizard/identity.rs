//! Which backend syllabus the wizard is editing.
//!
//! The identity travels as a location string
//! (`syllabus://wizard?codigo=MAT101&syllabusId=42`) so a restarted session,
//! or a shared link, resumes the same record.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const LOCATION_BASE: &str = "syllabus://wizard";
const PARAM_SYLLABUS_ID: &str = "syllabusId";
const PARAM_COURSE_CODE: &str = "codigo";
const PARAM_COURSE_CODE_ALT: &str = "courseCode";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("el sílabo ya está identificado como {current}; no se puede cambiar a {attempted}")]
    AlreadyEstablished { current: u64, attempted: u64 },

    #[error("ubicación inválida: {0}")]
    InvalidLocation(String),

    #[error("no se pudo guardar la sesión: {0}")]
    Storage(String),
}

/// Cross-step identity of the syllabus being edited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyllabusIdentity {
    syllabus_id: Option<u64>,
    course_code: Option<String>,
    course_name: String,
}

impl SyllabusIdentity {
    pub fn new(course_code: Option<String>) -> Self {
        Self {
            syllabus_id: None,
            course_code: course_code.filter(|c| !c.trim().is_empty()),
            course_name: String::new(),
        }
    }

    /// Identity for an existing record (e.g. from command-line flags)
    pub fn existing(syllabus_id: u64, course_code: Option<String>) -> Self {
        let mut identity = Self::new(course_code);
        identity.syllabus_id = Some(syllabus_id);
        identity
    }

    /// Rebuild an identity from a location string.
    ///
    /// Accepts a full location, a bare query (`?codigo=..`) or `key=value` pairs.
    pub fn from_location(location: &str) -> Result<Self, IdentityError> {
        let trimmed = location.trim();
        let url = if trimmed.contains("://") {
            Url::parse(trimmed)
        } else {
            let query = trimmed.trim_start_matches('?');
            Url::parse(&format!("{}?{}", LOCATION_BASE, query))
        }
        .map_err(|e| IdentityError::InvalidLocation(format!("{}: {}", trimmed, e)))?;

        let mut identity = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                PARAM_SYLLABUS_ID => {
                    let id = value.parse::<u64>().map_err(|_| {
                        IdentityError::InvalidLocation(format!("syllabusId no numérico: {}", value))
                    })?;
                    identity.syllabus_id = Some(id);
                }
                PARAM_COURSE_CODE | PARAM_COURSE_CODE_ALT if !value.trim().is_empty() => {
                    identity.course_code = Some(value.into_owned());
                }
                _ => {}
            }
        }
        Ok(identity)
    }

    /// Serialize to the location string carried between sessions
    pub fn to_location(&self) -> String {
        let mut url = match Url::parse(LOCATION_BASE) {
            Ok(url) => url,
            Err(_) => return LOCATION_BASE.to_string(),
        };
        {
            let mut query = url.query_pairs_mut();
            if let Some(code) = &self.course_code {
                query.append_pair(PARAM_COURSE_CODE, code);
            }
            if let Some(id) = self.syllabus_id {
                query.append_pair(PARAM_SYLLABUS_ID, &id.to_string());
            }
        }
        url.to_string()
    }

    pub fn syllabus_id(&self) -> Option<u64> {
        self.syllabus_id
    }

    pub fn course_code(&self) -> Option<&str> {
        self.course_code.as_deref()
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn set_course_name(&mut self, name: impl Into<String>) {
        self.course_name = name.into();
    }

    /// Record the id returned by the first successful create.
    ///
    /// Returns `Ok(true)` when the id was newly set, `Ok(false)` when the same
    /// id was already known. A different id is refused: once set, the id is
    /// fixed for the rest of the session.
    pub fn establish(&mut self, syllabus_id: u64) -> Result<bool, IdentityError> {
        match self.syllabus_id {
            None => {
                self.syllabus_id = Some(syllabus_id);
                info!(syllabus_id, "syllabus identity established");
                Ok(true)
            }
            Some(current) if current == syllabus_id => Ok(false),
            Some(current) => Err(IdentityError::AlreadyEstablished {
                current,
                attempted: syllabus_id,
            }),
        }
    }
}

/// Where the current location is kept between sessions.
///
/// `replace` overwrites the stored location without keeping history.
pub trait LocationStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, IdentityError>;
    fn replace(&self, location: &str) -> Result<(), IdentityError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    location: String,
    updated_at: DateTime<Utc>,
}

/// Location persisted as JSON in the state directory
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl LocationStore for SessionFile {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        let record: SessionRecord = serde_json::from_str(&content)
            .map_err(|e| IdentityError::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(Some(record.location))
    }

    fn replace(&self, location: &str) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| IdentityError::Storage(e.to_string()))?;
        }
        let record = SessionRecord {
            location: location.to_string(),
            updated_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| IdentityError::Storage(e.to_string()))?;
        debug!(path = %self.path.display(), location, "session location replaced");
        Ok(())
    }
}

/// In-memory location, for tests and one-shot commands
#[derive(Debug, Default)]
pub struct MemoryLocation {
    current: Mutex<Option<String>>,
    replacements: Mutex<usize>,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.current.lock().ok().and_then(|c| c.clone())
    }

    /// Number of `replace` calls so far
    pub fn replacements(&self) -> usize {
        self.replacements.lock().map(|r| *r).unwrap_or(0)
    }
}

impl LocationStore for MemoryLocation {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        Ok(self.current())
    }

    fn replace(&self, location: &str) -> Result<(), IdentityError> {
        let mut current = self
            .current
            .lock()
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        *current = Some(location.to_string());
        if let Ok(mut count) = self.replacements.lock() {
            *count += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_establish_once() {
        let mut identity = SyllabusIdentity::new(Some("MAT101".to_string()));
        assert_eq!(identity.syllabus_id(), None);
        assert_eq!(identity.establish(42), Ok(true));
        assert_eq!(identity.establish(42), Ok(false));
        assert_eq!(
            identity.establish(43),
            Err(IdentityError::AlreadyEstablished {
                current: 42,
                attempted: 43
            })
        );
        assert_eq!(identity.syllabus_id(), Some(42));
    }

    #[test]
    fn test_location_round_trip() {
        let identity = SyllabusIdentity::existing(42, Some("MAT 101".to_string()));
        let location = identity.to_location();
        assert!(location.starts_with("syllabus://wizard?"));
        assert!(location.contains("syllabusId=42"));

        let parsed = SyllabusIdentity::from_location(&location).unwrap();
        assert_eq!(parsed.syllabus_id(), Some(42));
        assert_eq!(parsed.course_code(), Some("MAT 101"));
    }

    #[test]
    fn test_bare_query_and_alias() {
        let parsed = SyllabusIdentity::from_location("?courseCode=FIS200").unwrap();
        assert_eq!(parsed.course_code(), Some("FIS200"));
        assert_eq!(parsed.syllabus_id(), None);

        let parsed = SyllabusIdentity::from_location("codigo=QUI1&syllabusId=7").unwrap();
        assert_eq!(parsed.syllabus_id(), Some(7));
    }

    #[test]
    fn test_non_numeric_id_rejected() {
        assert!(matches!(
            SyllabusIdentity::from_location("?syllabusId=abc"),
            Err(IdentityError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_blank_course_code_dropped() {
        assert_eq!(SyllabusIdentity::new(Some("  ".to_string())).course_code(), None);
    }

    #[test]
    fn test_session_file_replace_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionFile::new(temp_dir.path().join("state").join("session.json"));
        assert_eq!(store.load().unwrap(), None);

        store.replace("syllabus://wizard?syllabusId=1").unwrap();
        store.replace("syllabus://wizard?syllabusId=2").unwrap();
        assert_eq!(
            store.load().unwrap().as_deref(),
            Some("syllabus://wizard?syllabusId=2")
        );
    }

    #[test]
    fn test_memory_location_counts_replacements() {
        let store = MemoryLocation::new();
        store.replace("a").unwrap();
        store.replace("b").unwrap();
        assert_eq!(store.current().as_deref(), Some("b"));
        assert_eq!(store.replacements(), 2);
    }
}
