//! In-memory backend for tests and offline runs

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ApiError, CourseInfo, CreatedSyllabus, SyllabusBackend};
use crate::review::{ReviewDecision, ReviewItem, ReviewStatus};
use crate::sections::SectionKind;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    FetchSection {
        syllabus_id: u64,
        section: SectionKind,
    },
    CreateSection {
        section: SectionKind,
        course_code: Option<String>,
    },
    UpdateSection {
        syllabus_id: u64,
        section: SectionKind,
    },
    FetchCourse(String),
    SubmitForReview(u64),
    ListForReview,
    RecordReview {
        syllabus_id: u64,
        status: ReviewStatus,
    },
}

impl BackendCall {
    pub fn is_create(&self) -> bool {
        matches!(self, BackendCall::CreateSection { .. })
    }

    pub fn is_update(&self) -> bool {
        matches!(self, BackendCall::UpdateSection { .. })
    }
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    syllabi: BTreeSet<u64>,
    course_codes: HashMap<u64, String>,
    sections: HashMap<(u64, SectionKind), Value>,
    courses: HashMap<String, String>,
    review_queue: Vec<ReviewItem>,
    reviews: Vec<(u64, ReviewDecision)>,
    save_failures: VecDeque<ApiError>,
    fetch_failures: VecDeque<ApiError>,
    echo_updates: bool,
    delay: Option<Duration>,
}

/// Backend double keeping syllabi in memory.
///
/// Clones share state, so a test can keep a handle while the wizard owns another.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                next_id: 1,
                echo_updates: true,
                ..MockState::default()
            })),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Id handed out by the next create
    pub fn with_next_id(self, id: u64) -> Self {
        lock(&self.state).next_id = id;
        self
    }

    /// Add a course to the catalogue
    pub fn with_course(self, code: &str, name: &str) -> Self {
        lock(&self.state)
            .courses
            .insert(code.to_string(), name.to_string());
        self
    }

    /// Register an existing syllabus record
    pub fn with_syllabus(self, syllabus_id: u64, course_code: &str) -> Self {
        {
            let mut state = lock(&self.state);
            state.syllabi.insert(syllabus_id);
            state
                .course_codes
                .insert(syllabus_id, course_code.to_string());
            state.next_id = state.next_id.max(syllabus_id + 1);
        }
        self
    }

    /// Store a section payload for an existing syllabus
    pub fn with_section(self, syllabus_id: u64, kind: SectionKind, payload: Value) -> Self {
        {
            let mut state = lock(&self.state);
            state.syllabi.insert(syllabus_id);
            state.sections.insert((syllabus_id, kind), payload);
        }
        self
    }

    /// Whether updates echo the stored payload back
    pub fn echo_updates(self, echo: bool) -> Self {
        lock(&self.state).echo_updates = echo;
        self
    }

    /// Delay every call, to keep requests in flight during tests
    pub fn with_delay(self, delay: Duration) -> Self {
        lock(&self.state).delay = Some(delay);
        self
    }

    /// Make the next create or update fail with `err`
    pub fn fail_next_save(&self, err: ApiError) {
        lock(&self.state).save_failures.push_back(err);
    }

    /// Make the next section or course fetch fail with `err`
    pub fn fail_next_fetch(&self, err: ApiError) {
        lock(&self.state).fetch_failures.push_back(err);
    }

    pub fn section(&self, syllabus_id: u64, kind: SectionKind) -> Option<Value> {
        lock(&self.state)
            .sections
            .get(&(syllabus_id, kind))
            .cloned()
    }

    pub fn reviews(&self) -> Vec<(u64, ReviewDecision)> {
        lock(&self.state).reviews.clone()
    }

    pub fn queue(&self) -> Vec<ReviewItem> {
        lock(&self.state).review_queue.clone()
    }

    /// All calls so far, oldest first
    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: BackendCall) {
        lock(&self.calls).push(call);
    }

    async fn pause(&self) {
        let delay = lock(&self.state).delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn not_found(what: String) -> ApiError {
        ApiError::from_response(404, &format!("{{\"message\":\"{} no encontrado\"}}", what))
    }
}

#[async_trait]
impl SyllabusBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_section(
        &self,
        syllabus_id: u64,
        kind: SectionKind,
    ) -> Result<Option<Value>, ApiError> {
        self.record(BackendCall::FetchSection {
            syllabus_id,
            section: kind,
        });
        self.pause().await;
        let mut state = lock(&self.state);
        if let Some(err) = state.fetch_failures.pop_front() {
            return Err(err);
        }
        Ok(state.sections.get(&(syllabus_id, kind)).cloned())
    }

    async fn create_section(
        &self,
        kind: SectionKind,
        payload: &Value,
        course_code: Option<&str>,
    ) -> Result<CreatedSyllabus, ApiError> {
        self.record(BackendCall::CreateSection {
            section: kind,
            course_code: course_code.map(str::to_string),
        });
        self.pause().await;
        let mut state = lock(&self.state);
        if let Some(err) = state.save_failures.pop_front() {
            return Err(err);
        }
        let id = state.next_id;
        state.next_id += 1;
        state.syllabi.insert(id);
        if let Some(code) = course_code {
            state.course_codes.insert(id, code.to_string());
        }
        state.sections.insert((id, kind), payload.clone());
        Ok(CreatedSyllabus { id })
    }

    async fn update_section(
        &self,
        syllabus_id: u64,
        kind: SectionKind,
        payload: &Value,
    ) -> Result<Option<Value>, ApiError> {
        self.record(BackendCall::UpdateSection {
            syllabus_id,
            section: kind,
        });
        self.pause().await;
        let mut state = lock(&self.state);
        if let Some(err) = state.save_failures.pop_front() {
            return Err(err);
        }
        if !state.syllabi.contains(&syllabus_id) {
            return Err(Self::not_found(format!("Sílabo {}", syllabus_id)));
        }
        state.sections.insert((syllabus_id, kind), payload.clone());
        Ok(state.echo_updates.then(|| payload.clone()))
    }

    async fn fetch_course(&self, course_code: &str) -> Result<Option<CourseInfo>, ApiError> {
        self.record(BackendCall::FetchCourse(course_code.to_string()));
        self.pause().await;
        let mut state = lock(&self.state);
        if let Some(err) = state.fetch_failures.pop_front() {
            return Err(err);
        }
        Ok(state.courses.get(course_code).map(|name| CourseInfo {
            code: course_code.to_string(),
            name: name.clone(),
        }))
    }

    async fn submit_for_review(&self, syllabus_id: u64) -> Result<(), ApiError> {
        self.record(BackendCall::SubmitForReview(syllabus_id));
        self.pause().await;
        let mut state = lock(&self.state);
        if let Some(err) = state.save_failures.pop_front() {
            return Err(err);
        }
        if !state.syllabi.contains(&syllabus_id) {
            return Err(Self::not_found(format!("Sílabo {}", syllabus_id)));
        }
        let general = state
            .sections
            .get(&(syllabus_id, SectionKind::GeneralInfo))
            .cloned()
            .unwrap_or(Value::Null);
        let text = |key: &str| {
            general
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let item = ReviewItem {
            id: syllabus_id,
            course_code: state
                .course_codes
                .get(&syllabus_id)
                .cloned()
                .unwrap_or_default(),
            course_name: text("nombre_curso"),
            teacher: text("docente"),
            status: ReviewStatus::EnRevision,
        };
        state.review_queue.retain(|i| i.id != syllabus_id);
        state.review_queue.push(item);
        Ok(())
    }

    async fn list_for_review(&self) -> Result<Vec<ReviewItem>, ApiError> {
        self.record(BackendCall::ListForReview);
        self.pause().await;
        let state = lock(&self.state);
        Ok(state
            .review_queue
            .iter()
            .filter(|i| i.status == ReviewStatus::EnRevision)
            .cloned()
            .collect())
    }

    async fn record_review(
        &self,
        syllabus_id: u64,
        decision: &ReviewDecision,
    ) -> Result<(), ApiError> {
        self.record(BackendCall::RecordReview {
            syllabus_id,
            status: decision.status(),
        });
        self.pause().await;
        let mut state = lock(&self.state);
        let Some(item) = state.review_queue.iter_mut().find(|i| i.id == syllabus_id) else {
            return Err(Self::not_found(format!("Sílabo {} en revisión", syllabus_id)));
        };
        item.status = decision.status();
        state.reviews.push((syllabus_id, decision.clone()));
        Ok(())
    }
}
