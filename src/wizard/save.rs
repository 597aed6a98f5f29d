//! Save-then-advance: the only way a step moves the wizard forward.
//!
//! `on_next_step` clears the step's error, validates the draft, checks the
//! syllabus identity, persists the section and, only after the backend
//! confirms, moves the controller one step. Every failure is converted into
//! a step-local [`StepError`] and leaves the controller where it was.
//!
//! The routine is split in three phases so the TUI can run the network call
//! on a spawned task: [`SectionStep::begin_save`], [`persist`] and
//! [`SectionStep::finish_save`].

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::allocator::{ActivityIdGenerator, WeeklyAllocator};
use super::controller::StepsController;
use super::draft::SectionDraft;
use super::identity::{LocationStore, SyllabusIdentity};
use crate::api::{ApiError, SyllabusBackend};
use crate::sections::{
    FieldFocus, IdentityPolicy, SectionKind, SectionPayload, ValidationError,
    MISSING_IDENTITY_MESSAGE,
};

/// Error shown inline under the active step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// Local validation failed; nothing was sent
    #[error("{message}")]
    Validation {
        message: String,
        focus: Option<FieldFocus>,
    },

    /// The step needs a syllabus created by an earlier step
    #[error("{}", MISSING_IDENTITY_MESSAGE)]
    MissingIdentity,

    /// The backend call failed; the message is the backend's own
    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Unexpected(String),
}

impl StepError {
    pub fn focus(&self) -> Option<&FieldFocus> {
        match self {
            StepError::Validation { focus, .. } => focus.as_ref(),
            _ => None,
        }
    }

    /// Whether pressing advance again may succeed without editing
    pub fn is_retryable(&self) -> bool {
        matches!(self, StepError::Transport(_))
    }
}

impl From<ValidationError> for StepError {
    fn from(err: ValidationError) -> Self {
        StepError::Validation {
            message: err.message,
            focus: err.focus,
        }
    }
}

impl From<ApiError> for StepError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Decode(_) => StepError::Unexpected(err.to_string()),
            _ => StepError::Transport(err.to_string()),
        }
    }
}

/// Whether a save creates the syllabus or updates an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Create { course_code: Option<String> },
    Update { syllabus_id: u64 },
}

/// A validated save, ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// Step that started the save
    pub step: usize,
    /// Mount of the step state that started the save
    pub mount: u64,
    pub kind: SectionKind,
    pub target: SaveTarget,
    pub payload: Value,
    sent: SectionPayload,
}

impl SaveRequest {
    /// The section value that was sent
    pub fn sent(&self) -> &SectionPayload {
        &self.sent
    }
}

/// What the backend confirmed
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    /// Id returned by a create
    pub created_id: Option<u64>,
    /// Server-normalized value, when the backend echoed one back
    pub stored: Option<SectionPayload>,
}

/// Result of pressing the advance control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Saved and moved to step `to`
    Advanced { to: usize },
    /// Saved on the last step; the controller stays put
    SavedLast,
    /// Saved, but the user had already left the step
    Stale,
    /// Nothing saved; the error is now shown on the step
    Blocked(StepError),
    /// A load or save is still running
    Busy,
}

/// Per-step load/save state and the draft it owns
#[derive(Debug)]
pub struct SectionStep {
    kind: SectionKind,
    mount: u64,
    draft: Option<SectionDraft>,
    error: Option<StepError>,
    notice: Option<String>,
    is_loading: bool,
    is_saving: bool,
    ids: ActivityIdGenerator,
}

impl SectionStep {
    /// A step waiting for its initial load
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            mount: 0,
            draft: None,
            error: None,
            notice: None,
            is_loading: true,
            is_saving: false,
            ids: ActivityIdGenerator::new(),
        }
    }

    /// A step whose draft is already available
    pub fn with_draft(draft: SectionDraft) -> Self {
        let mut step = Self::new(draft.kind());
        step.apply_load(Ok(draft));
        step
    }

    /// Tag this state with the mount it belongs to; saves carry the tag
    pub fn mounted_as(mut self, mount: u64) -> Self {
        self.mount = mount;
        self
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn mount(&self) -> u64 {
        self.mount
    }

    /// Whether `request` was started by this step state and is still awaited
    pub fn owns(&self, request: &SaveRequest) -> bool {
        self.is_saving && self.kind == request.kind && self.mount == request.mount
    }

    pub fn draft(&self) -> Option<&SectionDraft> {
        self.draft.as_ref()
    }

    pub fn error(&self) -> Option<&StepError> {
        self.error.as_ref()
    }

    /// Non-blocking message, e.g. a rejected hour change
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    /// Mark a reload as started
    pub fn start_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Install the result of a load
    pub fn apply_load(&mut self, result: Result<SectionDraft, StepError>) {
        self.is_loading = false;
        match result {
            Ok(draft) => {
                if let SectionPayload::Programme(programme) = draft.value() {
                    self.ids = ActivityIdGenerator::seeded_after(programme.max_activity_id());
                }
                self.draft = Some(draft);
                self.error = None;
            }
            Err(err) => {
                warn!(section = self.kind.key(), error = %err, "section load failed");
                self.error = Some(err);
            }
        }
    }

    /// Replace the draft value with a user edit
    pub fn set_value(&mut self, value: SectionPayload) {
        if let Some(draft) = self.draft.as_mut() {
            draft.set(value);
        }
    }

    /// Run allocator operations against the programme draft.
    ///
    /// Returns `None` when this step has no programme loaded. Rejected hour
    /// changes leave a notice on the step.
    pub fn allocate<R>(&mut self, f: impl FnOnce(&mut WeeklyAllocator<'_>) -> R) -> Option<R> {
        let ids = &mut self.ids;
        let draft = self.draft.as_mut()?;
        let mut notice = None;
        let mut result = None;
        draft.edit(|payload| {
            if let SectionPayload::Programme(programme) = payload {
                let mut allocator = WeeklyAllocator::new(programme, ids)
                    .on_limit_exceeded(|message| notice = Some(message.to_string()));
                result = Some(f(&mut allocator));
            }
        });
        if notice.is_some() {
            self.notice = notice;
        }
        result
    }

    /// First phase: validate and resolve the save target.
    ///
    /// On success the step is marked as saving until [`finish_save`] runs.
    ///
    /// [`finish_save`]: SectionStep::finish_save
    pub fn begin_save(&mut self, identity: &SyllabusIdentity) -> Result<SaveRequest, AdvanceOutcome> {
        if self.is_saving || self.is_loading {
            return Err(AdvanceOutcome::Busy);
        }
        self.error = None;
        self.notice = None;

        let request = self.prepare(identity).map_err(|err| {
            debug!(section = self.kind.key(), error = %err, "advance blocked");
            self.error = Some(err.clone());
            AdvanceOutcome::Blocked(err)
        })?;

        self.is_saving = true;
        debug!(
            step = request.step,
            section = self.kind.key(),
            target = ?request.target,
            "saving section"
        );
        Ok(request)
    }

    fn prepare(&self, identity: &SyllabusIdentity) -> Result<SaveRequest, StepError> {
        let draft = self.draft.as_ref().ok_or_else(|| {
            StepError::Unexpected(format!(
                "No se pudo cargar {}; recarga la sección antes de continuar.",
                self.kind.title()
            ))
        })?;
        let value = draft.value();
        self.kind.validate(value)?;

        let target = match (identity.syllabus_id(), self.kind.identity_policy()) {
            (Some(syllabus_id), _) => SaveTarget::Update { syllabus_id },
            (None, IdentityPolicy::CreateIfAbsent) => SaveTarget::Create {
                course_code: identity.course_code().map(str::to_string),
            },
            (None, IdentityPolicy::RequireExisting) => return Err(StepError::MissingIdentity),
        };

        let payload = value
            .to_value()
            .map_err(|e| StepError::Unexpected(e.to_string()))?;

        Ok(SaveRequest {
            step: self.kind.step(),
            mount: self.mount,
            kind: self.kind,
            target,
            payload,
            sent: value.clone(),
        })
    }

    /// Last phase: apply the backend's answer and advance if still on the step
    pub fn finish_save(
        &mut self,
        request: &SaveRequest,
        result: Result<SaveReceipt, StepError>,
        controller: &mut StepsController,
        identity: &mut SyllabusIdentity,
        location: &dyn LocationStore,
    ) -> AdvanceOutcome {
        self.is_saving = false;

        let receipt = match result.and_then(|receipt| {
            record_identity(receipt.created_id, identity, location)?;
            Ok(receipt)
        }) {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(step = request.step, section = self.kind.key(), error = %err, "save failed");
                self.error = Some(err.clone());
                return AdvanceOutcome::Blocked(err);
            }
        };

        if let Some(draft) = self.draft.as_mut() {
            // Edits made while the request was in flight stay local
            if draft.value() == request.sent() {
                draft.reconcile(receipt.stored.unwrap_or_else(|| request.sent.clone()));
            }
        }

        if controller.current_step() != request.step {
            info!(
                step = request.step,
                current = controller.current_step(),
                "save finished after leaving the step"
            );
            return AdvanceOutcome::Stale;
        }

        if controller.next_step() {
            AdvanceOutcome::Advanced {
                to: controller.current_step(),
            }
        } else {
            AdvanceOutcome::SavedLast
        }
    }

    /// Run the whole save-then-advance routine in place
    pub async fn on_next_step(
        &mut self,
        backend: &dyn SyllabusBackend,
        controller: &mut StepsController,
        identity: &mut SyllabusIdentity,
        location: &dyn LocationStore,
    ) -> AdvanceOutcome {
        let request = match self.begin_save(identity) {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        let result = persist(backend, &request).await;
        self.finish_save(&request, result, controller, identity, location)
    }
}

/// Second phase: send the section to the backend
pub async fn persist(
    backend: &dyn SyllabusBackend,
    request: &SaveRequest,
) -> Result<SaveReceipt, StepError> {
    let (created_id, echoed) = match &request.target {
        SaveTarget::Create { course_code } => {
            let created = backend
                .create_section(request.kind, &request.payload, course_code.as_deref())
                .await?;
            (Some(created.id), None)
        }
        SaveTarget::Update { syllabus_id } => {
            let echoed = backend
                .update_section(*syllabus_id, request.kind, &request.payload)
                .await?;
            (None, echoed)
        }
    };

    let stored = echoed.and_then(|value| match request.kind.decode(value) {
        Ok(payload) => Some(payload),
        Err(e) => {
            debug!(section = request.kind.key(), error = %e, "ignoring echoed payload");
            None
        }
    });

    Ok(SaveReceipt { created_id, stored })
}

/// Adopt the id returned by a create and rewrite the session location.
///
/// Runs even when the step that saved is gone, so later steps update the
/// same record instead of creating another.
pub fn record_identity(
    created_id: Option<u64>,
    identity: &mut SyllabusIdentity,
    location: &dyn LocationStore,
) -> Result<(), StepError> {
    let Some(id) = created_id else {
        return Ok(());
    };
    let changed = identity
        .establish(id)
        .map_err(|e| StepError::Unexpected(e.to_string()))?;
    if changed {
        if let Err(e) = location.replace(&identity.to_location()) {
            warn!(syllabus_id = id, error = %e, "could not persist session location");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::sections::{ActivityHours, GeneralInfo, LineList, TextBlock, WeeklyProgramme};
    use crate::wizard::MemoryLocation;

    fn general() -> SectionPayload {
        SectionPayload::General(GeneralInfo {
            course_name: "Álgebra".into(),
            weekly_hours: 4,
            ..GeneralInfo::default()
        })
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let backend = MockBackend::new();
        let mut controller = StepsController::starting_at(9, 5);
        let mut identity = SyllabusIdentity::existing(1, None);
        let location = MemoryLocation::new();
        let mut step = SectionStep::with_draft(SectionDraft::defaulted(
            SectionKind::Strategies,
            SectionPayload::Lines(LineList::new(vec!["  ".into()])),
        ));

        let outcome = step
            .on_next_step(&backend, &mut controller, &mut identity, &location)
            .await;
        assert!(matches!(outcome, AdvanceOutcome::Blocked(StepError::Validation { .. })));
        assert_eq!(controller.current_step(), 5);
        assert!(backend.calls().is_empty());
        assert!(step.error().is_some());
    }

    #[tokio::test]
    async fn test_require_existing_blocks_without_identity() {
        let backend = MockBackend::new();
        let mut controller = StepsController::starting_at(9, 2);
        let mut identity = SyllabusIdentity::new(Some("MAT101".into()));
        let location = MemoryLocation::new();
        let mut step = SectionStep::with_draft(SectionDraft::defaulted(
            SectionKind::Summary,
            SectionPayload::Text(TextBlock::new("Curso")),
        ));

        let outcome = step
            .on_next_step(&backend, &mut controller, &mut identity, &location)
            .await;
        assert_eq!(outcome, AdvanceOutcome::Blocked(StepError::MissingIdentity));
        assert_eq!(
            step.error().map(|e| e.to_string()).as_deref(),
            Some(MISSING_IDENTITY_MESSAGE)
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_establishes_identity_and_location() {
        let backend = MockBackend::new().with_next_id(42);
        let mut controller = StepsController::new(9);
        let mut identity = SyllabusIdentity::new(Some("MAT101".into()));
        let location = MemoryLocation::new();
        let mut step = SectionStep::with_draft(SectionDraft::defaulted(
            SectionKind::GeneralInfo,
            general(),
        ));

        let outcome = step
            .on_next_step(&backend, &mut controller, &mut identity, &location)
            .await;
        assert_eq!(outcome, AdvanceOutcome::Advanced { to: 2 });
        assert_eq!(identity.syllabus_id(), Some(42));
        assert!(location.current().unwrap().contains("syllabusId=42"));
        assert!(!step.is_saving());
    }

    #[test]
    fn test_begin_save_refuses_while_saving() {
        let identity = SyllabusIdentity::existing(1, None);
        let mut step = SectionStep::with_draft(SectionDraft::defaulted(
            SectionKind::GeneralInfo,
            general(),
        ));
        assert!(step.begin_save(&identity).is_ok());
        assert_eq!(step.begin_save(&identity), Err(AdvanceOutcome::Busy));
    }

    #[tokio::test]
    async fn test_stale_save_does_not_move_controller() {
        let backend = MockBackend::new().with_syllabus(1, "MAT101");
        let mut controller = StepsController::starting_at(9, 3);
        let mut identity = SyllabusIdentity::existing(1, None);
        let location = MemoryLocation::new();
        let mut step = SectionStep::with_draft(SectionDraft::defaulted(
            SectionKind::Competencies,
            SectionPayload::Lines(LineList::new(vec!["Analiza".into()])),
        ));

        let request = step.begin_save(&identity).unwrap();
        controller.prev_step();
        let result = persist(&backend, &request).await;
        let outcome = step.finish_save(&request, result, &mut controller, &mut identity, &location);
        assert_eq!(outcome, AdvanceOutcome::Stale);
        assert_eq!(controller.current_step(), 2);
    }

    #[tokio::test]
    async fn test_edit_during_save_is_kept() {
        let backend = MockBackend::new().with_syllabus(1, "MAT101");
        let mut controller = StepsController::starting_at(9, 2);
        let mut identity = SyllabusIdentity::existing(1, None);
        let location = MemoryLocation::new();
        let mut step = SectionStep::with_draft(SectionDraft::defaulted(
            SectionKind::Summary,
            SectionPayload::Text(TextBlock::new("v1")),
        ));

        let request = step.begin_save(&identity).unwrap();
        step.set_value(SectionPayload::Text(TextBlock::new("v2")));
        let result = persist(&backend, &request).await;
        step.finish_save(&request, result, &mut controller, &mut identity, &location);
        let draft = step.draft().unwrap();
        assert!(draft.is_edited());
        assert_eq!(draft.value(), &SectionPayload::Text(TextBlock::new("v2")));
    }

    #[test]
    fn test_allocate_records_notice() {
        let mut step = SectionStep::with_draft(SectionDraft::defaulted(
            SectionKind::Programming,
            SectionPayload::Programme(WeeklyProgramme::scaffold([1], 2)),
        ));
        let id = step.allocate(|a| a.add_activity(1, "Taller")).unwrap().unwrap();
        let rejected = step
            .allocate(|a| a.change_hours(1, id, ActivityHours::Three))
            .unwrap();
        assert!(rejected.is_err());
        assert!(step.notice().unwrap().contains("sumaría 3"));
        assert!(step.draft().unwrap().is_edited());
    }

    #[test]
    fn test_allocate_ignores_other_sections() {
        let mut step = SectionStep::with_draft(SectionDraft::defaulted(
            SectionKind::Summary,
            SectionPayload::Text(TextBlock::default()),
        ));
        assert_eq!(step.allocate(|a| a.can_add(1)), None);
    }

    #[test]
    fn test_api_errors_map_to_transport() {
        let err: StepError = ApiError::from_response(409, "ya existe").into();
        assert_eq!(err, StepError::Transport("ya existe".into()));
        assert!(err.is_retryable());
    }
}
