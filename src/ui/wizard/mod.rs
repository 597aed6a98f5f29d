//! Wizard screen: one mounted step at a time, driven by the steps controller

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use tracing::{debug, info, warn};

use crate::api::{ApiError, CourseInfo};
use crate::sections::{SectionKind, SectionPayload, TOTAL_SECTIONS};
use crate::ui::dialogs::{HelpDialog, SubmitDialog, SubmitResult};
use crate::ui::form_field::FormField;
use crate::wizard::{
    record_identity, AdvanceOutcome, Control, ControlOutcome, LocationStore, SaveReceipt,
    SaveRequest, SectionDraft, SectionStep, StepError, StepGate, StepsController,
    SyllabusIdentity,
};

mod editor;
mod steps;

pub use editor::{ProgrammeCursor, StepEditor};

#[cfg(test)]
mod tests;

/// Work the screen asks the app loop to run off the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum WizardCommand {
    /// Load the section of a freshly mounted step; `mount` tags the result
    Load {
        mount: u64,
        kind: SectionKind,
        syllabus_id: Option<u64>,
    },
    Save(SaveRequest),
    Submit(u64),
    FetchCourse(String),
    Quit,
}

pub struct WizardScreen {
    pub(crate) controller: StepsController,
    pub(crate) identity: SyllabusIdentity,
    /// State of the mounted step; replaced on every navigation
    pub(crate) step: Option<SectionStep>,
    pub(crate) editor: StepEditor,
    /// Increments on every mount so late loads are recognised
    mount: u64,
    /// Highest step reachable without saving
    max_visited: usize,
    pub help: HelpDialog,
    pub submit: SubmitDialog,
    pub(crate) status: Option<String>,
}

impl WizardScreen {
    pub fn new(identity: SyllabusIdentity) -> Self {
        let max_visited = if identity.syllabus_id().is_some() {
            TOTAL_SECTIONS
        } else {
            1
        };
        Self {
            controller: StepsController::new(TOTAL_SECTIONS),
            identity,
            step: None,
            editor: StepEditor::Loading,
            mount: 0,
            max_visited,
            help: HelpDialog::new(),
            submit: SubmitDialog::new(),
            status: None,
        }
    }

    pub fn identity(&self) -> &SyllabusIdentity {
        &self.identity
    }

    pub fn current_step(&self) -> usize {
        self.controller.current_step()
    }

    pub fn current_kind(&self) -> SectionKind {
        SectionKind::from_step(self.controller.current_step()).unwrap_or(SectionKind::GeneralInfo)
    }

    pub fn mounted(&self) -> Option<&SectionStep> {
        self.step.as_ref()
    }

    /// Commands to run when the wizard opens
    pub fn start(&mut self) -> Vec<WizardCommand> {
        let mut commands = Vec::new();
        if let Some(code) = self.identity.course_code() {
            commands.push(WizardCommand::FetchCourse(code.to_string()));
        }
        commands.push(self.mount_current());
        commands
    }

    /// Drop the previous step's state and mount the current one
    fn mount_current(&mut self) -> WizardCommand {
        let kind = self.current_kind();
        self.mount += 1;
        self.max_visited = self.max_visited.max(self.controller.current_step());
        self.step = Some(SectionStep::new(kind).mounted_as(self.mount));
        self.editor = StepEditor::Loading;
        debug!(step = kind.step(), section = kind.key(), mount = self.mount, "mounting step");
        WizardCommand::Load {
            mount: self.mount,
            kind,
            syllabus_id: self.identity.syllabus_id(),
        }
    }

    pub fn load_finished(&mut self, mount: u64, result: Result<SectionDraft, StepError>) {
        if mount != self.mount {
            debug!(mount, current = self.mount, "discarding load for unmounted step");
            return;
        }
        let Some(step) = self.step.as_mut() else {
            return;
        };
        self.editor = match &result {
            Ok(draft) => StepEditor::for_payload(step.kind(), draft.value()),
            Err(_) => StepEditor::Unavailable,
        };
        step.apply_load(result);
    }

    /// Apply a save result, whether or not the step that sent it is still mounted
    pub fn save_finished(
        &mut self,
        request: &SaveRequest,
        result: Result<SaveReceipt, StepError>,
        location: &dyn LocationStore,
    ) -> Option<WizardCommand> {
        let owner = self.step.as_mut().filter(|s| s.owns(request));

        let Some(step) = owner else {
            // Started by an earlier mount: keep the identity, drop the rest
            match result {
                Ok(receipt) => {
                    if let Err(e) = record_identity(receipt.created_id, &mut self.identity, location)
                    {
                        warn!(step = request.step, error = %e, "could not record identity");
                    }
                    info!(step = request.step, "save finished after leaving the step");
                }
                Err(e) => warn!(step = request.step, error = %e, "save failed after leaving the step"),
            }
            return None;
        };

        let outcome = step.finish_save(
            request,
            result,
            &mut self.controller,
            &mut self.identity,
            location,
        );

        if let (SectionKind::GeneralInfo, SectionPayload::General(info)) =
            (request.kind, request.sent())
        {
            if self.identity.course_name().is_empty() && !info.course_name.is_empty() {
                self.identity.set_course_name(info.course_name.clone());
            }
        }

        match outcome {
            AdvanceOutcome::Advanced { to } => {
                info!(step = to, syllabus_id = ?self.identity.syllabus_id(), "advanced");
                self.status = None;
                Some(self.mount_current())
            }
            AdvanceOutcome::SavedLast => {
                self.status = Some("Todas las secciones están guardadas.".to_string());
                self.offer_submit();
                None
            }
            AdvanceOutcome::Blocked(err) => {
                if let Some(focus) = err.focus() {
                    let programme = self.programme().cloned();
                    self.editor.apply_focus(focus, programme.as_ref());
                }
                None
            }
            AdvanceOutcome::Stale | AdvanceOutcome::Busy => None,
        }
    }

    pub fn submit_finished(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.submit.hide();
                self.status = Some("Sílabo enviado a revisión.".to_string());
            }
            Err(e) => {
                warn!(error = %e, "submit for review failed");
                self.submit.set_failed(&e.to_string());
            }
        }
    }

    pub fn course_loaded(&mut self, result: Result<Option<CourseInfo>, ApiError>) {
        match result {
            Ok(Some(course)) => {
                debug!(code = %course.code, "course name loaded");
                self.identity.set_course_name(course.name);
            }
            Ok(None) => warn!(code = ?self.identity.course_code(), "course not found"),
            Err(e) => warn!(error = %e, "could not load course name"),
        }
    }

    fn offer_submit(&mut self) {
        match self.identity.syllabus_id() {
            Some(id) => {
                let course = self.identity.course_name().to_string();
                self.submit.show(id, &course);
            }
            None => {
                self.status = Some(
                    "Guarda primero los datos generales para poder enviar el sílabo.".to_string(),
                )
            }
        }
    }

    pub(crate) fn programme(&self) -> Option<&crate::sections::WeeklyProgramme> {
        match self.step.as_ref()?.draft()?.value() {
            SectionPayload::Programme(programme) => Some(programme),
            _ => None,
        }
    }

    fn is_saving(&self) -> bool {
        self.step.as_ref().map_or(false, SectionStep::is_saving)
    }

    fn gate(&self) -> StepGate {
        StepGate::new(self.controller.current_step())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<WizardCommand> {
        if self.help.visible {
            self.help.visible = false;
            return None;
        }

        if self.submit.visible {
            return match self.submit.handle_key(key.code)? {
                SubmitResult::Confirmed { syllabus_id } => Some(WizardCommand::Submit(syllabus_id)),
                SubmitResult::Cancelled => None,
            };
        }

        if key.code == KeyCode::F(1) {
            self.help.toggle();
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') => return Some(WizardCommand::Quit),
                KeyCode::Char('n') => return self.press(Control::Advance),
                KeyCode::Char('p') => return self.press(Control::Back),
                KeyCode::Char('r') => return self.reload(),
                KeyCode::Char('e') => {
                    self.offer_submit();
                    return None;
                }
                _ => {}
            }
        }

        if key.modifiers.contains(KeyModifiers::ALT) {
            if let KeyCode::Char(c) = key.code {
                if let Some(step) = c.to_digit(10) {
                    return self.jump_to(step as usize);
                }
            }
        }

        self.edit(key);
        None
    }

    fn press(&mut self, control: Control) -> Option<WizardCommand> {
        let is_saving = self.is_saving();
        match self.gate().press(&mut self.controller, control, is_saving) {
            ControlOutcome::MovedBack => Some(self.mount_current()),
            ControlOutcome::AdvanceRequested => self.advance(),
            ControlOutcome::Ignored => None,
        }
    }

    fn advance(&mut self) -> Option<WizardCommand> {
        let step = self.step.as_mut()?;
        match step.begin_save(&self.identity) {
            Ok(request) => {
                self.status = Some("Guardando...".to_string());
                Some(WizardCommand::Save(request))
            }
            Err(AdvanceOutcome::Blocked(err)) => {
                if let Some(focus) = err.focus() {
                    let programme = self.programme().cloned();
                    self.editor.apply_focus(focus, programme.as_ref());
                }
                None
            }
            Err(_) => None,
        }
    }

    fn reload(&mut self) -> Option<WizardCommand> {
        if self.is_saving() {
            return None;
        }
        Some(self.mount_current())
    }

    /// Jump to a step already reached in this session
    fn jump_to(&mut self, step: usize) -> Option<WizardCommand> {
        if step > self.max_visited {
            self.status = Some(format!("Aún no llegaste al paso {}.", step));
            return None;
        }
        if self.controller.go_to_step(step) {
            Some(self.mount_current())
        } else {
            None
        }
    }

    fn edit(&mut self, key: KeyEvent) {
        if matches!(self.editor, StepEditor::Programme(_)) {
            self.edit_programme(key);
            return;
        }
        let Some(step) = self.step.as_mut() else {
            return;
        };
        if self.editor.handle_key(key) {
            if let Some(value) = self.editor.to_payload(step.kind()) {
                step.set_value(value);
            }
        }
    }

    fn edit_programme(&mut self, key: KeyEvent) {
        let Some(programme) = self.programme() else {
            return;
        };
        let weeks: Vec<(u32, Vec<u64>)> = programme
            .weeks
            .iter()
            .map(|w| (w.week, w.activities.iter().map(|a| a.id).collect()))
            .collect();
        let (Some(step), StepEditor::Programme(cursor)) = (self.step.as_mut(), &mut self.editor)
        else {
            return;
        };
        if weeks.is_empty() {
            return;
        }
        step.clear_notice();
        self.status = None;
        cursor.week = cursor.week.min(weeks.len() - 1);
        let (week, ids) = &weeks[cursor.week];
        let week = *week;
        let selected = ids.get(cursor.activity).copied();

        if let Some(naming) = cursor.naming.as_mut() {
            match key.code {
                KeyCode::Enter => {
                    let name = naming.value();
                    cursor.naming = None;
                    match step.allocate(|a| a.add_activity(week, &name)) {
                        Some(Ok(_)) => cursor.activity = ids.len(),
                        Some(Err(e)) => self.status = Some(e.to_string()),
                        None => {}
                    }
                }
                KeyCode::Esc => cursor.naming = None,
                _ => {
                    naming.handle_key(key);
                }
            }
            return;
        }

        match key.code {
            KeyCode::Up => {
                cursor.week = cursor.week.saturating_sub(1);
                cursor.activity = 0;
            }
            KeyCode::Down => {
                cursor.week = (cursor.week + 1).min(weeks.len() - 1);
                cursor.activity = 0;
            }
            KeyCode::Left => cursor.activity = cursor.activity.saturating_sub(1),
            KeyCode::Right => {
                cursor.activity = (cursor.activity + 1).min(ids.len().saturating_sub(1))
            }
            KeyCode::Char('a') => {
                if step.allocate(|a| a.can_add(week)) == Some(true) {
                    cursor.naming = Some(FormField::text("", "Nombre de la actividad", Some(80)));
                } else {
                    self.status = Some(format!("La semana {} ya no tiene horas libres.", week));
                }
            }
            KeyCode::Char('+') | KeyCode::Char('-') => {
                let Some(id) = selected else {
                    return;
                };
                let increase = key.code == KeyCode::Char('+');
                let result = step.allocate(|a| {
                    let current = a.hours(week, id)?;
                    let hours = if increase {
                        current.increased()
                    } else {
                        current.decreased()
                    };
                    a.change_hours(week, id, hours).ok()
                });
                debug!(week, id, applied = result.flatten().is_some(), "hour change");
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                if let Some(id) = selected {
                    step.allocate(|a| a.remove_activity(week, id));
                    cursor.activity = cursor.activity.min(ids.len().saturating_sub(2));
                }
            }
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        self.render_wizard(frame);
        self.submit.render(frame);
        self.help.render(frame);
    }
}
