//! Tests for the wizard screen

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{StepEditor, WizardCommand, WizardScreen};
use crate::sections::{
    FieldFocus, GeneralInfo, LineList, SectionKind, SectionPayload, WeeklyProgramme,
};
use crate::wizard::{
    MemoryLocation, SaveReceipt, SaveRequest, SectionDraft, StepError, StepsController,
    SyllabusIdentity,
};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_text(screen: &mut WizardScreen, text: &str) {
    for c in text.chars() {
        screen.handle_key(key(KeyCode::Char(c)));
    }
}

/// Mount the current step and complete its load with `payload`
fn mount_with(screen: &mut WizardScreen, payload: Option<SectionPayload>) -> u64 {
    let commands = screen.start();
    let Some(WizardCommand::Load { mount, kind, .. }) = commands.last().cloned() else {
        panic!("expected a load command, got {:?}", commands);
    };
    screen.load_finished(mount, Ok(SectionDraft::from_server(kind, payload)));
    mount
}

fn expect_save(command: Option<WizardCommand>) -> SaveRequest {
    match command {
        Some(WizardCommand::Save(request)) => request,
        other => panic!("expected a save, got {:?}", other),
    }
}

#[test]
fn test_start_fetches_course_and_loads_first_step() {
    let mut screen = WizardScreen::new(SyllabusIdentity::new(Some("MAT101".into())));
    let commands = screen.start();
    assert_eq!(commands[0], WizardCommand::FetchCourse("MAT101".into()));
    assert!(matches!(
        commands[1],
        WizardCommand::Load {
            kind: SectionKind::GeneralInfo,
            syllabus_id: None,
            ..
        }
    ));
    assert!(matches!(screen.editor, StepEditor::Loading));
}

#[test]
fn test_first_save_establishes_identity_and_advances() {
    let location = MemoryLocation::new();
    let mut screen = WizardScreen::new(SyllabusIdentity::new(Some("MAT101".into())));
    mount_with(&mut screen, None);

    type_text(&mut screen, "Cálculo I");
    for _ in 0..3 {
        screen.handle_key(key(KeyCode::Tab));
    }
    type_text(&mut screen, "4");

    let request = expect_save(screen.handle_key(ctrl('n')));
    assert!(screen.mounted().is_some_and(|s| s.is_saving()));

    let receipt = SaveReceipt {
        created_id: Some(42),
        stored: None,
    };
    let next = screen.save_finished(&request, Ok(receipt), &location);

    assert_eq!(screen.current_step(), 2);
    assert_eq!(screen.identity().syllabus_id(), Some(42));
    assert_eq!(screen.identity().course_name(), "Cálculo I");
    assert!(location.current().is_some_and(|l| l.contains("syllabusId=42")));
    assert!(matches!(
        next,
        Some(WizardCommand::Load {
            kind: SectionKind::Summary,
            syllabus_id: Some(42),
            ..
        })
    ));
}

#[test]
fn test_validation_failure_keeps_step_and_focuses_field() {
    let mut screen = WizardScreen::new(SyllabusIdentity::new(None));
    mount_with(&mut screen, None);
    type_text(&mut screen, "Física");

    assert_eq!(screen.handle_key(ctrl('n')), None);
    assert_eq!(screen.current_step(), 1);
    let error = screen.mounted().and_then(|s| s.error()).cloned();
    assert_eq!(
        error.as_ref().and_then(|e| e.focus()),
        Some(&FieldFocus::Field("weekly_hours"))
    );
    assert!(matches!(screen.editor, StepEditor::General { focus: 3, .. }));
}

#[test]
fn test_transport_error_keeps_step() {
    let location = MemoryLocation::new();
    let mut screen = WizardScreen::new(SyllabusIdentity::existing(3, None));
    screen.controller = StepsController::starting_at(9, 3);
    mount_with(
        &mut screen,
        Some(SectionPayload::Lines(LineList::new(vec!["Analiza".into()]))),
    );

    let request = expect_save(screen.handle_key(ctrl('n')));
    let next = screen.save_finished(
        &request,
        Err(StepError::Transport("Error 503".into())),
        &location,
    );
    assert_eq!(next, None);
    assert_eq!(screen.current_step(), 3);
    assert!(screen
        .mounted()
        .and_then(|s| s.error())
        .is_some_and(|e| e.is_retryable()));
}

#[test]
fn test_save_finishing_after_leaving_records_identity_only() {
    let location = MemoryLocation::new();
    let mut screen = WizardScreen::new(SyllabusIdentity::new(None));
    screen.controller = StepsController::starting_at(9, 5);
    mount_with(&mut screen, None);

    let request = expect_save(screen.handle_key(ctrl('n')));
    assert_eq!(request.kind, SectionKind::Strategies);

    // Going back is allowed while saving and unmounts the step
    assert!(matches!(
        screen.handle_key(ctrl('p')),
        Some(WizardCommand::Load {
            kind: SectionKind::Units,
            ..
        })
    ));

    let receipt = SaveReceipt {
        created_id: Some(9),
        stored: None,
    };
    assert_eq!(screen.save_finished(&request, Ok(receipt), &location), None);
    assert_eq!(screen.current_step(), 4);
    assert_eq!(screen.identity().syllabus_id(), Some(9));
    assert_eq!(location.replacements(), 1);
}

#[test]
fn test_late_load_is_discarded() {
    let mut screen = WizardScreen::new(SyllabusIdentity::existing(1, None));
    let first = mount_with(&mut screen, None);
    screen.handle_key(ctrl('r'));
    screen.load_finished(
        first,
        Ok(SectionDraft::from_server(SectionKind::GeneralInfo, None)),
    );
    assert!(matches!(screen.editor, StepEditor::Loading));
}

#[test]
fn test_jump_only_to_visited_steps() {
    let mut screen = WizardScreen::new(SyllabusIdentity::new(None));
    mount_with(&mut screen, None);
    let alt_five = KeyEvent::new(KeyCode::Char('5'), KeyModifiers::ALT);
    assert_eq!(screen.handle_key(alt_five), None);
    assert_eq!(screen.current_step(), 1);

    let mut resumed = WizardScreen::new(SyllabusIdentity::existing(8, None));
    mount_with(&mut resumed, None);
    assert!(resumed.handle_key(alt_five).is_some());
    assert_eq!(resumed.current_step(), 5);
}

#[test]
fn test_programme_keys_drive_allocator() {
    let mut screen = WizardScreen::new(SyllabusIdentity::existing(5, None));
    screen.controller = StepsController::starting_at(9, 8);
    let scaffold = WeeklyProgramme::scaffold([1, 2], 2);
    let commands = screen.start();
    let Some(WizardCommand::Load { mount, .. }) = commands.last().cloned() else {
        panic!("expected load");
    };
    screen.load_finished(
        mount,
        Ok(SectionDraft::defaulted(
            SectionKind::Programming,
            SectionPayload::Programme(scaffold),
        )),
    );

    screen.handle_key(key(KeyCode::Char('a')));
    type_text(&mut screen, "Taller");
    screen.handle_key(key(KeyCode::Enter));
    screen.handle_key(key(KeyCode::Char('+')));

    let week = screen.programme().and_then(|p| p.week(1)).cloned();
    let week = week.expect("week 1");
    assert_eq!(week.activities.len(), 1);
    assert_eq!(week.activities[0].name, "Taller");
    assert!(week.is_balanced());

    // Week 2 is still empty, so advancing is blocked on it
    assert_eq!(screen.handle_key(ctrl('n')), None);
    match &screen.editor {
        StepEditor::Programme(cursor) => assert_eq!(cursor.week, 1),
        _ => panic!("expected programme editor"),
    }
}

#[test]
fn test_last_step_save_offers_submit() {
    let location = MemoryLocation::new();
    let mut screen = WizardScreen::new(SyllabusIdentity::existing(12, None));
    screen.controller = StepsController::starting_at(9, 9);
    mount_with(
        &mut screen,
        Some(SectionPayload::Lines(LineList::new(vec!["Stewart".into()]))),
    );

    let request = expect_save(screen.handle_key(ctrl('n')));
    let receipt = SaveReceipt {
        created_id: None,
        stored: None,
    };
    assert_eq!(screen.save_finished(&request, Ok(receipt), &location), None);
    assert_eq!(screen.current_step(), 9);
    assert!(screen.submit.visible);
    assert_eq!(
        screen.handle_key(key(KeyCode::Enter)),
        Some(WizardCommand::Submit(12))
    );
}

#[test]
fn test_general_info_edits_reach_draft() {
    let mut screen = WizardScreen::new(SyllabusIdentity::new(None));
    mount_with(
        &mut screen,
        Some(SectionPayload::General(GeneralInfo {
            course_name: "Química".into(),
            weekly_hours: 3,
            ..GeneralInfo::default()
        })),
    );
    type_text(&mut screen, " II");
    let draft = screen.mounted().and_then(|s| s.draft()).cloned();
    let draft = draft.expect("draft");
    assert!(draft.is_edited());
    match draft.value() {
        SectionPayload::General(info) => assert_eq!(info.course_name, "Química II"),
        other => panic!("unexpected payload {:?}", other),
    }
}

/// Complete the load requested by `command` with an empty server section
fn finish_load(screen: &mut WizardScreen, command: Option<WizardCommand>) {
    let Some(WizardCommand::Load { mount, kind, .. }) = command else {
        panic!("expected a load, got {:?}", command);
    };
    screen.load_finished(mount, Ok(SectionDraft::from_server(kind, None)));
}

#[test]
fn test_save_from_previous_visit_does_not_drive_remounted_step() {
    let location = MemoryLocation::new();
    let mut screen = WizardScreen::new(SyllabusIdentity::existing(3, None));
    screen.controller = StepsController::starting_at(9, 2);
    mount_with(&mut screen, None);

    type_text(&mut screen, "A");
    let first = expect_save(screen.handle_key(ctrl('n')));

    // Leave and come back to the same step while the first save is in flight
    let back = screen.handle_key(ctrl('p'));
    finish_load(&mut screen, back);
    let alt_two = KeyEvent::new(KeyCode::Char('2'), KeyModifiers::ALT);
    let jump = screen.handle_key(alt_two);
    finish_load(&mut screen, jump);
    assert_eq!(screen.current_step(), 2);

    type_text(&mut screen, "AB");
    let second = expect_save(screen.handle_key(ctrl('n')));
    assert_ne!(first.mount, second.mount);

    let receipt = SaveReceipt {
        created_id: None,
        stored: None,
    };
    assert_eq!(screen.save_finished(&first, Ok(receipt), &location), None);
    assert_eq!(screen.current_step(), 2);
    assert!(screen.mounted().is_some_and(|s| s.is_saving()));

    let next = screen.save_finished(
        &second,
        Err(StepError::Transport("caído".into())),
        &location,
    );
    assert_eq!(next, None);
    assert_eq!(screen.current_step(), 2);
    let error = screen.mounted().and_then(|s| s.error()).cloned();
    assert_eq!(error, Some(StepError::Transport("caído".into())));
}
