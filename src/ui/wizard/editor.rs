//! Transient input state of the mounted step

use crossterm::event::{KeyCode, KeyEvent};

use crate::sections::{
    FieldFocus, GeneralInfo, LineList, ResourceGroups, SectionKind, SectionPayload, TextBlock,
    UnitList, WeeklyProgramme, MAX_WEEKLY_HOURS,
};
use crate::ui::form_field::FormField;

/// Form fields of the general data step: (focus key, label)
pub(crate) const GENERAL_FIELDS: [(&str, &str); 5] = [
    ("course_name", "Nombre del curso"),
    ("semester", "Semestre"),
    ("credits", "Créditos"),
    ("weekly_hours", "Horas semanales"),
    ("teacher", "Docente"),
];

const MAX_CREDITS: u32 = 30;

/// Selection inside the weekly programme
#[derive(Default)]
pub struct ProgrammeCursor {
    pub week: usize,
    pub activity: usize,
    /// Name input for an activity being added
    pub naming: Option<FormField>,
}

/// Widgets of the mounted step; dropped when the step unmounts
pub enum StepEditor {
    Loading,
    /// The load failed; nothing to edit until a reload succeeds
    Unavailable,
    General { fields: Vec<FormField>, focus: usize },
    Text { field: FormField },
    Programme(ProgrammeCursor),
}

fn placeholder(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Summary => "Describe brevemente la naturaleza y el propósito del curso",
        SectionKind::Competencies => "Una competencia por línea",
        SectionKind::Units => "Una unidad por línea: Nombre | semana inicio-semana fin",
        SectionKind::Strategies => "Una estrategia por línea",
        SectionKind::Resources => "Un recurso por línea: Grupo: recurso",
        SectionKind::Evaluation => "Sistema de evaluación",
        SectionKind::References => "Una referencia por línea",
        _ => "",
    }
}

impl StepEditor {
    /// Build the widgets for a freshly loaded draft
    pub fn for_payload(kind: SectionKind, payload: &SectionPayload) -> Self {
        match payload {
            SectionPayload::General(info) => StepEditor::General {
                fields: vec![
                    FormField::text(&info.course_name, "Ej. Cálculo I", Some(120)),
                    FormField::text(&info.semester, "Ej. 2026-I", Some(20)),
                    FormField::number(u32::from(info.credits), MAX_CREDITS),
                    FormField::number(u32::from(info.weekly_hours), u32::from(MAX_WEEKLY_HOURS)),
                    FormField::text(&info.teacher, "Nombre del docente", Some(120)),
                ],
                focus: 0,
            },
            SectionPayload::Text(block) => StepEditor::Text {
                field: FormField::textarea(&block.content, placeholder(kind)),
            },
            SectionPayload::Lines(list) => StepEditor::Text {
                field: FormField::textarea(&list.items.join("\n"), placeholder(kind)),
            },
            SectionPayload::Units(units) => StepEditor::Text {
                field: FormField::textarea(&units.to_text(), placeholder(kind)),
            },
            SectionPayload::Resources(groups) => StepEditor::Text {
                field: FormField::textarea(&groups.to_text(), placeholder(kind)),
            },
            SectionPayload::Programme(_) => StepEditor::Programme(ProgrammeCursor::default()),
        }
    }

    /// Current widget contents as a section value.
    ///
    /// `None` for the programme, which is edited through the allocator.
    pub fn to_payload(&self, kind: SectionKind) -> Option<SectionPayload> {
        match self {
            StepEditor::General { fields, .. } => {
                let number = |i: usize| u8::try_from(fields[i].number_value()).unwrap_or(u8::MAX);
                Some(SectionPayload::General(GeneralInfo {
                    course_name: fields[0].value().trim().to_string(),
                    semester: fields[1].value().trim().to_string(),
                    credits: number(2),
                    weekly_hours: number(3),
                    teacher: fields[4].value().trim().to_string(),
                }))
            }
            StepEditor::Text { field } => {
                let text = field.value();
                Some(match kind {
                    SectionKind::Summary | SectionKind::Evaluation => {
                        SectionPayload::Text(TextBlock::new(text))
                    }
                    SectionKind::Units => SectionPayload::Units(UnitList::from_text(&text)),
                    SectionKind::Resources => {
                        SectionPayload::Resources(ResourceGroups::from_text(&text))
                    }
                    _ => SectionPayload::Lines(LineList::from_text(&text)),
                })
            }
            _ => None,
        }
    }

    /// Route a key to the focused widget; true when the value may have changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self {
            StepEditor::General { fields, focus } => match key.code {
                KeyCode::Tab => {
                    *focus = (*focus + 1) % fields.len();
                    false
                }
                KeyCode::BackTab => {
                    *focus = (*focus + fields.len() - 1) % fields.len();
                    false
                }
                _ => fields[*focus].handle_key(key),
            },
            StepEditor::Text { field } => field.handle_key(key),
            _ => false,
        }
    }

    /// Move input focus to where a validation error points
    pub fn apply_focus(&mut self, focus: &FieldFocus, programme: Option<&WeeklyProgramme>) {
        match (self, focus) {
            (StepEditor::General { focus: current, .. }, FieldFocus::Field(name)) => {
                if let Some(i) = GENERAL_FIELDS.iter().position(|(key, _)| key == name) {
                    *current = i;
                }
            }
            (StepEditor::Text { field }, FieldFocus::Line(line)) => field.focus_line(*line),
            (StepEditor::Programme(cursor), FieldFocus::Week(week)) => {
                if let Some(i) =
                    programme.and_then(|p| p.weeks.iter().position(|w| w.week == *week))
                {
                    cursor.week = i;
                    cursor.activity = 0;
                }
            }
            _ => {}
        }
    }
}
