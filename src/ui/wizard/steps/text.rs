//! Free-text and line-list steps

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::sections::SectionKind;
use crate::ui::wizard::{StepEditor, WizardScreen};

fn hint(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Units => "Formato: Nombre de la unidad | 1-4",
        SectionKind::Resources => "Formato: Grupo: recurso (sin grupo va a \"General\")",
        SectionKind::Summary | SectionKind::Evaluation => "Texto libre",
        _ => "Un elemento por línea",
    }
}

impl WizardScreen {
    pub(crate) fn render_text_step(&mut self, frame: &mut Frame, area: Rect) {
        let kind = self.current_kind();
        let defaulted = self
            .step
            .as_ref()
            .and_then(|s| s.draft())
            .is_some_and(|d| d.is_defaulted());

        let StepEditor::Text { field } = &mut self.editor else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3)])
            .split(area);

        let mut spans = vec![Span::styled(hint(kind), Style::default().fg(Color::DarkGray))];
        if defaulted {
            spans.push(Span::styled(
                "  · valores sugeridos, edítalos o guarda para aceptarlos",
                Style::default().fg(Color::Yellow),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);
        field.render(frame, chunks[1], true);
    }
}
