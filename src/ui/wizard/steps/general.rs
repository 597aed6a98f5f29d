//! General data step rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::wizard::editor::GENERAL_FIELDS;
use crate::ui::wizard::{StepEditor, WizardScreen};

impl WizardScreen {
    pub(crate) fn render_general_step(&mut self, frame: &mut Frame, area: Rect) {
        let StepEditor::General { fields, focus } = &mut self.editor else {
            return;
        };

        let mut constraints: Vec<Constraint> = fields
            .iter()
            .map(|f| Constraint::Length(f.render_height() + 1))
            .collect();
        constraints.push(Constraint::Min(0));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(constraints)
            .split(area);

        for (i, (field, (_, label))) in fields.iter_mut().zip(GENERAL_FIELDS.iter()).enumerate() {
            let focused = i == *focus;
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(20), Constraint::Min(10)])
                .split(rows[i]);

            let label_style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(format!("{}:", label), label_style))),
                cols[0],
            );
            field.render(frame, cols[1], focused);
        }
    }
}
