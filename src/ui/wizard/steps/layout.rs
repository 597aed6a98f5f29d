//! Wizard frame: header, step strip, body, messages and controls

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::sections::SectionKind;
use crate::ui::wizard::{StepEditor, WizardScreen};
use crate::wizard::StepGate;

impl WizardScreen {
    pub(crate) fn render_wizard(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(1), // Step strip
                Constraint::Min(8),    // Step body
                Constraint::Length(2), // Error / notice
                Constraint::Length(1), // Controls
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        self.render_step_strip(frame, chunks[1]);

        // Only the gate of the current step produces a body
        let controller = self.controller.clone();
        for kind in SectionKind::all() {
            StepGate::new(kind.step()).render(&controller, || {
                self.render_step_body(frame, chunks[2], *kind)
            });
        }

        self.render_messages(frame, chunks[3]);
        self.render_controls(frame, chunks[4]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            "Sílabo",
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(code) = self.identity.course_code() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(code.to_string(), Style::default().fg(Color::Cyan)));
        }
        if !self.identity.course_name().is_empty() {
            spans.push(Span::raw(format!("  {}", self.identity.course_name())));
        }
        spans.push(Span::raw("  "));
        spans.push(match self.identity.syllabus_id() {
            Some(id) => Span::styled(format!("#{}", id), Style::default().fg(Color::Green)),
            None => Span::styled("(sin guardar)", Style::default().fg(Color::DarkGray)),
        });

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(header, area);
    }

    fn render_step_strip(&self, frame: &mut Frame, area: Rect) {
        let current = self.controller.current_step();
        let spans: Vec<Span> = SectionKind::all()
            .iter()
            .map(|kind| {
                let step = kind.step();
                let style = if step == current {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else if step <= self.max_visited {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Span::styled(format!(" {} ", step), style)
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
    }

    fn render_step_body(&mut self, frame: &mut Frame, area: Rect, kind: SectionKind) {
        let block = Block::default()
            .title(format!(
                " Paso {} de {}: {} ",
                kind.step(),
                self.controller.total_steps(),
                kind.title()
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match self.editor {
            StepEditor::Loading => {
                let loading = Paragraph::new("Cargando...")
                    .style(Style::default().fg(Color::Gray))
                    .alignment(Alignment::Center);
                frame.render_widget(loading, inner);
            }
            StepEditor::Unavailable => {
                let message = Paragraph::new(vec![
                    Line::from("No se pudo cargar la sección."),
                    Line::from(vec![
                        Span::styled("Ctrl+R", Style::default().fg(Color::Yellow)),
                        Span::raw(" para reintentar"),
                    ]),
                ])
                .alignment(Alignment::Center);
                frame.render_widget(message, inner);
            }
            StepEditor::General { .. } => self.render_general_step(frame, inner),
            StepEditor::Text { .. } => self.render_text_step(frame, inner),
            StepEditor::Programme(_) => self.render_programme_step(frame, inner),
        }
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect) {
        let step = self.step.as_ref();
        let line = if let Some(err) = step.and_then(|s| s.error()) {
            let mut spans = vec![Span::styled(
                err.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )];
            if err.is_retryable() {
                spans.push(Span::styled(
                    "  (Ctrl+N para reintentar)",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        } else if let Some(notice) = step.and_then(|s| s.notice()) {
            Line::from(Span::styled(notice.to_string(), Style::default().fg(Color::Yellow)))
        } else if let Some(status) = &self.status {
            Line::from(Span::styled(status.clone(), Style::default().fg(Color::Gray)))
        } else {
            Line::from("")
        };
        frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect) {
        let is_saving = self.step.as_ref().is_some_and(|s| s.is_saving());
        let state = StepGate::new(self.controller.current_step()).controls(&self.controller, is_saving);

        let enabled = |on: bool, color: Color| {
            if on {
                Style::default().fg(color)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };

        let advance_label = if is_saving {
            " guardando...  |  "
        } else if state.is_last {
            " guardar  |  "
        } else {
            " guardar y continuar  |  "
        };

        let controls = Paragraph::new(Line::from(vec![
            Span::styled("Ctrl+P", enabled(state.back_enabled, Color::Yellow)),
            Span::styled(" anterior  |  ", enabled(state.back_enabled, Color::Gray)),
            Span::styled("Ctrl+N", enabled(state.advance_enabled, Color::Green)),
            Span::styled(advance_label, enabled(state.advance_enabled, Color::Gray)),
            Span::styled("F1", Style::default().fg(Color::Cyan)),
            Span::raw(" ayuda  |  "),
            Span::styled("Ctrl+Q", Style::default().fg(Color::Red)),
            Span::raw(" salir"),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(controls, area);
    }
}
