use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;

/// Result from the submit-for-review dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    Confirmed { syllabus_id: u64 },
    Cancelled,
}

/// Offered after the last section saves: send the syllabus to the coordinator
pub struct SubmitDialog {
    pub visible: bool,
    syllabus_id: u64,
    course: String,
    /// Whether the submit request is in flight
    pub submitting: bool,
    status_message: Option<String>,
}

impl Default for SubmitDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            syllabus_id: 0,
            course: String::new(),
            submitting: false,
            status_message: None,
        }
    }

    pub fn show(&mut self, syllabus_id: u64, course: &str) {
        self.syllabus_id = syllabus_id;
        self.course = course.to_string();
        self.submitting = false;
        self.status_message = None;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.submitting = false;
        self.status_message = None;
    }

    /// Show a failed submission so the user can retry or cancel
    pub fn set_failed(&mut self, message: &str) {
        self.submitting = false;
        self.status_message = Some(message.to_string());
    }

    /// Handle key input, returns Some(result) if an action was triggered
    pub fn handle_key(&mut self, key: KeyCode) -> Option<SubmitResult> {
        if self.submitting {
            return None;
        }

        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('s') | KeyCode::Enter => {
                self.submitting = true;
                self.status_message = Some("Enviando...".to_string());
                Some(SubmitResult::Confirmed {
                    syllabus_id: self.syllabus_id,
                })
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.hide();
                Some(SubmitResult::Cancelled)
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }

        let area = centered_rect(55, 35, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(" Enviar a revisión ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Body
                Constraint::Length(2), // Status message
                Constraint::Length(2), // Footer
            ])
            .margin(1)
            .split(inner);

        let body = Paragraph::new(vec![
            Line::from(vec![
                Span::raw("Todas las secciones del sílabo "),
                Span::styled(
                    format!("#{}", self.syllabus_id),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" están guardadas."),
            ]),
            Line::from(Span::styled(
                self.course.clone(),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(""),
            Line::from("¿Enviarlo al coordinador para su revisión?"),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(body, chunks[0]);

        if let Some(ref message) = self.status_message {
            let status = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(status, chunks[1]);
        }

        let footer = if self.submitting {
            Line::from(Span::styled(
                " Enviando... ",
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Line::from(vec![
                Span::styled(
                    " [S]í, enviar ",
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("   "),
                Span::styled(" [N]o, más tarde ", Style::default().fg(Color::Red)),
            ])
        };
        frame.render_widget(Paragraph::new(footer).alignment(Alignment::Center), chunks[2]);
    }
}
