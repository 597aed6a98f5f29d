//! Form field widgets used by the wizard steps

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_textarea::{CursorMove, TextArea};

/// A form field widget that can handle different input types
pub enum FormField {
    /// Single-line text input; `cursor_pos` counts chars, not bytes
    TextInput {
        value: String,
        cursor_pos: usize,
        placeholder: String,
        max_length: Option<usize>,
    },
    /// Digits only, bounded by `max`
    NumberInput { value: String, max: u32 },
    /// Multi-line text input using tui-textarea
    TextArea {
        textarea: Box<TextArea<'static>>,
        placeholder: String,
    },
}

fn byte_index(value: &str, char_pos: usize) -> usize {
    value
        .char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}

impl FormField {
    pub fn text(value: &str, placeholder: &str, max_length: Option<usize>) -> Self {
        FormField::TextInput {
            value: value.to_string(),
            cursor_pos: value.chars().count(),
            placeholder: placeholder.to_string(),
            max_length,
        }
    }

    pub fn number(value: u32, max: u32) -> Self {
        FormField::NumberInput {
            value: if value == 0 {
                String::new()
            } else {
                value.to_string()
            },
            max,
        }
    }

    pub fn textarea(value: &str, placeholder: &str) -> Self {
        let mut textarea = TextArea::from(value.lines().map(str::to_string).collect::<Vec<_>>());
        textarea.move_cursor(CursorMove::Bottom);
        textarea.move_cursor(CursorMove::End);
        FormField::TextArea {
            textarea: Box::new(textarea),
            placeholder: placeholder.to_string(),
        }
    }

    /// Get the current value as a string
    pub fn value(&self) -> String {
        match self {
            FormField::TextInput { value, .. } => value.clone(),
            FormField::NumberInput { value, .. } => value.clone(),
            FormField::TextArea { textarea, .. } => textarea.lines().join("\n"),
        }
    }

    /// Numeric value; blank or non-numeric input is 0
    pub fn number_value(&self) -> u32 {
        self.value().trim().parse().unwrap_or(0)
    }

    /// Put the cursor on a zero-based line of a text area
    pub fn focus_line(&mut self, line: usize) {
        if let FormField::TextArea { textarea, .. } = self {
            let row = u16::try_from(line).unwrap_or(u16::MAX);
            textarea.move_cursor(CursorMove::Jump(row, 0));
        }
    }

    /// Handle a key event, returns true if the value may have changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                max_length,
                ..
            } => {
                let len = value.chars().count();
                match key.code {
                    KeyCode::Char(c) => {
                        if max_length.map(|m| len < m).unwrap_or(true) {
                            value.insert(byte_index(value, *cursor_pos), c);
                            *cursor_pos += 1;
                        }
                        true
                    }
                    KeyCode::Backspace => {
                        if *cursor_pos > 0 {
                            *cursor_pos -= 1;
                            value.remove(byte_index(value, *cursor_pos));
                        }
                        true
                    }
                    KeyCode::Delete => {
                        if *cursor_pos < len {
                            value.remove(byte_index(value, *cursor_pos));
                        }
                        true
                    }
                    KeyCode::Left => {
                        *cursor_pos = cursor_pos.saturating_sub(1);
                        false
                    }
                    KeyCode::Right => {
                        *cursor_pos = (*cursor_pos + 1).min(len);
                        false
                    }
                    KeyCode::Home => {
                        *cursor_pos = 0;
                        false
                    }
                    KeyCode::End => {
                        *cursor_pos = len;
                        false
                    }
                    _ => false,
                }
            }
            FormField::NumberInput { value, max } => match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    let candidate = format!("{}{}", value, c);
                    if candidate.parse::<u32>().map(|n| n <= *max).unwrap_or(false) {
                        *value = candidate;
                    }
                    true
                }
                KeyCode::Backspace => {
                    value.pop();
                    true
                }
                KeyCode::Up => {
                    let n = value.parse::<u32>().unwrap_or(0);
                    *value = (n + 1).min(*max).to_string();
                    true
                }
                KeyCode::Down => {
                    let n = value.parse::<u32>().unwrap_or(0);
                    *value = n.saturating_sub(1).to_string();
                    true
                }
                _ => false,
            },
            FormField::TextArea { textarea, .. } => {
                // Wizard shortcuts use Ctrl/Alt; everything else is text editing
                if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    && matches!(key.code, KeyCode::Char(_))
                {
                    return false;
                }
                textarea.input(key)
            }
        }
    }

    /// Get the height needed to render this field
    pub fn render_height(&self) -> u16 {
        match self {
            FormField::TextInput { .. } | FormField::NumberInput { .. } => 1,
            FormField::TextArea { .. } => 8,
        }
    }

    /// Render the field
    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let border_color = if focused { Color::Cyan } else { Color::Gray };

        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                placeholder,
                max_length,
            } => {
                let content = if value.is_empty() && !focused {
                    Line::from(Span::styled(
                        placeholder.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ))
                } else {
                    let mut text = value.clone();
                    if focused {
                        text.insert(byte_index(&text, *cursor_pos), '|');
                    }
                    let suffix = max_length
                        .map(|m| format!(" ({}/{})", value.chars().count(), m))
                        .unwrap_or_default();
                    Line::from(vec![
                        Span::raw(text),
                        Span::styled(suffix, Style::default().fg(Color::DarkGray)),
                    ])
                };

                let para = Paragraph::new(content).style(Style::default().fg(if focused {
                    Color::White
                } else {
                    Color::Gray
                }));
                frame.render_widget(para, area);
            }
            FormField::NumberInput { value, max } => {
                let mut text = value.clone();
                if focused {
                    text.push('|');
                }
                let para = Paragraph::new(Line::from(vec![
                    Span::raw(text),
                    Span::styled(
                        format!(" (0-{})", max),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
                .style(Style::default().fg(if focused {
                    Color::White
                } else {
                    Color::Gray
                }));
                frame.render_widget(para, area);
            }
            FormField::TextArea {
                textarea,
                placeholder,
            } => {
                textarea.set_cursor_line_style(Style::default());
                textarea.set_cursor_style(if focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                });
                textarea.set_block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(border_color)),
                );
                textarea.set_placeholder_text(placeholder.clone());
                textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));

                frame.render_widget(&**textarea, area);
            }
        }
    }
}
