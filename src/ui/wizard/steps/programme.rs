//! Weekly programme step rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::sections::{SectionPayload, WeekPlan};
use crate::ui::wizard::{StepEditor, WizardScreen};

fn week_line(plan: &WeekPlan, selected: bool, activity: usize) -> Line<'static> {
    let allocated = plan.allocated_hours();
    let balance_style = if plan.is_balanced() {
        Style::default().fg(Color::Green)
    } else if allocated > u32::from(plan.hours_available) {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let marker = if selected { "> " } else { "  " };
    let mut spans = vec![
        Span::styled(
            format!("{}Semana {:>2} ", marker, plan.week),
            if selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            },
        ),
        Span::styled(
            format!("[{}/{} h] ", allocated, plan.hours_available),
            balance_style,
        ),
    ];

    if plan.activities.is_empty() {
        spans.push(Span::styled("sin actividades", Style::default().fg(Color::DarkGray)));
    }
    for (i, a) in plan.activities.iter().enumerate() {
        let style = if selected && i == activity {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(
            format!(" {} ({}h) ", a.name, a.hours.value()),
            style,
        ));
    }
    Line::from(spans)
}

impl WizardScreen {
    pub(crate) fn render_programme_step(&mut self, frame: &mut Frame, area: Rect) {
        let Some(SectionPayload::Programme(programme)) =
            self.step.as_ref().and_then(|s| s.draft()).map(|d| d.value())
        else {
            return;
        };
        let StepEditor::Programme(cursor) = &mut self.editor else {
            return;
        };

        let naming_height = if cursor.naming.is_some() { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(naming_height),
                Constraint::Length(1),
            ])
            .split(area);

        if programme.weeks.is_empty() {
            let empty = Paragraph::new(
                "No hay semanas que programar. Define las unidades (paso 4) y las horas semanales (paso 1).",
            )
            .style(Style::default().fg(Color::Yellow));
            frame.render_widget(empty, chunks[0]);
            return;
        }

        let lines: Vec<Line> = programme
            .weeks
            .iter()
            .enumerate()
            .map(|(i, plan)| week_line(plan, i == cursor.week, cursor.activity))
            .collect();
        let visible = usize::from(chunks[0].height.max(1));
        let scroll = cursor.week.saturating_sub(visible - 1);
        frame.render_widget(
            Paragraph::new(lines).scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
            chunks[0],
        );

        if let Some(naming) = cursor.naming.as_mut() {
            let block = Block::default()
                .title(" Nueva actividad (Enter agrega, Esc cancela) ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan));
            let inner = block.inner(chunks[1]);
            frame.render_widget(block, chunks[1]);
            naming.render(frame, inner, true);
        }

        let unbalanced = programme.weeks.iter().filter(|w| !w.is_balanced()).count();
        let summary = if unbalanced == 0 {
            Span::styled(
                "Todas las semanas usan sus horas exactas.",
                Style::default().fg(Color::Green),
            )
        } else {
            Span::styled(
                format!("{} semana(s) sin cuadrar.", unbalanced),
                Style::default().fg(Color::Yellow),
            )
        };
        frame.render_widget(Paragraph::new(Line::from(summary)), chunks[2]);
    }
}
