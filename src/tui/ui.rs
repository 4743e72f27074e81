//! UI rendering for the wizard.
//!
//! Handles layout and widget rendering using ratatui. One panel per
//! workflow stage, plus a progress header and a status bar.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
    Frame,
};

use crate::render;
use crate::workflow::{FormField, WorkflowStage};

use super::WizardApp;

/// Draw the main UI.
pub fn draw(frame: &mut Frame, app: &WizardApp) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress header
            Constraint::Length(2), // Error / notice line
            Constraint::Min(8),    // Stage panel
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    draw_messages(frame, app, chunks[1]);

    match app.workflow.stage() {
        WorkflowStage::Ingest => draw_ingest(frame, app, chunks[2]),
        WorkflowStage::Configure => draw_configure(frame, app, chunks[2]),
        WorkflowStage::Result => draw_result(frame, app, chunks[2]),
    }

    draw_status_bar(frame, app, chunks[3]);

    if app.choice_open {
        draw_choice_popup(frame, app, area);
    }
}

fn draw_header(frame: &mut Frame, app: &WizardApp, area: Rect) {
    let current = app.stage_number();
    let steps = [(1, "Upload Outline"), (2, "Configure Plan"), (3, "Generated Plan")];

    let mut spans = vec![Span::styled(
        " Lessonforge ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    for (number, label) in steps {
        let style = if number == current {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if number < current {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("{number} {label}"), style));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    frame.render_widget(header, area);
}

fn draw_messages(frame: &mut Frame, app: &WizardApp, area: Rect) {
    let line = if let Some(error) = app.workflow.error() {
        Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red)))
    } else if let Some(notice) = app.workflow.notice() {
        Line::from(Span::styled(notice.to_string(), Style::default().fg(Color::Green)))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
}

fn draw_ingest(frame: &mut Frame, app: &WizardApp, area: Rect) {
    let title = if app.workflow.is_busy() {
        " Processing document... extracting subject information "
    } else {
        " Course outline (PDF) "
    };

    let input = Paragraph::new(app.path_input.as_str())
        .block(Block::default().borders(Borders::ALL).title(title).padding(Padding::horizontal(1)));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);
    frame.render_widget(input, chunks[0]);

    if !app.workflow.is_busy() {
        // +2 accounts for the border and padding
        frame.set_cursor_position((
            chunks[0].x.saturating_add(2 + cursor_column(&app.path_input, app.cursor_position)),
            chunks[0].y + 1,
        ));
    }

    let help = Paragraph::new(
        "Type the path to a unit outline PDF and press Enter.\n\
         Supports text-based PDFs containing a timetable of activities.",
    )
    .style(Style::default().fg(Color::DarkGray))
    .wrap(Wrap { trim: true });
    frame.render_widget(help, chunks[1]);
}

/// Terminal column of the cursor within the input, clamped instead of
/// wrapping when the typed path is longer than a `u16` can hold.
fn cursor_column(input: &str, cursor: usize) -> u16 {
    u16::try_from(input[..cursor].chars().count()).unwrap_or(u16::MAX)
}

fn draw_configure(frame: &mut Frame, app: &WizardApp, area: Rect) {
    let items: Vec<ListItem> = FormField::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let value = app.workflow.form().value(*field);
            let shown = if value.is_empty() {
                if *field == FormField::FocusTopic && app.choices_for(*field).is_empty() {
                    "(no focus topics for this lecture)"
                } else {
                    "(select)"
                }
            } else {
                value
            };

            let style = if i == app.field_index {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<24}", field.label()), style),
                Span::styled(shown.to_string(), Style::default().fg(Color::White)),
            ]))
        })
        .collect();

    let ready = app.workflow.form_complete();
    let title = if app.workflow.is_busy() {
        " Generating... ".to_string()
    } else if ready {
        " Create your lesson plan - press g to generate ".to_string()
    } else {
        " Create your lesson plan ".to_string()
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title).padding(Padding::horizontal(1)));
    frame.render_widget(list, area);
}

fn draw_result(frame: &mut Frame, app: &WizardApp, area: Rect) {
    let Some(plan) = app.workflow.plan() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let meta = &plan.request_data;
    let summary = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Subject: ", Style::default().fg(Color::DarkGray)),
            Span::raw(meta.subject_name.clone()),
            Span::styled("   Duration: ", Style::default().fg(Color::DarkGray)),
            Span::raw(meta.lesson_duration.clone()),
        ]),
        Line::from(vec![
            Span::styled("Lecture: ", Style::default().fg(Color::DarkGray)),
            Span::raw(meta.lecture_topic.clone()),
            Span::styled("   Focus: ", Style::default().fg(Color::DarkGray)),
            Span::raw(meta.focus_topic.clone()),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Lesson plan generated "));
    frame.render_widget(summary, chunks[0]);

    let lines = plan_lines(&plan.content);
    let scroll = app.result_scroll.min(lines.len().saturating_sub(1)) as u16;
    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).padding(Padding::horizontal(1)))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(content, chunks[1]);
}

/// Convert segmented plan content into styled text lines.
fn plan_lines(content: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in render::segment(content) {
        match block {
            render::Block::Heading { text, lines: body } => {
                lines.push(Line::from(Span::styled(
                    text,
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in body {
                    lines.push(Line::from(format!("    {line}")));
                }
            }
            render::Block::Body { lines: body } => {
                for line in body {
                    match line {
                        render::Line::Bullet(item) => {
                            lines.push(Line::from(vec![
                                Span::styled("  • ", Style::default().fg(Color::Cyan)),
                                Span::raw(item),
                            ]));
                        }
                        render::Line::Paragraph(text) => lines.push(Line::from(text)),
                    }
                }
            }
        }
        lines.push(Line::default());
    }
    lines
}

fn draw_status_bar(frame: &mut Frame, app: &WizardApp, area: Rect) {
    if !app.config.ui.show_hints {
        return;
    }

    let hints = match app.workflow.stage() {
        WorkflowStage::Ingest => "Enter upload  Esc quit",
        WorkflowStage::Configure => {
            if app.choice_open {
                "↑/↓ choose  Enter select  Esc close"
            } else {
                "↑/↓ field  Enter choose  g generate  r start over  q quit"
            }
        }
        WorkflowStage::Result => "↑/↓ scroll  d download PDF  r create another plan  q quit",
    };

    let bar = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(bar, area);
}

fn draw_choice_popup(frame: &mut Frame, app: &WizardApp, area: Rect) {
    let field = app.selected_field();
    let choices = app.choices_for(field);

    let popup = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup);

    let items: Vec<ListItem> = choices
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let style = if i == app.choice_index {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(choice.clone(), style))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", field.label()))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(list, popup);
}

/// Centered rect helper for popups.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
