//! Keyboard input handling for the wizard.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::workflow::WorkflowStage;

use super::WizardApp;

/// Handle a single key event.
pub fn handle_key(key: KeyEvent, app: &mut WizardApp) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.workflow.stage() {
        WorkflowStage::Ingest => handle_ingest_key(key, app),
        WorkflowStage::Configure => handle_configure_key(key, app),
        WorkflowStage::Result => handle_result_key(key, app),
    }
}

/// Ingest stage: a single text input for the document path.
fn handle_ingest_key(key: KeyEvent, app: &mut WizardApp) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => {
            if !app.workflow.is_busy() && !app.path_input.trim().is_empty() {
                app.spawn_ingest();
            }
        }
        KeyCode::Char(c) => {
            app.path_input.insert(app.cursor_position, c);
            app.cursor_position += c.len_utf8();
        }
        KeyCode::Backspace => {
            if app.cursor_position > 0 {
                let prev = app.path_input[..app.cursor_position]
                    .chars()
                    .next_back()
                    .map_or(0, char::len_utf8);
                app.cursor_position -= prev;
                app.path_input.remove(app.cursor_position);
            }
        }
        KeyCode::Left => {
            let prev = app.path_input[..app.cursor_position]
                .chars()
                .next_back()
                .map_or(0, char::len_utf8);
            app.cursor_position = app.cursor_position.saturating_sub(prev);
        }
        KeyCode::Right => {
            let next = app.path_input[app.cursor_position..]
                .chars()
                .next()
                .map_or(0, char::len_utf8);
            app.cursor_position = (app.cursor_position + next).min(app.path_input.len());
        }
        KeyCode::Home => app.cursor_position = 0,
        KeyCode::End => app.cursor_position = app.path_input.len(),
        _ => {}
    }
}

/// Configure stage: field list navigation plus a choice popup.
fn handle_configure_key(key: KeyEvent, app: &mut WizardApp) {
    if app.choice_open {
        handle_choice_key(key, app);
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up => {
            app.field_index = app.field_index.saturating_sub(1);
        }
        KeyCode::Down => {
            app.field_index = (app.field_index + 1).min(crate::workflow::FormField::ALL.len() - 1);
        }
        KeyCode::Enter => {
            let field = app.selected_field();
            if !app.choices_for(field).is_empty() {
                app.choice_open = true;
                app.choice_index = 0;
            }
        }
        KeyCode::Char('g') => {
            if !app.workflow.is_busy() {
                app.spawn_generation();
            }
        }
        KeyCode::Char('r') => app.reset(),
        _ => {}
    }
}

/// Choice popup: pick a value for the selected field.
fn handle_choice_key(key: KeyEvent, app: &mut WizardApp) {
    let field = app.selected_field();
    let choices = app.choices_for(field);

    match key.code {
        KeyCode::Esc => app.choice_open = false,
        KeyCode::Up => {
            app.choice_index = app.choice_index.saturating_sub(1);
        }
        KeyCode::Down => {
            if !choices.is_empty() {
                app.choice_index = (app.choice_index + 1).min(choices.len() - 1);
            }
        }
        KeyCode::Enter => {
            if let Some(value) = choices.get(app.choice_index) {
                app.workflow.form_mut().set(field, value.clone());
            }
            app.choice_open = false;
        }
        _ => {}
    }
}

/// Result stage: scroll the rendered plan, download, or start over.
fn handle_result_key(key: KeyEvent, app: &mut WizardApp) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up => app.result_scroll = app.result_scroll.saturating_sub(1),
        KeyCode::Down => app.result_scroll = app.result_scroll.saturating_add(1),
        KeyCode::PageUp => app.result_scroll = app.result_scroll.saturating_sub(10),
        KeyCode::PageDown => app.result_scroll = app.result_scroll.saturating_add(10),
        KeyCode::Home => app.result_scroll = 0,
        KeyCode::Char('d') => {
            if !app.workflow.is_busy() {
                app.spawn_download();
            }
        }
        KeyCode::Char('r') => app.reset(),
        _ => {}
    }
}
