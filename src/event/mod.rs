use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::app::{App, Page};
use crate::async_task::Task;

pub mod explorer;
pub mod grid;
pub mod mouse;

pub use explorer::*;
pub use grid::*;
pub use mouse::*;

pub type EventResult = Result<bool, Box<dyn std::error::Error>>;

/// Dispatch one terminal event. Returns true when the UI needs a redraw.
pub fn handle_event(event: Event, app: &mut App, async_sender: &mpsc::Sender<Task>) -> EventResult {
    let changed = match event {
        Event::Key(key) => handle_key(key, app, async_sender)?,
        Event::Mouse(mouse) => handle_mouse_event(app, mouse, async_sender)?,
        Event::Resize(_, _) => {
            // Popups are positioned in screen cells
            app.explorer.close_context_menu();
            true
        }
        _ => false,
    };
    app.process_explorer_events();
    Ok(changed)
}

fn handle_key(key: KeyEvent, app: &mut App, async_sender: &mpsc::Sender<Task>) -> EventResult {
    if key.kind != KeyEventKind::Press {
        return Ok(false);
    }
    // The inline input and the open menu own the keyboard
    if app.explorer.is_editing() {
        return handle_draft_key(app, key.code);
    }
    if app.explorer.context_menu().is_some() {
        return handle_menu_key(app, key.code);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
            return Ok(false);
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return Ok(false);
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.next_page();
            return Ok(true);
        }
        KeyCode::Char('t') => {
            app.cycle_theme();
            return Ok(true);
        }
        KeyCode::Char('L') => {
            request_language_change(app, async_sender);
            return Ok(true);
        }
        _ => {}
    }

    match app.page {
        Page::Explorer => handle_explorer_key(app, key.code),
        Page::Grid => handle_grid_key(app, key.code),
    }
}

/// Hand the next language to the worker; load it here if the queue is full
pub fn request_language_change(app: &mut App, async_sender: &mpsc::Sender<Task>) {
    let task = app.next_language_task();
    let language = match &task {
        Task::LoadLanguage { language, .. } => language.clone(),
        Task::ResolveIcon { .. } => return,
    };
    if app.i18n.current_language() == language {
        return;
    }
    match async_sender.try_send(task) {
        Ok(()) => {
            app.status_message = format!("Loading {}...", language);
        }
        Err(e) => {
            log::warn!("Language task not queued ({}), loading inline", e);
            app.change_language(&language);
        }
    }
}
