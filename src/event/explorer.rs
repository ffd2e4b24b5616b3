use crossterm::event::KeyCode;

use crate::app::App;
use crate::event::EventResult;
use crate::tree::NodeKind;

pub fn handle_explorer_key(app: &mut App, key: KeyCode) -> EventResult {
    if key == KeyCode::Char('m') {
        return Ok(open_menu_at_selection(app));
    }
    let explorer = &mut app.explorer;
    let changed = match key {
        KeyCode::Up | KeyCode::Char('k') => explorer.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => explorer.select_next(),
        KeyCode::Home => explorer.select_first(),
        KeyCode::End => explorer.select_last(),
        KeyCode::Right | KeyCode::Char('l') => explorer.expand_or_enter(),
        KeyCode::Left | KeyCode::Char('h') => explorer.collapse_or_parent(),
        KeyCode::Enter | KeyCode::Char(' ') => match explorer.selected_id().map(str::to_string) {
            Some(id) => explorer.activate(&id),
            None => explorer.select_first(),
        },
        KeyCode::Char('a') => explorer.start_creating(NodeKind::File, None, false),
        KeyCode::Char('A') => explorer.start_creating(NodeKind::Folder, None, false),
        KeyCode::Char('r') | KeyCode::F(2) => match explorer.selected_id().map(str::to_string) {
            Some(id) => explorer.start_renaming(&id),
            None => false,
        },
        KeyCode::Char('d') | KeyCode::Delete => match explorer.selected_id().map(str::to_string) {
            Some(id) => explorer.delete(&id),
            None => false,
        },
        _ => false,
    };
    Ok(changed)
}

/// Keyboard equivalent of a right click: the menu opens beside the
/// selected row, or at the top of the tree bound to the root.
fn open_menu_at_selection(app: &mut App) -> bool {
    let area = app.ui.tree_area;
    let selected = app.explorer.selected_id().map(str::to_string);
    let row = selected.as_deref().and_then(|id| {
        app.ui
            .tree_rows
            .iter()
            .position(|row| row.as_deref() == Some(id))
    });
    let (x, y) = match row {
        Some(index) => (area.x + 2, area.y + index as u16),
        None => (area.x, area.y),
    };
    app.explorer.open_context_menu(x, y, selected.as_deref())
}

/// Keys while an inline name input is open
pub fn handle_draft_key(app: &mut App, key: KeyCode) -> EventResult {
    match key {
        KeyCode::Char(c) => app.explorer.draft_insert(c),
        KeyCode::Backspace => app.explorer.draft_backspace(),
        KeyCode::Enter => {
            app.explorer.commit_draft();
        }
        KeyCode::Esc => {
            app.explorer.cancel_draft();
            app.status_message = app.t("explorer", "status.cancelled");
        }
        _ => return Ok(false),
    }
    Ok(true)
}

/// Keys while the context menu is open; anything else closes it
pub fn handle_menu_key(app: &mut App, key: KeyCode) -> EventResult {
    let explorer = &mut app.explorer;
    match key {
        KeyCode::Up | KeyCode::Char('k') => explorer.menu_highlight_previous(),
        KeyCode::Down | KeyCode::Char('j') => explorer.menu_highlight_next(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            explorer.activate_highlighted_menu_entry();
        }
        _ => explorer.close_context_menu(),
    }
    Ok(true)
}
