use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

use crate::app::{App, Page};
use crate::async_task::Task;
use crate::context_menu::{self, ContextMenu, MenuAction, MenuEntry};
use crate::event::{request_language_change, EventResult};
use crate::tree::NodeKind;

pub fn handle_mouse_event(
    app: &mut App,
    mouse: MouseEvent,
    async_sender: &mpsc::Sender<Task>,
) -> EventResult {
    let (x, y) = (mouse.column, mouse.row);
    let changed = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => handle_left_click(app, x, y, async_sender),
        MouseEventKind::Down(MouseButton::Right) => handle_right_click(app, x, y),
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            // Scrolling closes the menu instead of moving it along
            app.explorer.close_context_menu();
            if app.page == Page::Explorer && app.ui.in_tree(x, y) {
                if mouse.kind == MouseEventKind::ScrollDown {
                    app.explorer.select_next();
                } else {
                    app.explorer.select_previous();
                }
            }
            true
        }
        _ => false,
    };
    Ok(changed)
}

fn handle_left_click(app: &mut App, x: u16, y: u16, async_sender: &mpsc::Sender<Task>) -> bool {
    if app.explorer.context_menu().is_some() {
        if let Some(area) = app.ui.menu_area {
            if context_menu::contains(area, x, y) {
                click_menu(app, area, x, y);
                return true;
            }
        }
        app.explorer.close_context_menu();
    }

    // Clicking away from an inline input confirms it
    if app.explorer.is_editing() && !on_draft_row(app, x, y) {
        app.explorer.commit_draft();
    }

    if let Some(page) = app
        .ui
        .tabs
        .iter()
        .find(|(_, rect)| context_menu::contains(*rect, x, y))
        .map(|(page, _)| *page)
    {
        app.switch_page(page);
        return true;
    }
    if context_menu::contains(app.ui.theme_button, x, y) {
        app.cycle_theme();
        return true;
    }
    if context_menu::contains(app.ui.language_button, x, y) {
        request_language_change(app, async_sender);
        return true;
    }

    match app.page {
        Page::Explorer => click_explorer(app, x, y),
        Page::Grid => click_grid(app, x, y),
    }
}

fn click_menu(app: &mut App, area: ratatui::layout::Rect, x: u16, y: u16) {
    let Some(menu) = app.explorer.context_menu() else {
        return;
    };
    let entries = menu.entries(app.explorer.options());
    if let Some(MenuEntry::Action(action)) = ContextMenu::entry_at(&entries, area, x, y) {
        app.explorer.menu_action(action);
    }
}

fn on_draft_row(app: &App, x: u16, y: u16) -> bool {
    if !app.ui.in_tree(x, y) {
        return false;
    }
    // Draft rows carry no node id, rename rows carry the renamed node
    let renamed = app.explorer.interaction().renaming_id();
    match app.ui.tree_rows.get((y - app.ui.tree_area.y) as usize) {
        Some(None) => true,
        Some(Some(id)) => renamed == Some(id.as_str()),
        None => false,
    }
}

fn click_explorer(app: &mut App, x: u16, y: u16) -> bool {
    if let Some(action) = app
        .ui
        .toolbar
        .iter()
        .find(|(_, rect)| context_menu::contains(*rect, x, y))
        .map(|(action, _)| *action)
    {
        let kind = match action {
            MenuAction::NewFolder => NodeKind::Folder,
            _ => NodeKind::File,
        };
        return app.explorer.start_creating(kind, None, false);
    }

    if app.explorer.is_editing() {
        return false;
    }
    match app.ui.tree_row_at(x, y).map(str::to_string) {
        Some(id) => app.explorer.activate(&id),
        None => false,
    }
}

fn click_grid(app: &mut App, x: u16, y: u16) -> bool {
    if context_menu::contains(app.ui.layout_button, x, y) {
        app.toggle_grid_layout();
        return true;
    }
    if context_menu::contains(app.ui.add_item_button, x, y) {
        app.add_grid_item();
        return true;
    }
    let hit = app
        .ui
        .grid_cells
        .iter()
        .find(|(_, rect)| context_menu::contains(*rect, x, y))
        .map(|(id, _)| id.clone());
    match hit {
        Some(id) => {
            app.grid_select(&id);
            true
        }
        None => false,
    }
}

/// Right click in the tree opens the context menu for the row under the
/// pointer, or for the root on empty space. The selection stays put.
fn handle_right_click(app: &mut App, x: u16, y: u16) -> bool {
    if app.page != Page::Explorer || !app.ui.in_tree(x, y) {
        app.explorer.close_context_menu();
        return false;
    }
    if app.explorer.is_editing() {
        app.explorer.commit_draft();
    }
    let item_id = app.ui.tree_row_at(x, y).map(str::to_string);
    app.explorer.open_context_menu(x, y, item_id.as_deref())
}
