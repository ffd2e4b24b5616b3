use crate::{
    app::App,
    command::Command,
    snapshot::Snapshot,
    tree::NodeKind,
};

/// Result of executing a command
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub snapshot: Snapshot,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

/// Executes commands against saved snapshots
pub struct Executor;

impl Executor {
    /// Execute a command against a snapshot and return the resulting state
    pub fn execute(snapshot: &Snapshot, command: Command) -> ExecutionResult {
        let mut app = App::from_snapshot(snapshot);
        let before = app.status_message.clone();
        Self::apply(&mut app, command);

        let status_message = (app.status_message != before).then(|| app.status_message.clone());
        ExecutionResult {
            snapshot: Snapshot::from_app(&app),
            status_message,
            should_quit: app.should_quit,
        }
    }

    /// Apply one command to a live app, the way the matching key or click would
    pub fn apply(app: &mut App, command: Command) {
        match command {
            Command::Quit => {
                app.should_quit = true;
                app.status_message = "Goodbye!".to_string();
            }
            Command::NextPage => app.next_page(),
            Command::ShowPage(page) => app.switch_page(page),
            Command::CycleTheme => app.cycle_theme(),
            Command::SetTheme(name) => {
                if !app.set_theme(&name) {
                    app.status_message = format!("Unknown theme: {}", name);
                }
            }
            Command::NextLanguage => {
                let next = app.i18n.next_language().to_string();
                app.change_language(&next);
            }
            Command::SetLanguage(code) => app.change_language(&code),

            Command::Up => {
                app.explorer.select_previous();
            }
            Command::Down => {
                app.explorer.select_next();
            }
            Command::First => {
                app.explorer.select_first();
            }
            Command::Last => {
                app.explorer.select_last();
            }
            Command::Expand => {
                app.explorer.expand_or_enter();
            }
            Command::Collapse => {
                app.explorer.collapse_or_parent();
            }
            Command::Activate => {
                if let Some(id) = app.explorer.selected_id().map(str::to_string) {
                    app.explorer.activate(&id);
                }
            }
            Command::Select(id) => {
                if !app.explorer.select(&id) {
                    app.status_message = format!("No item with id {}", id);
                }
            }
            Command::Toggle(id) => {
                app.explorer.toggle(&id);
            }
            Command::NewFile => {
                app.explorer.start_creating(NodeKind::File, None, false);
            }
            Command::NewFolder => {
                app.explorer.start_creating(NodeKind::Folder, None, false);
            }
            Command::Rename(id) => {
                app.explorer.start_renaming(&id);
            }
            Command::Delete(id) => {
                app.explorer.delete(&id);
            }
            Command::Type(text) => {
                for c in text.chars() {
                    app.explorer.draft_insert(c);
                }
            }
            Command::Backspace => app.explorer.draft_backspace(),
            Command::Commit => {
                app.explorer.commit_draft();
            }
            Command::Cancel => {
                if app.explorer.is_editing() {
                    app.explorer.cancel_draft();
                    app.status_message = app.t("explorer", "status.cancelled");
                } else {
                    app.explorer.close_context_menu();
                }
            }
            Command::OpenMenu { x, y, item_id } => {
                app.explorer.open_context_menu(x, y, item_id.as_deref());
            }
            Command::MenuNext => app.explorer.menu_highlight_next(),
            Command::MenuPrevious => app.explorer.menu_highlight_previous(),
            Command::MenuEnter => {
                app.explorer.activate_highlighted_menu_entry();
            }
            Command::MenuAction(action) => {
                app.explorer.menu_action(action);
            }
            Command::CloseMenu => app.explorer.close_context_menu(),

            Command::GridLeft => {
                app.grid_move(-1, 0);
            }
            Command::GridRight => {
                app.grid_move(1, 0);
            }
            Command::GridUp => {
                app.grid_move(0, -1);
            }
            Command::GridDown => {
                app.grid_move(0, 1);
            }
            Command::GridSelect(id) => {
                app.grid_select(&id);
            }
            Command::GridEnter => {
                app.grid_select_cursor();
            }
            Command::ToggleLayout => app.toggle_grid_layout(),
            Command::ToggleFixed => app.toggle_fixed_items(),
            Command::AddItem => {
                app.add_grid_item();
            }

            Command::Sequence(commands) => {
                for command in commands {
                    Self::apply(app, command);
                    if app.should_quit {
                        break;
                    }
                }
            }
        }
        app.process_explorer_events();
    }
}
