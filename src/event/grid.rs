use crossterm::event::KeyCode;

use crate::app::App;
use crate::event::EventResult;

pub fn handle_grid_key(app: &mut App, key: KeyCode) -> EventResult {
    let changed = match key {
        KeyCode::Left | KeyCode::Char('h') => app.grid_move(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.grid_move(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.grid_move(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.grid_move(0, 1),
        KeyCode::Home => app.grid_move(-(app.grid_items.len() as i32), 0),
        KeyCode::End => app.grid_move(app.grid_items.len() as i32, 0),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if !app.grid_select_cursor() {
                if let Some(item) = app.grid_cursor_item() {
                    log::debug!("grid: '{}' not selectable", item.id);
                }
            }
            true
        }
        KeyCode::Char('g') => {
            app.toggle_grid_layout();
            true
        }
        KeyCode::Char('f') => {
            app.toggle_fixed_items();
            true
        }
        KeyCode::Char('+') | KeyCode::Char('n') => {
            app.add_grid_item();
            true
        }
        _ => false,
    };
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_forest;
    use crate::grid::LayoutMode;

    fn create_test_app() -> App {
        App::headless(demo_forest())
    }

    #[test]
    fn test_disabled_item_cannot_be_selected() {
        let mut app = create_test_app();
        let index = app
            .grid_items
            .iter()
            .position(|item| item.id == "a60cc")
            .expect("demo item");
        app.grid_cursor = index;
        handle_grid_key(&mut app, KeyCode::Enter).expect("key");
        assert_eq!(app.grid_selected, None);
    }

    #[test]
    fn test_home_and_end() {
        let mut app = create_test_app();
        handle_grid_key(&mut app, KeyCode::End).expect("key");
        assert_eq!(app.grid_cursor, app.grid_items.len() - 1);
        handle_grid_key(&mut app, KeyCode::Home).expect("key");
        assert_eq!(app.grid_cursor, 0);
    }

    #[test]
    fn test_layout_and_fixed_toggles() {
        let mut app = create_test_app();
        handle_grid_key(&mut app, KeyCode::Char('g')).expect("key");
        assert_eq!(app.grid_options.layout, LayoutMode::List);
        assert_eq!(app.status_message, "List");

        let fixed = app.grid_options.allow_fixed_items;
        handle_grid_key(&mut app, KeyCode::Char('f')).expect("key");
        assert_eq!(app.grid_options.allow_fixed_items, !fixed);
    }

    #[test]
    fn test_vertical_move_in_list_layout_is_one_step() {
        let mut app = create_test_app();
        app.toggle_grid_layout();
        handle_grid_key(&mut app, KeyCode::Down).expect("key");
        assert_eq!(app.grid_cursor, 1);
    }
}
