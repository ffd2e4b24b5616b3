use crate::explorer::ExplorerOptions;
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    NewFile,
    NewFolder,
    Rename,
    Delete,
}

impl MenuAction {
    /// Key in the `explorer` namespace
    pub fn label_key(&self) -> &'static str {
        match self {
            MenuAction::NewFile => "actions.newFile",
            MenuAction::NewFolder => "actions.newFolder",
            MenuAction::Rename => "actions.rename",
            MenuAction::Delete => "actions.delete",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MenuAction::NewFile => "new_file",
            MenuAction::NewFolder => "new_folder",
            MenuAction::Rename => "rename",
            MenuAction::Delete => "delete",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "new_file" => Some(MenuAction::NewFile),
            "new_folder" => Some(MenuAction::NewFolder),
            "rename" => Some(MenuAction::Rename),
            "delete" => Some(MenuAction::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Action(MenuAction),
    Separator,
}

/// Entries offered for an item (or for the root when `item_id` is `None`).
///
/// A separator only appears when both create and item actions are present.
pub fn entries_for(item_id: Option<&str>, options: &ExplorerOptions) -> Vec<MenuEntry> {
    let mut create = Vec::new();
    if options.create_file {
        create.push(MenuEntry::Action(MenuAction::NewFile));
    }
    if options.create_folder {
        create.push(MenuEntry::Action(MenuAction::NewFolder));
    }

    let mut item = Vec::new();
    if item_id.is_some() {
        if options.rename {
            item.push(MenuEntry::Action(MenuAction::Rename));
        }
        if options.delete {
            item.push(MenuEntry::Action(MenuAction::Delete));
        }
    }

    if !create.is_empty() && !item.is_empty() {
        create.push(MenuEntry::Separator);
    }
    create.extend(item);
    create
}

/// An open context menu anchored at a screen cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenu {
    pub x: u16,
    pub y: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Index into the actionable entries
    #[serde(default)]
    pub highlighted: usize,
}

impl ContextMenu {
    pub fn new(x: u16, y: u16, item_id: Option<String>) -> Self {
        Self {
            x,
            y,
            item_id,
            highlighted: 0,
        }
    }

    pub fn entries(&self, options: &ExplorerOptions) -> Vec<MenuEntry> {
        entries_for(self.item_id.as_deref(), options)
    }

    pub fn actions(&self, options: &ExplorerOptions) -> Vec<MenuAction> {
        self.entries(options)
            .into_iter()
            .filter_map(|entry| match entry {
                MenuEntry::Action(action) => Some(action),
                MenuEntry::Separator => None,
            })
            .collect()
    }

    pub fn highlighted_action(&self, options: &ExplorerOptions) -> Option<MenuAction> {
        self.actions(options).get(self.highlighted).copied()
    }

    pub fn highlight_next(&mut self, options: &ExplorerOptions) {
        let count = self.actions(options).len();
        if count > 0 {
            self.highlighted = (self.highlighted + 1) % count;
        }
    }

    pub fn highlight_previous(&mut self, options: &ExplorerOptions) {
        let count = self.actions(options).len();
        if count > 0 {
            self.highlighted = (self.highlighted + count - 1) % count;
        }
    }

    /// Popup rectangle one cell below-right of the anchor, kept inside `bounds`.
    /// `None` when there is nothing to show.
    pub fn area(&self, entry_count: usize, label_width: u16, bounds: Rect) -> Option<Rect> {
        if entry_count == 0 {
            return None;
        }
        let width = label_width.saturating_add(4).min(bounds.width);
        let height = u16::try_from(entry_count)
            .unwrap_or(u16::MAX)
            .saturating_add(2)
            .min(bounds.height);
        let x = self.x.saturating_add(1).min(bounds.right().saturating_sub(width)).max(bounds.x);
        let y = self.y.saturating_add(1).min(bounds.bottom().saturating_sub(height)).max(bounds.y);
        Some(Rect::new(x, y, width, height))
    }

    /// Entry under a screen cell of a menu drawn in `area`
    pub fn entry_at(entries: &[MenuEntry], area: Rect, x: u16, y: u16) -> Option<MenuEntry> {
        if !contains(area, x, y) || y == area.y || x == area.x || x.saturating_add(1) >= area.right() {
            return None;
        }
        entries.get((y - area.y - 1) as usize).copied()
    }
}

pub fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.right() && y >= area.y && y < area.bottom()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_enabled() -> ExplorerOptions {
        ExplorerOptions::default()
    }

    #[test]
    fn test_entries_for_item() {
        let entries = entries_for(Some("1"), &all_enabled());
        assert_eq!(
            entries,
            vec![
                MenuEntry::Action(MenuAction::NewFile),
                MenuEntry::Action(MenuAction::NewFolder),
                MenuEntry::Separator,
                MenuEntry::Action(MenuAction::Rename),
                MenuEntry::Action(MenuAction::Delete),
            ]
        );
    }

    #[test]
    fn test_entries_for_root_have_no_item_actions() {
        let entries = entries_for(None, &all_enabled());
        assert_eq!(entries.len(), 2);
        assert!(!entries.contains(&MenuEntry::Separator));
    }

    #[test]
    fn test_no_separator_without_create_actions() {
        let options = ExplorerOptions {
            create_file: false,
            create_folder: false,
            ..all_enabled()
        };
        let entries = entries_for(Some("1"), &options);
        assert_eq!(
            entries,
            vec![
                MenuEntry::Action(MenuAction::Rename),
                MenuEntry::Action(MenuAction::Delete),
            ]
        );
    }

    #[test]
    fn test_all_disabled_means_no_entries() {
        let options = ExplorerOptions {
            create_file: false,
            create_folder: false,
            rename: false,
            delete: false,
        };
        assert!(entries_for(Some("1"), &options).is_empty());
        let menu = ContextMenu::new(3, 3, Some("1".to_string()));
        assert!(menu.area(0, 10, Rect::new(0, 0, 80, 24)).is_none());
    }

    #[test]
    fn test_highlight_wraps() {
        let options = all_enabled();
        let mut menu = ContextMenu::new(0, 0, None);
        assert_eq!(menu.highlighted_action(&options), Some(MenuAction::NewFile));
        menu.highlight_next(&options);
        menu.highlight_next(&options);
        assert_eq!(menu.highlighted_action(&options), Some(MenuAction::NewFile));
        menu.highlight_previous(&options);
        assert_eq!(menu.highlighted_action(&options), Some(MenuAction::NewFolder));
    }

    #[test]
    fn test_area_offset_and_clamped() {
        let bounds = Rect::new(0, 0, 40, 12);
        let menu = ContextMenu::new(5, 2, None);
        assert_eq!(menu.area(2, 10, bounds), Some(Rect::new(6, 3, 14, 4)));

        let corner = ContextMenu::new(39, 11, None);
        let area = corner.area(5, 10, bounds).unwrap();
        assert_eq!(area.right(), 40);
        assert_eq!(area.bottom(), 12);
    }

    #[test]
    fn test_entry_at() {
        let entries = entries_for(Some("1"), &all_enabled());
        let area = Rect::new(10, 5, 16, 7);
        assert_eq!(
            ContextMenu::entry_at(&entries, area, 12, 6),
            Some(MenuEntry::Action(MenuAction::NewFile))
        );
        assert_eq!(ContextMenu::entry_at(&entries, area, 12, 8), Some(MenuEntry::Separator));
        assert_eq!(ContextMenu::entry_at(&entries, area, 12, 5), None);
        assert_eq!(ContextMenu::entry_at(&entries, area, 2, 6), None);
    }

    #[test]
    fn test_action_names() {
        for action in [MenuAction::NewFile, MenuAction::NewFolder, MenuAction::Rename, MenuAction::Delete] {
            assert_eq!(MenuAction::from_name(action.name()), Some(action));
        }
        assert_eq!(MenuAction::from_name("copy"), None);
    }

    #[test]
    fn test_area_anchor_at_last_cell() {
        let menu = ContextMenu::new(u16::MAX, u16::MAX, None);
        let bounds = Rect::new(0, 0, 80, 24);
        let area = menu.area(3, 10, bounds).unwrap();
        assert_eq!(area, Rect::new(66, 19, 14, 5));
    }
}
