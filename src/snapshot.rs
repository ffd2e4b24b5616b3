use crate::app::{App, Page};
use crate::context_menu::ContextMenu;
use crate::demo;
use crate::error::Result;
use crate::explorer::{ExplorerOptions, Interaction};
use crate::grid::{GridItem, GridOptions};
use crate::theme::DEFAULT_THEME;
use crate::tree::Forest;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable state of the whole app, used by the screenshot and execute
/// commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub page: Page,
    pub theme: String,
    pub language: String,
    pub forest: Forest,
    /// The host owns the forest and applies every proposed change
    pub controlled: bool,
    pub explorer_options: ExplorerOptions,
    pub selected_id: Option<String>,
    pub interaction: Interaction,
    pub context_menu: Option<ContextMenu>,
    pub grid_items: Vec<GridItem>,
    pub grid_options: GridOptions,
    pub grid_selected: Option<String>,
    pub grid_cursor: usize,
    pub status_message: String,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            page: Page::Explorer,
            theme: DEFAULT_THEME.to_string(),
            language: "en".to_string(),
            forest: demo::demo_forest(),
            controlled: false,
            explorer_options: ExplorerOptions::default(),
            selected_id: None,
            interaction: Interaction::Idle,
            context_menu: None,
            grid_items: demo::demo_grid_items(),
            grid_options: GridOptions::default(),
            grid_selected: None,
            grid_cursor: 0,
            status_message: "Ready".to_string(),
        }
    }
}

impl Snapshot {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_app(app: &App) -> Self {
        Snapshot {
            page: app.page,
            theme: app.theme.current(),
            language: app.i18n.current_language().to_string(),
            forest: app.explorer.forest().clone(),
            controlled: app.explorer.is_controlled(),
            explorer_options: *app.explorer.options(),
            selected_id: app.explorer.selected_id().map(str::to_string),
            interaction: app.explorer.interaction().clone(),
            context_menu: app.explorer.context_menu().cloned(),
            grid_items: app.grid_items.clone(),
            grid_options: app.grid_options.clone(),
            grid_selected: app.grid_selected.clone(),
            grid_cursor: app.grid_cursor,
            status_message: app.status_message.clone(),
        }
    }
}
