use crate::async_task::Task;
use crate::config::{Config, ExplorerConfig};
use crate::context_menu::MenuAction;
use crate::demo;
use crate::error::Result;
use crate::explorer::{Explorer, ExplorerEvent};
use crate::grid::{GridItem, GridOptions, LayoutMode};
use crate::snapshot::Snapshot;
use crate::i18n::{Bundle, CachedTranslationSource, DirTranslationSource, I18n, MemoryTranslationSource, TranslationSource};
use crate::icons::{fallback_glyph, Glyph, IconCatalog, IconResolver, IconSource, StaticIconTable, LIGHT_SUFFIX};
use crate::theme::{prefers_dark_from_env, Theme, ThemeStore, ThemeWatcher, DEFAULT_THEME};
use crate::tree::{Forest, Node};
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Explorer,
    Grid,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Explorer, Page::Grid];

    pub fn next(self) -> Self {
        match self {
            Page::Explorer => Page::Grid,
            Page::Grid => Page::Explorer,
        }
    }

    /// Key in the `index` namespace
    pub fn title_key(&self) -> &'static str {
        match self {
            Page::Explorer => "pages.explorer",
            Page::Grid => "pages.grid",
        }
    }
}

/// Screen regions from the last draw, used for mouse hit testing
#[derive(Debug, Clone, Default)]
pub struct UiLayout {
    pub screen: Rect,
    pub tabs: Vec<(Page, Rect)>,
    pub theme_button: Rect,
    pub language_button: Rect,
    pub toolbar: Vec<(MenuAction, Rect)>,
    pub tree_area: Rect,
    /// Node id of each drawn tree line, top to bottom; `None` for draft rows
    pub tree_rows: Vec<Option<String>>,
    pub tree_scroll: usize,
    pub menu_area: Option<Rect>,
    pub grid_cells: Vec<(String, Rect)>,
    pub layout_button: Rect,
    pub add_item_button: Rect,
}

impl UiLayout {
    /// Node id drawn at a screen cell of the tree
    pub fn tree_row_at(&self, x: u16, y: u16) -> Option<&str> {
        let area = self.tree_area;
        if x < area.x || x >= area.right() || y < area.y || y >= area.bottom() {
            return None;
        }
        self.tree_rows
            .get((y - area.y) as usize)
            .and_then(|id| id.as_deref())
    }

    pub fn in_tree(&self, x: u16, y: u16) -> bool {
        let area = self.tree_area;
        x >= area.x && x < area.right() && y >= area.y && y < area.bottom()
    }
}

/// Glyph received for a node, with the request it answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIcon {
    pub icon_name: String,
    pub light_mode: bool,
    pub glyph: Glyph,
}

#[derive(Debug, Clone)]
struct PendingIcon {
    icon_name: String,
    light_mode: bool,
    cancel: CancellationToken,
}

pub struct App {
    pub page: Page,
    pub explorer: Explorer,
    pub explorer_view: ExplorerConfig,

    // Grid page
    pub grid_items: Vec<GridItem>,
    pub grid_options: GridOptions,
    pub grid_selected: Option<String>,
    pub grid_cursor: usize,

    pub theme: ThemeStore,
    pub theme_watcher: ThemeWatcher,
    pub i18n: I18n,
    pub icons: Box<dyn IconResolver>,
    pub glyphs: HashMap<String, ResolvedIcon>,
    pending_icons: HashMap<String, PendingIcon>,

    pub status_message: String,
    pub should_quit: bool,
    pub ui: UiLayout,
    added_items: u32,
}

/// Translation context over the embedded catalogs, in English
pub fn builtin_i18n(namespaces: &[String]) -> I18n {
    let mut i18n = I18n::new(Arc::new(MemoryTranslationSource::builtin()));
    for namespace in namespaces {
        i18n.register_namespace(namespace);
    }
    if let Err(e) = i18n.init(None) {
        log::warn!("I18n init failed: {}", e);
    }
    i18n
}

impl App {
    pub fn new(explorer: Explorer, theme: ThemeStore, i18n: I18n, icons: Box<dyn IconResolver>) -> Self {
        let theme_watcher = ThemeWatcher::new(theme.subscribe());
        Self {
            page: Page::Explorer,
            explorer,
            explorer_view: ExplorerConfig::default(),
            grid_items: demo::demo_grid_items(),
            grid_options: GridOptions::default(),
            grid_selected: None,
            grid_cursor: 0,
            theme,
            theme_watcher,
            i18n,
            icons,
            glyphs: HashMap::new(),
            pending_icons: HashMap::new(),
            status_message: "Ready".to_string(),
            should_quit: false,
            ui: UiLayout::default(),
            added_items: 0,
        }
    }

    /// Self-contained app: embedded catalogs, builtin icons, nothing persisted
    pub fn headless(forest: Forest) -> Self {
        let config = Config::default();
        Self::new(
            Explorer::new(forest).with_options(config.explorer.options),
            ThemeStore::in_memory(DEFAULT_THEME),
            builtin_i18n(&config.i18n.namespaces),
            Box::new(StaticIconTable),
        )
    }

    /// App wired from a configuration: translation and icon sources, theme
    /// persistence and grid options.
    pub fn from_config(forest: Forest, config: &Config, system_locale: Option<&str>) -> Result<Self> {
        let source = translation_source(config);
        let mut i18n = I18n::new(source)
            .with_fallback(&config.i18n.fallback)
            .with_settings_path(config.i18n.settings_file.clone());
        for namespace in &config.i18n.namespaces {
            i18n.register_namespace(namespace);
        }
        i18n.init(system_locale)?;

        let icons: Box<dyn IconResolver> = match &config.icons.catalog {
            Some(path) => Box::new(IconCatalog::load_from_file(path)?),
            None => Box::new(StaticIconTable),
        };

        let theme = ThemeStore::new(config.theme.state_file.clone(), prefers_dark_from_env());
        let explorer = Explorer::new(forest).with_options(config.explorer.options);

        let mut app = Self::new(explorer, theme, i18n, icons);
        app.explorer_view = config.explorer.clone();
        app.grid_options = config.grid.options();
        Ok(app)
    }

    /// Rebuild a headless app from saved state. Ids that no longer exist
    /// are dropped; an unknown theme or language keeps the default.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let explorer = if snapshot.controlled {
            Explorer::controlled(snapshot.forest.clone())
        } else {
            Explorer::new(snapshot.forest.clone())
        };
        let config = Config::default();
        let mut app = Self::new(
            explorer.with_options(snapshot.explorer_options),
            ThemeStore::in_memory(DEFAULT_THEME),
            builtin_i18n(&config.i18n.namespaces),
            Box::new(StaticIconTable),
        );
        app.set_theme(&snapshot.theme);
        if snapshot.language != app.i18n.current_language() {
            app.change_language(&snapshot.language);
        }
        app.explorer.restore_state(
            snapshot.selected_id.clone(),
            snapshot.interaction.clone(),
            snapshot.context_menu.clone(),
        );
        app.page = snapshot.page;
        app.grid_items = snapshot.grid_items.clone();
        app.grid_options = snapshot.grid_options.clone();
        app.grid_selected = snapshot
            .grid_selected
            .clone()
            .filter(|id| app.grid_items.iter().any(|item| &item.id == id));
        app.grid_cursor = snapshot.grid_cursor.min(app.grid_items.len().saturating_sub(1));
        app.status_message = snapshot.status_message.clone();
        app
    }

    pub fn with_grid_items(mut self, items: Vec<GridItem>) -> Self {
        self.grid_items = items;
        self.grid_cursor = 0;
        self
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    /// Shortcut for a translation without parameters
    pub fn t(&self, namespace: &str, key: &str) -> String {
        self.i18n.translate(namespace, key, &[])
    }

    pub fn palette(&self) -> Theme {
        Theme::for_name(self.theme_watcher.theme())
    }

    pub fn switch_page(&mut self, page: Page) {
        if self.page != page {
            self.explorer.close_context_menu();
            self.page = page;
        }
    }

    pub fn next_page(&mut self) {
        self.switch_page(self.page.next());
    }

    pub fn cycle_theme(&mut self) {
        match self.theme.cycle() {
            Ok(theme) => {
                self.theme_watcher.poll();
                self.status_message = format!("{} {}", theme.symbol, theme.title);
            }
            Err(e) => {
                log::error!("Failed to save theme: {}", e);
                self.status_message = format!("Error: {}", e);
            }
        }
    }

    /// Switch to a named theme; unknown names leave the current one
    pub fn set_theme(&mut self, name: &str) -> bool {
        match self.theme.apply(name) {
            Ok(applied) => {
                self.theme_watcher.poll();
                applied
            }
            Err(e) => {
                log::error!("Failed to save theme: {}", e);
                self.status_message = format!("Error: {}", e);
                false
            }
        }
    }

    /// Worker task that loads the next language
    pub fn next_language_task(&self) -> Task {
        Task::LoadLanguage {
            language: self.i18n.next_language().to_string(),
            namespaces: self.i18n.namespaces().to_vec(),
        }
    }

    /// Switch language synchronously, loading on the calling thread
    pub fn change_language(&mut self, code: &str) {
        match self.i18n.change_language(code) {
            Ok(true) => {
                self.status_message =
                    format!("{}: {}", self.t("index", "language"), self.i18n.current_language_name())
            }
            Ok(false) => self.status_message = format!("Unsupported language: {}", code),
            Err(e) => self.status_message = format!("Error: {}", e),
        }
    }

    /// Install bundles loaded by the worker and switch to them
    pub fn language_loaded(&mut self, language: &str, bundles: HashMap<String, Bundle>) {
        self.i18n.install_bundles(language, bundles);
        match self.i18n.activate(language) {
            Ok(true) => {
                self.status_message =
                    format!("{}: {}", self.t("index", "language"), self.i18n.current_language_name())
            }
            Ok(false) => self.status_message = format!("Unsupported language: {}", language),
            Err(e) => self.status_message = format!("Error: {}", e),
        }
    }

    /// Turn explorer events into status updates; in controlled mode the app
    /// is the owner and accepts every proposed forest.
    pub fn process_explorer_events(&mut self) {
        let mut forest_changed = false;
        for event in self.explorer.drain_events() {
            match event {
                ExplorerEvent::ForestChanged(forest) => {
                    if self.explorer.is_controlled() {
                        self.explorer.set_forest(forest);
                    }
                    forest_changed = true;
                }
                ExplorerEvent::Created(node) => {
                    self.status_message =
                        self.i18n.translate("explorer", "status.created", &[("name", &node.name)]);
                }
                ExplorerEvent::Renamed { from, to, .. } => {
                    self.status_message =
                        self.i18n.translate("explorer", "status.renamed", &[("from", &from), ("to", &to)]);
                }
                ExplorerEvent::Deleted(node) => {
                    self.status_message =
                        self.i18n.translate("explorer", "status.deleted", &[("name", &node.name)]);
                }
                ExplorerEvent::Selected(node) => {
                    log::debug!("selected '{}'", node.id);
                }
                ExplorerEvent::Activated(node) => {
                    log::debug!("activated '{}'", node.id);
                }
            }
        }
        if forest_changed {
            self.prune_icons();
        }
    }

    /// Forget glyphs and requests for nodes that left the forest
    fn prune_icons(&mut self) {
        let forest = self.explorer.forest();
        self.glyphs.retain(|id, _| forest.contains(id));
        self.pending_icons.retain(|id, pending| {
            let keep = forest.contains(id);
            if !keep {
                pending.cancel.cancel();
            }
            keep
        });
    }

    // Grid page

    pub fn grid_cursor_item(&self) -> Option<&GridItem> {
        self.grid_items.get(self.grid_cursor)
    }

    /// Move the cursor by whole cells; vertical moves step by a row of columns
    pub fn grid_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.grid_items.is_empty() {
            return false;
        }
        let columns = match self.grid_options.layout {
            LayoutMode::Grid => self.grid_options.grid_columns.max(1) as i32,
            LayoutMode::List => 1,
        };
        let last = self.grid_items.len() as i32 - 1;
        let target = (self.grid_cursor as i32 + dx + dy * columns).clamp(0, last) as usize;
        let moved = target != self.grid_cursor;
        self.grid_cursor = target;
        moved
    }

    /// Select an item by id; disabled items ignore it
    pub fn grid_select(&mut self, id: &str) -> bool {
        let Some(index) = self.grid_items.iter().position(|item| item.id == id) else {
            return false;
        };
        self.grid_cursor = index;
        let item = &self.grid_items[index];
        if !item.is_interactive() {
            log::debug!("grid: '{}' is disabled", id);
            return false;
        }
        self.grid_selected = Some(item.id.clone());
        self.status_message = item.text.clone();
        true
    }

    pub fn grid_select_cursor(&mut self) -> bool {
        match self.grid_cursor_item().map(|item| item.id.clone()) {
            Some(id) => self.grid_select(&id),
            None => false,
        }
    }

    pub fn toggle_grid_layout(&mut self) {
        self.grid_options.layout = match self.grid_options.layout {
            LayoutMode::Grid => LayoutMode::List,
            LayoutMode::List => LayoutMode::Grid,
        };
        let key = match self.grid_options.layout {
            LayoutMode::Grid => "iconListView.layout.grid",
            LayoutMode::List => "iconListView.layout.list",
        };
        self.status_message = self.t("index", key);
    }

    pub fn toggle_fixed_items(&mut self) {
        self.grid_options.allow_fixed_items = !self.grid_options.allow_fixed_items;
        let state = if self.grid_options.allow_fixed_items { "on" } else { "off" };
        self.status_message = format!("{}: {}", self.t("index", "iconListView.fixed"), state);
    }

    pub fn add_grid_item(&mut self) -> String {
        let id = loop {
            self.added_items += 1;
            let candidate = format!("new{}", self.added_items);
            if !self.grid_items.iter().any(|item| item.id == candidate) {
                break candidate;
            }
        };
        let text = self.t("index", "iconListView.newItem");
        self.grid_items.push(GridItem {
            icon: Some("New".to_string()),
            ..GridItem::new(id.clone(), text)
        });
        self.grid_cursor = self.grid_items.len() - 1;
        id
    }

    // Icons

    /// Glyph to draw for a node: the last resolved one, else the default
    pub fn glyph_for(&self, node: &Node) -> Glyph {
        self.glyphs
            .get(&node.id)
            .map(|resolved| resolved.glyph.clone())
            .unwrap_or_else(|| fallback_glyph(node.kind, node.is_expanded))
    }

    /// Requests for visible nodes whose glyph is missing or outdated.
    ///
    /// A newer request for a node cancels the one still in flight.
    pub fn icon_requests(&mut self) -> Vec<Task> {
        let light_mode = self.theme_watcher.is_light_mode();
        let wanted: Vec<(String, String)> = self
            .explorer
            .forest()
            .visible_nodes_with_depth()
            .into_iter()
            .map(|(node, _)| (node.id.clone(), self.icons.icon_for(node)))
            .collect();

        let mut tasks = Vec::new();
        for (node_id, icon_name) in wanted {
            let current = self
                .glyphs
                .get(&node_id)
                .is_some_and(|resolved| resolved.icon_name == icon_name && resolved.light_mode == light_mode);
            if current {
                continue;
            }
            if let Some(pending) = self.pending_icons.get(&node_id) {
                if pending.icon_name == icon_name && pending.light_mode == light_mode {
                    continue;
                }
                pending.cancel.cancel();
            }

            let cancel = CancellationToken::new();
            self.pending_icons.insert(
                node_id.clone(),
                PendingIcon {
                    icon_name: icon_name.clone(),
                    light_mode,
                    cancel: cancel.clone(),
                },
            );
            tasks.push(Task::ResolveIcon {
                node_id,
                icon_name,
                light_mode,
                cancel,
            });
        }
        tasks
    }

    pub fn pending_icon_count(&self) -> usize {
        self.pending_icons.len()
    }

    /// Store a worker answer unless a newer request superseded it
    pub fn apply_icon_result(
        &mut self,
        node_id: &str,
        icon_name: &str,
        light_mode: bool,
        glyph: Option<Glyph>,
    ) -> bool {
        let is_still_relevant = self
            .pending_icons
            .get(node_id)
            .is_some_and(|pending| pending.icon_name == icon_name && pending.light_mode == light_mode);
        if !is_still_relevant {
            log::debug!("Dropping stale icon '{}' for '{}'", icon_name, node_id);
            return false;
        }
        self.pending_icons.remove(node_id);

        let glyph = match glyph {
            Some(glyph) => glyph,
            None => match self.explorer.forest().find_by_id(node_id) {
                Some(node) => fallback_glyph(node.kind, node.is_expanded),
                None => return false,
            },
        };
        self.glyphs.insert(
            node_id.to_string(),
            ResolvedIcon {
                icon_name: icon_name.to_string(),
                light_mode,
                glyph,
            },
        );
        true
    }

    /// Resolve every visible icon on the calling thread
    pub fn resolve_icons_with(&mut self, source: &dyn IconSource) {
        for task in self.icon_requests() {
            if let Task::ResolveIcon {
                node_id,
                icon_name,
                light_mode,
                ..
            } = task
            {
                let mut candidates = Vec::with_capacity(2);
                if light_mode {
                    candidates.push(format!("{}{}", icon_name, LIGHT_SUFFIX));
                }
                candidates.push(icon_name.clone());
                let glyph = candidates
                    .iter()
                    .find_map(|candidate| source.fetch(candidate).ok().flatten());
                self.apply_icon_result(&node_id, &icon_name, light_mode, glyph);
            }
        }
    }

    pub fn cancel_pending_icons(&mut self) {
        for (_, pending) in self.pending_icons.drain() {
            pending.cancel.cancel();
        }
    }
}

pub fn translation_source(config: &Config) -> Arc<dyn TranslationSource> {
    match (&config.i18n.languages_dir, &config.i18n.cache_dir) {
        (Some(dir), Some(cache)) => Arc::new(CachedTranslationSource::new(
            DirTranslationSource::new(dir),
            cache,
            &config.i18n.build,
        )),
        (Some(dir), None) => Arc::new(DirTranslationSource::new(dir)),
        (None, Some(cache)) => Arc::new(CachedTranslationSource::new(
            MemoryTranslationSource::builtin(),
            cache,
            &config.i18n.build,
        )),
        (None, None) => Arc::new(MemoryTranslationSource::builtin()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::BuiltinGlyphs;
    use crate::tree::NodeKind;

    fn app() -> App {
        App::headless(demo::demo_forest())
    }

    #[test]
    fn test_page_cycle() {
        let mut app = app();
        assert_eq!(app.page, Page::Explorer);
        app.next_page();
        assert_eq!(app.page, Page::Grid);
        app.next_page();
        assert_eq!(app.page, Page::Explorer);
    }

    #[test]
    fn test_icon_requests_are_not_repeated() {
        let mut app = app();
        let first = app.icon_requests();
        assert!(!first.is_empty());
        assert!(app.icon_requests().is_empty());
        assert_eq!(app.pending_icon_count(), first.len());
    }

    #[test]
    fn test_newer_request_cancels_older() {
        let mut app = app();
        let first = app.icon_requests();
        let old_token = first
            .iter()
            .find_map(|task| match task {
                Task::ResolveIcon { node_id, cancel, .. } if node_id == "1" => Some(cancel.clone()),
                _ => None,
            })
            .unwrap();

        // collapsing src changes its icon name to the closed variant
        app.explorer.toggle("1");
        let second = app.icon_requests();
        assert!(old_token.is_cancelled());
        assert!(second
            .iter()
            .any(|task| matches!(task, Task::ResolveIcon { node_id, icon_name, .. } if node_id == "1" && icon_name == "folder-src")));

        // the answer to the first request is stale now
        assert!(!app.apply_icon_result("1", "folder-src-open", false, Some(Glyph::new("x", None))));
        assert!(app.apply_icon_result("1", "folder-src", false, Some(Glyph::new("■", None))));
        assert_eq!(app.glyphs["1"].glyph.symbol, "■");
    }

    #[test]
    fn test_missing_glyph_falls_back() {
        let mut app = app();
        app.icon_requests();
        assert!(app.apply_icon_result("15", "git", false, None));
        assert_eq!(app.glyphs["15"].glyph, fallback_glyph(NodeKind::File, false));
    }

    #[test]
    fn test_resolve_icons_with_builtin() {
        let mut app = app();
        app.resolve_icons_with(&BuiltinGlyphs);
        assert_eq!(app.pending_icon_count(), 0);
        let package = app.explorer.forest().find_by_id("12").unwrap().clone();
        assert_eq!(app.glyph_for(&package).symbol, "N");
    }

    #[test]
    fn test_light_theme_requests_again() {
        let mut app = app();
        app.resolve_icons_with(&BuiltinGlyphs);
        app.theme.apply("light").unwrap();
        app.theme_watcher.poll();
        assert!(app.theme_watcher.is_light_mode());
        assert!(!app.icon_requests().is_empty());
    }

    #[test]
    fn test_deleted_nodes_lose_their_glyphs() {
        let mut app = app();
        app.resolve_icons_with(&BuiltinGlyphs);
        assert!(app.glyphs.contains_key("2") && app.glyphs.contains_key("12"));

        app.explorer.delete("1");
        app.explorer.delete("12");
        app.process_explorer_events();
        assert!(!app.glyphs.contains_key("12"));
        assert!(!app.glyphs.contains_key("1"));
        assert!(!app.glyphs.contains_key("2"));
        assert!(app.glyphs.contains_key("13"));
    }

    #[test]
    fn test_pruning_cancels_requests_for_deleted_nodes() {
        let mut app = app();
        let token = app
            .icon_requests()
            .into_iter()
            .find_map(|task| match task {
                Task::ResolveIcon { node_id, cancel, .. } if node_id == "12" => Some(cancel),
                _ => None,
            })
            .unwrap();

        app.explorer.delete("12");
        app.process_explorer_events();
        assert!(token.is_cancelled());
        assert!(!app.apply_icon_result("12", "npm", false, None));
    }

    #[test]
    fn test_grid_select_skips_disabled() {
        let mut app = app();
        assert!(!app.grid_select("a60cc"));
        assert_eq!(app.grid_selected, None);
        assert!(app.grid_select("a5"));
        assert_eq!(app.grid_selected.as_deref(), Some("a5"));
    }

    #[test]
    fn test_grid_move_clamps() {
        let mut app = app();
        assert!(!app.grid_move(-1, 0));
        assert!(app.grid_move(0, 1));
        assert_eq!(app.grid_cursor, 4);
        app.grid_move(0, 100);
        assert_eq!(app.grid_cursor, app.grid_items.len() - 1);
    }

    #[test]
    fn test_add_grid_item_uses_translation() {
        let mut app = app();
        let before = app.grid_items.len();
        let id = app.add_grid_item();
        assert_eq!(app.grid_items.len(), before + 1);
        assert_eq!(app.grid_items.last().unwrap().id, id);
        assert_eq!(app.grid_items.last().unwrap().text, "New");
        app.change_language("es");
        app.add_grid_item();
        assert_eq!(app.grid_items.last().unwrap().text, "Nuevo");
    }

    #[test]
    fn test_controlled_app_accepts_changes() {
        let mut app = App::new(
            Explorer::controlled(demo::demo_forest()),
            ThemeStore::in_memory("dark"),
            builtin_i18n(&["index".to_string(), "explorer".to_string()]),
            Box::new(StaticIconTable),
        );
        app.explorer.toggle("2");
        assert!(!app.explorer.forest().find_by_id("2").unwrap().is_expanded);
        app.process_explorer_events();
        assert!(app.explorer.forest().find_by_id("2").unwrap().is_expanded);
    }

    #[test]
    fn test_delete_reports_status() {
        let mut app = app();
        app.explorer.delete("14");
        app.process_explorer_events();
        assert!(app.status_message.contains("README.md"));
    }
}
