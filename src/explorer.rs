use crate::context_menu::{ContextMenu, MenuAction};
use crate::tree::{Forest, Node, NodeKind};
use serde::{Deserialize, Serialize};

/// Which explorer actions are offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExplorerOptions {
    pub create_file: bool,
    pub create_folder: bool,
    pub rename: bool,
    pub delete: bool,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            create_file: true,
            create_folder: true,
            rename: true,
            delete: true,
        }
    }
}

impl ExplorerOptions {
    pub fn allows(&self, action: MenuAction) -> bool {
        match action {
            MenuAction::NewFile => self.create_file,
            MenuAction::NewFolder => self.create_folder,
            MenuAction::Rename => self.rename,
            MenuAction::Delete => self.delete,
        }
    }

    fn allows_create(&self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::File => self.create_file,
            NodeKind::Folder => self.create_folder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraft {
    pub kind: NodeKind,
    pub name: String,
    /// `None` targets the root
    #[serde(default)]
    pub target_folder_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameDraft {
    pub item_id: String,
    pub name: String,
}

/// Inline editing state of the explorer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Interaction {
    #[default]
    Idle,
    Creating(CreateDraft),
    Renaming(RenameDraft),
}

impl Interaction {
    pub fn renaming_id(&self) -> Option<&str> {
        match self {
            Interaction::Renaming(draft) => Some(&draft.item_id),
            _ => None,
        }
    }
}

/// What a pending creation is about to add
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub kind: NodeKind,
    pub name: String,
    pub target_folder_id: Option<String>,
}

/// Callbacks around tree mutations. A `before_*` hook returning `false`
/// cancels the operation.
#[cfg_attr(test, mockall::automock)]
pub trait ExplorerHooks: Send {
    fn before_create(&mut self, _request: &CreateRequest) -> bool {
        true
    }
    fn after_create(&mut self, _node: &Node, _request: &CreateRequest) {}
    fn before_rename(&mut self, _node: &Node, _new_name: &str) -> bool {
        true
    }
    /// `node` already carries the new name
    fn after_rename(&mut self, _node: &Node, _old_name: &str) {}
    fn before_delete(&mut self, _node: &Node) -> bool {
        true
    }
    fn after_delete(&mut self, _node: &Node) {}
}

pub struct NoHooks;

impl ExplorerHooks for NoHooks {}

/// Notifications for whoever owns the explorer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerEvent {
    ForestChanged(Forest),
    Selected(Node),
    Activated(Node),
    Created(Node),
    Renamed { id: String, from: String, to: String },
    Deleted(Node),
}

/// Source of ids for created nodes
#[derive(Debug, Clone)]
pub enum IdGenerator {
    /// Millisecond timestamps, strictly increasing
    Timestamp { last: i64 },
    /// `prefix1`, `prefix2`, ...
    Sequence { prefix: String, next: u64 },
}

impl Default for IdGenerator {
    fn default() -> Self {
        IdGenerator::Timestamp { last: 0 }
    }
}

impl IdGenerator {
    pub fn sequence(prefix: impl Into<String>) -> Self {
        IdGenerator::Sequence {
            prefix: prefix.into(),
            next: 1,
        }
    }

    pub fn next_id(&mut self) -> String {
        match self {
            IdGenerator::Timestamp { last } => {
                let now = chrono::Utc::now().timestamp_millis();
                *last = if now > *last { now } else { *last + 1 };
                last.to_string()
            }
            IdGenerator::Sequence { prefix, next } => {
                let id = format!("{}{}", prefix, next);
                *next += 1;
                id
            }
        }
    }
}

/// One line of the rendered tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerRow<'a> {
    Item {
        node: &'a Node,
        depth: usize,
        selected: bool,
        /// Present while this node is being renamed
        rename_buffer: Option<&'a str>,
    },
    Draft {
        kind: NodeKind,
        name: &'a str,
        depth: usize,
    },
}

impl ExplorerRow<'_> {
    pub fn depth(&self) -> usize {
        match self {
            ExplorerRow::Item { depth, .. } | ExplorerRow::Draft { depth, .. } => *depth,
        }
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            ExplorerRow::Item { node, .. } => Some(&node.id),
            ExplorerRow::Draft { .. } => None,
        }
    }
}

/// Selection, inline editing and context menu state over a [`Forest`]
pub struct Explorer {
    forest: Forest,
    selected_id: Option<String>,
    interaction: Interaction,
    context_menu: Option<ContextMenu>,
    options: ExplorerOptions,
    controlled: bool,
    hooks: Box<dyn ExplorerHooks>,
    ids: IdGenerator,
    events: Vec<ExplorerEvent>,
}

impl Explorer {
    /// An explorer that owns its forest
    pub fn new(forest: Forest) -> Self {
        Self {
            forest,
            selected_id: None,
            interaction: Interaction::Idle,
            context_menu: None,
            options: ExplorerOptions::default(),
            controlled: false,
            hooks: Box::new(NoHooks),
            ids: IdGenerator::default(),
            events: Vec::new(),
        }
    }

    /// An explorer whose forest is only replaced through [`Explorer::set_forest`].
    /// Mutations are proposed as `ForestChanged` events.
    pub fn controlled(forest: Forest) -> Self {
        Self {
            controlled: true,
            ..Self::new(forest)
        }
    }

    pub fn with_options(mut self, options: ExplorerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_hooks(mut self, hooks: Box<dyn ExplorerHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    pub fn options(&self) -> &ExplorerOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ExplorerOptions) {
        self.options = options;
        if self
            .context_menu
            .as_ref()
            .is_some_and(|menu| menu.entries(&self.options).is_empty())
        {
            self.context_menu = None;
        }
    }

    /// Replace the forest from outside. No `ForestChanged` is emitted.
    ///
    /// Selection and drafts that point at nodes which no longer exist are dropped.
    pub fn set_forest(&mut self, forest: Forest) {
        self.forest = forest;
        let selection_gone = self
            .selected_id
            .as_deref()
            .is_some_and(|id| !self.forest.contains(id));
        if selection_gone {
            self.selected_id = None;
        }
        if self.draft_is_stale(&self.forest) {
            log::debug!("Explorer: draft target vanished, cancelling");
            self.interaction = Interaction::Idle;
        }
        let menu_gone = self
            .context_menu
            .as_ref()
            .and_then(|menu| menu.item_id.as_deref())
            .is_some_and(|id| !self.forest.contains(id));
        if menu_gone {
            self.context_menu = None;
        }
    }

    /// Reinstate a saved selection, draft and menu. Anything pointing at a
    /// missing node is dropped. No events are emitted.
    pub fn restore_state(
        &mut self,
        selected_id: Option<String>,
        interaction: Interaction,
        context_menu: Option<ContextMenu>,
    ) {
        self.selected_id = selected_id.filter(|id| self.forest.contains(id));
        self.interaction = interaction;
        if self.draft_is_stale(&self.forest) {
            self.interaction = Interaction::Idle;
        }
        self.context_menu = context_menu.filter(|menu| {
            menu.item_id.as_deref().map_or(true, |id| self.forest.contains(id))
                && !menu.entries(&self.options).is_empty()
        });
    }

    fn draft_is_stale(&self, forest: &Forest) -> bool {
        match &self.interaction {
            Interaction::Idle => false,
            Interaction::Creating(draft) => draft
                .target_folder_id
                .as_deref()
                .is_some_and(|id| !forest.contains(id)),
            Interaction::Renaming(draft) => !forest.contains(&draft.item_id),
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selected_id.as_deref().and_then(|id| self.forest.find_by_id(id))
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn is_editing(&self) -> bool {
        self.interaction != Interaction::Idle
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    pub fn drain_events(&mut self) -> Vec<ExplorerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Publish a rewritten forest. Returns `false` when nothing changed.
    fn commit_forest(&mut self, next: Forest) -> bool {
        if next == self.forest {
            return false;
        }
        if !self.controlled {
            self.forest = next.clone();
        }
        self.events.push(ExplorerEvent::ForestChanged(next));
        true
    }

    fn next_free_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            if !self.forest.contains(&id) {
                return id;
            }
        }
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        let next = self.forest.toggle(id);
        self.commit_forest(next)
    }

    pub fn expand(&mut self, id: &str) -> bool {
        let next = self.forest.expand(id);
        self.commit_forest(next)
    }

    pub fn collapse(&mut self, id: &str) -> bool {
        let next = self.forest.collapse(id);
        self.commit_forest(next)
    }

    /// Select a node. A creation draft in progress is abandoned.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(node) = self.forest.find_by_id(id).cloned() else {
            return false;
        };
        if matches!(self.interaction, Interaction::Creating(_)) {
            log::debug!("Explorer: selection moved, dropping creation draft");
            self.interaction = Interaction::Idle;
        }
        self.selected_id = Some(node.id.clone());
        self.events.push(ExplorerEvent::Selected(node));
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    /// Click on a row: select it and flip it open or closed if it is a folder
    pub fn activate(&mut self, id: &str) -> bool {
        if !self.select(id) {
            return false;
        }
        if let Some(node) = self.forest.find_by_id(id).cloned() {
            if node.is_folder() {
                self.toggle(id);
            }
            self.events.push(ExplorerEvent::Activated(node));
        }
        true
    }

    /// Open an inline creation draft.
    ///
    /// `context_item_id` is the item the action was invoked on. From the
    /// context menu without an item the draft targets the root; otherwise the
    /// context item (or the selection) decides the folder.
    pub fn start_creating(
        &mut self,
        kind: NodeKind,
        context_item_id: Option<&str>,
        from_context_menu: bool,
    ) -> bool {
        if !self.options.allows_create(kind) {
            log::debug!("Explorer: creating {} is disabled", kind.as_str());
            return false;
        }
        self.context_menu = None;

        let target = if from_context_menu && context_item_id.is_none() {
            None
        } else {
            context_item_id
                .map(str::to_string)
                .or_else(|| self.selected_id.clone())
                .and_then(|id| self.forest.resolve_target_folder(&id))
        };

        if let Some(folder_id) = &target {
            let opened = self.forest.expand(folder_id);
            self.commit_forest(opened);
        }

        self.interaction = Interaction::Creating(CreateDraft {
            kind,
            name: String::new(),
            target_folder_id: target,
        });
        true
    }

    /// Open an inline rename draft pre-filled with the current name
    pub fn start_renaming(&mut self, id: &str) -> bool {
        if !self.options.rename {
            return false;
        }
        let Some(node) = self.forest.find_by_id(id) else {
            return false;
        };
        self.interaction = Interaction::Renaming(RenameDraft {
            item_id: node.id.clone(),
            name: node.name.clone(),
        });
        self.context_menu = None;
        true
    }

    pub fn draft_name(&self) -> Option<&str> {
        match &self.interaction {
            Interaction::Idle => None,
            Interaction::Creating(draft) => Some(&draft.name),
            Interaction::Renaming(draft) => Some(&draft.name),
        }
    }

    fn draft_name_mut(&mut self) -> Option<&mut String> {
        match &mut self.interaction {
            Interaction::Idle => None,
            Interaction::Creating(draft) => Some(&mut draft.name),
            Interaction::Renaming(draft) => Some(&mut draft.name),
        }
    }

    pub fn set_draft_name(&mut self, name: &str) {
        if let Some(buffer) = self.draft_name_mut() {
            *buffer = name.to_string();
        }
    }

    pub fn draft_insert(&mut self, c: char) {
        if let Some(buffer) = self.draft_name_mut() {
            buffer.push(c);
        }
    }

    pub fn draft_backspace(&mut self) {
        if let Some(buffer) = self.draft_name_mut() {
            buffer.pop();
        }
    }

    pub fn cancel_draft(&mut self) {
        self.interaction = Interaction::Idle;
    }

    /// Enter or blur: apply whichever draft is open
    pub fn commit_draft(&mut self) -> bool {
        match &self.interaction {
            Interaction::Idle => false,
            Interaction::Creating(_) => self.commit_create().is_some(),
            Interaction::Renaming(_) => self.commit_rename(),
        }
    }

    /// Apply the creation draft. Returns the id of the new node.
    pub fn commit_create(&mut self) -> Option<String> {
        let draft = match std::mem::take(&mut self.interaction) {
            Interaction::Creating(draft) => draft,
            other => {
                self.interaction = other;
                return None;
            }
        };

        let name = draft.name.trim().to_string();
        if name.is_empty() {
            log::debug!("Explorer: empty name, creation cancelled");
            return None;
        }

        let request = CreateRequest {
            kind: draft.kind,
            name,
            target_folder_id: draft.target_folder_id,
        };
        if !self.hooks.before_create(&request) {
            log::info!("Explorer: creation of '{}' vetoed", request.name);
            return None;
        }

        let id = self.next_free_id();
        let next = self.forest.create(
            request.kind,
            request.target_folder_id.as_deref(),
            &id,
            &request.name,
        );
        let node = next.find_by_id(&id).cloned()?;
        if !self.commit_forest(next) {
            return None;
        }

        log::info!("Explorer: created {} '{}' ({})", node.kind.as_str(), node.name, id);
        self.hooks.after_create(&node, &request);
        self.events.push(ExplorerEvent::Created(node));
        Some(id)
    }

    /// Apply the rename draft. Blank or unchanged names change nothing.
    pub fn commit_rename(&mut self) -> bool {
        let draft = match std::mem::take(&mut self.interaction) {
            Interaction::Renaming(draft) => draft,
            other => {
                self.interaction = other;
                return false;
            }
        };

        let new_name = draft.name.trim();
        let Some(node) = self.forest.find_by_id(&draft.item_id).cloned() else {
            return false;
        };
        if new_name.is_empty() || new_name == node.name {
            return false;
        }
        if !self.hooks.before_rename(&node, new_name) {
            log::info!("Explorer: rename of '{}' vetoed", node.name);
            return false;
        }

        let next = self.forest.rename(&node.id, new_name);
        let Some(renamed) = next.find_by_id(&node.id).cloned() else {
            return false;
        };
        if !self.commit_forest(next) {
            return false;
        }

        self.hooks.after_rename(&renamed, &node.name);
        self.events.push(ExplorerEvent::Renamed {
            id: node.id,
            from: node.name,
            to: renamed.name,
        });
        true
    }

    /// Remove a node and its subtree
    pub fn delete(&mut self, id: &str) -> bool {
        if !self.options.delete {
            return false;
        }
        let Some(node) = self.forest.find_by_id(id).cloned() else {
            return false;
        };
        self.context_menu = None;
        if !self.hooks.before_delete(&node) {
            log::info!("Explorer: deletion of '{}' vetoed", node.name);
            return false;
        }

        let next = self.forest.delete(id);
        // A controlled owner may reject the proposal; set_forest tidies up once it lands
        let selection_gone = !self.controlled
            && self
                .selected_id
                .as_deref()
                .is_some_and(|selected| !next.contains(selected));
        let draft_gone = !self.controlled && self.draft_is_stale(&next);
        if !self.commit_forest(next) {
            return false;
        }

        if selection_gone {
            self.selected_id = None;
        }
        if draft_gone {
            self.interaction = Interaction::Idle;
        }
        log::info!("Explorer: deleted '{}' ({})", node.name, node.id);
        self.hooks.after_delete(&node);
        self.events.push(ExplorerEvent::Deleted(node));
        true
    }

    /// Open the context menu at a screen cell, bound to an item or to the root.
    /// Nothing opens when every entry is disabled.
    pub fn open_context_menu(&mut self, x: u16, y: u16, item_id: Option<&str>) -> bool {
        let item_id = item_id.filter(|id| self.forest.contains(id)).map(str::to_string);
        let menu = ContextMenu::new(x, y, item_id);
        if menu.entries(&self.options).is_empty() {
            self.context_menu = None;
            return false;
        }
        self.context_menu = Some(menu);
        true
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    pub fn menu_highlight_next(&mut self) {
        if let Some(menu) = self.context_menu.as_mut() {
            menu.highlight_next(&self.options);
        }
    }

    pub fn menu_highlight_previous(&mut self) {
        if let Some(menu) = self.context_menu.as_mut() {
            menu.highlight_previous(&self.options);
        }
    }

    /// Run a menu action against the menu's item, closing the menu
    pub fn menu_action(&mut self, action: MenuAction) -> bool {
        let Some(menu) = self.context_menu.take() else {
            return false;
        };
        if !self.options.allows(action) {
            return false;
        }
        let item_id = menu.item_id.as_deref();
        match action {
            MenuAction::NewFile => self.start_creating(NodeKind::File, item_id, true),
            MenuAction::NewFolder => self.start_creating(NodeKind::Folder, item_id, true),
            MenuAction::Rename => item_id.is_some_and(|id| self.start_renaming(id)),
            MenuAction::Delete => item_id.is_some_and(|id| self.delete(id)),
        }
    }

    pub fn activate_highlighted_menu_entry(&mut self) -> bool {
        match self
            .context_menu
            .as_ref()
            .and_then(|menu| menu.highlighted_action(&self.options))
        {
            Some(action) => self.menu_action(action),
            None => false,
        }
    }

    fn visible_ids(&self) -> Vec<String> {
        self.forest
            .visible_nodes_with_depth()
            .into_iter()
            .map(|(node, _)| node.id.clone())
            .collect()
    }

    fn select_visible(&mut self, pick: impl FnOnce(Option<usize>, usize) -> usize) -> bool {
        let ids = self.visible_ids();
        if ids.is_empty() {
            return false;
        }
        let current = self
            .selected_id
            .as_deref()
            .and_then(|selected| ids.iter().position(|id| id == selected));
        let index = pick(current, ids.len()).min(ids.len() - 1);
        if current == Some(index) {
            return false;
        }
        self.select(&ids[index])
    }

    pub fn select_next(&mut self) -> bool {
        self.select_visible(|current, _| current.map_or(0, |i| i + 1))
    }

    pub fn select_previous(&mut self) -> bool {
        self.select_visible(|current, _| current.map_or(0, |i| i.saturating_sub(1)))
    }

    pub fn select_first(&mut self) -> bool {
        self.select_visible(|_, _| 0)
    }

    pub fn select_last(&mut self) -> bool {
        self.select_visible(|_, len| len - 1)
    }

    /// Open the selected folder, or step into its first child when already open
    pub fn expand_or_enter(&mut self) -> bool {
        let Some(node) = self.selected_node().cloned() else {
            return false;
        };
        if !node.is_folder() {
            return false;
        }
        if !node.is_expanded {
            return self.expand(&node.id);
        }
        match node.children.first() {
            Some(child) => self.select(&child.id),
            None => false,
        }
    }

    /// Close the selected folder, or step out to the parent
    pub fn collapse_or_parent(&mut self) -> bool {
        let Some(node) = self.selected_node().cloned() else {
            return false;
        };
        if node.is_folder() && node.is_expanded {
            return self.collapse(&node.id);
        }
        match self.forest.find_parent_of(&node.id).map(|parent| parent.id.clone()) {
            Some(parent_id) => self.select(&parent_id),
            None => false,
        }
    }

    /// Flattened render model of the visible tree, drafts included
    pub fn rows(&self) -> Vec<ExplorerRow<'_>> {
        let (draft, rename) = match &self.interaction {
            Interaction::Creating(draft) => (Some(draft), None),
            Interaction::Renaming(draft) => (None, Some(draft)),
            Interaction::Idle => (None, None),
        };

        let mut rows = Vec::new();
        let mut draft_placed = draft.is_none();
        for (node, depth) in self.forest.visible_nodes_with_depth() {
            let rename_buffer = rename
                .filter(|rename| rename.item_id == node.id)
                .map(|rename| rename.name.as_str());
            rows.push(ExplorerRow::Item {
                node,
                depth,
                selected: self.selected_id.as_deref() == Some(node.id.as_str()),
                rename_buffer,
            });

            if let Some(draft) = draft {
                if !draft_placed && draft.target_folder_id.as_deref() == Some(node.id.as_str()) {
                    rows.push(ExplorerRow::Draft {
                        kind: draft.kind,
                        name: &draft.name,
                        depth: depth + 1,
                    });
                    draft_placed = true;
                }
            }
        }

        if let (Some(draft), false) = (draft, draft_placed) {
            rows.push(ExplorerRow::Draft {
                kind: draft.kind,
                name: &draft.name,
                depth: 0,
            });
        }
        rows
    }

    /// Row index of the selection within [`Explorer::rows`]
    pub fn selected_row(&self) -> Option<usize> {
        let selected = self.selected_id.as_deref()?;
        self.rows().iter().position(|row| row.node_id() == Some(selected))
    }
}
