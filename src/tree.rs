use crate::error::Result;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Kind of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }
}

/// A single node of the explorer forest.
///
/// Only folders carry children, and `is_expanded` is only meaningful for folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_expanded: bool,
}

impl Node {
    /// Create a new file node
    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::File,
            children: Vec::new(),
            is_expanded: false,
        }
    }

    /// Create a new, collapsed and empty folder node
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::Folder,
            children: Vec::new(),
            is_expanded: false,
        }
    }

    /// Replace the children of a folder. Files ignore this.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        if self.is_folder() {
            self.children = children;
        }
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        if self.is_folder() {
            self.is_expanded = expanded;
        }
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Shallow copy carrying a new child list
    fn rebuilt(&self, children: Vec<Node>) -> Node {
        Node {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            children,
            is_expanded: self.is_expanded,
        }
    }

    fn normalized(mut self) -> Node {
        if self.is_file() {
            if !self.children.is_empty() || self.is_expanded {
                log::warn!("Dropping folder state from file node '{}'", self.id);
            }
            self.children.clear();
            self.is_expanded = false;
        } else {
            self.children = self.children.into_iter().map(Node::normalized).collect();
        }
        self
    }
}

/// Summary counts over a forest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub folders: usize,
    pub files: usize,
    pub expanded_folders: usize,
}

/// Ordered collection of root nodes.
///
/// Every mutating operation is a pure rewrite: `self` is left untouched and a
/// new forest is returned. Unknown ids leave the result equal to the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    pub roots: Vec<Node>,
}

impl Forest {
    pub fn new(roots: Vec<Node>) -> Self {
        Self { roots }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Parse a forest from its JSON form, dropping folder state carried by files
    pub fn from_json(json: &str) -> Result<Self> {
        let forest: Forest = serde_json::from_str(json)?;
        Ok(forest.normalized())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn normalized(self) -> Self {
        Forest {
            roots: self.roots.into_iter().map(Node::normalized).collect(),
        }
    }

    /// Build a forest from a directory, honoring .gitignore rules.
    ///
    /// Node ids are the paths relative to `path`, using `/` as separator.
    pub fn from_directory<P: AsRef<Path>>(path: P) -> Result<Self> {
        let start_time = Instant::now();
        let root = path.as_ref();
        log::info!("Forest::from_directory: scanning {:?}", root);

        let walk = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .parents(true)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        let mut by_parent: HashMap<PathBuf, Vec<(PathBuf, bool)>> = HashMap::new();
        for result in walk {
            match result {
                Ok(entry) => {
                    let entry_path = entry.path();
                    if entry_path == root {
                        continue;
                    }
                    let relative = entry_path
                        .strip_prefix(root)
                        .unwrap_or(entry_path)
                        .to_path_buf();
                    let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                    let parent = relative.parent().map(Path::to_path_buf).unwrap_or_default();
                    by_parent.entry(parent).or_default().push((relative, is_dir));
                }
                Err(err) => {
                    log::warn!("Forest::from_directory: error walking directory: {}", err);
                }
            }
        }

        let forest = Forest {
            roots: Self::build_level(Path::new(""), &by_parent),
        };
        log::info!(
            "Forest::from_directory: {} root nodes in {:?}",
            forest.roots.len(),
            start_time.elapsed()
        );
        Ok(forest)
    }

    fn build_level(parent: &Path, by_parent: &HashMap<PathBuf, Vec<(PathBuf, bool)>>) -> Vec<Node> {
        let mut nodes: Vec<Node> = by_parent
            .get(parent)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(path, is_dir)| {
                        let id = path.to_string_lossy().replace('\\', "/");
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| id.clone());
                        if *is_dir {
                            Node::folder(id, name).with_children(Self::build_level(path, by_parent))
                        } else {
                            Node::file(id, name)
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Folders first, then files, both alphabetically
        nodes.sort_by(|a, b| match (a.is_folder(), b.is_folder()) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a.name.cmp(&b.name),
        });
        nodes
    }

    /// Depth-first search for the first node with the given id
    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        Self::find_in(&self.roots, id)
    }

    fn find_in<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
        for node in nodes {
            if node.id == id {
                return Some(node);
            }
            if let Some(found) = Self::find_in(&node.children, id) {
                return Some(found);
            }
        }
        None
    }

    /// Folder directly containing `id`. `None` for root-level or unknown ids.
    pub fn find_parent_of(&self, id: &str) -> Option<&Node> {
        Self::find_parent_in(&self.roots, id)
    }

    fn find_parent_in<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
        for node in nodes {
            if node.children.iter().any(|child| child.id == id) {
                return Some(node);
            }
            if let Some(found) = Self::find_parent_in(&node.children, id) {
                return Some(found);
            }
        }
        None
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Folder an operation aimed at `id` should land in.
    ///
    /// A folder targets itself, a file delegates to its parent folder and a
    /// root-level (or unknown) item delegates to the root, reported as `None`.
    pub fn resolve_target_folder(&self, id: &str) -> Option<String> {
        match self.find_by_id(id) {
            Some(node) if node.is_folder() => Some(node.id.clone()),
            _ => self.find_parent_of(id).map(|parent| parent.id.clone()),
        }
    }

    /// Slash separated names from the root down to `id`
    pub fn path_of(&self, id: &str) -> Option<String> {
        let mut names = Vec::new();
        if Self::collect_path(&self.roots, id, &mut names) {
            Some(names.join("/"))
        } else {
            None
        }
    }

    fn collect_path<'a>(nodes: &'a [Node], id: &str, names: &mut Vec<&'a str>) -> bool {
        for node in nodes {
            names.push(&node.name);
            if node.id == id || Self::collect_path(&node.children, id, names) {
                return true;
            }
            names.pop();
        }
        false
    }

    /// Flip the expanded flag of a folder
    pub fn toggle(&self, id: &str) -> Forest {
        self.update_folder(id, |folder| folder.is_expanded = !folder.is_expanded)
    }

    pub fn expand(&self, id: &str) -> Forest {
        self.update_folder(id, |folder| folder.is_expanded = true)
    }

    pub fn collapse(&self, id: &str) -> Forest {
        self.update_folder(id, |folder| folder.is_expanded = false)
    }

    fn update_folder(&self, id: &str, update: impl Fn(&mut Node)) -> Forest {
        match self.find_by_id(id) {
            Some(node) if node.is_folder() => Forest {
                roots: Self::rewrite_matching(&self.roots, id, &update),
            },
            Some(_) => {
                log::debug!("Forest: '{}' is a file, nothing to expand", id);
                self.clone()
            }
            None => {
                log::debug!("Forest: no node with id '{}'", id);
                self.clone()
            }
        }
    }

    /// Append a new node to `target` (a folder id) or to the root when `target` is `None`.
    ///
    /// The target folder is opened. The call is a no-op when the trimmed name is
    /// empty, the target is missing or not a folder, or `id` is already taken.
    pub fn create(&self, kind: NodeKind, target: Option<&str>, id: &str, name: &str) -> Forest {
        let name = name.trim();
        if name.is_empty() {
            log::debug!("Forest::create: empty name, ignoring");
            return self.clone();
        }
        if id.is_empty() || self.contains(id) {
            log::warn!("Forest::create: id '{}' is empty or already in use", id);
            return self.clone();
        }

        let node = match kind {
            NodeKind::File => Node::file(id, name),
            NodeKind::Folder => Node::folder(id, name),
        };

        match target {
            None => {
                let mut roots = self.roots.clone();
                roots.push(node);
                Forest { roots }
            }
            Some(target_id) => match self.find_by_id(target_id) {
                Some(folder) if folder.is_folder() => Forest {
                    roots: Self::rewrite_matching(&self.roots, target_id, &|folder: &mut Node| {
                        folder.children.push(node.clone());
                        folder.is_expanded = true;
                    }),
                },
                _ => {
                    log::debug!("Forest::create: target '{}' is not a folder", target_id);
                    self.clone()
                }
            },
        }
    }

    /// Rename a node. Blank or unchanged names leave the forest as it was.
    pub fn rename(&self, id: &str, new_name: &str) -> Forest {
        let new_name = new_name.trim();
        match self.find_by_id(id) {
            Some(node) if !new_name.is_empty() && node.name != new_name => Forest {
                roots: Self::rewrite_matching(&self.roots, id, &|node: &mut Node| {
                    node.name = new_name.to_string();
                }),
            },
            _ => self.clone(),
        }
    }

    /// Remove a node, and with it all of its descendants
    pub fn delete(&self, id: &str) -> Forest {
        if !self.contains(id) {
            return self.clone();
        }
        Forest {
            roots: Self::remove_matching(&self.roots, id),
        }
    }

    fn rewrite_matching(nodes: &[Node], id: &str, update: &dyn Fn(&mut Node)) -> Vec<Node> {
        nodes
            .iter()
            .map(|node| {
                if node.id == id {
                    let mut updated = node.clone();
                    update(&mut updated);
                    updated
                } else if node.children.is_empty() {
                    node.clone()
                } else {
                    node.rebuilt(Self::rewrite_matching(&node.children, id, update))
                }
            })
            .collect()
    }

    fn remove_matching(nodes: &[Node], id: &str) -> Vec<Node> {
        nodes
            .iter()
            .filter(|node| node.id != id)
            .map(|node| {
                if node.children.is_empty() {
                    node.clone()
                } else {
                    node.rebuilt(Self::remove_matching(&node.children, id))
                }
            })
            .collect()
    }

    /// Nodes reachable through expanded folders, paired with their depth
    pub fn visible_nodes_with_depth(&self) -> Vec<(&Node, usize)> {
        let mut visible = Vec::new();
        for node in &self.roots {
            Self::collect_visible(node, 0, &mut visible);
        }
        visible
    }

    fn collect_visible<'a>(node: &'a Node, depth: usize, visible: &mut Vec<(&'a Node, usize)>) {
        visible.push((node, depth));
        if node.is_folder() && node.is_expanded {
            for child in &node.children {
                Self::collect_visible(child, depth + 1, visible);
            }
        }
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        for node in &self.roots {
            Self::collect_stats(node, &mut stats);
        }
        stats
    }

    fn collect_stats(node: &Node, stats: &mut TreeStats) {
        match node.kind {
            NodeKind::File => stats.files += 1,
            NodeKind::Folder => {
                stats.folders += 1;
                if node.is_expanded {
                    stats.expanded_folders += 1;
                }
            }
        }
        for child in &node.children {
            Self::collect_stats(child, stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_forest() -> Forest {
        Forest::new(vec![
            Node::folder("src", "src").expanded(true).with_children(vec![
                Node::folder("components", "components").with_children(vec![
                    Node::file("button", "Button.tsx"),
                    Node::file("input", "Input.tsx"),
                ]),
                Node::file("main", "main.ts"),
            ]),
            Node::file("readme", "README.md"),
        ])
    }

    #[test]
    fn test_node_creation() {
        let file = Node::file("1", "a.ts");
        assert!(file.is_file());
        assert!(file.children.is_empty());
        assert!(!file.is_expanded);

        let folder = Node::folder("2", "src");
        assert!(folder.is_folder());
        assert!(!folder.is_expanded);
    }

    #[test]
    fn test_files_ignore_folder_state() {
        let file = Node::file("1", "a.ts")
            .expanded(true)
            .with_children(vec![Node::file("2", "b.ts")]);
        assert!(!file.is_expanded);
        assert!(file.children.is_empty());
    }

    #[test]
    fn test_find_by_id_and_parent() {
        let forest = sample_forest();
        assert_eq!(forest.find_by_id("input").map(|n| n.name.as_str()), Some("Input.tsx"));
        assert_eq!(forest.find_parent_of("input").map(|n| n.id.as_str()), Some("components"));
        assert_eq!(forest.find_parent_of("components").map(|n| n.id.as_str()), Some("src"));
        assert!(forest.find_parent_of("readme").is_none());
        assert!(forest.find_by_id("missing").is_none());
    }

    #[test]
    fn test_resolve_target_folder() {
        let forest = sample_forest();
        assert_eq!(forest.resolve_target_folder("components"), Some("components".to_string()));
        assert_eq!(forest.resolve_target_folder("main"), Some("src".to_string()));
        assert_eq!(forest.resolve_target_folder("readme"), None);
        assert_eq!(forest.resolve_target_folder("missing"), None);
    }

    #[test]
    fn test_toggle_flips_only_target() {
        let forest = sample_forest();
        let toggled = forest.toggle("components");
        assert!(toggled.find_by_id("components").unwrap().is_expanded);
        assert!(toggled.find_by_id("src").unwrap().is_expanded);
        assert_eq!(toggled.toggle("components"), forest);
    }

    #[test]
    fn test_toggle_file_is_noop() {
        let forest = sample_forest();
        assert_eq!(forest.toggle("main"), forest);
        assert_eq!(forest.toggle("missing"), forest);
    }

    #[test]
    fn test_create_into_folder_opens_it() {
        let forest = sample_forest();
        let created = forest.create(NodeKind::File, Some("components"), "new", "  Card.tsx ");

        let components = created.find_by_id("components").unwrap();
        assert!(components.is_expanded);
        assert_eq!(components.children.last().unwrap().name, "Card.tsx");
        assert_eq!(created.find_parent_of("new").unwrap().id, "components");
    }

    #[test]
    fn test_create_at_root_appends() {
        let forest = sample_forest();
        let created = forest.create(NodeKind::Folder, None, "docs", "docs");
        let last = created.roots.last().unwrap();
        assert_eq!(last.id, "docs");
        assert!(last.is_folder());
        assert!(last.children.is_empty());
    }

    #[test]
    fn test_create_rejects_blank_names_and_bad_targets() {
        let forest = sample_forest();
        assert_eq!(forest.create(NodeKind::File, None, "x", "   "), forest);
        assert_eq!(forest.create(NodeKind::File, Some("main"), "x", "a.ts"), forest);
        assert_eq!(forest.create(NodeKind::File, Some("missing"), "x", "a.ts"), forest);
        assert_eq!(forest.create(NodeKind::File, None, "main", "dup.ts"), forest);
    }

    #[test]
    fn test_rename() {
        let forest = sample_forest();
        let renamed = forest.rename("main", " index.ts ");
        assert_eq!(renamed.find_by_id("main").unwrap().name, "index.ts");
        assert_eq!(forest.rename("main", "   "), forest);
        assert_eq!(forest.rename("main", "main.ts"), forest);
        assert_eq!(forest.rename("missing", "x"), forest);
    }

    #[test]
    fn test_delete_removes_descendants() {
        let forest = sample_forest();
        let deleted = forest.delete("components");
        assert!(deleted.find_by_id("components").is_none());
        assert!(deleted.find_by_id("button").is_none());
        assert!(deleted.find_by_id("input").is_none());
        assert!(deleted.find_by_id("main").is_some());
        // The source forest is untouched
        assert!(forest.find_by_id("button").is_some());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let forest = sample_forest();
        assert_eq!(forest.delete("missing"), forest);
    }

    #[test]
    fn test_visible_nodes_with_depth() {
        let forest = sample_forest();
        let visible: Vec<(&str, usize)> = forest
            .visible_nodes_with_depth()
            .into_iter()
            .map(|(node, depth)| (node.id.as_str(), depth))
            .collect();
        assert_eq!(
            visible,
            vec![("src", 0), ("components", 1), ("main", 1), ("readme", 0)]
        );
    }

    #[test]
    fn test_path_of() {
        let forest = sample_forest();
        assert_eq!(forest.path_of("button"), Some("src/components/Button.tsx".to_string()));
        assert_eq!(forest.path_of("readme"), Some("README.md".to_string()));
        assert_eq!(forest.path_of("missing"), None);
    }

    #[test]
    fn test_stats() {
        let stats = sample_forest().stats();
        assert_eq!(stats.folders, 2);
        assert_eq!(stats.files, 4);
        assert_eq!(stats.expanded_folders, 1);
    }

    #[test]
    fn test_json_format() {
        let json = r#"[
            {"id": "1", "name": "src", "type": "folder", "isExpanded": true, "children": [
                {"id": "2", "name": "a.ts", "type": "file", "children": [{"id": "3", "name": "x", "type": "file"}]}
            ]},
            {"id": "4", "name": "docs", "type": "folder"}
        ]"#;
        let forest = Forest::from_json(json).unwrap();
        assert!(forest.find_by_id("1").unwrap().is_expanded);
        // Files never keep children
        assert!(forest.find_by_id("3").is_none());
        assert!(forest.find_by_id("4").unwrap().children.is_empty());

        let out = forest.to_json().unwrap();
        assert!(out.contains("\"type\": \"folder\""));
        assert!(out.contains("\"isExpanded\": true"));
        assert_eq!(Forest::from_json(&out).unwrap(), forest);
    }

    #[test]
    fn test_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/nested/mod.rs"), "").unwrap();
        fs::write(root.join("Cargo.toml"), "[package]").unwrap();

        let forest = Forest::from_directory(root).unwrap();
        assert_eq!(forest.roots[0].id, "src");
        assert!(forest.roots[0].is_folder());
        assert_eq!(forest.roots[1].name, "Cargo.toml");

        let src = forest.find_by_id("src").unwrap();
        assert_eq!(src.children[0].id, "src/nested");
        assert_eq!(src.children[1].id, "src/main.rs");
        assert_eq!(forest.find_parent_of("src/nested/mod.rs").unwrap().id, "src/nested");
    }
}
