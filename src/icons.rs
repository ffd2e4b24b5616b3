use crate::error::{Result, WidgetLabError};
use crate::tree::{Node, NodeKind};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const DEFAULT_FILE_ICON: &str = "file";
pub const DEFAULT_FOLDER_ICON: &str = "folder";
pub const DEFAULT_FOLDER_OPEN_ICON: &str = "folder-open";
pub const OPEN_SUFFIX: &str = "-open";
pub const LIGHT_SUFFIX: &str = "_light";

/// Maps node names to icon names
pub trait IconResolver {
    fn file_icon(&self, name: &str) -> String;
    fn folder_icon(&self, name: &str, expanded: bool) -> String;

    fn icon_for(&self, node: &Node) -> String {
        match node.kind {
            NodeKind::File => self.file_icon(&node.name),
            NodeKind::Folder => self.folder_icon(&node.name, node.is_expanded),
        }
    }
}

/// Text after the last dot, unless the dot starts the name (".gitignore" has no extension)
pub fn file_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) if index > 0 => &name[index + 1..],
        _ => "",
    }
}

/// Name tables an icon theme ships with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IconCatalog {
    pub folder_names: HashMap<String, String>,
    pub file_names: HashMap<String, String>,
    pub file_extensions: HashMap<String, String>,
    /// Substring matches tried between exact names and extensions
    pub name_fragments: BTreeMap<String, String>,
}

impl IconCatalog {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog: IconCatalog = serde_json::from_str(&content)?;
        Ok(catalog.normalized())
    }

    /// File names, fragments and extensions are matched case-insensitively
    fn normalized(self) -> Self {
        let lower = |map: HashMap<String, String>| {
            map.into_iter()
                .map(|(key, icon)| (key.to_lowercase(), icon))
                .collect::<HashMap<_, _>>()
        };
        IconCatalog {
            folder_names: self.folder_names,
            file_names: lower(self.file_names),
            file_extensions: lower(self.file_extensions),
            name_fragments: self
                .name_fragments
                .into_iter()
                .map(|(key, icon)| (key.to_lowercase(), icon))
                .collect(),
        }
    }

    fn builtin_table() -> Self {
        let pairs = |entries: &[(&str, &str)]| {
            entries
                .iter()
                .map(|(key, icon)| (key.to_string(), icon.to_string()))
                .collect::<HashMap<_, _>>()
        };

        IconCatalog {
            folder_names: pairs(&[
                ("src", "folder-src"),
                ("components", "folder-components"),
                ("public", "folder-public"),
                ("tests", "folder-test"),
                ("node_modules", "folder-node"),
            ]),
            file_names: pairs(&[
                (".gitignore", "git"),
                ("package.json", "npm"),
                ("cargo.toml", "rust"),
            ]),
            file_extensions: pairs(&[
                ("ts", "typescript"),
                ("tsx", "typescript"),
                ("js", "javascript"),
                ("jsx", "javascript"),
                ("json", "json"),
                ("html", "html"),
                ("css", "css"),
                ("md", "markdown"),
                ("gitignore", "git"),
                ("png", "image"),
                ("jpg", "image"),
                ("svg", "image"),
                ("rs", "rust"),
            ]),
            name_fragments: [("config".to_string(), "config".to_string())]
                .into_iter()
                .collect(),
        }
    }
}

impl IconResolver for IconCatalog {
    fn file_icon(&self, name: &str) -> String {
        let lower = name.to_lowercase();
        if let Some(icon) = self.file_names.get(&lower) {
            return icon.clone();
        }
        if let Some(icon) = self
            .name_fragments
            .iter()
            .find(|(fragment, _)| lower.contains(fragment.as_str()))
            .map(|(_, icon)| icon)
        {
            return icon.clone();
        }
        let extension = file_extension(&lower);
        if !extension.is_empty() {
            if let Some(icon) = self.file_extensions.get(extension) {
                return icon.clone();
            }
        }
        DEFAULT_FILE_ICON.to_string()
    }

    fn folder_icon(&self, name: &str, expanded: bool) -> String {
        let named = self
            .folder_names
            .get(name)
            .or_else(|| self.folder_names.get(&name.to_lowercase()));
        match (named, expanded) {
            (Some(icon), true) => format!("{}{}", icon, OPEN_SUFFIX),
            (Some(icon), false) => icon.clone(),
            (None, true) => DEFAULT_FOLDER_OPEN_ICON.to_string(),
            (None, false) => DEFAULT_FOLDER_ICON.to_string(),
        }
    }
}

/// Resolver backed by the compiled-in table
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticIconTable;

impl IconResolver for StaticIconTable {
    fn file_icon(&self, name: &str) -> String {
        BUILTIN_CATALOG.file_icon(name)
    }

    fn folder_icon(&self, name: &str, expanded: bool) -> String {
        BUILTIN_CATALOG.folder_icon(name, expanded)
    }
}

/// Terminal rendition of an icon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    pub symbol: String,
    /// Hex colour such as "#3178c6"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Glyph {
    pub fn new(symbol: &str, color: Option<&str>) -> Self {
        Self {
            symbol: symbol.to_string(),
            color: color.map(str::to_string),
        }
    }
}

lazy_static! {
    static ref BUILTIN_CATALOG: IconCatalog = IconCatalog::builtin_table();
    static ref BUILTIN_GLYPHS: HashMap<&'static str, Glyph> = {
        let mut glyphs = HashMap::new();
        glyphs.insert("file", Glyph::new("-", None));
        glyphs.insert("folder", Glyph::new("■", Some("#dcb67a")));
        glyphs.insert("folder-open", Glyph::new("□", Some("#dcb67a")));
        glyphs.insert("folder-src", Glyph::new("■", Some("#4caf50")));
        glyphs.insert("folder-src-open", Glyph::new("□", Some("#4caf50")));
        glyphs.insert("folder-components", Glyph::new("■", Some("#c0ca33")));
        glyphs.insert("folder-components-open", Glyph::new("□", Some("#c0ca33")));
        glyphs.insert("folder-public", Glyph::new("■", Some("#039be5")));
        glyphs.insert("folder-public-open", Glyph::new("□", Some("#039be5")));
        glyphs.insert("folder-test", Glyph::new("■", Some("#00bfa5")));
        glyphs.insert("folder-test-open", Glyph::new("□", Some("#00bfa5")));
        glyphs.insert("typescript", Glyph::new("T", Some("#3178c6")));
        glyphs.insert("javascript", Glyph::new("J", Some("#f1e05a")));
        glyphs.insert("javascript_light", Glyph::new("J", Some("#b08800")));
        glyphs.insert("json", Glyph::new("{", Some("#cbcb41")));
        glyphs.insert("json_light", Glyph::new("{", Some("#8a8a00")));
        glyphs.insert("html", Glyph::new("<", Some("#e34c26")));
        glyphs.insert("css", Glyph::new("#", Some("#563d7c")));
        glyphs.insert("markdown", Glyph::new("M", Some("#519aba")));
        glyphs.insert("git", Glyph::new("G", Some("#f14e32")));
        glyphs.insert("image", Glyph::new("▨", Some("#a074c4")));
        glyphs.insert("config", Glyph::new("*", Some("#6d8086")));
        glyphs.insert("npm", Glyph::new("N", Some("#cb3837")));
        glyphs.insert("rust", Glyph::new("R", Some("#dea584")));
        glyphs
    };
}

/// Glyph used when an icon name cannot be loaded
pub fn fallback_glyph(kind: NodeKind, expanded: bool) -> Glyph {
    let name = match (kind, expanded) {
        (NodeKind::File, _) => DEFAULT_FILE_ICON,
        (NodeKind::Folder, true) => DEFAULT_FOLDER_OPEN_ICON,
        (NodeKind::Folder, false) => DEFAULT_FOLDER_ICON,
    };
    BUILTIN_GLYPHS
        .get(name)
        .cloned()
        .unwrap_or_else(|| Glyph::new("?", None))
}

/// Where glyphs for icon names come from
#[cfg_attr(test, mockall::automock)]
pub trait IconSource: Send + Sync {
    /// `Ok(None)` when the source has no glyph with this name
    fn fetch(&self, icon_name: &str) -> Result<Option<Glyph>>;
}

/// Glyphs compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinGlyphs;

impl IconSource for BuiltinGlyphs {
    fn fetch(&self, icon_name: &str) -> Result<Option<Glyph>> {
        Ok(BUILTIN_GLYPHS.get(icon_name).cloned())
    }
}

/// Directory of `<icon name>.json` glyph files
#[derive(Debug, Clone)]
pub struct DirGlyphSource {
    dir: PathBuf,
}

impl DirGlyphSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

impl IconSource for DirGlyphSource {
    fn fetch(&self, icon_name: &str) -> Result<Option<Glyph>> {
        if icon_name.is_empty() || icon_name.contains(['/', '\\']) || icon_name.contains("..") {
            return Err(WidgetLabError::Icon(format!("invalid icon name '{}'", icon_name)));
        }
        let path = self.dir.join(format!("{}.json", icon_name));
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// Asynchronous glyph loader with an in-memory cache.
///
/// Cache keys are the names that were actually found, so a light-mode hit is
/// stored under `<name>_light`. Clones share the cache.
#[derive(Clone)]
pub struct IconLoader {
    source: Arc<dyn IconSource>,
    cache: Arc<RwLock<HashMap<String, Glyph>>>,
    missing: Arc<RwLock<HashSet<String>>>,
}

impl IconLoader {
    pub fn new(source: Arc<dyn IconSource>) -> Self {
        Self {
            source,
            cache: Arc::new(RwLock::new(HashMap::new())),
            missing: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub fn builtin() -> Self {
        Self::new(Arc::new(BuiltinGlyphs))
    }

    /// Load the glyph for `icon_name`, preferring the light variant in light mode.
    /// Returns `None` when no variant exists.
    pub async fn load(&self, icon_name: &str, light_mode: bool) -> Option<Glyph> {
        let mut candidates = Vec::with_capacity(2);
        if light_mode {
            candidates.push(format!("{}{}", icon_name, LIGHT_SUFFIX));
        }
        candidates.push(icon_name.to_string());

        for candidate in candidates {
            if let Some(glyph) = self.cache.read().await.get(&candidate) {
                return Some(glyph.clone());
            }
            if self.missing.read().await.contains(&candidate) {
                continue;
            }

            let source = Arc::clone(&self.source);
            let name = candidate.clone();
            match tokio::task::spawn_blocking(move || source.fetch(&name)).await {
                Ok(Ok(Some(glyph))) => {
                    self.cache.write().await.insert(candidate, glyph.clone());
                    return Some(glyph);
                }
                Ok(Ok(None)) => {
                    log::debug!("IconLoader: no glyph named '{}'", candidate);
                    self.missing.write().await.insert(candidate);
                }
                Ok(Err(e)) => {
                    log::warn!("IconLoader: failed to load '{}': {}", candidate, e);
                }
                Err(e) => {
                    log::error!("IconLoader: loader task failed: {}", e);
                }
            }
        }
        None
    }

    pub async fn cached(&self, key: &str) -> Option<Glyph> {
        self.cache.read().await.get(key).cloned()
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        self.missing.write().await.clear();
    }
}
