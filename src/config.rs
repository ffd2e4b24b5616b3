use crate::error::Result;
use crate::explorer::ExplorerOptions;
use crate::grid::{GridOptions, IconSize, LayoutMode};
use crate::i18n::{DEFAULT_NAMESPACE, FALLBACK_LANGUAGE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub explorer: ExplorerConfig,
    pub grid: GridConfig,
    pub theme: ThemeConfig,
    pub i18n: I18nConfig,
    pub icons: IconConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub options: ExplorerOptions,
    /// Columns per nesting level
    pub indent: u16,
    pub show_guides: bool,
    pub details_width: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: u16,
    pub row_height: u16,
    pub gap: u16,
    pub layout: LayoutMode,
    pub allow_fixed_items: bool,
    pub icon_size: IconSize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Where the chosen theme is remembered; nothing is saved when unset
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// `<dir>/<lang>/<namespace>.json`; the embedded catalogs are used when unset
    pub languages_dir: Option<PathBuf>,
    pub fallback: String,
    pub settings_file: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub build: String,
    pub namespaces: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub catalog: Option<PathBuf>,
    pub glyph_dir: Option<PathBuf>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            options: ExplorerOptions::default(),
            indent: 2,
            show_guides: true,
            details_width: 32,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        let options = GridOptions::default();
        Self {
            columns: options.grid_columns,
            row_height: options.row_height,
            gap: options.gap,
            layout: options.layout,
            allow_fixed_items: options.allow_fixed_items,
            icon_size: options.icon_size,
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            languages_dir: None,
            fallback: FALLBACK_LANGUAGE.to_string(),
            settings_file: None,
            cache_dir: None,
            build: env!("CARGO_PKG_VERSION").to_string(),
            namespaces: vec![
                DEFAULT_NAMESPACE.to_string(),
                "explorer".to_string(),
                "hola".to_string(),
            ],
        }
    }
}

impl GridConfig {
    pub fn options(&self) -> GridOptions {
        GridOptions {
            layout: self.layout,
            grid_columns: self.columns.max(1),
            allow_fixed_items: self.allow_fixed_items,
            icon_size: self.icon_size,
            gap: self.gap,
            row_height: self.row_height.max(1),
            ..GridOptions::default()
        }
    }
}

impl Config {
    /// Read a JSON config, or return the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_json::from_str(&content)?;
                log::info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
