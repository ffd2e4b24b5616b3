// Testable pieces of the binary: worker plumbing and the non-interactive commands

use crate::app::App;
use crate::async_task::{TaskResult, WorkerContext};
use crate::command::Command;
use crate::config::Config;
use crate::error::{Result, WidgetLabError};
use crate::executor::Executor;
use crate::grid::{self, GridItem, LayoutMode};
use crate::icons::{DirGlyphSource, IconLoader};
use crate::snapshot::Snapshot;
use crate::tree::Forest;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the explorer's forest comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ForestSource {
    #[default]
    Demo,
    Directory(PathBuf),
    File(PathBuf),
}

impl ForestSource {
    pub fn from_args(root: Option<PathBuf>, forest: Option<PathBuf>) -> Self {
        match (forest, root) {
            (Some(file), _) => ForestSource::File(file),
            (None, Some(dir)) => ForestSource::Directory(dir),
            (None, None) => ForestSource::Demo,
        }
    }

    /// Directory walks run on the blocking pool
    pub async fn load(&self) -> Result<Forest> {
        match self {
            ForestSource::Demo => Ok(crate::demo::demo_forest()),
            ForestSource::File(path) => Forest::load_from_file(path),
            ForestSource::Directory(dir) => {
                let dir = dir.clone();
                tokio::task::spawn_blocking(move || Forest::from_directory(dir))
                    .await
                    .map_err(|e| WidgetLabError::Generic(format!("directory walk failed: {}", e)))?
            }
        }
    }
}

/// Locale from the usual environment variables, most specific first
pub fn system_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|value| !value.is_empty()))
}

pub fn handle_task_result(app: &mut App, result: TaskResult) {
    match result {
        TaskResult::IconResolved {
            node_id,
            icon_name,
            light_mode,
            glyph,
        } => {
            // Stale answers are dropped inside
            app.apply_icon_result(&node_id, &icon_name, light_mode, glyph);
        }
        TaskResult::LanguageLoaded { language, bundles } => {
            app.language_loaded(&language, bundles);
        }
        TaskResult::Error { message } => {
            log::error!("worker: {}", message);
            app.status_message = format!("Error: {}", message);
        }
    }
}

/// Worker context sharing the app's translation source
pub fn worker_context(config: &Config, app: &App) -> WorkerContext {
    let icons = match &config.icons.glyph_dir {
        Some(dir) => IconLoader::new(Arc::new(DirGlyphSource::new(dir))),
        None => IconLoader::builtin(),
    };
    WorkerContext::new(icons, app.i18n.source(), &config.i18n.fallback)
}

pub fn execute_command(
    snapshot_path: &Path,
    command_str: &str,
    output_path: Option<&Path>,
    generate_screenshot: bool,
    width: u16,
    height: u16,
) -> Result<()> {
    let snapshot = Snapshot::load_from_file(snapshot_path)?;
    let command = Command::from_string(command_str).map_err(WidgetLabError::Generic)?;
    let result = Executor::execute(&snapshot, command);
    let result_json = result.snapshot.to_json()?;

    match output_path {
        Some(path) => {
            fs::write(path, &result_json)?;
            println!("Result saved to: {}", path.display());
        }
        None => {
            println!("{}", result_json);
        }
    }

    if let Some(status) = result.status_message {
        eprintln!("Status: {}", status);
    }
    if result.should_quit {
        eprintln!("Command resulted in quit");
    }

    if generate_screenshot {
        let screenshot_path = output_path
            .map(|p| p.with_extension("screenshot.txt"))
            .unwrap_or_else(|| PathBuf::from("command_result_screenshot.txt"));
        let screen = crate::screenshot::render_snapshot(&result.snapshot, width, height)?;
        fs::write(&screenshot_path, screen)?;
        eprintln!("Screenshot saved to: {}", screenshot_path.display());
    }

    Ok(())
}

/// Snapshot of the app as it would start, without opening the terminal
pub async fn save_current_state(
    config: &Config,
    source: &ForestSource,
    output_path: Option<&Path>,
) -> Result<()> {
    let forest = source.load().await?;
    let app = App::from_config(forest, config, system_locale().as_deref())?;
    let json = Snapshot::from_app(&app).to_json()?;

    match output_path {
        Some(path) => {
            fs::write(path, &json)?;
            println!("Current state saved to: {}", path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

/// Grid options from config, overridden by the `layout` flags
pub fn layout_options(config: &Config, list: bool, columns: Option<u16>, no_fixed: bool) -> grid::GridOptions {
    let mut options = config.grid.options();
    if list {
        options.layout = LayoutMode::List;
    }
    if let Some(columns) = columns {
        options.grid_columns = columns.max(1);
    }
    if no_fixed {
        options.allow_fixed_items = false;
    }
    options
}

pub fn print_layout(items_path: Option<&Path>, options: &grid::GridOptions) -> Result<()> {
    let items: Vec<GridItem> = match items_path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => crate::demo::demo_grid_items(),
    };
    let layouts = grid::compose(&items, options);
    log::debug!("layout: {} items in {:?} mode", layouts.len(), options.layout);
    println!("{}", serde_json::to_string_pretty(&layouts)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_forest;
    use crate::icons::Glyph;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_stale_icon_result_is_ignored() {
        let mut app = App::headless(demo_forest());
        let requests = app.icon_requests();
        assert!(!requests.is_empty());

        handle_task_result(
            &mut app,
            TaskResult::IconResolved {
                node_id: "12".to_string(),
                icon_name: "not-what-was-asked".to_string(),
                light_mode: false,
                glyph: Some(Glyph::new("X", None)),
            },
        );
        assert!(app.glyphs.get("12").is_none());
    }

    #[test]
    fn test_language_loaded_switches_language() {
        let mut app = App::headless(demo_forest());
        let mut bundle = HashMap::new();
        bundle.insert("title".to_string(), "Explorador".to_string());
        let mut bundles = HashMap::new();
        bundles.insert("explorer".to_string(), bundle);

        handle_task_result(
            &mut app,
            TaskResult::LanguageLoaded {
                language: "es".to_string(),
                bundles,
            },
        );
        assert_eq!(app.i18n.current_language(), "es");
        assert_eq!(app.t("explorer", "title"), "Explorador");
    }

    #[test]
    fn test_error_result_sets_status() {
        let mut app = App::headless(demo_forest());
        handle_task_result(
            &mut app,
            TaskResult::Error {
                message: "boom".to_string(),
            },
        );
        assert_eq!(app.status_message, "Error: boom");
    }

    #[test]
    fn test_forest_source_from_args() {
        assert_eq!(ForestSource::from_args(None, None), ForestSource::Demo);
        assert_eq!(
            ForestSource::from_args(Some("src".into()), Some("f.json".into())),
            ForestSource::File("f.json".into())
        );
    }

    #[test]
    fn test_execute_command_writes_result() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        Snapshot::default().save_to_file(&input).unwrap();

        execute_command(&input, "delete:15", Some(&output), true, 80, 24).unwrap();

        let result = Snapshot::load_from_file(&output).unwrap();
        assert!(!result.forest.contains("15"));
        assert!(dir.path().join("out.screenshot.txt").exists());
    }

    #[test]
    fn test_layout_options_overrides() {
        let options = layout_options(&Config::default(), true, Some(0), true);
        assert_eq!(options.layout, LayoutMode::List);
        assert_eq!(options.grid_columns, 1);
        assert!(!options.allow_fixed_items);
    }

    #[test]
    fn test_print_layout_reads_items() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, r#"[{"id": 1, "text": "One", "gridRowStart": 1}]"#).unwrap();
        let options = layout_options(&Config::default(), true, None, false);
        assert!(print_layout(Some(&path), &options).is_ok());
        assert!(print_layout(Some(&dir.path().join("missing.json")), &options).is_err());
    }

    #[test]
    fn test_execute_command_rejects_unknown_command() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.json");
        Snapshot::default().save_to_file(&input).unwrap();
        assert!(execute_command(&input, "explode", None, false, 80, 24).is_err());
    }
}
