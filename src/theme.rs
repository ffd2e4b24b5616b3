use crate::error::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// A selectable theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeDefinition {
    pub value: &'static str,
    pub title: &'static str,
    pub symbol: &'static str,
    /// Name of the matching code-editor theme
    pub editor_theme: &'static str,
}

impl ThemeDefinition {
    pub fn is_light(&self) -> bool {
        self.value == "light"
    }
}

pub const THEMES: [ThemeDefinition; 4] = [
    ThemeDefinition {
        value: "light",
        title: "Light Theme",
        symbol: "☀",
        editor_theme: "vs",
    },
    ThemeDefinition {
        value: "dark",
        title: "Dark Theme",
        symbol: "☾",
        editor_theme: "vs-dark",
    },
    ThemeDefinition {
        value: "dark-green",
        title: "Dark Green Theme",
        symbol: "♣",
        editor_theme: "vs-dark",
    },
    ThemeDefinition {
        value: "dark-blue",
        title: "Dark Blue Theme",
        symbol: "♦",
        editor_theme: "vs-dark",
    },
];

pub const DEFAULT_THEME: &str = "dark";

pub fn find_theme(value: &str) -> Option<&'static ThemeDefinition> {
    THEMES.iter().find(|theme| theme.value == value)
}

/// Colors used when drawing the application
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub active_border: Color,
    pub inactive_border: Color,

    // Explorer
    pub tree_selected_bg: Color,
    pub tree_selected_fg: Color,
    pub tree_folder: Color,
    pub tree_file: Color,
    pub tree_guide: Color,
    pub input_fg: Color,
    pub input_bg: Color,
    pub placeholder: Color,

    // Context menu
    pub menu_bg: Color,
    pub menu_fg: Color,
    pub menu_highlight_bg: Color,
    pub menu_highlight_fg: Color,
    pub menu_disabled: Color,

    // Grid
    pub grid_item_bg: Color,
    pub grid_item_fg: Color,
    pub grid_selected_bg: Color,
    pub grid_selected_fg: Color,
    pub grid_disabled_fg: Color,
    pub badge_bg: Color,
    pub badge_fg: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_help_text: Color,

    // General UI
    pub accent: Color,
    pub panel_title: Color,
    pub text_default: Color,
    pub text_muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            active_border: Color::Yellow,
            inactive_border: Color::DarkGray,

            tree_selected_bg: Color::White,
            tree_selected_fg: Color::Black,
            tree_folder: Color::Blue,
            tree_file: Color::Reset,
            tree_guide: Color::DarkGray,
            input_fg: Color::White,
            input_bg: Color::Rgb(40, 40, 40),
            placeholder: Color::DarkGray,

            menu_bg: Color::Rgb(37, 37, 38),
            menu_fg: Color::Gray,
            menu_highlight_bg: Color::Rgb(9, 71, 113),
            menu_highlight_fg: Color::White,
            menu_disabled: Color::DarkGray,

            grid_item_bg: Color::Rgb(45, 45, 45),
            grid_item_fg: Color::White,
            grid_selected_bg: Color::Rgb(9, 71, 113),
            grid_selected_fg: Color::White,
            grid_disabled_fg: Color::DarkGray,
            badge_bg: Color::Red,
            badge_fg: Color::White,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_help_text: Color::Gray,

            accent: Color::Yellow,
            panel_title: Color::Gray,
            text_default: Color::Reset,
            text_muted: Color::Gray,
        }
    }
}

impl Theme {
    /// Palette for a theme name; unknown names get the dark palette
    pub fn for_name(name: &str) -> Self {
        let dark = Theme::default();
        match name {
            "light" => Theme {
                active_border: Color::Blue,
                inactive_border: Color::Gray,
                tree_selected_bg: Color::Rgb(0, 95, 184),
                tree_selected_fg: Color::White,
                tree_folder: Color::Rgb(0, 70, 140),
                tree_file: Color::Black,
                tree_guide: Color::Gray,
                input_fg: Color::Black,
                input_bg: Color::Rgb(230, 230, 230),
                placeholder: Color::Gray,
                menu_bg: Color::Rgb(243, 243, 243),
                menu_fg: Color::Black,
                menu_highlight_bg: Color::Rgb(0, 95, 184),
                menu_highlight_fg: Color::White,
                menu_disabled: Color::Gray,
                grid_item_bg: Color::Rgb(240, 240, 240),
                grid_item_fg: Color::Black,
                grid_selected_bg: Color::Rgb(0, 95, 184),
                grid_selected_fg: Color::White,
                grid_disabled_fg: Color::Gray,
                status_bar_bg: Color::Rgb(0, 122, 204),
                status_bar_fg: Color::White,
                status_help_text: Color::Rgb(220, 220, 220),
                accent: Color::Blue,
                panel_title: Color::Black,
                text_default: Color::Black,
                text_muted: Color::DarkGray,
                ..dark
            },
            "dark-green" => Theme {
                active_border: Color::Green,
                tree_selected_bg: Color::Rgb(20, 83, 45),
                tree_selected_fg: Color::White,
                tree_folder: Color::LightGreen,
                menu_highlight_bg: Color::Rgb(20, 83, 45),
                grid_selected_bg: Color::Rgb(20, 83, 45),
                status_bar_bg: Color::Rgb(20, 83, 45),
                accent: Color::LightGreen,
                ..dark
            },
            "dark-blue" => Theme {
                active_border: Color::LightBlue,
                tree_selected_bg: Color::Rgb(30, 58, 138),
                tree_selected_fg: Color::White,
                tree_folder: Color::LightBlue,
                menu_highlight_bg: Color::Rgb(30, 58, 138),
                grid_selected_bg: Color::Rgb(30, 58, 138),
                status_bar_bg: Color::Rgb(30, 58, 138),
                accent: Color::LightBlue,
                ..dark
            },
            _ => dark,
        }
    }
}

/// Parse "#rgb", "#rrggbb" or "#rrggbbaa" (alpha ignored), falling back to ratatui color names
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        return match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Some(Color::Rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 | 8 => Some(Color::Rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => None,
        };
    }
    value.parse::<Color>().ok()
}

/// Guess whether the terminal background is dark from `COLORFGBG` ("fg;bg")
pub fn prefers_dark_from_env() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|value| value.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
        .map(|bg| !matches!(bg, 7 | 15))
        .unwrap_or(true)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ThemeState {
    theme: Option<String>,
}

/// Holds the active theme, persists it and publishes changes.
///
/// Subscribers get a `watch::Receiver` carrying the theme name.
#[derive(Debug)]
pub struct ThemeStore {
    state_path: Option<PathBuf>,
    sender: watch::Sender<String>,
}

impl ThemeStore {
    /// Start from the saved theme, else from the system preference
    pub fn new(state_path: Option<PathBuf>, prefers_dark: bool) -> Self {
        let saved = state_path
            .as_deref()
            .and_then(Self::read_saved)
            .filter(|name| find_theme(name).is_some());
        let initial = saved.unwrap_or_else(|| {
            if prefers_dark {
                DEFAULT_THEME.to_string()
            } else {
                "light".to_string()
            }
        });
        log::debug!("ThemeStore: initial theme '{}'", initial);

        let (sender, _receiver) = watch::channel(initial);
        Self { state_path, sender }
    }

    /// In-memory store, nothing is persisted
    pub fn in_memory(initial: &str) -> Self {
        let store = Self::new(None, true);
        if find_theme(initial).is_some() {
            store.sender.send_replace(initial.to_string());
        }
        store
    }

    fn read_saved(path: &Path) -> Option<String> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str::<ThemeState>(&content) {
            Ok(state) => state.theme,
            Err(e) => {
                log::warn!("ThemeStore: ignoring unreadable state {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn current(&self) -> String {
        self.sender.borrow().clone()
    }

    pub fn definition(&self) -> &'static ThemeDefinition {
        find_theme(&self.current()).unwrap_or(&THEMES[1])
    }

    pub fn palette(&self) -> Theme {
        Theme::for_name(&self.current())
    }

    pub fn is_light_mode(&self) -> bool {
        self.definition().is_light()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.sender.subscribe()
    }

    /// Switch to `name`. Unknown names are ignored and reported as `false`.
    pub fn apply(&mut self, name: &str) -> Result<bool> {
        if find_theme(name).is_none() {
            log::warn!("ThemeStore: unknown theme '{}'", name);
            return Ok(false);
        }
        self.sender.send_replace(name.to_string());
        self.persist()?;
        Ok(true)
    }

    /// Move to the next theme, wrapping around
    pub fn cycle(&mut self) -> Result<&'static ThemeDefinition> {
        let current = self.current();
        let next = THEMES
            .iter()
            .position(|theme| theme.value == current)
            .map(|index| (index + 1) % THEMES.len())
            .unwrap_or(0);
        let theme = &THEMES[next];
        self.apply(theme.value)?;
        Ok(theme)
    }

    fn persist(&self) -> Result<()> {
        if let Some(path) = &self.state_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let state = ThemeState {
                theme: Some(self.current()),
            };
            std::fs::write(path, serde_json::to_string_pretty(&state)?)?;
        }
        Ok(())
    }
}

/// Read side of the theme store: tracks the published name
#[derive(Debug)]
pub struct ThemeWatcher {
    receiver: watch::Receiver<String>,
    theme: String,
}

impl ThemeWatcher {
    pub fn new(receiver: watch::Receiver<String>) -> Self {
        let mut watcher = Self {
            receiver,
            theme: String::new(),
        };
        watcher.theme = watcher.read();
        watcher
    }

    fn read(&mut self) -> String {
        let value = self.receiver.borrow_and_update().clone();
        if value.is_empty() {
            DEFAULT_THEME.to_string()
        } else {
            value
        }
    }

    /// Pick up a newly published theme; returns whether it changed
    pub fn poll(&mut self) -> bool {
        match self.receiver.has_changed() {
            Ok(true) => {
                let next = self.read();
                let changed = next != self.theme;
                self.theme = next;
                changed
            }
            _ => false,
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn is_light_mode(&self) -> bool {
        self.theme == "light"
    }
}
