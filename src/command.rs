use crate::app::Page;
use crate::context_menu::MenuAction;
use serde::{Deserialize, Serialize};

/// Scriptable user actions, one per string form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // Global
    NextPage,
    ShowPage(Page),
    CycleTheme,
    SetTheme(String),
    NextLanguage,
    SetLanguage(String),
    Quit,

    // Explorer
    Up,
    Down,
    First,
    Last,
    Expand,
    Collapse,
    Activate,
    Select(String),
    Toggle(String),
    NewFile,
    NewFolder,
    Rename(String),
    Delete(String),
    Type(String),
    Backspace,
    Commit,
    Cancel,
    OpenMenu {
        x: u16,
        y: u16,
        item_id: Option<String>,
    },
    MenuNext,
    MenuPrevious,
    MenuEnter,
    MenuAction(MenuAction),
    CloseMenu,

    // Grid
    GridLeft,
    GridRight,
    GridUp,
    GridDown,
    GridSelect(String),
    GridEnter,
    ToggleLayout,
    ToggleFixed,
    AddItem,

    Sequence(Vec<Command>),
}

impl Command {
    /// Parse a command. Keywords are case-insensitive, arguments are kept
    /// verbatim.
    pub fn from_string(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Some((keyword, argument)) = s.split_once(':') {
            return Self::with_argument(&keyword.to_lowercase(), argument, s);
        }

        match s.to_lowercase().as_str() {
            "next_page" | "tab" => Ok(Command::NextPage),
            "theme" | "t" => Ok(Command::CycleTheme),
            "language" | "l" => Ok(Command::NextLanguage),
            "quit" | "q" => Ok(Command::Quit),

            "up" | "k" => Ok(Command::Up),
            "down" | "j" => Ok(Command::Down),
            "first" | "home" => Ok(Command::First),
            "last" | "end" => Ok(Command::Last),
            "expand" | "right" => Ok(Command::Expand),
            "collapse" | "left" => Ok(Command::Collapse),
            "activate" | "enter" => Ok(Command::Activate),
            "new_file" | "a" => Ok(Command::NewFile),
            "new_folder" => Ok(Command::NewFolder),
            "backspace" => Ok(Command::Backspace),
            "commit" => Ok(Command::Commit),
            "cancel" | "escape" => Ok(Command::Cancel),
            "menu_next" => Ok(Command::MenuNext),
            "menu_previous" => Ok(Command::MenuPrevious),
            "menu_enter" => Ok(Command::MenuEnter),
            "close_menu" => Ok(Command::CloseMenu),

            "grid_left" => Ok(Command::GridLeft),
            "grid_right" => Ok(Command::GridRight),
            "grid_up" => Ok(Command::GridUp),
            "grid_down" => Ok(Command::GridDown),
            "grid_enter" => Ok(Command::GridEnter),
            "toggle_layout" | "g" => Ok(Command::ToggleLayout),
            "toggle_fixed" | "f" => Ok(Command::ToggleFixed),
            "add_item" | "+" => Ok(Command::AddItem),

            _ => Err(format!("Unknown command: {}", s)),
        }
    }

    fn with_argument(keyword: &str, argument: &str, whole: &str) -> Result<Self, String> {
        let required = |name: &str| {
            if argument.is_empty() {
                Err(format!("Command '{}' needs an argument", name))
            } else {
                Ok(argument.to_string())
            }
        };

        match keyword {
            "page" => match argument.to_lowercase().as_str() {
                "explorer" => Ok(Command::ShowPage(Page::Explorer)),
                "grid" => Ok(Command::ShowPage(Page::Grid)),
                other => Err(format!("Unknown page: {}", other)),
            },
            "theme" => required("theme").map(Command::SetTheme),
            "language" => required("language").map(Command::SetLanguage),
            "select" => required("select").map(Command::Select),
            "toggle" => required("toggle").map(Command::Toggle),
            "rename" => required("rename").map(Command::Rename),
            "delete" => required("delete").map(Command::Delete),
            // Text may be empty and may contain colons
            "type" => Ok(Command::Type(argument.to_string())),
            "menu" => Self::parse_menu(argument),
            "menu_action" => MenuAction::from_name(argument)
                .map(Command::MenuAction)
                .ok_or_else(|| format!("Unknown menu action: {}", argument)),
            "grid_select" => required("grid_select").map(Command::GridSelect),
            "sequence" => Self::parse_sequence(argument),
            _ => Err(format!("Unknown command: {}", whole)),
        }
    }

    /// `menu:<x>:<y>` or `menu:<x>:<y>:<item id>`
    fn parse_menu(argument: &str) -> Result<Self, String> {
        let mut parts = argument.splitn(3, ':');
        let mut coordinate = |name: &str| {
            parts
                .next()
                .ok_or_else(|| format!("menu needs {}", name))?
                .trim()
                .parse::<u16>()
                .map_err(|e| format!("Invalid menu {}: {}", name, e))
        };
        let x = coordinate("x")?;
        let y = coordinate("y")?;
        let item_id = parts.next().filter(|id| !id.is_empty()).map(str::to_string);
        Ok(Command::OpenMenu { x, y, item_id })
    }

    /// `sequence:[cmd1,cmd2,...]`
    fn parse_sequence(argument: &str) -> Result<Self, String> {
        let inner = argument
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| format!("Invalid sequence: {}", argument))?;
        if inner.trim().is_empty() {
            return Ok(Command::Sequence(vec![]));
        }

        let mut commands = Vec::new();
        for cmd_str in inner.split(',') {
            let cmd_str = cmd_str.trim();
            match Command::from_string(cmd_str) {
                Ok(cmd) => commands.push(cmd),
                Err(e) => return Err(format!("Invalid command in sequence '{}': {}", cmd_str, e)),
            }
        }
        Ok(Command::Sequence(commands))
    }

    /// Convert command to string representation
    pub fn to_string(&self) -> String {
        match self {
            Command::NextPage => "next_page".to_string(),
            Command::ShowPage(Page::Explorer) => "page:explorer".to_string(),
            Command::ShowPage(Page::Grid) => "page:grid".to_string(),
            Command::CycleTheme => "theme".to_string(),
            Command::SetTheme(name) => format!("theme:{}", name),
            Command::NextLanguage => "language".to_string(),
            Command::SetLanguage(code) => format!("language:{}", code),
            Command::Quit => "quit".to_string(),

            Command::Up => "up".to_string(),
            Command::Down => "down".to_string(),
            Command::First => "first".to_string(),
            Command::Last => "last".to_string(),
            Command::Expand => "expand".to_string(),
            Command::Collapse => "collapse".to_string(),
            Command::Activate => "activate".to_string(),
            Command::Select(id) => format!("select:{}", id),
            Command::Toggle(id) => format!("toggle:{}", id),
            Command::NewFile => "new_file".to_string(),
            Command::NewFolder => "new_folder".to_string(),
            Command::Rename(id) => format!("rename:{}", id),
            Command::Delete(id) => format!("delete:{}", id),
            Command::Type(text) => format!("type:{}", text),
            Command::Backspace => "backspace".to_string(),
            Command::Commit => "commit".to_string(),
            Command::Cancel => "cancel".to_string(),
            Command::OpenMenu { x, y, item_id } => match item_id {
                Some(id) => format!("menu:{}:{}:{}", x, y, id),
                None => format!("menu:{}:{}", x, y),
            },
            Command::MenuNext => "menu_next".to_string(),
            Command::MenuPrevious => "menu_previous".to_string(),
            Command::MenuEnter => "menu_enter".to_string(),
            Command::MenuAction(action) => format!("menu_action:{}", action.name()),
            Command::CloseMenu => "close_menu".to_string(),

            Command::GridLeft => "grid_left".to_string(),
            Command::GridRight => "grid_right".to_string(),
            Command::GridUp => "grid_up".to_string(),
            Command::GridDown => "grid_down".to_string(),
            Command::GridSelect(id) => format!("grid_select:{}", id),
            Command::GridEnter => "grid_enter".to_string(),
            Command::ToggleLayout => "toggle_layout".to_string(),
            Command::ToggleFixed => "toggle_fixed".to_string(),
            Command::AddItem => "add_item".to_string(),

            Command::Sequence(commands) => {
                format!(
                    "sequence:[{}]",
                    commands
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(",")
                )
            }
        }
    }
}
