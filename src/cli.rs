use crate::app::Page;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "widgetlab")]
#[command(about = "A terminal file explorer and icon grid with themes and live translations")]
pub struct Cli {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the interactive TUI (default)
    Run {
        /// Show this directory instead of the sample tree
        #[arg(long)]
        root: Option<PathBuf>,
        /// Load the tree from a JSON file
        #[arg(long, conflicts_with = "root")]
        forest: Option<PathBuf>,
        /// Let the host own the tree and apply every proposed change
        #[arg(long)]
        controlled: bool,
        /// Page shown at startup
        #[arg(long, value_enum, default_value_t = Page::Explorer)]
        page: Page,
    },
    /// Render a saved snapshot to text
    Screenshot {
        /// Snapshot JSON file
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Output file for the screenshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Terminal width for rendering
        #[arg(long, default_value = "120")]
        width: u16,
        /// Terminal height for rendering
        #[arg(long, default_value = "40")]
        height: u16,
    },
    /// Execute a command against a snapshot and output the resulting snapshot
    Execute {
        /// Snapshot JSON file
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Command to execute (e.g. "toggle:1", "sequence:[select:2,new_file,type:a.ts,commit]")
        #[arg(short = 'x', long)]
        command: String,
        /// Output file for the resulting snapshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also render the result
        #[arg(long)]
        screenshot: bool,
        /// Terminal width for the screenshot
        #[arg(long, default_value = "120")]
        width: u16,
        /// Terminal height for the screenshot
        #[arg(long, default_value = "40")]
        height: u16,
    },
    /// Save the startup state as a snapshot without running the TUI
    SaveState {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long, conflicts_with = "root")]
        forest: Option<PathBuf>,
        /// Output file for the snapshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the grid layout directives computed for an item file
    Layout {
        /// JSON array of grid items (the sample items when omitted)
        #[arg(long)]
        items: Option<PathBuf>,
        /// Use list mode instead of grid mode
        #[arg(long)]
        list: bool,
        /// Column count (the configured value when omitted)
        #[arg(long)]
        columns: Option<u16>,
        /// Keep items out of their requested rows and columns
        #[arg(long)]
        no_fixed: bool,
    },
}
