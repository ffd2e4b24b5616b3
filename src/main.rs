use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};
use tokio::sync::mpsc;

use widgetlab::app::{App, Page};
use widgetlab::async_task::{self, Task, TaskResult};
use widgetlab::cli::{Cli, Commands};
use widgetlab::config::Config;
use widgetlab::error::Result;
use widgetlab::explorer::Explorer;
use widgetlab::main_lib::{self, ForestSource};
use widgetlab::{event, screenshot, ui};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging goes to a file only, the terminal belongs to the UI
    if let Ok(log_file) = std::env::var("WIDGETLAB_LOG") {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
        {
            Ok(file) => {
                env_logger::Builder::new()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .filter_level(log::LevelFilter::Debug)
                    .init();
                log::info!("widgetlab starting up");
            }
            Err(e) => eprintln!("Cannot open log file {}: {}", log_file, e),
        }
    }

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let command = cli.command.unwrap_or(Commands::Run {
        root: None,
        forest: None,
        controlled: false,
        page: Page::Explorer,
    });
    match command {
        Commands::Run {
            root,
            forest,
            controlled,
            page,
        } => run_interactive(&config, ForestSource::from_args(root, forest), controlled, page).await,
        Commands::Screenshot {
            snapshot,
            output,
            width,
            height,
        } => screenshot::generate_screenshot(&snapshot, output.as_deref(), width, height),
        Commands::Execute {
            snapshot,
            command,
            output,
            screenshot,
            width,
            height,
        } => main_lib::execute_command(
            &snapshot,
            &command,
            output.as_deref(),
            screenshot,
            width,
            height,
        ),
        Commands::SaveState {
            root,
            forest,
            output,
        } => {
            main_lib::save_current_state(&config, &ForestSource::from_args(root, forest), output.as_deref())
                .await
        }
        Commands::Layout {
            items,
            list,
            columns,
            no_fixed,
        } => main_lib::print_layout(
            items.as_deref(),
            &main_lib::layout_options(&config, list, columns, no_fixed),
        ),
    }
}

async fn run_interactive(config: &Config, source: ForestSource, controlled: bool, page: Page) -> Result<()> {
    let forest = source.load().await?;
    log::info!("main: loaded forest from {:?}", source);

    let mut app = App::from_config(forest, config, main_lib::system_locale().as_deref())?;
    if controlled {
        let options = *app.explorer.options();
        app.explorer = Explorer::controlled(app.explorer.forest().clone()).with_options(options);
    }
    app.switch_page(page);
    if let ForestSource::Directory(dir) = &source {
        app.status_message = dir.display().to_string();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup async task channels
    let (task_sender, task_receiver) = mpsc::channel::<Task>(256);
    let (result_sender, mut result_receiver) = mpsc::channel::<TaskResult>(256);

    let worker_handle = tokio::spawn(async_task::run_worker(
        task_receiver,
        result_sender,
        main_lib::worker_context(config, &app),
    ));

    // Main application loop
    let tick_rate = Duration::from_millis(250);
    loop {
        app.theme_watcher.poll();
        for task in app.icon_requests() {
            if let Err(e) = task_sender.try_send(task) {
                // Everything pending is asked again on the next tick
                log::warn!("main: icon queue full ({}), retrying later", e);
                app.cancel_pending_icons();
                break;
            }
        }

        terminal.draw(|f| ui::draw(f, &mut app))?;

        if crossterm::event::poll(tick_rate)? {
            let event = crossterm::event::read()?;
            if let Err(e) = event::handle_event(event, &mut app, &task_sender) {
                app.status_message = format!("Error handling event: {}", e);
            }
        }

        while let Ok(result) = result_receiver.try_recv() {
            main_lib::handle_task_result(&mut app, result);
        }

        if app.should_quit {
            break;
        }
    }

    // Cleanup
    app.cancel_pending_icons();
    drop(task_sender);
    worker_handle.abort();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
