use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::icons::BuiltinGlyphs;
use crate::{app::App, snapshot::Snapshot, ui};

pub fn generate_screenshot(
    snapshot_path: &Path,
    output_path: Option<&Path>,
    width: u16,
    height: u16,
) -> Result<()> {
    let snapshot = Snapshot::load_from_file(snapshot_path)?;
    let screenshot = render_snapshot(&snapshot, width, height)?;

    match output_path {
        Some(path) => {
            fs::write(path, screenshot)?;
            println!("Screenshot saved to: {}", path.display());
        }
        None => {
            print!("{}", screenshot);
        }
    }

    Ok(())
}

/// Draw a snapshot once, with builtin glyphs resolved, and return the screen as text
pub fn render_snapshot(snapshot: &Snapshot, width: u16, height: u16) -> Result<String> {
    let mut app = App::from_snapshot(snapshot);
    app.resolve_icons_with(&BuiltinGlyphs);
    render_app(&mut app, width, height)
}

pub fn render_app(app: &mut App, width: u16, height: u16) -> Result<String> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|frame| ui::draw(frame, app))?;
    Ok(buffer_to_string(terminal.backend().buffer()))
}

pub fn buffer_to_string(buffer: &Buffer) -> String {
    let mut result = String::new();

    for y in 0..buffer.area().height {
        for x in 0..buffer.area().width {
            let sym = buffer[(x, y)].symbol();
            // Empty cells trail wide glyphs
            if sym.is_empty() {
                result.push(' ');
            } else {
                result.push_str(sym);
            }
        }
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_to_string() {
        let backend = TestBackend::new(10, 3);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                use ratatui::{
                    text::Text,
                    widgets::{Block, Borders, Paragraph},
                };

                let paragraph =
                    Paragraph::new(Text::from("Tree")).block(Block::default().borders(Borders::ALL));
                frame.render_widget(paragraph, frame.area());
            })
            .unwrap();

        let result = buffer_to_string(terminal.backend().buffer());
        assert!(result.contains("Tree"));
        assert_eq!(result.lines().count(), 3);
    }

    #[test]
    fn test_render_default_snapshot() {
        let screen = render_snapshot(&Snapshot::default(), 100, 30).unwrap();
        assert!(screen.contains("Explorer"));
        assert!(screen.contains("components"));
        assert!(screen.contains("package.json"));
        // src is expanded, public is not
        assert!(screen.contains("▾ "));
        assert!(!screen.contains("logo.png"));
    }
}
