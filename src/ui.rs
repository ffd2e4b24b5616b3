use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, Page};
use crate::context_menu::{MenuAction, MenuEntry};
use crate::explorer::ExplorerRow;
use crate::grid::{self, Background};
use crate::icons::{fallback_glyph, Glyph};
use crate::theme::{parse_color, Theme};
use crate::tree::NodeKind;

const CURSOR: &str = "▏";

pub fn draw(frame: &mut Frame, app: &mut App) {
    let palette = app.palette();
    let screen = frame.area();
    app.ui.screen = screen;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(screen);

    draw_header(frame, app, &palette, chunks[0]);
    match app.page {
        Page::Explorer => {
            app.ui.grid_cells.clear();
            draw_explorer_page(frame, app, &palette, chunks[1]);
        }
        Page::Grid => {
            app.ui.tree_rows.clear();
            app.ui.toolbar.clear();
            app.ui.menu_area = None;
            draw_grid_page(frame, app, &palette, chunks[1]);
        }
    }
    draw_status_bar(frame, app, &palette, chunks[2]);

    if app.page == Page::Explorer {
        draw_context_menu(frame, app, &palette, screen);
    }
}

/// Render `span` at column `x` of `area`'s first row, returning the cells it used
fn place_text(frame: &mut Frame, area: Rect, x: u16, span: Span<'_>) -> Rect {
    let width = (span.width() as u16).min(area.right().saturating_sub(x));
    let rect = Rect::new(x, area.y, width, 1);
    if width > 0 {
        frame.render_widget(Paragraph::new(Line::from(span)), rect);
    }
    rect
}

fn draw_header(frame: &mut Frame, app: &mut App, palette: &Theme, area: Rect) {
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.status_bar_bg)),
        area,
    );

    let mut x = area.x;
    app.ui.tabs.clear();
    for page in Page::ALL {
        let label = format!(" {} ", app.t("index", page.title_key()));
        let style = if page == app.page {
            Style::default()
                .fg(palette.status_bar_bg)
                .bg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.status_bar_fg).bg(palette.status_bar_bg)
        };
        let rect = place_text(frame, area, x, Span::styled(label, style));
        app.ui.tabs.push((page, rect));
        x = rect.right() + 1;
    }

    let theme = app.theme.definition();
    let theme_label = format!(" {} {} ", theme.symbol, theme.title);
    let language_label = format!(
        " {}: {} ",
        app.t("index", "language"),
        app.i18n.current_language_name()
    );
    let greeting = app
        .i18n
        .translator(Some("hola"))
        .scope("pruebaComponent")
        .scope("title")
        .t_with("text", &[("name", " · widgetlab")]);

    let button = Style::default()
        .fg(palette.status_bar_fg)
        .bg(palette.status_bar_bg)
        .add_modifier(Modifier::REVERSED);
    let theme_span = Span::styled(theme_label, button);
    let language_span = Span::styled(language_label, button);
    let right_width = (theme_span.width() + language_span.width() + 1) as u16;
    let right_x = area.right().saturating_sub(right_width).max(x);

    let greeting_span = Span::styled(
        greeting,
        Style::default().fg(palette.status_help_text).bg(palette.status_bar_bg),
    );
    if x + (greeting_span.width() as u16) < right_x {
        place_text(frame, area, x, greeting_span);
    }

    app.ui.theme_button = place_text(frame, area, right_x, theme_span);
    app.ui.language_button = place_text(frame, area, app.ui.theme_button.right() + 1, language_span);
}

fn draw_explorer_page(frame: &mut Frame, app: &mut App, palette: &Theme, area: Rect) {
    let details_width = app.explorer_view.details_width.min(area.width / 2);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(details_width)])
        .split(area);

    draw_tree_panel(frame, app, palette, chunks[0]);
    draw_details(frame, app, palette, chunks[1]);
}

fn draw_tree_panel(frame: &mut Frame, app: &mut App, palette: &Theme, area: Rect) {
    let border = if app.explorer.is_editing() {
        palette.active_border
    } else {
        palette.inactive_border
    };
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", app.t("explorer", "title")),
            Style::default().fg(palette.panel_title),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        app.ui.tree_rows.clear();
        return;
    }

    // Toolbar
    app.ui.toolbar.clear();
    let toolbar = Rect::new(inner.x, inner.y, inner.width, 1);
    let mut x = toolbar.x;
    let options = *app.explorer.options();
    for action in [MenuAction::NewFile, MenuAction::NewFolder] {
        if !options.allows(action) {
            continue;
        }
        let label = format!("[+ {}]", app.t("explorer", action.label_key()));
        let rect = place_text(
            frame,
            toolbar,
            x,
            Span::styled(label, Style::default().fg(palette.accent)),
        );
        app.ui.toolbar.push((action, rect));
        x = rect.right() + 1;
    }

    let tree_area = Rect::new(
        inner.x,
        inner.y + 1,
        inner.width,
        inner.height.saturating_sub(1),
    );
    app.ui.tree_area = tree_area;
    draw_tree(frame, app, palette, tree_area);
}

fn draw_tree(frame: &mut Frame, app: &mut App, palette: &Theme, area: Rect) {
    let rows = app.explorer.rows();
    if rows.is_empty() {
        app.ui.tree_rows.clear();
        let empty = Paragraph::new(app.t("explorer", "empty"))
            .style(Style::default().fg(palette.text_muted));
        frame.render_widget(empty, area);
        return;
    }

    // Keep the focused row on screen
    let height = area.height as usize;
    let focus = rows
        .iter()
        .position(|row| match row {
            ExplorerRow::Draft { .. } => true,
            ExplorerRow::Item { rename_buffer, .. } => rename_buffer.is_some(),
        })
        .or_else(|| {
            rows.iter()
                .position(|row| matches!(row, ExplorerRow::Item { selected: true, .. }))
        });
    let mut scroll = app.ui.tree_scroll.min(rows.len().saturating_sub(height));
    if let Some(focus) = focus {
        if focus < scroll {
            scroll = focus;
        } else if height > 0 && focus >= scroll + height {
            scroll = focus + 1 - height;
        }
    }

    let indent = app.explorer_view.indent.max(1) as usize;
    let guide = if app.explorer_view.show_guides {
        format!("│{}", " ".repeat(indent - 1))
    } else {
        " ".repeat(indent)
    };

    let mut drawn = Vec::with_capacity(height);
    let mut lines = Vec::with_capacity(height);
    for row in rows.iter().skip(scroll).take(height) {
        drawn.push(row.node_id().map(str::to_string));
        let mut spans = vec![Span::styled(
            guide.repeat(row.depth()),
            Style::default().fg(palette.tree_guide),
        )];

        match row {
            ExplorerRow::Item {
                node,
                selected,
                rename_buffer,
                ..
            } => {
                let chevron = match (node.kind, node.is_expanded) {
                    (NodeKind::Folder, true) => "▾ ",
                    (NodeKind::Folder, false) => "▸ ",
                    (NodeKind::File, _) => "  ",
                };
                spans.push(Span::styled(chevron, Style::default().fg(palette.tree_guide)));
                spans.push(glyph_span(&app.glyph_for(node), palette));

                match rename_buffer {
                    Some(buffer) => spans.extend(input_spans(buffer, "", palette)),
                    None => {
                        let color = if node.is_folder() {
                            palette.tree_folder
                        } else {
                            palette.tree_file
                        };
                        let style = if *selected {
                            Style::default()
                                .fg(palette.tree_selected_fg)
                                .bg(palette.tree_selected_bg)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(color)
                        };
                        spans.push(Span::styled(node.name.clone(), style));
                    }
                }
            }
            ExplorerRow::Draft { kind, name, .. } => {
                let chevron = if *kind == NodeKind::Folder { "▸ " } else { "  " };
                spans.push(Span::styled(chevron, Style::default().fg(palette.tree_guide)));
                spans.push(glyph_span(&fallback_glyph(*kind, false), palette));
                let placeholder = match kind {
                    NodeKind::File => app.t("explorer", "placeholders.file"),
                    NodeKind::Folder => app.t("explorer", "placeholders.folder"),
                };
                spans.extend(input_spans(name, &placeholder, palette));
            }
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
    app.ui.tree_scroll = scroll;
    app.ui.tree_rows = drawn;
}

fn glyph_span(glyph: &Glyph, palette: &Theme) -> Span<'static> {
    let color = glyph
        .color
        .as_deref()
        .and_then(parse_color)
        .unwrap_or(palette.text_default);
    Span::styled(format!("{} ", glyph.symbol), Style::default().fg(color))
}

fn input_spans(text: &str, placeholder: &str, palette: &Theme) -> Vec<Span<'static>> {
    let input = Style::default().fg(palette.input_fg).bg(palette.input_bg);
    if text.is_empty() {
        vec![
            Span::styled(CURSOR, input),
            Span::styled(placeholder.to_string(), input.fg(palette.placeholder)),
        ]
    } else {
        vec![Span::styled(format!("{}{}", text, CURSOR), input)]
    }
}

fn draw_details(frame: &mut Frame, app: &App, palette: &Theme, area: Rect) {
    if area.width == 0 {
        return;
    }
    let details = app.i18n.translator(Some("explorer")).scope("details");
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", details.t("title")),
            Style::default().fg(palette.panel_title),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.inactive_border));

    let label = Style::default().fg(palette.text_muted);
    let value = Style::default().fg(palette.text_default);
    let mut lines = Vec::new();
    match app.explorer.selected_node() {
        Some(node) => {
            let path = app.explorer.forest().path_of(&node.id).unwrap_or_default();
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", details.t("name")), label),
                Span::styled(node.name.clone(), value),
            ]));
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", details.t("type")), label),
                Span::styled(node.kind.as_str(), value),
            ]));
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", details.t("path")), label),
                Span::styled(path, value),
            ]));
            if node.is_folder() {
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", details.t("items")), label),
                    Span::styled(node.children.len().to_string(), value),
                ]));
            }
        }
        None => lines.push(Line::from(Span::styled(details.t("nothingSelected"), label))),
    }

    let stats = app.explorer.forest().stats();
    let folders = stats.folders.to_string();
    let files = stats.files.to_string();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        app.i18n
            .translate("explorer", "stats", &[("folders", &folders), ("files", &files)]),
        label,
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_context_menu(frame: &mut Frame, app: &mut App, palette: &Theme, bounds: Rect) {
    let Some(menu) = app.explorer.context_menu().cloned() else {
        app.ui.menu_area = None;
        return;
    };
    let options = *app.explorer.options();
    let entries = menu.entries(&options);
    let labels: Vec<Option<String>> = entries
        .iter()
        .map(|entry| match entry {
            MenuEntry::Action(action) => Some(app.t("explorer", action.label_key())),
            MenuEntry::Separator => None,
        })
        .collect();
    let label_width = labels
        .iter()
        .flatten()
        .map(|label| Span::raw(label.as_str()).width() as u16)
        .max()
        .unwrap_or(0);

    let Some(area) = menu.area(entries.len(), label_width, bounds) else {
        app.ui.menu_area = None;
        return;
    };
    app.ui.menu_area = Some(area);

    let highlighted = menu.highlighted_action(&options);
    let inner_width = area.width.saturating_sub(2) as usize;
    let lines: Vec<Line> = entries
        .iter()
        .zip(labels)
        .map(|(entry, label)| match (entry, label) {
            (MenuEntry::Action(action), Some(label)) => {
                let style = if Some(*action) == highlighted {
                    Style::default()
                        .fg(palette.menu_highlight_fg)
                        .bg(palette.menu_highlight_bg)
                } else {
                    Style::default().fg(palette.menu_fg)
                };
                Line::from(Span::styled(format!(" {:<width$}", label, width = inner_width.saturating_sub(1)), style))
            }
            _ => Line::from(Span::styled(
                "─".repeat(inner_width),
                Style::default().fg(palette.menu_disabled),
            )),
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.active_border))
        .style(Style::default().bg(palette.menu_bg));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_grid_page(frame: &mut Frame, app: &mut App, palette: &Theme, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", app.t("index", "iconListView.title")),
            Style::default().fg(palette.panel_title),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.inactive_border));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.ui.grid_cells.clear();
    if inner.height < 2 {
        return;
    }

    let toolbar = Rect::new(inner.x, inner.y, inner.width, 1);
    let layout_key = match app.grid_options.layout {
        grid::LayoutMode::Grid => "iconListView.layout.grid",
        grid::LayoutMode::List => "iconListView.layout.list",
    };
    let accent = Style::default().fg(palette.accent);
    let layout_label = format!("[{}]", app.t("index", layout_key));
    app.ui.layout_button = place_text(frame, toolbar, toolbar.x, Span::styled(layout_label, accent));
    let add_label = format!("[+ {}]", app.t("index", "iconListView.addItem"));
    app.ui.add_item_button = place_text(
        frame,
        toolbar,
        app.ui.layout_button.right() + 1,
        Span::styled(add_label, accent),
    );
    let fixed = format!(
        "{}: {}",
        app.t("index", "iconListView.fixed"),
        if app.grid_options.allow_fixed_items { "on" } else { "off" }
    );
    place_text(
        frame,
        toolbar,
        app.ui.add_item_button.right() + 1,
        Span::styled(fixed, Style::default().fg(palette.text_muted)),
    );

    let grid_area = Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 1);
    let layouts = grid::compose(&app.grid_items, &app.grid_options);
    let placed = grid::arrange(&layouts, &app.grid_options, grid_area);

    for cell in placed {
        let Some(item) = app.grid_items.get(cell.index) else {
            continue;
        };
        let look = grid::appearance(item, app.grid_selected.as_deref());
        let custom_bg = match item.background() {
            Some(Background::Color(color)) => parse_color(color),
            Some(_) => Some(palette.grid_item_bg),
            None => None,
        };
        let bg = if look.selected {
            palette.grid_selected_bg
        } else {
            custom_bg.unwrap_or(palette.grid_item_bg)
        };
        let fg = if look.disabled {
            palette.grid_disabled_fg
        } else if look.selected {
            palette.grid_selected_fg
        } else {
            item.text_color
                .as_deref()
                .and_then(parse_color)
                .unwrap_or(palette.grid_item_fg)
        };
        let border = if app.grid_cursor == cell.index {
            palette.active_border
        } else {
            palette.inactive_border
        };

        let mut title = Vec::new();
        if let Some(icon) = item.icon_label() {
            title.push(Span::styled(format!("{} ", icon), Style::default().fg(fg).add_modifier(Modifier::BOLD)));
        }
        title.push(Span::styled(item.text.clone(), Style::default().fg(fg)));
        if let Some(badge) = &item.badge {
            title.push(Span::raw(" "));
            title.push(Span::styled(
                format!(" {} ", badge),
                Style::default().fg(palette.badge_fg).bg(palette.badge_bg),
            ));
        }
        let mut lines = vec![Line::from(title)];
        if let Some(subtitle) = &item.subtitle {
            lines.push(Line::from(Span::styled(
                subtitle.clone(),
                Style::default().fg(palette.text_muted),
            )));
        }
        if matches!(item.background(), Some(Background::Svg(_))) && cell.area.height > 3 {
            lines.push(Line::from(Span::styled("░".repeat(cell.area.width as usize), Style::default().fg(fg))));
        }

        let mut style = Style::default().bg(bg);
        if look.disabled {
            style = style.add_modifier(Modifier::DIM);
        }
        let block = if cell.area.height >= 3 {
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
        } else {
            Block::default()
        };
        frame.render_widget(Paragraph::new(lines).block(block).style(style), cell.area);
        app.ui.grid_cells.push((item.id.clone(), cell.area));
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, palette: &Theme, area: Rect) {
    let help_key = if app.explorer.is_editing() {
        "help.editing"
    } else {
        match app.page {
            Page::Explorer => "help.explorer",
            Page::Grid => "help.grid",
        }
    };
    let help = app.t("index", help_key);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(help.chars().count() as u16 + 1)])
        .split(area);

    let style = Style::default().fg(palette.status_bar_fg).bg(palette.status_bar_bg);
    frame.render_widget(
        Paragraph::new(format!(" {}", app.status_message)).style(style),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(help).style(style.fg(palette.status_help_text)),
        chunks[1],
    );
}
