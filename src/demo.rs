//! Sample data shown when the app starts without a forest or item file.

use crate::grid::{Badge, GridItem};
use crate::tree::{Forest, Node};

const DASHBOARD_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><rect fill="#3b82f6" opacity="0.1" width="100" height="100"/></svg>"##;
const FAVORITES_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><rect fill="#ec4899" opacity="0.1" width="100" height="100"/></svg>"##;
const REPORT_ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path fill="currentColor" d="M5 3h14v18H5z"/></svg>"##;

pub fn demo_forest() -> Forest {
    Forest::new(vec![
        Node::folder("1", "src").expanded(true).with_children(vec![
            Node::folder("2", "components").with_children(vec![
                Node::file("3", "FileExplorer.tsx"),
                Node::file("4", "IconListView.tsx"),
                Node::file("5", "themeSelector.tsx"),
            ]),
            Node::folder("6", "utils").with_children(vec![Node::file("7", "languages.ts")]),
            Node::file("8", "main.tsx"),
            Node::file("9", "App.css"),
        ]),
        Node::folder("10", "public").with_children(vec![Node::file("11", "logo.png")]),
        Node::file("12", "package.json"),
        Node::file("13", "vite.config.ts"),
        Node::file("14", "README.md"),
        Node::file("15", ".gitignore"),
    ])
}

pub fn demo_grid_items() -> Vec<GridItem> {
    vec![
        GridItem {
            icon: Some("Home".to_string()),
            grid_span: Some(2),
            background_svg: Some(DASHBOARD_SVG.to_string()),
            ..GridItem::new("a1", "Dashboard")
        },
        GridItem::new("a2", "Usuarios 1651 6 168 16 81"),
        GridItem {
            icon: Some("User".to_string()),
            subtitle: Some("Perfiles y permisos".to_string()),
            badge: Some(Badge::Count(5)),
            ..GridItem::new("a50", "Usuarios")
        },
        GridItem {
            icon: Some("User".to_string()),
            badge: Some(Badge::Count(5)),
            disabled: true,
            grid_column_start: Some(1),
            grid_row_start: Some(1),
            grid_row_span: Some(3),
            ..GridItem::new("a60cc", "Usuarios start 1")
        },
        GridItem {
            icon: Some("User".to_string()),
            badge: Some(Badge::Count(5)),
            grid_row_start: Some(1),
            background_color: Some("#575757ff".to_string()),
            text_color: Some("#be185dff".to_string()),
            ..GridItem::new("a60ccc", "Usuarios row 1")
        },
        GridItem {
            icon: Some("Settings".to_string()),
            ..GridItem::new("a3", "Ajustes")
        },
        GridItem {
            icon: Some("Settings".to_string()),
            ..GridItem::new("a33", "Ajustes")
        },
        GridItem {
            icon: Some("Bell".to_string()),
            badge: Some(Badge::Count(3)),
            ..GridItem::new("a5", "Notificaciones")
        },
        GridItem {
            icon: Some(REPORT_ICON_SVG.to_string()),
            grid_span: Some(2),
            grid_row_span: Some(2),
            ..GridItem::new("a4", "Reportes")
        },
        GridItem {
            icon: Some("Heart".to_string()),
            background_svg: Some(FAVORITES_SVG.to_string()),
            ..GridItem::new("a6", "Favoritos")
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_ids_are_unique() {
        let forest = demo_forest();
        let stats = forest.stats();
        let ids: HashSet<String> = forest
            .visible_nodes_with_depth()
            .into_iter()
            .map(|(node, _)| node.id.clone())
            .collect();
        assert!(ids.len() <= stats.files + stats.folders);
        for id in 1..=15 {
            assert!(forest.contains(&id.to_string()), "missing {}", id);
        }

        let items = demo_grid_items();
        let item_ids: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(item_ids.len(), items.len());
    }
}
