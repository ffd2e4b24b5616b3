use ratatui::layout::{Constraint, Layout, Rect};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Grid,
    List,
}

/// Icon size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSize {
    Small,
    #[default]
    Medium,
    Large,
    #[serde(rename = "xlarge")]
    XLarge,
}

impl IconSize {
    /// Share of the item the icon takes, in percent
    pub fn percent(&self) -> u16 {
        match self {
            IconSize::Small => 25,
            IconSize::Medium => 45,
            IconSize::Large => 65,
            IconSize::XLarge => 85,
        }
    }

    /// Upper bound for the icon, in pixels
    pub fn max_px(&self) -> u16 {
        match self {
            IconSize::Small => 80,
            IconSize::Medium => 135,
            IconSize::Large => 195,
            IconSize::XLarge => 255,
        }
    }
}

/// Numeric or textual badge shown next to an item title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Badge {
    Count(i64),
    Text(String),
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Badge::Count(count) => write!(f, "{}", count),
            Badge::Text(text) => write!(f, "{}", text),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// One entry of the icon grid
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_span: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_row_span: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_column_start: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_row_start: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_size: Option<IconSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_gradient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_svg: Option<String>,
}

/// Background layer that wins for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background<'a> {
    Color(&'a str),
    Image(&'a str),
    Gradient(&'a str),
    Svg(&'a str),
}

impl GridItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn is_interactive(&self) -> bool {
        !self.disabled
    }

    /// Image layers stack svg over gradient over image; a plain colour sits below all of them
    pub fn background(&self) -> Option<Background<'_>> {
        self.background_svg
            .as_deref()
            .map(Background::Svg)
            .or_else(|| self.background_gradient.as_deref().map(Background::Gradient))
            .or_else(|| self.background_image.as_deref().map(Background::Image))
            .or_else(|| self.background_color.as_deref().map(Background::Color))
    }

    pub fn has_custom_background(&self) -> bool {
        self.background().is_some()
    }

    /// Short label for the icon; inline SVG markup collapses to a single glyph
    pub fn icon_label(&self) -> Option<String> {
        self.icon.as_ref().map(|icon| {
            if icon.trim_start().starts_with("<svg") {
                "▣".to_string()
            } else {
                icon.clone()
            }
        })
    }
}

/// Options shared by every item of one grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    pub layout: LayoutMode,
    pub grid_columns: u16,
    pub allow_fixed_items: bool,
    pub icon_size: IconSize,
    pub gap: u16,
    pub row_height: u16,
    pub text_color: String,
    pub background_color: String,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Grid,
            grid_columns: 4,
            allow_fixed_items: true,
            icon_size: IconSize::Medium,
            gap: 1,
            row_height: 4,
            text_color: "#000000".to_string(),
            background_color: "#f0f0f0".to_string(),
        }
    }
}

/// Placement on one axis, with 1-based grid lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Track {
    Span { span: u16 },
    Lines { start: u16, end: u16 },
}

impl Track {
    /// Cells covered. A `start / start` pair still covers one cell.
    pub fn extent(&self) -> u16 {
        match self {
            Track::Span { span } => (*span).max(1),
            Track::Lines { start, end } => end.saturating_sub(*start).max(1),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Span { span } => write!(f, "span {}", span),
            Track::Lines { start, end } => write!(f, "{} / {}", start, end),
        }
    }
}

/// Layout directives computed for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLayout {
    pub id: String,
    pub column: Option<Track>,
    pub row: Option<Track>,
    pub icon_size: IconSize,
}

/// List-mode reflow: items asking for the same row are pushed down into
/// successive rows, each step as tall as the item's own row span.
///
/// Returns the items unchanged outside list mode or when fixed items are off.
pub fn reflow(items: &[GridItem], options: &GridOptions) -> Vec<GridItem> {
    if options.layout != LayoutMode::List || !options.allow_fixed_items {
        return items.to_vec();
    }

    let mut rows_seen: HashMap<u16, u16> = HashMap::new();
    items
        .iter()
        .map(|item| {
            let mut adjusted = item.clone();
            if let Some(row) = item.grid_row_start {
                let seen = rows_seen.entry(row).or_insert(0);
                let span = item.grid_row_span.unwrap_or(1).max(1);
                adjusted.grid_row_start = Some(row.saturating_add(seen.saturating_mul(span)));
                *seen = seen.saturating_add(1);
            }
            adjusted
        })
        .collect()
}

/// Compute per-item directives after reflow
pub fn compose(items: &[GridItem], options: &GridOptions) -> Vec<ItemLayout> {
    reflow(items, options)
        .into_iter()
        .map(|item| {
            let row = match item.grid_row_start {
                Some(start) if options.allow_fixed_items => {
                    let end = match options.layout {
                        LayoutMode::List => start,
                        LayoutMode::Grid => start.saturating_add(item.grid_row_span.unwrap_or(1)),
                    };
                    Some(Track::Lines { start, end })
                }
                _ => None,
            };

            let mut column = None;
            if options.layout == LayoutMode::Grid {
                if let Some(span) = item.grid_span {
                    let span = if options.allow_fixed_items {
                        span
                    } else {
                        span.min(options.grid_columns)
                    };
                    column = Some(Track::Span { span });
                }
                if let (Some(start), true) = (item.grid_column_start, options.allow_fixed_items) {
                    column = Some(Track::Lines {
                        start,
                        end: start.saturating_add(item.grid_span.unwrap_or(1)),
                    });
                }
            }

            ItemLayout {
                id: item.id,
                column,
                row,
                icon_size: item.icon_size.unwrap_or(options.icon_size),
            }
        })
        .collect()
}

/// Visual state of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemAppearance {
    pub selected: bool,
    pub disabled: bool,
    /// No custom background, so the theme default applies
    pub default_background: bool,
}

pub fn appearance(item: &GridItem, selected_id: Option<&str>) -> ItemAppearance {
    let selected = selected_id == Some(item.id.as_str());
    ItemAppearance {
        selected,
        disabled: item.disabled,
        default_background: !selected && !item.has_custom_background(),
    }
}

/// Item placed on the terminal grid, with 0-based cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedItem {
    pub index: usize,
    pub row: u16,
    pub column: u16,
    pub row_span: u16,
    pub column_span: u16,
    pub area: Rect,
}

/// Cells taken so far. Coordinates are u32 so spans near the top of the
/// u16 range cannot overflow while placing.
struct Occupancy {
    columns: u32,
    cells: Vec<Vec<bool>>,
}

impl Occupancy {
    fn new(columns: u32) -> Self {
        Self {
            columns,
            cells: Vec::new(),
        }
    }

    fn fits(&self, row: u32, column: u32, row_span: u32, column_span: u32) -> bool {
        if column + column_span > self.columns {
            return false;
        }
        (row..row + row_span).all(|r| {
            self.cells
                .get(r as usize)
                .map(|cells| (column..column + column_span).all(|c| !cells[c as usize]))
                .unwrap_or(true)
        })
    }

    fn mark(&mut self, row: u32, column: u32, row_span: u32, column_span: u32) {
        let needed = (row + row_span) as usize;
        if self.cells.len() < needed {
            self.cells.resize(needed, vec![false; self.columns as usize]);
        }
        for r in row..row + row_span {
            for c in column..(column + column_span).min(self.columns) {
                self.cells[r as usize][c as usize] = true;
            }
        }
    }
}

/// Place items on a terminal grid.
///
/// Items fixed on both axes go first, then row-locked items take the first
/// free column of their row, then everything else flows in order behind a
/// forward-only cursor. Rows that fall below `area` are dropped.
pub fn arrange(layouts: &[ItemLayout], options: &GridOptions, area: Rect) -> Vec<PlacedItem> {
    let columns = match options.layout {
        LayoutMode::Grid => options.grid_columns.max(1),
        LayoutMode::List => 1,
    } as u32;
    let row_height = options.row_height as u32;
    let gap = options.gap as u32;
    let row_pitch = (row_height + gap).max(1);
    // First row that starts below the area; anything from there on is dropped,
    // so explicit starts and spans never need to reach further
    let hidden_row = area.height as u32 / row_pitch + 1;

    let mut occupancy = Occupancy::new(columns);
    let mut cells: Vec<Option<(u32, u32, u32, u32)>> = vec![None; layouts.len()];

    let column_span_of = |layout: &ItemLayout| {
        (layout.column.map(|track| track.extent()).unwrap_or(1) as u32).min(columns)
    };
    let column_start_of = |layout: &ItemLayout, span: u32| match layout.column {
        Some(Track::Lines { start, .. }) => Some((start.saturating_sub(1) as u32).min(columns - span)),
        _ => None,
    };
    let row_start_of = |layout: &ItemLayout| match layout.row {
        Some(Track::Lines { start, .. }) => Some((start.saturating_sub(1) as u32).min(hidden_row)),
        _ => None,
    };
    let row_span_of = |layout: &ItemLayout| {
        (layout.row.map(|track| track.extent()).unwrap_or(1) as u32).min(hidden_row)
    };

    // Fixed on both axes
    for (index, layout) in layouts.iter().enumerate() {
        let column_span = column_span_of(layout);
        if let (Some(row), Some(column)) = (row_start_of(layout), column_start_of(layout, column_span)) {
            let row_span = row_span_of(layout);
            occupancy.mark(row, column, row_span, column_span);
            cells[index] = Some((row, column, row_span, column_span));
        }
    }

    // Row-locked
    for (index, layout) in layouts.iter().enumerate() {
        if cells[index].is_some() {
            continue;
        }
        if let Some(row) = row_start_of(layout) {
            let column_span = column_span_of(layout);
            let row_span = row_span_of(layout);
            let column = (0..=columns - column_span)
                .find(|&column| occupancy.fits(row, column, row_span, column_span))
                .unwrap_or(0);
            occupancy.mark(row, column, row_span, column_span);
            cells[index] = Some((row, column, row_span, column_span));
        }
    }

    // Auto flow
    let (mut cursor_row, mut cursor_column) = (0u32, 0u32);
    for (index, layout) in layouts.iter().enumerate() {
        if cells[index].is_some() {
            continue;
        }
        let column_span = column_span_of(layout);
        let row_span = row_span_of(layout);

        if let Some(column) = column_start_of(layout, column_span) {
            if column < cursor_column {
                cursor_row += 1;
            }
            while !occupancy.fits(cursor_row, column, row_span, column_span) {
                cursor_row += 1;
            }
            cursor_column = column;
        } else {
            loop {
                if cursor_column + column_span > columns {
                    cursor_row += 1;
                    cursor_column = 0;
                }
                if occupancy.fits(cursor_row, cursor_column, row_span, column_span) {
                    break;
                }
                cursor_column += 1;
            }
        }

        occupancy.mark(cursor_row, cursor_column, row_span, column_span);
        cells[index] = Some((cursor_row, cursor_column, row_span, column_span));
        cursor_column += column_span;
    }

    let column_areas = Layout::horizontal(vec![Constraint::Ratio(1, columns); columns as usize])
        .spacing(options.gap)
        .split(area);

    cells
        .into_iter()
        .enumerate()
        .filter_map(|(index, cell)| {
            let (row, column, row_span, column_span) = cell?;
            let y = area.y as u32 + row * row_pitch;
            if y >= area.bottom() as u32 {
                return None;
            }
            let height = row_span
                .saturating_mul(row_height)
                .saturating_add((row_span - 1).saturating_mul(gap))
                .min(area.bottom() as u32 - y);
            let first = column_areas[column as usize];
            let last = column_areas[(column + column_span - 1) as usize];
            // Everything left is on screen, so it fits back into u16
            Some(PlacedItem {
                index,
                row: row as u16,
                column: column as u16,
                row_span: row_span.min(u16::MAX as u32) as u16,
                column_span: column_span as u16,
                area: Rect::new(first.x, y as u16, last.right() - first.x, height as u16),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_options() -> GridOptions {
        GridOptions {
            layout: LayoutMode::List,
            ..GridOptions::default()
        }
    }

    fn item_in_row(id: &str, row: u16) -> GridItem {
        GridItem {
            grid_row_start: Some(row),
            ..GridItem::new(id, id)
        }
    }

    #[test]
    fn test_options_defaults() {
        let options = GridOptions::default();
        assert_eq!(options.layout, LayoutMode::Grid);
        assert_eq!(options.grid_columns, 4);
        assert!(options.allow_fixed_items);
        assert_eq!(options.icon_size, IconSize::Medium);
        assert_eq!(options.text_color, "#000000");
        assert_eq!(options.background_color, "#f0f0f0");
    }

    #[test]
    fn test_icon_size_presets() {
        assert_eq!(IconSize::Small.percent(), 25);
        assert_eq!(IconSize::XLarge.percent(), 85);
        assert_eq!(IconSize::Large.max_px(), 195);
    }

    #[test]
    fn test_list_reflow_stacks_same_row() {
        let items = vec![item_in_row("1", 1), item_in_row("2", 1)];
        let reflowed = reflow(&items, &list_options());
        assert_eq!(reflowed[0].grid_row_start, Some(1));
        assert_eq!(reflowed[1].grid_row_start, Some(2));
        // Input untouched
        assert_eq!(items[1].grid_row_start, Some(1));
    }

    #[test]
    fn test_list_reflow_uses_own_row_span() {
        let mut tall = item_in_row("3", 2);
        tall.grid_row_span = Some(3);
        let items = vec![item_in_row("1", 2), item_in_row("2", 2), tall, GridItem::new("4", "free")];
        let reflowed = reflow(&items, &list_options());
        assert_eq!(reflowed[0].grid_row_start, Some(2));
        assert_eq!(reflowed[1].grid_row_start, Some(3));
        assert_eq!(reflowed[2].grid_row_start, Some(2 + 2 * 3));
        assert_eq!(reflowed[3].grid_row_start, None);
    }

    #[test]
    fn test_reflow_only_in_list_mode_with_fixed_items() {
        let items = vec![item_in_row("1", 1), item_in_row("2", 1)];
        assert_eq!(reflow(&items, &GridOptions::default()), items);

        let options = GridOptions {
            allow_fixed_items: false,
            ..list_options()
        };
        assert_eq!(reflow(&items, &options), items);
    }

    #[test]
    fn test_compose_row_directives() {
        let mut item = item_in_row("1", 2);
        item.grid_row_span = Some(2);

        let grid = compose(&[item.clone()], &GridOptions::default());
        assert_eq!(grid[0].row, Some(Track::Lines { start: 2, end: 4 }));

        let list = compose(&[item.clone()], &list_options());
        assert_eq!(list[0].row, Some(Track::Lines { start: 2, end: 2 }));
        assert_eq!(list[0].column, None);

        let unfixed = GridOptions {
            allow_fixed_items: false,
            ..GridOptions::default()
        };
        assert_eq!(compose(&[item], &unfixed)[0].row, None);
    }

    #[test]
    fn test_compose_column_span_clamped_without_fixed_items() {
        let item = GridItem {
            grid_span: Some(6),
            ..GridItem::new("1", "wide")
        };
        let fixed = compose(&[item.clone()], &GridOptions::default());
        assert_eq!(fixed[0].column, Some(Track::Span { span: 6 }));

        let unfixed = GridOptions {
            allow_fixed_items: false,
            ..GridOptions::default()
        };
        assert_eq!(compose(&[item], &unfixed)[0].column, Some(Track::Span { span: 4 }));
    }

    #[test]
    fn test_compose_column_start() {
        let item = GridItem {
            grid_column_start: Some(2),
            grid_span: Some(2),
            icon_size: Some(IconSize::Small),
            ..GridItem::new("1", "x")
        };
        let layout = &compose(&[item], &GridOptions::default())[0];
        assert_eq!(layout.column, Some(Track::Lines { start: 2, end: 4 }));
        assert_eq!(layout.column.unwrap().to_string(), "2 / 4");
        assert_eq!(layout.icon_size, IconSize::Small);
    }

    #[test]
    fn test_appearance() {
        let plain = GridItem::new("1", "plain");
        let colored = GridItem {
            background_color: Some("#575757ff".to_string()),
            disabled: true,
            ..GridItem::new("2", "colored")
        };

        let a = appearance(&plain, Some("1"));
        assert!(a.selected && !a.default_background);
        assert!(appearance(&plain, None).default_background);

        let b = appearance(&colored, Some("1"));
        assert!(!b.selected && b.disabled && !b.default_background);
        assert!(!colored.is_interactive());
    }

    #[test]
    fn test_background_precedence() {
        let item = GridItem {
            background_color: Some("#fff".to_string()),
            background_image: Some("bg.png".to_string()),
            background_svg: Some("<svg/>".to_string()),
            ..GridItem::new("1", "x")
        };
        assert_eq!(item.background(), Some(Background::Svg("<svg/>")));
    }

    #[test]
    fn test_item_json_accepts_numeric_ids() {
        let items: Vec<GridItem> =
            serde_json::from_str(r#"[{"id": 1, "text": "a", "gridRowStart": 1, "badge": 5}, {"id": "b", "badge": "new"}]"#)
                .unwrap();
        assert_eq!(items[0].id, "1");
        assert_eq!(items[0].badge, Some(Badge::Count(5)));
        assert_eq!(items[1].badge.as_ref().map(|b| b.to_string()), Some("new".to_string()));
    }

    #[test]
    fn test_arrange_auto_flow_wraps() {
        let items: Vec<GridItem> = (1..=5).map(|i| GridItem::new(i.to_string(), "x")).collect();
        let options = GridOptions::default();
        let placed = arrange(&compose(&items, &options), &options, Rect::new(0, 0, 43, 20));

        let cells: Vec<(u16, u16)> = placed.iter().map(|p| (p.row, p.column)).collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (0, 3), (1, 0)]);
        assert_eq!(placed[4].area.y, 5);
    }

    #[test]
    fn test_arrange_fixed_items_first() {
        let fixed = GridItem {
            grid_column_start: Some(1),
            grid_row_start: Some(1),
            grid_row_span: Some(2),
            ..GridItem::new("fixed", "x")
        };
        let wide = GridItem {
            grid_span: Some(2),
            ..GridItem::new("wide", "x")
        };
        let items = vec![wide, GridItem::new("a", "x"), fixed];
        let options = GridOptions::default();
        let placed = arrange(&compose(&items, &options), &options, Rect::new(0, 0, 80, 40));

        let by_index = |i: usize| placed.iter().find(|p| p.index == i).copied().unwrap();
        assert_eq!((by_index(2).row, by_index(2).column, by_index(2).row_span), (0, 0, 2));
        assert_eq!((by_index(0).row, by_index(0).column, by_index(0).column_span), (0, 1, 2));
        assert_eq!((by_index(1).row, by_index(1).column), (0, 3));
        assert_eq!(by_index(2).area.height, 2 * 4 + 1);
    }

    #[test]
    fn test_arrange_list_mode_single_column() {
        let items = vec![item_in_row("1", 1), item_in_row("2", 1), GridItem::new("3", "x")];
        let options = list_options();
        let placed = arrange(&compose(&items, &options), &options, Rect::new(0, 0, 30, 30));
        let rows: Vec<u16> = placed.iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
        assert!(placed.iter().all(|p| p.column == 0 && p.area.width == 30));
    }

    #[test]
    fn test_arrange_drops_rows_below_area() {
        let items: Vec<GridItem> = (0..12).map(|i| GridItem::new(i.to_string(), "x")).collect();
        let options = GridOptions::default();
        let placed = arrange(&compose(&items, &options), &options, Rect::new(0, 0, 40, 6));
        assert_eq!(placed.len(), 8);
        assert_eq!(placed[7].area.height, 1);
    }

    #[test]
    fn test_reflow_saturates_at_last_row() {
        let items = vec![item_in_row("1", u16::MAX), item_in_row("2", u16::MAX)];
        let reflowed = reflow(&items, &list_options());
        assert_eq!(reflowed[0].grid_row_start, Some(u16::MAX));
        assert_eq!(reflowed[1].grid_row_start, Some(u16::MAX));
    }

    #[test]
    fn test_compose_saturates_track_ends() {
        let item = GridItem {
            grid_column_start: Some(u16::MAX),
            grid_span: Some(2),
            grid_row_start: Some(u16::MAX),
            grid_row_span: Some(3),
            ..GridItem::new("1", "edge")
        };
        let layout = &compose(&[item], &GridOptions::default())[0];
        assert_eq!(layout.column, Some(Track::Lines { start: u16::MAX, end: u16::MAX }));
        assert_eq!(layout.row, Some(Track::Lines { start: u16::MAX, end: u16::MAX }));
    }

    #[test]
    fn test_arrange_huge_hints_stay_inside_area() {
        let tall = GridItem {
            grid_row_start: Some(1),
            grid_row_span: Some(20000),
            ..GridItem::new("tall", "x")
        };
        let far = GridItem {
            grid_column_start: Some(u16::MAX),
            grid_span: Some(2),
            grid_row_start: Some(u16::MAX),
            ..GridItem::new("far", "x")
        };
        let options = GridOptions {
            row_height: u16::MAX,
            ..GridOptions::default()
        };
        let items = vec![tall, far, GridItem::new("free", "x")];
        let area = Rect::new(0, 0, 40, 12);

        for options in [options.clone(), GridOptions::default(), list_options()] {
            let placed = arrange(&compose(&items, &options), &options, area);
            assert!(!placed.is_empty());
            assert!(placed.iter().all(|p| p.area.bottom() <= area.bottom()));
        }
    }
}
