use serde::{Deserialize, Serialize};

use crate::common::{Point, Rect};
use crate::components::menu_item::MenuItemKind;

/// Dimensions of a rendered menu level
///
/// All values are logical pixels. No logic or state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextMenuStyle {
    /// Menu width (None = min_width)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,

    /// Minimum menu width
    pub min_width: f32,

    /// Horizontal padding inside menu
    pub horizontal_padding: f32,

    /// Vertical padding inside menu
    pub vertical_padding: f32,

    pub item_height: f32,
    pub separator_height: f32,
    pub label_height: f32,
}

impl Default for ContextMenuStyle {
    fn default() -> Self {
        Self {
            width: None,
            min_width: 200.0,
            horizontal_padding: 6.0,
            vertical_padding: 4.0,
            item_height: 22.0,
            separator_height: 9.0,
            label_height: 22.0,
        }
    }
}

impl ContextMenuStyle {
    pub fn row_height(&self, kind: MenuItemKind) -> f32 {
        match kind {
            MenuItemKind::Separator => self.separator_height,
            MenuItemKind::Label => self.label_height,
            MenuItemKind::Normal | MenuItemKind::Radio => self.item_height,
        }
    }

    pub fn menu_width(&self) -> f32 {
        self.width.unwrap_or(self.min_width).max(self.min_width)
    }

    /// Stack rows vertically from `origin`
    ///
    /// Each entry is `(kind, hidden)`; hidden rows collapse to zero height
    /// but keep a rect so they stay addressable. Returns the menu bounds
    /// and one rect per row.
    pub fn layout(&self, origin: Point, rows: &[(MenuItemKind, bool)]) -> (Rect, Vec<Rect>) {
        let width = self.menu_width();
        let row_width = width - self.horizontal_padding * 2.0;
        let mut y = origin.y + self.vertical_padding;
        let rects = rows
            .iter()
            .map(|(kind, hidden)| {
                let height = if *hidden { 0.0 } else { self.row_height(*kind) };
                let rect = Rect::new(origin.x + self.horizontal_padding, y, row_width, height);
                y += height;
                rect
            })
            .collect();
        let height = y - origin.y + self.vertical_padding;
        (Rect::new(origin.x, origin.y, width, height), rects)
    }
}
