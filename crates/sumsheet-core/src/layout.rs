//! Two-column worksheet pagination.
//!
//! Coordinates are in PDF points with the origin at the top-left corner
//! of the page and `y` growing downwards; the renderer flips them.
//!
//! Items alternate between columns by index parity (even → left,
//! odd → right). Each column keeps its own cursor. When the active
//! column runs past the bottom margin a new page starts and both cursors
//! go back to the top, so rows stay aligned across the two columns.

use serde::Serialize;

use crate::settings::Presentation;

pub const DEFAULT_MARGIN: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

impl Column {
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Left
        } else {
            Self::Right
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub line_spacing: f32,
    pub font_size: f32,
}

impl LayoutOptions {
    pub fn for_paper(presentation: &Presentation) -> Self {
        let (page_width, page_height) = presentation.paper_size.dimensions();
        Self {
            page_width,
            page_height,
            margin: DEFAULT_MARGIN,
            line_spacing: presentation.line_spacing,
            font_size: presentation.font_size,
        }
    }

    pub fn column_width(&self) -> f32 {
        (self.page_width - 2.0 * self.margin) / 2.0
    }

    /// Lowest `y` an item may be placed at.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin
    }

    fn column_x(&self, column: Column) -> f32 {
        match column {
            Column::Left => self.margin,
            Column::Right => self.margin + self.column_width(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedText {
    pub column: Column,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<PlacedText>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub pages: Vec<Page>,
    pub column_width: f32,
}

impl Layout {
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }
}

pub fn layout<S: AsRef<str>>(texts: &[S], options: &LayoutOptions) -> Layout {
    let mut pages = vec![Page::default()];
    let mut left = options.margin;
    let mut right = options.margin;

    for (index, text) in texts.iter().enumerate() {
        let column = Column::for_index(index);
        let cursor = match column {
            Column::Left => left,
            Column::Right => right,
        };

        let y = if cursor > options.bottom_limit() {
            pages.push(Page::default());
            left = options.margin;
            right = options.margin;
            options.margin
        } else {
            cursor
        };

        if let Some(page) = pages.last_mut() {
            page.items.push(PlacedText {
                column,
                x: options.column_x(column),
                y,
                text: text.as_ref().to_string(),
            });
        }

        match column {
            Column::Left => left = y + options.line_spacing,
            Column::Right => right = y + options.line_spacing,
        }
    }

    Layout {
        pages,
        column_width: options.column_width(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PaperSize;

    fn options(line_spacing: f32) -> LayoutOptions {
        LayoutOptions {
            page_width: 600.0,
            page_height: 400.0,
            margin: 50.0,
            line_spacing,
            font_size: 12.0,
        }
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{i} + 1 = ")).collect()
    }

    #[test]
    fn test_column_width_and_positions() {
        let opts = options(20.0);
        let out = layout(&texts(2), &opts);
        assert_eq!(out.column_width, 250.0);
        let items = &out.pages[0].items;
        assert_eq!((items[0].column, items[0].x, items[0].y), (Column::Left, 50.0, 50.0));
        assert_eq!((items[1].column, items[1].x, items[1].y), (Column::Right, 300.0, 50.0));
    }

    #[test]
    fn test_alternates_by_parity() {
        let out = layout(&texts(6), &options(20.0));
        assert_eq!(out.pages.len(), 1);
        let items = &out.pages[0].items;
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.column, Column::for_index(i));
            assert_eq!(item.y, 50.0 + 20.0 * (i / 2) as f32);
        }
    }

    #[test]
    fn test_paginates_and_resets_both_cursors() {
        // Rows at 50, 150, 250, 350; the fifth row would be at 450 > 350.
        let out = layout(&texts(10), &options(100.0));
        assert_eq!(out.pages.len(), 2);
        assert_eq!(out.pages[0].items.len(), 8);
        let second = &out.pages[1].items;
        assert_eq!(second[0].column, Column::Left);
        assert_eq!(second[0].y, 50.0);
        assert_eq!(second[1].column, Column::Right);
        assert_eq!(second[1].y, 50.0);
    }

    #[test]
    fn test_oversized_spacing_breaks_before_overflow() {
        let opts = options(1_000.0);
        let out = layout(&texts(5), &opts);
        assert_eq!(out.pages.len(), 3);
        for page in &out.pages {
            assert!(page.items.len() <= 2);
            for item in &page.items {
                assert!(item.y <= opts.bottom_limit());
            }
        }
        assert_eq!(out.item_count(), 5);
    }

    #[test]
    fn test_never_places_below_bottom_margin() {
        let opts = options(33.0);
        let out = layout(&texts(101), &opts);
        assert_eq!(out.item_count(), 101);
        for page in &out.pages {
            assert!(page.items.iter().all(|i| i.y <= opts.bottom_limit()));
        }
    }

    #[test]
    fn test_empty_input_gives_single_blank_page() {
        let out = layout::<String>(&[], &options(20.0));
        assert_eq!(out.pages.len(), 1);
        assert!(out.pages[0].items.is_empty());
    }

    #[test]
    fn test_options_from_presentation() {
        let presentation = Presentation {
            paper_size: PaperSize::Letter,
            line_spacing: 30.0,
            ..Presentation::default()
        };
        let opts = LayoutOptions::for_paper(&presentation);
        assert_eq!(opts.page_width, 612.0);
        assert_eq!(opts.margin, DEFAULT_MARGIN);
        assert_eq!(opts.column_width(), 266.0);
    }
}
