//! Terminal cell representation
//!
//! Each cell in the terminal grid contains:
//! - One or more codepoints (base character plus combining marks)
//! - Display attributes (colors, bold, italic, etc.)
//! - An optional hyperlink handle

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::hyperlink::Hyperlink;

/// Underline style variants (SGR 4:x subparameters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

/// Attributes that affect how a cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellAttributes {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Underline color (SGR 58)
    pub underline_color: Color,
    /// Bold text (SGR 1)
    pub bold: bool,
    /// Faint/dim text (SGR 2)
    pub faint: bool,
    /// Italic text (SGR 3)
    pub italic: bool,
    /// Underline style (SGR 4, 21, 4:x)
    pub underline: UnderlineStyle,
    /// Blinking text (SGR 5)
    pub blink: bool,
    /// Inverse/reverse video (SGR 7)
    pub inverse: bool,
    /// Hidden/invisible text (SGR 8)
    pub hidden: bool,
    /// Strikethrough text (SGR 9)
    pub crossed_out: bool,
    /// Framed glyph (SGR 51)
    pub framed: bool,
    /// Overlined glyph (SGR 53)
    pub overline: bool,
}

impl CellAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all attributes to default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Get effective foreground color (accounting for inverse)
    pub fn effective_fg(&self) -> Color {
        if self.inverse {
            self.bg
        } else {
            self.fg
        }
    }

    /// Get effective background color (accounting for inverse)
    pub fn effective_bg(&self) -> Color {
        if self.inverse {
            self.fg
        } else {
            self.bg
        }
    }
}

/// A single cell in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The content of this cell. Empty means blank; the first char is the
    /// base character, any following chars are combining marks.
    content: String,
    /// Display attributes
    pub attrs: CellAttributes,
    /// Width of this cell (1 for normal, 2 for wide chars, 0 for continuation)
    width: u8,
    /// Hyperlink this cell belongs to, if any
    #[serde(skip)]
    hyperlink: Option<Arc<Hyperlink>>,
}

impl Cell {
    /// Create a new empty cell
    pub fn new() -> Self {
        Self {
            content: String::new(),
            attrs: CellAttributes::default(),
            width: 1,
            hyperlink: None,
        }
    }

    /// Create a cell with a character
    pub fn with_char(c: char) -> Self {
        let mut cell = Self::new();
        cell.set_char(c);
        cell
    }

    /// Set the character content
    pub fn set_char(&mut self, c: char) {
        self.content.clear();
        self.content.push(c);
        self.width = unicode_display_width(c);
    }

    /// Append a combining mark to the existing base character
    pub fn push_combining(&mut self, c: char) {
        if !self.content.is_empty() {
            self.content.push(c);
        }
    }

    /// Get the cell content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the base codepoint (space if empty)
    pub fn display_char(&self) -> char {
        self.content.chars().next().unwrap_or(' ')
    }

    /// Check if cell is empty (no content or just space)
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() || self.content == " "
    }

    /// Get the display width of this cell
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Set this cell as a wide character continuation (width=0)
    pub fn set_continuation(&mut self) {
        self.content.clear();
        self.width = 0;
        self.hyperlink = None;
    }

    /// Check if this is a continuation cell
    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// The hyperlink covering this cell, if any
    pub fn hyperlink(&self) -> Option<&Arc<Hyperlink>> {
        self.hyperlink.as_ref()
    }

    /// Attach or detach a hyperlink handle
    pub fn set_hyperlink(&mut self, link: Option<Arc<Hyperlink>>) {
        self.hyperlink = link;
    }

    /// Clear the cell (reset to empty with given attributes)
    pub fn clear(&mut self, attrs: CellAttributes) {
        self.content.clear();
        self.attrs = attrs;
        self.width = 1;
        self.hyperlink = None;
    }

    /// Reset cell to default state
    pub fn reset(&mut self) {
        self.clear(CellAttributes::default());
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculate the display width of a Unicode character
/// Returns 2 for wide characters (CJK, etc.), 1 for normal, 0 for combining marks
fn unicode_display_width(c: char) -> u8 {
    use unicode_width::UnicodeWidthChar;
    match c.width() {
        Some(w) => w.min(2) as u8,
        None => 1, // Control characters - treat as 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_new() {
        let cell = Cell::new();
        assert!(cell.is_empty());
        assert_eq!(cell.width(), 1);
    }

    #[test]
    fn test_cell_with_char() {
        let cell = Cell::with_char('A');
        assert_eq!(cell.display_char(), 'A');
        assert_eq!(cell.width(), 1);
        assert!(!cell.is_empty());
    }

    #[test]
    fn test_cell_wide_char() {
        let cell = Cell::with_char('中');
        assert_eq!(cell.display_char(), '中');
        assert_eq!(cell.width(), 2);
    }

    #[test]
    fn test_cell_combining_mark() {
        let mut cell = Cell::with_char('e');
        cell.push_combining('\u{0301}');
        assert_eq!(cell.content(), "e\u{0301}");
        assert_eq!(cell.width(), 1);
    }

    #[test]
    fn test_cell_clear_detaches_hyperlink() {
        let mut cell = Cell::with_char('X');
        cell.set_hyperlink(Some(Arc::new(Hyperlink {
            id: String::new(),
            uri: "https://example.com".into(),
        })));
        cell.clear(CellAttributes::default());
        assert!(cell.is_empty());
        assert!(cell.hyperlink().is_none());
    }

    #[test]
    fn test_attributes_inverse() {
        let mut attrs = CellAttributes::new();
        attrs.fg = Color::Indexed(1);
        attrs.bg = Color::Indexed(0);
        attrs.inverse = true;

        assert_eq!(attrs.effective_fg(), Color::Indexed(0));
        assert_eq!(attrs.effective_bg(), Color::Indexed(1));
    }

    #[test]
    fn test_attributes_reset() {
        let mut attrs = CellAttributes::new();
        attrs.bold = true;
        attrs.italic = true;
        attrs.fg = Color::Indexed(1);

        attrs.reset();

        assert!(!attrs.bold);
        assert!(!attrs.italic);
        assert_eq!(attrs.fg, Color::Default);
    }
}
