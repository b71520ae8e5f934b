//! Cursor state management
//!
//! Handles cursor position, style, visibility, and saved state.

use serde::{Deserialize, Serialize};

use crate::cell::CellAttributes;
use crate::charset::CharsetState;
use crate::command::{CursorDisplay, CursorShape};

/// Cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub col: usize,
    /// Row position (0-indexed)
    pub row: usize,
    /// Visual shape
    pub shape: CursorShape,
    /// Blinking vs. steady display
    pub display: CursorDisplay,
    /// Whether cursor is visible
    pub visible: bool,
    /// Current cell attributes (used for new characters)
    pub attrs: CellAttributes,
    /// Pending wrap: cursor is at the right margin and next char should wrap
    pub pending_wrap: bool,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            col: 0,
            row: 0,
            shape: CursorShape::Block,
            display: CursorDisplay::Blink,
            visible: true,
            attrs: CellAttributes::default(),
            pending_wrap: false,
        }
    }

    /// Reset cursor to default state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Saved cursor state for DECSC/DECRC.
///
/// DECSC also captures the charset designation state, which DECRC restores.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavedCursor {
    pub col: usize,
    pub row: usize,
    pub attrs: CellAttributes,
    pub pending_wrap: bool,
    pub charsets: CharsetState,
}

impl SavedCursor {
    /// Save current cursor and charset state
    pub fn save(cursor: &Cursor, charsets: &CharsetState) -> Self {
        Self {
            col: cursor.col,
            row: cursor.row,
            attrs: cursor.attrs,
            pending_wrap: cursor.pending_wrap,
            charsets: charsets.clone(),
        }
    }

    /// Restore cursor and charset state
    pub fn restore(&self, cursor: &mut Cursor, charsets: &mut CharsetState) {
        cursor.col = self.col;
        cursor.row = self.row;
        cursor.attrs = self.attrs;
        cursor.pending_wrap = self.pending_wrap;
        *charsets = self.charsets.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::{CharsetId, CharsetTable};

    #[test]
    fn test_cursor_new() {
        let cursor = Cursor::new();
        assert_eq!(cursor.col, 0);
        assert_eq!(cursor.row, 0);
        assert!(cursor.visible);
        assert!(!cursor.pending_wrap);
    }

    #[test]
    fn test_saved_cursor_round_trip() {
        let mut cursor = Cursor::new();
        cursor.col = 10;
        cursor.row = 5;
        cursor.attrs.bold = true;
        let mut charsets = CharsetState::new();
        charsets.designate(CharsetTable::G0, CharsetId::Special);

        let saved = SavedCursor::save(&cursor, &charsets);

        cursor.reset();
        charsets.reset();

        saved.restore(&mut cursor, &mut charsets);

        assert_eq!(cursor.col, 10);
        assert_eq!(cursor.row, 5);
        assert!(cursor.attrs.bold);
        assert_eq!(charsets.slot(CharsetTable::G0), CharsetId::Special);
    }
}
