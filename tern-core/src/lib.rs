//! Terminal Core - command set, screen model, and state machine
//!
//! This crate provides the interpreter half of a terminal emulator:
//! - The closed `Command` set covering cursor motion, erase/insert/delete,
//!   scrolling, margins, modes, colors, charsets, and report requests
//! - A `Screen` that owns the primary and alternate buffers, scrollback,
//!   cursor, margins, and modes, and applies commands to them
//! - An `OutputGenerator` serializing commands back into escape sequences
//! - A `Selector` for text selection over the grid including scrollback
//!
//! The crate is deterministic: given the same sequence of commands, it will
//! always produce the same screen state. Byte-stream parsing lives in the
//! companion parser crate.

mod buffer;
mod cell;
mod charset;
mod color;
mod command;
mod cursor;
mod events;
mod grid;
mod hyperlink;
mod line;
mod modes;
mod output;
mod screen;
mod scrollback;
pub mod selector;
mod shared;

pub use buffer::{BufferKind, Margin, ScreenBuffer};
pub use cell::{Cell, CellAttributes, UnderlineStyle};
pub use charset::{charset_map, CharsetId, CharsetMap, CharsetState, CharsetTable};
pub use color::{parse_color, Color, ColorParseError, RgbColor};
pub use command::{
    Command, CursorDisplay, CursorShape, DynamicColorName, GraphicsRendition, Mode, MouseProtocol,
    ResizeUnit, StatusString, TabClear,
};
pub use cursor::{Cursor, SavedCursor};
pub use events::{MockEvents, NoopEvents, ScreenEvents};
pub use grid::Grid;
pub use hyperlink::{Hyperlink, HyperlinkRegistry};
pub use line::Line;
pub use modes::ModeSet;
pub use output::OutputGenerator;
pub use screen::Screen;
pub use scrollback::Scrollback;
pub use selector::{CellSource, SelectionMode, SelectionRange, Selector, SelectorState};
pub use shared::SharedScreen;

use serde::{Deserialize, Serialize};

/// Terminal dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub cols: usize,
    pub rows: usize,
}

impl Dimensions {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

/// A grid coordinate, 1-based as in the VT addressing model.
///
/// For selection and history queries the row is an absolute line number
/// spanning scrollback and the live screen: row 1 is the oldest history
/// line, history length + 1 is the top visible row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_default() {
        let dims = Dimensions::default();
        assert_eq!(dims.cols, 80);
        assert_eq!(dims.rows, 24);
    }

    #[test]
    fn test_coordinate_ordering() {
        // Row dominates, then column; selection normalization relies on it.
        assert!(Coordinate::new(1, 9) < Coordinate::new(2, 1));
        assert!(Coordinate::new(3, 2) < Coordinate::new(3, 5));
    }
}
