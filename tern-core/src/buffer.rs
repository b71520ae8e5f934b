//! Screen buffer: one grid plus its cursor, margins, tabs, and history
//!
//! The screen owns two of these (main and alternate) for its entire
//! lifetime. Only the main buffer feeds its scrollback.

use serde::{Deserialize, Serialize};

use crate::charset::CharsetState;
use crate::cursor::{Cursor, SavedCursor};
use crate::grid::Grid;
use crate::line::Line;
use crate::scrollback::Scrollback;
use crate::Dimensions;

/// Default tab stop interval
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Which of the two screen buffers this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferKind {
    Main,
    Alternate,
}

/// Scroll/addressing margins. Each edge is optional; unset means the screen
/// edge. Values are 1-based per the VT addressing model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub top: Option<usize>,
    pub bottom: Option<usize>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl Margin {
    /// Vertical bounds as 0-based inclusive rows
    pub fn vertical(&self, rows: usize) -> (usize, usize) {
        let top = self.top.map(|t| t - 1).unwrap_or(0).min(rows - 1);
        let bottom = self.bottom.map(|b| b - 1).unwrap_or(rows - 1).min(rows - 1);
        (top, bottom)
    }

    /// Horizontal bounds as 0-based inclusive columns
    pub fn horizontal(&self, cols: usize) -> (usize, usize) {
        let left = self.left.map(|l| l - 1).unwrap_or(0).min(cols - 1);
        let right = self.right.map(|r| r - 1).unwrap_or(cols - 1).min(cols - 1);
        (left, right)
    }

    /// True when no margin constrains the full screen
    pub fn is_unset(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }
}

/// One screen buffer: grid, cursor state, margins, tab stops, history
#[derive(Debug)]
pub struct ScreenBuffer {
    pub kind: BufferKind,
    pub grid: Grid,
    pub scrollback: Scrollback,
    pub cursor: Cursor,
    pub saved_cursors: Vec<SavedCursor>,
    pub margin: Margin,
    pub charsets: CharsetState,
    tab_stops: Vec<bool>,
    tab_width: usize,
}

impl ScreenBuffer {
    pub fn new(kind: BufferKind, dims: Dimensions, max_history: Option<usize>) -> Self {
        let history = match kind {
            BufferKind::Main => Scrollback::new(max_history),
            // The alternate buffer never scrolls back.
            BufferKind::Alternate => Scrollback::new(Some(0)),
        };
        Self {
            kind,
            grid: Grid::new(dims),
            scrollback: history,
            cursor: Cursor::new(),
            saved_cursors: Vec::new(),
            margin: Margin::default(),
            charsets: CharsetState::new(),
            tab_stops: default_tab_stops(dims.cols, DEFAULT_TAB_WIDTH),
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Number of lines available in history
    pub fn history_len(&self) -> usize {
        self.scrollback.len()
    }

    /// Total addressable lines: history plus the visible grid
    pub fn total_rows(&self) -> usize {
        self.history_len() + self.rows()
    }

    /// Line at an absolute 1-based row spanning history and grid.
    /// Row 1 is the oldest history line.
    pub fn absolute_line(&self, row: usize) -> Option<&Line> {
        if row == 0 {
            return None;
        }
        let history = self.history_len();
        if row <= history {
            self.scrollback.get(row - 1)
        } else {
            self.grid.get_line(row - 1 - history)
        }
    }

    /// Set a tab stop at the given 0-based column
    pub fn set_tab_stop(&mut self, col: usize) {
        if let Some(stop) = self.tab_stops.get_mut(col) {
            *stop = true;
        }
    }

    /// Clear the tab stop at the given 0-based column
    pub fn clear_tab_stop(&mut self, col: usize) {
        if let Some(stop) = self.tab_stops.get_mut(col) {
            *stop = false;
        }
    }

    /// Clear every tab stop
    pub fn clear_all_tab_stops(&mut self) {
        for stop in &mut self.tab_stops {
            *stop = false;
        }
    }

    /// Next tab stop strictly after `col`, clamped to the last column
    pub fn next_tab_stop(&self, col: usize) -> usize {
        let cols = self.cols();
        let mut c = col + 1;
        while c < cols {
            if self.tab_stops.get(c).copied().unwrap_or(false) {
                return c;
            }
            c += 1;
        }
        cols - 1
    }

    /// Previous tab stop strictly before `col`, clamped to column 0
    pub fn prev_tab_stop(&self, col: usize) -> usize {
        let mut c = col;
        while c > 0 {
            c -= 1;
            if self.tab_stops.get(c).copied().unwrap_or(false) {
                return c;
            }
        }
        0
    }

    /// All 1-based columns carrying a tab stop (for DECTABSR)
    pub fn tab_stop_columns(&self) -> Vec<usize> {
        self.tab_stops
            .iter()
            .enumerate()
            .filter(|(_, &set)| set)
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Reset tab stops to the default interval
    pub fn reset_tab_stops(&mut self) {
        self.tab_stops = default_tab_stops(self.cols(), self.tab_width);
    }

    /// Resize grid and tab stops, clamping the cursor into bounds
    pub fn resize(&mut self, dims: Dimensions) {
        let attrs = self.cursor.attrs;
        self.grid.resize(dims, attrs);
        self.tab_stops = default_tab_stops(dims.cols, self.tab_width);
        self.cursor.col = self.cursor.col.min(dims.cols.saturating_sub(1));
        self.cursor.row = self.cursor.row.min(dims.rows.saturating_sub(1));
        self.cursor.pending_wrap = false;
        self.margin = Margin::default();
    }
}

impl crate::selector::CellSource for ScreenBuffer {
    fn cell_at(&self, coord: crate::Coordinate) -> Option<&crate::cell::Cell> {
        let line = self.absolute_line(coord.row)?;
        line.get(coord.col.checked_sub(1)?)
    }
}

fn default_tab_stops(cols: usize, interval: usize) -> Vec<bool> {
    let mut stops = vec![false; cols];
    for i in (0..cols).step_by(interval.max(1)) {
        stops[i] = true;
    }
    stops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_defaults_to_screen_edges() {
        let margin = Margin::default();
        assert!(margin.is_unset());
        assert_eq!(margin.vertical(24), (0, 23));
        assert_eq!(margin.horizontal(80), (0, 79));
    }

    #[test]
    fn test_margin_bounds() {
        let margin = Margin {
            top: Some(2),
            bottom: Some(10),
            left: Some(5),
            right: Some(40),
        };
        assert_eq!(margin.vertical(24), (1, 9));
        assert_eq!(margin.horizontal(80), (4, 39));
    }

    #[test]
    fn test_tab_stops() {
        let buffer = ScreenBuffer::new(BufferKind::Main, Dimensions::new(80, 24), None);
        assert_eq!(buffer.next_tab_stop(0), 8);
        assert_eq!(buffer.next_tab_stop(8), 16);
        assert_eq!(buffer.next_tab_stop(78), 79);
        assert_eq!(buffer.prev_tab_stop(9), 8);
        assert_eq!(buffer.prev_tab_stop(8), 0);
    }

    #[test]
    fn test_absolute_line_addressing() {
        let mut buffer = ScreenBuffer::new(BufferKind::Main, Dimensions::new(10, 3), None);
        let mut old = Line::new(10);
        old.cell_mut(0).set_char('h');
        buffer.scrollback.push(old);
        buffer.grid.line_mut(0).cell_mut(0).set_char('v');

        assert_eq!(buffer.total_rows(), 4);
        assert_eq!(buffer.absolute_line(1).unwrap().cell(0).display_char(), 'h');
        assert_eq!(buffer.absolute_line(2).unwrap().cell(0).display_char(), 'v');
        assert!(buffer.absolute_line(0).is_none());
        assert!(buffer.absolute_line(5).is_none());
    }

    #[test]
    fn test_alternate_buffer_has_no_history() {
        let buffer = ScreenBuffer::new(BufferKind::Alternate, Dimensions::new(80, 24), Some(100));
        assert_eq!(buffer.scrollback.max_lines(), Some(0));
    }
}
