//! Terminal grid - the visible screen area
//!
//! The grid is a 2D array of cells representing the visible terminal area.

use serde::{Deserialize, Serialize};

use crate::cell::CellAttributes;
use crate::line::Line;
use crate::Dimensions;

/// The terminal grid (visible screen area)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Lines in the grid (row 0 is top)
    lines: Vec<Line>,
    /// Number of columns
    cols: usize,
    /// Number of rows
    rows: usize,
}

impl Grid {
    /// Create a new grid with the specified dimensions
    pub fn new(dims: Dimensions) -> Self {
        let lines = (0..dims.rows).map(|_| Line::new(dims.cols)).collect();
        Self {
            lines,
            cols: dims.cols,
            rows: dims.rows,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            cols: self.cols,
            rows: self.rows,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get a reference to a line
    pub fn line(&self, row: usize) -> &Line {
        &self.lines[row]
    }

    /// Get a mutable reference to a line
    pub fn line_mut(&mut self, row: usize) -> &mut Line {
        &mut self.lines[row]
    }

    /// Get a line, returning None if out of bounds
    pub fn get_line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    /// Clear the entire grid
    pub fn clear(&mut self, attrs: CellAttributes) {
        for line in &mut self.lines {
            line.clear(attrs);
        }
    }

    /// Clear from cursor position to end of screen
    pub fn clear_below(&mut self, row: usize, col: usize, attrs: CellAttributes) {
        if row >= self.rows {
            return;
        }
        self.lines[row].clear_from(col, attrs);
        for line in self.lines.iter_mut().skip(row + 1) {
            line.clear(attrs);
        }
    }

    /// Clear from start of screen to cursor position
    pub fn clear_above(&mut self, row: usize, col: usize, attrs: CellAttributes) {
        if row >= self.rows {
            return;
        }
        for line in self.lines.iter_mut().take(row) {
            line.clear(attrs);
        }
        self.lines[row].clear_to(col, attrs);
    }

    /// Scroll up within rows [top, bottom]: lines move toward the top,
    /// blank lines appear at the bottom of the region. Lines scrolled out
    /// of the region are returned (the caller decides whether they go to
    /// scrollback).
    pub fn scroll_up(
        &mut self,
        top: usize,
        bottom: usize,
        n: usize,
        attrs: CellAttributes,
    ) -> Vec<Line> {
        if top >= self.rows || bottom >= self.rows || top > bottom {
            return Vec::new();
        }

        let n = n.min(bottom - top + 1);
        let mut scrolled_out = Vec::with_capacity(n);

        for _ in 0..n {
            let line = self.lines.remove(top);
            scrolled_out.push(line);
            self.lines
                .insert(bottom, Line::with_attrs(self.cols, attrs));
        }

        scrolled_out
    }

    /// Scroll down within rows [top, bottom]: lines move toward the bottom,
    /// blank lines appear at the top of the region. Lines pushed past the
    /// bottom are discarded.
    pub fn scroll_down(&mut self, top: usize, bottom: usize, n: usize, attrs: CellAttributes) {
        if top >= self.rows || bottom >= self.rows || top > bottom {
            return;
        }

        let n = n.min(bottom - top + 1);

        for _ in 0..n {
            self.lines.remove(bottom);
            self.lines.insert(top, Line::with_attrs(self.cols, attrs));
        }
    }

    /// Scroll up only within the cell rectangle [top..=bottom] x [left..right).
    /// Used when a left/right margin constrains scrolling.
    pub fn scroll_up_rect(
        &mut self,
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
        n: usize,
        attrs: CellAttributes,
    ) {
        if top >= self.rows || bottom >= self.rows || top > bottom {
            return;
        }
        let n = n.min(bottom - top + 1);
        for row in top..=bottom {
            let src_row = row + n;
            for col in left..right.min(self.cols) {
                let cell = if src_row <= bottom {
                    self.lines[src_row].cell(col).clone()
                } else {
                    let mut blank = crate::cell::Cell::new();
                    blank.attrs = attrs;
                    blank
                };
                *self.lines[row].cell_mut(col) = cell;
            }
        }
    }

    /// Scroll down only within the cell rectangle [top..=bottom] x [left..right).
    pub fn scroll_down_rect(
        &mut self,
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
        n: usize,
        attrs: CellAttributes,
    ) {
        if top >= self.rows || bottom >= self.rows || top > bottom {
            return;
        }
        let n = n.min(bottom - top + 1);
        for row in (top..=bottom).rev() {
            for col in left..right.min(self.cols) {
                let cell = if row >= top + n {
                    self.lines[row - n].cell(col).clone()
                } else {
                    let mut blank = crate::cell::Cell::new();
                    blank.attrs = attrs;
                    blank
                };
                *self.lines[row].cell_mut(col) = cell;
            }
        }
    }

    /// Insert n blank lines at row, scrolling lines down within the region
    /// ending at `bottom`. Lines pushed past the region are lost.
    pub fn insert_lines(&mut self, row: usize, n: usize, bottom: usize, attrs: CellAttributes) {
        if row >= self.rows || row > bottom {
            return;
        }
        self.scroll_down(row, bottom, n, attrs);
    }

    /// Delete n lines at row, scrolling lines up within the region ending
    /// at `bottom`. Blank lines appear at the region bottom.
    pub fn delete_lines(&mut self, row: usize, n: usize, bottom: usize, attrs: CellAttributes) {
        if row >= self.rows || row > bottom {
            return;
        }
        self.scroll_up(row, bottom, n, attrs);
    }

    /// Resize the grid to new dimensions
    pub fn resize(&mut self, dims: Dimensions, attrs: CellAttributes) {
        for line in &mut self.lines {
            line.resize(dims.cols, attrs);
        }

        if dims.rows > self.rows {
            for _ in self.rows..dims.rows {
                self.lines.push(Line::with_attrs(dims.cols, attrs));
            }
        } else {
            self.lines.truncate(dims.rows);
        }

        self.cols = dims.cols;
        self.rows = dims.rows;
    }

    /// Iterator over lines
    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Mutable iterator over lines
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Line> {
        self.lines.iter_mut()
    }
}
