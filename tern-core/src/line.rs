//! Terminal line representation
//!
//! A line is a row of cells in the terminal grid.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellAttributes};

/// A single line in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Cells in this line
    cells: Vec<Cell>,
    /// Whether this line was soft-wrapped (continuation of previous line)
    pub wrapped: bool,
    /// Whether this line carries a mark (SetMark, prompt boundaries)
    pub marked: bool,
}

impl Line {
    /// Create a new line with the specified number of columns
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::new(); cols],
            wrapped: false,
            marked: false,
        }
    }

    /// Create a new line with specified columns and attributes
    pub fn with_attrs(cols: usize, attrs: CellAttributes) -> Self {
        let cells = (0..cols)
            .map(|_| {
                let mut cell = Cell::new();
                cell.attrs = attrs;
                cell
            })
            .collect();
        Self {
            cells,
            wrapped: false,
            marked: false,
        }
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    /// Get a reference to a cell
    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Get a mutable reference to a cell
    pub fn get_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    /// Get cell at column, panics if out of bounds
    pub fn cell(&self, col: usize) -> &Cell {
        &self.cells[col]
    }

    /// Get mutable cell at column, panics if out of bounds
    pub fn cell_mut(&mut self, col: usize) -> &mut Cell {
        &mut self.cells[col]
    }

    /// Clear the entire line with given attributes
    pub fn clear(&mut self, attrs: CellAttributes) {
        for cell in &mut self.cells {
            cell.clear(attrs);
        }
        self.wrapped = false;
        self.marked = false;
    }

    /// Clear from column to end of line
    pub fn clear_from(&mut self, col: usize, attrs: CellAttributes) {
        for cell in self.cells.iter_mut().skip(col) {
            cell.clear(attrs);
        }
    }

    /// Clear from start of line to column (inclusive)
    pub fn clear_to(&mut self, col: usize, attrs: CellAttributes) {
        for cell in self.cells.iter_mut().take(col + 1) {
            cell.clear(attrs);
        }
    }

    /// Resize the line to a new column count
    pub fn resize(&mut self, cols: usize, attrs: CellAttributes) {
        if cols > self.cells.len() {
            self.cells.resize_with(cols, || {
                let mut cell = Cell::new();
                cell.attrs = attrs;
                cell
            });
        } else {
            self.cells.truncate(cols);
        }
    }

    /// Insert n blank cells at column, shifting cells right within
    /// [col, right_edge). Cells shifted past the edge are lost.
    pub fn insert_cells(&mut self, col: usize, n: usize, right_edge: usize, attrs: CellAttributes) {
        let edge = right_edge.min(self.cells.len());
        if col >= edge {
            return;
        }
        let n = n.min(edge - col);
        for _ in 0..n {
            self.cells.remove(edge - 1);
            let mut cell = Cell::new();
            cell.attrs = attrs;
            self.cells.insert(col, cell);
        }
    }

    /// Delete n cells at column, shifting cells left within [col, right_edge).
    /// Vacated cells at the edge are filled with attrs.
    pub fn delete_cells(&mut self, col: usize, n: usize, right_edge: usize, attrs: CellAttributes) {
        let edge = right_edge.min(self.cells.len());
        if col >= edge {
            return;
        }
        let n = n.min(edge - col);
        for _ in 0..n {
            self.cells.remove(col);
            let mut cell = Cell::new();
            cell.attrs = attrs;
            self.cells.insert(edge - 1, cell);
        }
    }

    /// Erase n cells starting at column (replace with blanks, don't shift)
    pub fn erase_cells(&mut self, col: usize, n: usize, attrs: CellAttributes) {
        for i in col..col.saturating_add(n).min(self.cells.len()) {
            self.cells[i].clear(attrs);
        }
    }

    /// Get the text content of the line (for selection/copy)
    pub fn text(&self) -> String {
        let mut result = String::new();
        for cell in &self.cells {
            if cell.is_continuation() {
                continue;
            }
            let content = cell.content();
            if content.is_empty() {
                result.push(' ');
            } else {
                result.push_str(content);
            }
        }
        result.trim_end().to_string()
    }

    /// Check if line is empty (all cells are empty/space)
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// Iterator over cells
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Mutable iterator over cells
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_new() {
        let line = Line::new(80);
        assert_eq!(line.cols(), 80);
        assert!(!line.wrapped);
        assert!(!line.marked);
    }

    #[test]
    fn test_line_clear() {
        let mut line = Line::new(80);
        line.cell_mut(0).set_char('A');
        line.marked = true;
        line.clear(CellAttributes::default());
        assert!(line.cell(0).is_empty());
        assert!(!line.marked);
    }

    #[test]
    fn test_line_clear_from_and_to() {
        let mut line = Line::new(10);
        for i in 0..10 {
            line.cell_mut(i).set_char((b'A' + i as u8) as char);
        }
        line.clear_from(5, CellAttributes::default());
        assert_eq!(line.cell(4).display_char(), 'E');
        assert!(line.cell(5).is_empty());

        line.clear_to(2, CellAttributes::default());
        assert!(line.cell(2).is_empty());
        assert_eq!(line.cell(3).display_char(), 'D');
    }

    #[test]
    fn test_line_text() {
        let mut line = Line::new(10);
        line.cell_mut(0).set_char('H');
        line.cell_mut(1).set_char('i');
        assert_eq!(line.text(), "Hi");
    }

    #[test]
    fn test_line_insert_cells() {
        let mut line = Line::new(5);
        for i in 0..5 {
            line.cell_mut(i).set_char((b'A' + i as u8) as char);
        }
        // Line is: A B C D E
        line.insert_cells(2, 2, 5, CellAttributes::default());
        // Should be: A B _ _ C (D E shifted out)
        assert_eq!(line.cell(0).display_char(), 'A');
        assert_eq!(line.cell(1).display_char(), 'B');
        assert!(line.cell(2).is_empty());
        assert!(line.cell(3).is_empty());
        assert_eq!(line.cell(4).display_char(), 'C');
    }

    #[test]
    fn test_line_delete_cells() {
        let mut line = Line::new(5);
        for i in 0..5 {
            line.cell_mut(i).set_char((b'A' + i as u8) as char);
        }
        // Line is: A B C D E
        line.delete_cells(1, 2, 5, CellAttributes::default());
        // Should be: A D E _ _
        assert_eq!(line.cell(0).display_char(), 'A');
        assert_eq!(line.cell(1).display_char(), 'D');
        assert_eq!(line.cell(2).display_char(), 'E');
        assert!(line.cell(3).is_empty());
        assert!(line.cell(4).is_empty());
    }

    #[test]
    fn test_line_delete_cells_respects_right_edge() {
        let mut line = Line::new(6);
        for i in 0..6 {
            line.cell_mut(i).set_char((b'A' + i as u8) as char);
        }
        // Delete inside margin [1, 4): F stays untouched
        line.delete_cells(1, 1, 4, CellAttributes::default());
        assert_eq!(line.cell(0).display_char(), 'A');
        assert_eq!(line.cell(1).display_char(), 'C');
        assert_eq!(line.cell(2).display_char(), 'D');
        assert!(line.cell(3).is_empty());
        assert_eq!(line.cell(4).display_char(), 'E');
        assert_eq!(line.cell(5).display_char(), 'F');
    }

    #[test]
    fn test_line_serde_round_trip() {
        let mut line = Line::new(4);
        line.cell_mut(0).set_char('A');
        line.wrapped = true;
        let json = serde_json::to_string(&line).unwrap();
        let back: Line = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }

    #[test]
    fn test_line_erase_cells() {
        let mut line = Line::new(5);
        for i in 0..5 {
            line.cell_mut(i).set_char((b'A' + i as u8) as char);
        }
        line.erase_cells(1, 2, CellAttributes::default());
        assert_eq!(line.cell(0).display_char(), 'A');
        assert!(line.cell(1).is_empty());
        assert!(line.cell(2).is_empty());
        assert_eq!(line.cell(3).display_char(), 'D');
    }
}
