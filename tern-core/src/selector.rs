//! Text selection over the grid, including scrollback
//!
//! The selector is a small state machine independent of rendering. It
//! addresses cells by absolute 1-based coordinates spanning history and
//! the live screen, and resolves to a list of per-line column ranges.
//!
//! States move forward only: Waiting -> InProgress (first extension) ->
//! Complete (finalized). A completed selector is read-only; a new
//! selection replaces the old one wholesale.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::Coordinate;

/// How the selection grows from its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Contiguous span between anchor and extent
    Linear,
    /// Like Linear, but snapped outward to word boundaries
    LinearWordWise,
    /// Whole lines between anchor row and extent row
    FullLine,
    /// Axis-aligned box with anchor and extent as opposite corners
    Rectangular,
}

/// Selection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorState {
    Waiting,
    InProgress,
    Complete,
}

/// One selected span: line number plus inclusive 1-based column bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub line: usize,
    pub from_col: usize,
    pub to_col: usize,
}

impl SelectionRange {
    pub fn len(&self) -> usize {
        self.to_col.saturating_sub(self.from_col) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.to_col < self.from_col
    }
}

/// Cell lookup spanning history and the live screen
pub trait CellSource {
    /// Cell at an absolute 1-based coordinate, None if out of range
    fn cell_at(&self, coord: Coordinate) -> Option<&Cell>;
}

/// The selection state machine
#[derive(Debug, Clone)]
pub struct Selector {
    mode: SelectionMode,
    state: SelectorState,
    word_delimiters: Vec<char>,
    /// Total addressable lines (history + visible rows)
    total_rows: usize,
    columns: usize,
    /// Where the selection was started (never changes)
    start: Coordinate,
    from: Coordinate,
    to: Coordinate,
}

impl Selector {
    pub fn new(
        mode: SelectionMode,
        word_delimiters: &str,
        total_rows: usize,
        columns: usize,
        from: Coordinate,
        cells: &dyn CellSource,
    ) -> Self {
        let mut selector = Self {
            mode,
            state: SelectorState::Waiting,
            word_delimiters: word_delimiters.chars().collect(),
            total_rows,
            columns,
            start: from,
            from,
            to: from,
        };

        match mode {
            SelectionMode::FullLine => {
                selector.extend(Coordinate::new(from.row, 1), cells);
                selector.swap_direction();
                selector.extend(Coordinate::new(from.row, columns), cells);
            }
            SelectionMode::LinearWordWise => {
                selector.state = SelectorState::InProgress;
                selector.extend_backward(cells);
                selector.swap_direction();
                selector.extend_forward(cells);
            }
            _ => {}
        }

        selector
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn anchor(&self) -> Coordinate {
        self.from
    }

    pub fn extent(&self) -> Coordinate {
        self.to
    }

    /// Lowest absolute row the selection touches
    pub fn min_row(&self) -> usize {
        self.from.row.min(self.to.row)
    }

    /// Move the selection extent. Returns false if the selector is already
    /// complete; a completed selection never changes.
    pub fn extend(&mut self, coord: Coordinate, cells: &dyn CellSource) -> bool {
        if self.state == SelectorState::Complete {
            log::debug!("ignoring extend on a completed selection");
            return false;
        }

        let coord = Coordinate::new(
            coord.row.clamp(1, self.total_rows.max(1)),
            coord.col.clamp(1, self.columns.max(1)),
        );

        self.state = SelectorState::InProgress;

        if self.mode != SelectionMode::LinearWordWise {
            self.to = self.stretched_column(coord, cells);
        } else if coord > self.start {
            self.to = coord;
            self.extend_forward(cells);
        } else {
            self.to = coord;
            self.extend_backward(cells);
            self.swap_direction();
            self.to = self.start;
            self.extend_forward(cells);
        }

        true
    }

    /// Finalize the selection; it is read-only afterwards
    pub fn finish(&mut self) {
        if self.state == SelectorState::InProgress {
            self.state = SelectorState::Complete;
        }
    }

    /// Resolved per-line column ranges, ordered top to bottom
    pub fn selection(&self) -> Vec<SelectionRange> {
        match self.mode {
            SelectionMode::FullLine => self.lines(),
            SelectionMode::Linear | SelectionMode::LinearWordWise => self.linear(),
            SelectionMode::Rectangular => self.rectangular(),
        }
    }

    fn normalized(&self) -> (Coordinate, Coordinate) {
        if self.to < self.from {
            (self.to, self.from)
        } else {
            (self.from, self.to)
        }
    }

    fn linear(&self) -> Vec<SelectionRange> {
        let (from, to) = self.normalized();
        let rows = to.row - from.row + 1;

        match rows {
            1 => vec![SelectionRange {
                line: from.row,
                from_col: from.col,
                to_col: to.col,
            }],
            _ => {
                let mut result = Vec::with_capacity(rows);
                result.push(SelectionRange {
                    line: from.row,
                    from_col: from.col,
                    to_col: self.columns,
                });
                for n in 1..rows - 1 {
                    result.push(SelectionRange {
                        line: from.row + n,
                        from_col: 1,
                        to_col: self.columns,
                    });
                }
                result.push(SelectionRange {
                    line: to.row,
                    from_col: 1,
                    to_col: to.col,
                });
                result
            }
        }
    }

    fn lines(&self) -> Vec<SelectionRange> {
        let (from, to) = self.normalized();
        (from.row..=to.row)
            .map(|line| SelectionRange {
                line,
                from_col: 1,
                to_col: self.columns,
            })
            .collect()
    }

    fn rectangular(&self) -> Vec<SelectionRange> {
        let (from, to) = self.normalized();
        // Column bounds are corner-independent.
        let left = from.col.min(to.col);
        let right = from.col.max(to.col);
        (from.row..=to.row)
            .map(|line| SelectionRange {
                line,
                from_col: left,
                to_col: right,
            })
            .collect()
    }

    fn swap_direction(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// Snap a coordinate over a wide character or a run of empty cells to
    /// the last column that visually belongs to it.
    fn stretched_column(&self, coord: Coordinate, cells: &dyn CellSource) -> Coordinate {
        let mut stretched = coord;

        if let Some(cell) = cells.cell_at(coord) {
            if cell.width() > 1 {
                stretched.col = (stretched.col + cell.width() as usize - 1).min(self.columns);
                return stretched;
            }
        }

        while stretched.col < self.columns {
            match cells.cell_at(stretched) {
                Some(cell) if cell.is_empty() => stretched.col += 1,
                Some(cell) => {
                    if cell.width() > 1 {
                        stretched.col =
                            (stretched.col + cell.width() as usize - 1).min(self.columns);
                    }
                    break;
                }
                None => break,
            }
        }

        stretched
    }

    fn is_delimiter_at(&self, coord: Coordinate, cells: &dyn CellSource) -> bool {
        match cells.cell_at(coord) {
            None => true,
            Some(cell) => {
                cell.is_empty() || self.word_delimiters.contains(&cell.display_char())
            }
        }
    }

    fn extend_backward(&mut self, cells: &dyn CellSource) {
        let mut last = self.to;
        let mut current = last;
        loop {
            if current.col > 1 {
                current.col -= 1;
            } else if current.row > 1 {
                current.row -= 1;
                current.col = self.columns;
            } else {
                break;
            }

            if self.is_delimiter_at(current, cells) {
                break;
            }
            last = current;
        }

        if self.to < self.from {
            self.swap_direction();
        }
        self.to = last;
    }

    fn extend_forward(&mut self, cells: &dyn CellSource) {
        let mut last = self.to;
        let mut current = last;
        loop {
            if current.col < self.columns {
                current = self.stretched_column(Coordinate::new(current.row, current.col + 1), cells);
            } else if current.row < self.total_rows {
                current.row += 1;
                current.col = 1;
            } else {
                break;
            }

            if self.is_delimiter_at(current, cells) {
                break;
            }
            last = current;
        }

        self.to = self.stretched_column(last, cells);
    }
}
