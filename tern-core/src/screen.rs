//! Terminal screen - the command interpreter
//!
//! The screen owns both grid buffers (main and alternate), the cursor,
//! margins, modes, and scrollback, and applies `Command`s to them. It is
//! the only place cells are mutated.
//!
//! Commands are interpreted through one of two executor strategies. The
//! direct strategy applies every command as it arrives. The synchronized
//! strategy (selected by mode ?2026) queues drawing commands and replays
//! them on flush, so a renderer running on another thread never observes
//! a half-applied frame. Side-channel commands (reports, titles,
//! clipboard, mode switches) always bypass the queue.
//!
//! Malformed or out-of-range commands are clamped or ignored; nothing in
//! here may panic on untrusted input.

use std::sync::Arc;

use unicode_width::UnicodeWidthChar;

use crate::buffer::{BufferKind, Margin, ScreenBuffer};
use crate::cell::Cell;
use crate::charset::{CharsetId, CharsetTable};
use crate::command::{
    Command, CursorDisplay, CursorShape, GraphicsRendition, Mode, StatusString, TabClear,
};
use crate::cursor::SavedCursor;
use crate::events::ScreenEvents;
use crate::hyperlink::{Hyperlink, HyperlinkRegistry};
use crate::modes::ModeSet;
use crate::output::OutputGenerator;
use crate::selector::{SelectionMode, SelectionRange, Selector, SelectorState};
use crate::{Coordinate, Dimensions};

/// Word delimiters used for word-wise selection unless overridden
const DEFAULT_WORD_DELIMITERS: &str = " \t()[]{}<>'\"";

/// The terminal screen state machine
pub struct Screen<E: ScreenEvents> {
    size: Dimensions,
    main: ScreenBuffer,
    alternate: ScreenBuffer,
    active: BufferKind,
    modes: ModeSet,
    /// Synchronized-output queue; populated while mode ?2026 is set
    queued: Vec<Command>,
    synchronized: bool,
    listener: E,
    hyperlinks: HyperlinkRegistry,
    active_hyperlink: Option<Arc<Hyperlink>>,
    selection: Option<Selector>,
    word_delimiters: String,
    /// Viewport offset into history; 0 = pinned to the live screen
    scroll_offset: usize,
    window_title: String,
    saved_titles: Vec<String>,
    log_raw: bool,
    log_trace: bool,
}

impl<E: ScreenEvents> Screen<E> {
    pub fn new(size: Dimensions, listener: E) -> Self {
        Self::with_history(size, listener, Some(crate::scrollback::DEFAULT_SCROLLBACK_SIZE))
    }

    /// Create a screen with an explicit scrollback bound (None = unbounded)
    pub fn with_history(size: Dimensions, listener: E, max_history: Option<usize>) -> Self {
        Self {
            size,
            main: ScreenBuffer::new(BufferKind::Main, size, max_history),
            alternate: ScreenBuffer::new(BufferKind::Alternate, size, max_history),
            active: BufferKind::Main,
            modes: ModeSet::new(),
            queued: Vec::new(),
            synchronized: false,
            listener,
            hyperlinks: HyperlinkRegistry::new(),
            active_hyperlink: None,
            selection: None,
            word_delimiters: DEFAULT_WORD_DELIMITERS.to_string(),
            scroll_offset: 0,
            window_title: String::new(),
            saved_titles: Vec::new(),
            log_raw: false,
            log_trace: false,
        }
    }

    // {{{ accessors

    pub fn size(&self) -> Dimensions {
        self.size
    }

    pub fn cols(&self) -> usize {
        self.size.cols
    }

    pub fn rows(&self) -> usize {
        self.size.rows
    }

    pub fn listener(&self) -> &E {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut E {
        &mut self.listener
    }

    pub fn buffer_kind(&self) -> BufferKind {
        self.active
    }

    pub fn is_alternate(&self) -> bool {
        self.active == BufferKind::Alternate
    }

    pub fn buffer(&self) -> &ScreenBuffer {
        match self.active {
            BufferKind::Main => &self.main,
            BufferKind::Alternate => &self.alternate,
        }
    }

    fn buffer_mut(&mut self) -> &mut ScreenBuffer {
        match self.active {
            BufferKind::Main => &mut self.main,
            BufferKind::Alternate => &mut self.alternate,
        }
    }

    pub fn modes(&self) -> &ModeSet {
        &self.modes
    }

    pub fn is_mode_enabled(&self, mode: Mode) -> bool {
        self.modes.enabled(mode)
    }

    pub fn margin(&self) -> Margin {
        self.buffer().margin
    }

    /// Cursor position in 1-based screen coordinates
    pub fn cursor_position(&self) -> Coordinate {
        let cursor = &self.buffer().cursor;
        Coordinate::new(cursor.row + 1, cursor.col + 1)
    }

    pub fn cursor(&self) -> &crate::cursor::Cursor {
        &self.buffer().cursor
    }

    pub fn history_len(&self) -> usize {
        self.main.history_len()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn window_title(&self) -> &str {
        &self.window_title
    }

    pub fn set_max_history(&mut self, max: Option<usize>) {
        self.main.scrollback.set_max_lines(max);
    }

    pub fn set_log_raw(&mut self, enabled: bool) {
        self.log_raw = enabled;
    }

    pub fn log_raw(&self) -> bool {
        self.log_raw
    }

    pub fn set_log_trace(&mut self, enabled: bool) {
        self.log_trace = enabled;
    }

    pub fn log_trace(&self) -> bool {
        self.log_trace
    }

    pub fn set_word_delimiters(&mut self, delimiters: &str) {
        self.word_delimiters = delimiters.to_string();
    }

    /// Test whether a 1-based coordinate lies inside the visible screen
    pub fn contains(&self, coord: Coordinate) -> bool {
        (1..=self.size.rows).contains(&coord.row) && (1..=self.size.cols).contains(&coord.col)
    }

    /// Cell at a 1-based screen coordinate on the live grid
    pub fn cell_at(&self, coord: Coordinate) -> Option<&Cell> {
        if !self.contains(coord) {
            return None;
        }
        self.buffer()
            .grid
            .get_line(coord.row - 1)
            .and_then(|line| line.get(coord.col - 1))
    }

    /// Hyperlink under a 1-based screen coordinate, if any. This is a
    /// single-lock multi-field query: bounds test and cell read happen on
    /// one snapshot.
    pub fn hyperlink_at(&self, coord: Coordinate) -> Option<Arc<Hyperlink>> {
        self.cell_at(coord).and_then(|cell| cell.hyperlink().cloned())
    }

    // }}}

    // {{{ command application

    /// Apply a single command through the active executor strategy.
    pub fn apply(&mut self, command: Command) {
        if self.log_trace {
            log::trace!(target: "tern::trace", "{:?}", command);
        }

        if self.synchronized && !command.is_side_channel() {
            self.queued.push(command);
            return;
        }

        self.execute(command);
    }

    /// Replay queued drawing commands, emptying the queue.
    pub fn flush_queued(&mut self) {
        let queued = std::mem::take(&mut self.queued);
        for command in queued {
            self.execute(command);
        }
    }

    /// True while the synchronized executor is active (mode ?2026)
    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    fn execute(&mut self, command: Command) {
        use Command::*;

        match command {
            AppendChar(c) => self.append_char(c),
            ApplicationKeypadMode(enable) => self.listener.set_application_keypad(enable),
            BackIndex => self.back_index(),
            Backspace => self.backspace(),
            Bell => self.listener.bell(),
            ChangeIconTitle(title) => self.listener.set_icon_title(&title),
            ChangeWindowTitle(title) => {
                self.window_title = title.chars().take(4096).collect();
                self.listener.set_window_title(&self.window_title.clone());
            }
            ClearLine => self.erase_line(2),
            ClearScreen => self.erase_display(2),
            ClearScrollbackBuffer => {
                self.main.scrollback.clear();
                self.scroll_offset = 0;
                self.clear_selection();
            }
            ClearToBeginOfLine => self.erase_line(1),
            ClearToBeginOfScreen => self.erase_display(1),
            ClearToEndOfLine => self.erase_line(0),
            ClearToEndOfScreen => self.erase_display(0),
            CopyToClipboard(data) => self.listener.copy_to_clipboard(&data),
            CursorBackwardTab(n) => self.cursor_backward_tab(n),
            CursorNextLine(n) => {
                self.move_cursor_down(n);
                self.carriage_return();
            }
            CursorPreviousLine(n) => {
                self.move_cursor_up(n);
                self.carriage_return();
            }
            DeleteCharacters(n) => self.delete_chars(n),
            DeleteColumns(n) => self.delete_columns(n),
            DeleteLines(n) => self.delete_lines(n),
            DesignateCharset { table, charset } => self.designate_charset(table, charset),
            DeviceStatusReport => self.listener.reply("\x1b[0n"),
            DumpState => self.listener.dump_state(),
            EraseCharacters(n) => self.erase_chars(n),
            ForwardIndex => self.forward_index(),
            FullReset => self.reset_hard(),
            HorizontalPositionAbsolute(col) => self.set_cursor_col(col),
            HorizontalPositionRelative(n) => self.move_cursor_forward(n),
            HorizontalTabClear(which) => self.clear_tab_stops(which),
            HorizontalTabSet => {
                let col = self.buffer().cursor.col;
                self.buffer_mut().set_tab_stop(col);
            }
            Hyperlink { id, uri } => self.set_hyperlink(&id, &uri),
            Index => self.index(),
            InsertCharacters(n) => self.insert_chars(n),
            InsertColumns(n) => self.insert_columns(n),
            InsertLines(n) => self.insert_lines(n),
            Linefeed => self.linefeed(),
            MoveCursorBackward(n) => self.move_cursor_backward(n),
            MoveCursorDown(n) => self.move_cursor_down(n),
            MoveCursorForward(n) => self.move_cursor_forward(n),
            MoveCursorTo { row, col } => self.move_cursor_to(row, col),
            MoveCursorToBeginOfLine => self.carriage_return(),
            MoveCursorToColumn(col) => self.set_cursor_col(col),
            MoveCursorToLine(row) => self.set_cursor_row(row),
            MoveCursorToNextTab => self.tab(),
            MoveCursorUp(n) => self.move_cursor_up(n),
            Notify { title, body } => self.listener.notify(&title, &body),
            ReportCursorPosition => {
                let pos = self.logical_cursor_position();
                self.listener
                    .reply(&format!("\x1b[{};{}R", pos.row, pos.col));
            }
            ReportExtendedCursorPosition => {
                let pos = self.logical_cursor_position();
                self.listener
                    .reply(&format!("\x1b[{};{};1R", pos.row, pos.col));
            }
            RequestDynamicColor(name) => {
                if let Some(color) = self.listener.request_dynamic_color(name) {
                    self.listener.reply(&format!(
                        "\x1b]{};rgb:{:04x}/{:04x}/{:04x}\x07",
                        name.set_code(),
                        color.r as u16 * 0x101,
                        color.g as u16 * 0x101,
                        color.b as u16 * 0x101
                    ));
                }
            }
            RequestMode(mode) => self.request_mode(mode),
            RequestStatusString(value) => self.request_status_string(value),
            RequestTabStops => {
                let stops = self.buffer().tab_stop_columns();
                let list = stops
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join("/");
                self.listener.reply(&format!("\x1bP2$u{}\x1b\\", list));
            }
            ResetDynamicColor(name) => self.listener.reset_dynamic_color(name),
            ResizeWindow {
                width,
                height,
                unit,
            } => {
                let in_pixels = unit == crate::command::ResizeUnit::Pixels;
                self.listener.resize_window(width, height, in_pixels);
            }
            RestoreCursor => self.restore_cursor(),
            RestoreWindowTitle => {
                if let Some(title) = self.saved_titles.pop() {
                    self.window_title = title;
                    self.listener.set_window_title(&self.window_title.clone());
                }
            }
            ReverseIndex => self.reverse_index(),
            SaveCursor => self.save_cursor(),
            SaveWindowTitle => self.saved_titles.push(self.window_title.clone()),
            ScreenAlignmentPattern => self.screen_alignment_pattern(),
            ScrollDown(n) => self.scroll_down_in(n),
            ScrollUp(n) => self.scroll_up_in(n),
            SendDeviceAttributes => self.listener.reply("\x1b[?64;4;6;22c"),
            SendMouseEvents { protocol, enable } => {
                self.listener.set_mouse_protocol(protocol, enable);
            }
            SendTerminalId => {
                let version = pkg_version();
                self.listener.reply(&format!("\x1b[>64;{};0c", version));
            }
            SetBackgroundColor(color) => self.buffer_mut().cursor.attrs.bg = color,
            SetCursorStyle { display, shape } => {
                let cursor = &mut self.buffer_mut().cursor;
                cursor.display = display;
                cursor.shape = shape;
                self.listener.set_cursor_style(display, shape);
            }
            SetDynamicColor { name, color } => self.listener.set_dynamic_color(name, color),
            SetForegroundColor(color) => self.buffer_mut().cursor.attrs.fg = color,
            SetGraphicsRendition(rendition) => self.apply_rendition(rendition),
            SetLeftRightMargin { left, right } => self.set_left_right_margin(left, right),
            SetMark => {
                let row = self.buffer().cursor.row;
                self.buffer_mut().grid.line_mut(row).marked = true;
            }
            SetMode { mode, enable } => self.set_mode(mode, enable),
            SetTopBottomMargin { top, bottom } => self.set_top_bottom_margin(top, bottom),
            SetUnderlineColor(color) => self.buffer_mut().cursor.attrs.underline_color = color,
            SingleShiftSelect(table) => self.buffer_mut().charsets.single_shift(table),
            SoftTerminalReset => self.reset_soft(),
        }
    }

    // }}}

    // {{{ regions

    /// Vertical scroll region as 0-based inclusive rows
    fn vertical_region(&self) -> (usize, usize) {
        self.buffer().margin.vertical(self.size.rows)
    }

    /// Horizontal region as 0-based inclusive columns; the full width
    /// unless left/right margin mode is enabled
    fn horizontal_region(&self) -> (usize, usize) {
        if self.modes.enabled(Mode::LeftRightMargin) {
            self.buffer().margin.horizontal(self.size.cols)
        } else {
            (0, self.size.cols - 1)
        }
    }

    /// Cursor position for reports: margin-relative when origin mode is on
    fn logical_cursor_position(&self) -> Coordinate {
        let pos = self.cursor_position();
        if self.modes.enabled(Mode::Origin) {
            let (top, _) = self.vertical_region();
            let (left, _) = self.horizontal_region();
            Coordinate::new(pos.row.saturating_sub(top), pos.col.saturating_sub(left))
        } else {
            pos
        }
    }

    // }}}

    // {{{ printing

    fn append_char(&mut self, c: char) {
        let c = self.buffer_mut().charsets.map(c);
        let width = c.width().unwrap_or(1);

        if width == 0 {
            self.append_combining(c);
            return;
        }

        let (_, bottom) = self.vertical_region();
        let (left, right) = self.horizontal_region();
        let auto_wrap = self.modes.enabled(Mode::AutoWrap);
        let insert_mode = self.modes.enabled(Mode::Insert);

        if self.buffer().cursor.pending_wrap && auto_wrap {
            {
                let cursor = &mut self.buffer_mut().cursor;
                cursor.pending_wrap = false;
                cursor.col = left;
            }
            if self.buffer().cursor.row >= bottom {
                self.scroll_up_in(1);
            } else {
                self.buffer_mut().cursor.row += 1;
            }
            let row = self.buffer().cursor.row;
            if row > 0 {
                self.buffer_mut().grid.line_mut(row - 1).wrapped = true;
            }
        }

        let row = self.buffer().cursor.row;
        let col = self.buffer().cursor.col;
        let attrs = self.buffer().cursor.attrs;
        let link = self.active_hyperlink.clone();

        if insert_mode {
            self.buffer_mut()
                .grid
                .line_mut(row)
                .insert_cells(col, width, right + 1, attrs);
        }

        if col <= right {
            let line = self.buffer_mut().grid.line_mut(row);
            let cell = line.cell_mut(col);
            cell.set_char(c);
            cell.attrs = attrs;
            cell.set_hyperlink(link);

            if width == 2 && col + 1 <= right {
                line.cell_mut(col + 1).set_continuation();
            }
        }

        // Advance, arming the wrap flag at the right margin.
        let new_col = col + width;
        let buffer = self.buffer_mut();
        if new_col > right {
            buffer.cursor.col = right;
            buffer.cursor.pending_wrap = auto_wrap;
        } else {
            buffer.cursor.col = new_col;
        }
    }

    /// Attach a zero-width mark to the most recently printed cell.
    fn append_combining(&mut self, c: char) {
        let row = self.buffer().cursor.row;
        let col = self.buffer().cursor.col;
        let target = if self.buffer().cursor.pending_wrap {
            Some(col)
        } else {
            col.checked_sub(1)
        };
        if let Some(target) = target {
            self.buffer_mut()
                .grid
                .line_mut(row)
                .cell_mut(target)
                .push_combining(c);
        }
    }

    // }}}

    // {{{ cursor motion

    fn backspace(&mut self) {
        let cursor = &mut self.buffer_mut().cursor;
        if cursor.col > 0 {
            cursor.col -= 1;
        }
        cursor.pending_wrap = false;
    }

    fn tab(&mut self) {
        let col = self.buffer().cursor.col;
        let next = self.buffer().next_tab_stop(col);
        let cursor = &mut self.buffer_mut().cursor;
        cursor.col = next;
        cursor.pending_wrap = false;
    }

    fn cursor_backward_tab(&mut self, n: usize) {
        for _ in 0..n.max(1) {
            let col = self.buffer().cursor.col;
            let prev = self.buffer().prev_tab_stop(col);
            self.buffer_mut().cursor.col = prev;
        }
        self.buffer_mut().cursor.pending_wrap = false;
    }

    fn carriage_return(&mut self) {
        let (left, _) = self.horizontal_region();
        let cursor = &mut self.buffer_mut().cursor;
        cursor.col = if cursor.col >= left { left } else { 0 };
        cursor.pending_wrap = false;
    }

    fn index(&mut self) {
        let (_, bottom) = self.vertical_region();
        if self.buffer().cursor.row >= bottom {
            self.scroll_up_in(1);
        } else {
            self.buffer_mut().cursor.row += 1;
        }
        self.buffer_mut().cursor.pending_wrap = false;
    }

    fn linefeed(&mut self) {
        self.index();
        if self.modes.enabled(Mode::AutomaticNewline) {
            self.carriage_return();
        }
    }

    fn reverse_index(&mut self) {
        let (top, _) = self.vertical_region();
        if self.buffer().cursor.row <= top {
            self.scroll_down_in(1);
        } else {
            self.buffer_mut().cursor.row -= 1;
        }
        self.buffer_mut().cursor.pending_wrap = false;
    }

    fn back_index(&mut self) {
        let (left, _) = self.horizontal_region();
        if self.buffer().cursor.col == left {
            self.insert_columns_at(left, 1);
        } else {
            self.move_cursor_backward(1);
        }
    }

    fn forward_index(&mut self) {
        let (left, right) = self.horizontal_region();
        if self.buffer().cursor.col == right {
            self.delete_columns_at(left, 1);
        } else {
            self.move_cursor_forward(1);
        }
    }

    fn move_cursor_to(&mut self, row: usize, col: usize) {
        let rows = self.size.rows;
        let cols = self.size.cols;
        let (top, bottom) = self.vertical_region();
        let (left, right) = self.horizontal_region();
        let origin = self.modes.enabled(Mode::Origin);

        let row = row.saturating_sub(1);
        let col = col.saturating_sub(1);

        let cursor = &mut self.buffer_mut().cursor;
        if origin {
            cursor.row = (top + row).min(bottom);
            cursor.col = (left + col).min(right);
        } else {
            cursor.row = row.min(rows - 1);
            cursor.col = col.min(cols - 1);
        }
        cursor.pending_wrap = false;
    }

    fn move_cursor_up(&mut self, n: usize) {
        let (top, _) = self.vertical_region();
        let min_row = if self.modes.enabled(Mode::Origin) {
            top
        } else {
            0
        };
        let cursor = &mut self.buffer_mut().cursor;
        cursor.row = cursor.row.saturating_sub(n.max(1)).max(min_row);
        cursor.pending_wrap = false;
    }

    fn move_cursor_down(&mut self, n: usize) {
        let (_, bottom) = self.vertical_region();
        let max_row = if self.modes.enabled(Mode::Origin) {
            bottom
        } else {
            self.size.rows - 1
        };
        let cursor = &mut self.buffer_mut().cursor;
        cursor.row = (cursor.row + n.max(1)).min(max_row);
        cursor.pending_wrap = false;
    }

    fn move_cursor_forward(&mut self, n: usize) {
        let (_, right) = self.horizontal_region();
        let max_col = if self.modes.enabled(Mode::Origin) {
            right
        } else {
            self.size.cols - 1
        };
        let cursor = &mut self.buffer_mut().cursor;
        cursor.col = (cursor.col + n.max(1)).min(max_col);
        cursor.pending_wrap = false;
    }

    fn move_cursor_backward(&mut self, n: usize) {
        let (left, _) = self.horizontal_region();
        let min_col = if self.modes.enabled(Mode::Origin) {
            left
        } else {
            0
        };
        let cursor = &mut self.buffer_mut().cursor;
        cursor.col = cursor.col.saturating_sub(n.max(1)).max(min_col);
        cursor.pending_wrap = false;
    }

    fn set_cursor_col(&mut self, col: usize) {
        let cols = self.size.cols;
        let cursor = &mut self.buffer_mut().cursor;
        cursor.col = col.saturating_sub(1).min(cols - 1);
        cursor.pending_wrap = false;
    }

    fn set_cursor_row(&mut self, row: usize) {
        let rows = self.size.rows;
        let (top, bottom) = self.vertical_region();
        let origin = self.modes.enabled(Mode::Origin);
        let row = row.saturating_sub(1);
        let cursor = &mut self.buffer_mut().cursor;
        if origin {
            cursor.row = (top + row).min(bottom);
        } else {
            cursor.row = row.min(rows - 1);
        }
        cursor.pending_wrap = false;
    }

    fn save_cursor(&mut self) {
        let buffer = self.buffer_mut();
        let saved = SavedCursor::save(&buffer.cursor, &buffer.charsets);
        buffer.saved_cursors.push(saved);
    }

    fn restore_cursor(&mut self) {
        let rows = self.size.rows;
        let cols = self.size.cols;
        let buffer = self.buffer_mut();
        let saved = buffer.saved_cursors.pop().unwrap_or_default();
        saved.restore(&mut buffer.cursor, &mut buffer.charsets);
        buffer.cursor.col = buffer.cursor.col.min(cols - 1);
        buffer.cursor.row = buffer.cursor.row.min(rows - 1);
    }

    // }}}

    // {{{ scrolling

    /// Scroll the region up by n lines. Only an unconstrained main-buffer
    /// scroll feeds scrollback; constrained regions discard their lines.
    fn scroll_up_in(&mut self, n: usize) {
        let n = n.max(1);
        let (top, bottom) = self.vertical_region();
        let (left, right) = self.horizontal_region();
        let attrs = self.buffer().cursor.attrs;
        let full_width = left == 0 && right == self.size.cols - 1;

        if full_width {
            let scrolled = self.buffer_mut().grid.scroll_up(top, bottom, n, attrs);
            let unconstrained = top == 0 && bottom == self.size.rows - 1;
            if self.active == BufferKind::Main && unconstrained {
                let evicted = self.main.scrollback.push_lines(scrolled);
                if evicted > 0 && self.selection.is_some() {
                    // Eviction shifts absolute line numbers under the
                    // selection; drop it rather than let it go stale.
                    self.clear_selection();
                }
                self.scroll_offset = self.scroll_offset.min(self.main.history_len());
            }
        } else {
            self.buffer_mut()
                .grid
                .scroll_up_rect(top, bottom, left, right + 1, n, attrs);
        }
    }

    fn scroll_down_in(&mut self, n: usize) {
        let n = n.max(1);
        let (top, bottom) = self.vertical_region();
        let (left, right) = self.horizontal_region();
        let attrs = self.buffer().cursor.attrs;
        let full_width = left == 0 && right == self.size.cols - 1;

        if full_width {
            self.buffer_mut().grid.scroll_down(top, bottom, n, attrs);
        } else {
            self.buffer_mut()
                .grid
                .scroll_down_rect(top, bottom, left, right + 1, n, attrs);
        }
    }

    // }}}

    // {{{ erase / insert / delete

    fn erase_display(&mut self, mode: u16) {
        let attrs = self.buffer().cursor.attrs;
        let row = self.buffer().cursor.row;
        let col = self.buffer().cursor.col;

        match mode {
            0 => self.buffer_mut().grid.clear_below(row, col, attrs),
            1 => self.buffer_mut().grid.clear_above(row, col, attrs),
            2 => self.buffer_mut().grid.clear(attrs),
            _ => {}
        }
    }

    fn erase_line(&mut self, mode: u16) {
        let attrs = self.buffer().cursor.attrs;
        let row = self.buffer().cursor.row;
        let col = self.buffer().cursor.col;
        let line = self.buffer_mut().grid.line_mut(row);

        match mode {
            0 => line.clear_from(col, attrs),
            1 => line.clear_to(col, attrs),
            2 => line.clear(attrs),
            _ => {}
        }
    }

    fn erase_chars(&mut self, n: usize) {
        let attrs = self.buffer().cursor.attrs;
        let row = self.buffer().cursor.row;
        let col = self.buffer().cursor.col;
        self.buffer_mut()
            .grid
            .line_mut(row)
            .erase_cells(col, n.max(1), attrs);
    }

    fn insert_chars(&mut self, n: usize) {
        let (_, right) = self.horizontal_region();
        let attrs = self.buffer().cursor.attrs;
        let row = self.buffer().cursor.row;
        let col = self.buffer().cursor.col;
        self.buffer_mut()
            .grid
            .line_mut(row)
            .insert_cells(col, n.max(1), right + 1, attrs);
    }

    fn delete_chars(&mut self, n: usize) {
        let (_, right) = self.horizontal_region();
        let attrs = self.buffer().cursor.attrs;
        let row = self.buffer().cursor.row;
        let col = self.buffer().cursor.col;
        self.buffer_mut()
            .grid
            .line_mut(row)
            .delete_cells(col, n.max(1), right + 1, attrs);
    }

    fn insert_lines(&mut self, n: usize) {
        let (top, bottom) = self.vertical_region();
        let (left, right) = self.horizontal_region();
        let row = self.buffer().cursor.row;
        let attrs = self.buffer().cursor.attrs;

        if row < top || row > bottom {
            return;
        }
        if left == 0 && right == self.size.cols - 1 {
            self.buffer_mut()
                .grid
                .insert_lines(row, n.max(1), bottom, attrs);
        } else {
            self.buffer_mut()
                .grid
                .scroll_down_rect(row, bottom, left, right + 1, n.max(1), attrs);
        }
    }

    fn delete_lines(&mut self, n: usize) {
        let (top, bottom) = self.vertical_region();
        let (left, right) = self.horizontal_region();
        let row = self.buffer().cursor.row;
        let attrs = self.buffer().cursor.attrs;

        if row < top || row > bottom {
            return;
        }
        if left == 0 && right == self.size.cols - 1 {
            self.buffer_mut()
                .grid
                .delete_lines(row, n.max(1), bottom, attrs);
        } else {
            self.buffer_mut()
                .grid
                .scroll_up_rect(row, bottom, left, right + 1, n.max(1), attrs);
        }
    }

    fn insert_columns(&mut self, n: usize) {
        let col = self.buffer().cursor.col;
        self.insert_columns_at(col, n.max(1));
    }

    fn delete_columns(&mut self, n: usize) {
        let col = self.buffer().cursor.col;
        self.delete_columns_at(col, n.max(1));
    }

    fn insert_columns_at(&mut self, col: usize, n: usize) {
        let (top, bottom) = self.vertical_region();
        let (left, right) = self.horizontal_region();
        if col < left || col > right {
            return;
        }
        let attrs = self.buffer().cursor.attrs;
        for row in top..=bottom {
            self.buffer_mut()
                .grid
                .line_mut(row)
                .insert_cells(col, n, right + 1, attrs);
        }
    }

    fn delete_columns_at(&mut self, col: usize, n: usize) {
        let (top, bottom) = self.vertical_region();
        let (left, right) = self.horizontal_region();
        if col < left || col > right {
            return;
        }
        let attrs = self.buffer().cursor.attrs;
        for row in top..=bottom {
            self.buffer_mut()
                .grid
                .line_mut(row)
                .delete_cells(col, n, right + 1, attrs);
        }
    }

    fn clear_tab_stops(&mut self, which: TabClear) {
        match which {
            TabClear::UnderCursor => {
                let col = self.buffer().cursor.col;
                self.buffer_mut().clear_tab_stop(col);
            }
            TabClear::AllTabs => self.buffer_mut().clear_all_tab_stops(),
        }
    }

    fn screen_alignment_pattern(&mut self) {
        let attrs = self.buffer().cursor.attrs;
        let buffer = self.buffer_mut();
        buffer.margin = Margin::default();
        for line in buffer.grid.iter_mut() {
            for cell in line.iter_mut() {
                cell.set_char('E');
                cell.attrs = attrs;
            }
        }
        buffer.cursor.row = 0;
        buffer.cursor.col = 0;
        buffer.cursor.pending_wrap = false;
    }

    // }}}

    // {{{ margins, modes, charsets

    fn set_top_bottom_margin(&mut self, top: Option<usize>, bottom: Option<usize>) {
        let rows = self.size.rows;
        let bottom_value = bottom.map(|b| b.min(rows)).unwrap_or(rows);
        let top_value = top.unwrap_or(1);

        if top_value < bottom_value {
            let buffer = self.buffer_mut();
            buffer.margin.top = top;
            buffer.margin.bottom = bottom.map(|b| b.min(rows));
            self.move_cursor_to(1, 1);
        }
    }

    fn set_left_right_margin(&mut self, left: Option<usize>, right: Option<usize>) {
        if !self.modes.enabled(Mode::LeftRightMargin) {
            return;
        }
        let cols = self.size.cols;
        let right_value = right.map(|r| r.min(cols)).unwrap_or(cols);
        let left_value = left.unwrap_or(1);

        if left_value < right_value {
            let buffer = self.buffer_mut();
            buffer.margin.left = left;
            buffer.margin.right = right.map(|r| r.min(cols));
            self.move_cursor_to(1, 1);
        }
    }

    /// Apply a mode switch, with side effects where the mode has them.
    pub fn set_mode(&mut self, mode: Mode, enable: bool) {
        self.modes.set(mode, enable);

        match mode {
            Mode::BatchedRendering => {
                if enable {
                    self.synchronized = true;
                } else {
                    self.synchronized = false;
                    self.flush_queued();
                }
            }
            Mode::UseAlternateScreen => {
                self.set_buffer(if enable {
                    BufferKind::Alternate
                } else {
                    BufferKind::Main
                });
            }
            Mode::Origin => self.move_cursor_to(1, 1),
            Mode::LeftRightMargin => {
                if !enable {
                    let buffer = self.buffer_mut();
                    buffer.margin.left = None;
                    buffer.margin.right = None;
                }
            }
            Mode::UseApplicationCursorKeys => {
                self.listener.use_application_cursor_keys(enable);
            }
            Mode::BracketedPaste => self.listener.set_bracketed_paste(enable),
            Mode::FocusTracking => self.listener.set_generate_focus_events(enable),
            Mode::VisibleCursor => self.buffer_mut().cursor.visible = enable,
            Mode::BlinkingCursor => {
                self.buffer_mut().cursor.display = if enable {
                    CursorDisplay::Blink
                } else {
                    CursorDisplay::Steady
                };
            }
            _ => {}
        }
    }

    fn request_mode(&mut self, mode: Mode) {
        // 1 = set, 2 = reset, per DECRPM
        let value = if self.modes.enabled(mode) { 1 } else { 2 };
        let reply = if mode.is_ansi() {
            format!("\x1b[{};{}$y", mode.code(), value)
        } else {
            format!("\x1b[?{};{}$y", mode.code(), value)
        };
        self.listener.reply(&reply);
    }

    fn request_status_string(&mut self, value: StatusString) {
        let reply = match value {
            StatusString::GraphicsRendition => "\x1bP1$r0m\x1b\\".to_string(),
            StatusString::TopBottomMargin => {
                let (top, bottom) = self.vertical_region();
                format!("\x1bP1$r{};{}r\x1b\\", top + 1, bottom + 1)
            }
            StatusString::LeftRightMargin => {
                let (left, right) = self.horizontal_region();
                format!("\x1bP1$r{};{}s\x1b\\", left + 1, right + 1)
            }
            StatusString::CursorStyle => {
                let cursor = self.cursor();
                let ps = match (cursor.display, cursor.shape) {
                    (CursorDisplay::Blink, CursorShape::Block) => 1,
                    (CursorDisplay::Steady, CursorShape::Block) => 2,
                    (CursorDisplay::Blink, CursorShape::Underscore) => 3,
                    (CursorDisplay::Steady, CursorShape::Underscore) => 4,
                    (CursorDisplay::Blink, CursorShape::Bar) => 5,
                    (CursorDisplay::Steady, CursorShape::Bar) => 6,
                };
                format!("\x1bP1$r{} q\x1b\\", ps)
            }
        };
        self.listener.reply(&reply);
    }

    fn set_buffer(&mut self, kind: BufferKind) {
        if self.active == kind {
            return;
        }
        self.active = kind;
        if kind == BufferKind::Alternate {
            // Full-screen apps expect a clean canvas; the main buffer's
            // content and cursor survive untouched for the switch back.
            self.alternate.grid.clear(Default::default());
            self.alternate.cursor.reset();
            self.alternate.margin = Margin::default();
        }
        self.listener.buffer_changed(kind);
    }

    fn designate_charset(&mut self, table: CharsetTable, charset: CharsetId) {
        self.buffer_mut().charsets.designate(table, charset);
    }

    fn apply_rendition(&mut self, rendition: GraphicsRendition) {
        use crate::cell::UnderlineStyle;
        use GraphicsRendition::*;

        let attrs = &mut self.buffer_mut().cursor.attrs;
        match rendition {
            Reset => attrs.reset(),
            Bold => attrs.bold = true,
            Faint => attrs.faint = true,
            Italic => attrs.italic = true,
            Underline => attrs.underline = UnderlineStyle::Single,
            Blinking => attrs.blink = true,
            Inverse => attrs.inverse = true,
            Hidden => attrs.hidden = true,
            CrossedOut => attrs.crossed_out = true,
            DoublyUnderlined => attrs.underline = UnderlineStyle::Double,
            CurlyUnderlined => attrs.underline = UnderlineStyle::Curly,
            DottedUnderline => attrs.underline = UnderlineStyle::Dotted,
            DashedUnderline => attrs.underline = UnderlineStyle::Dashed,
            Normal => {
                attrs.bold = false;
                attrs.faint = false;
            }
            NoItalic => attrs.italic = false,
            NoUnderline => attrs.underline = UnderlineStyle::None,
            NoBlinking => attrs.blink = false,
            NoInverse => attrs.inverse = false,
            NoHidden => attrs.hidden = false,
            NoCrossedOut => attrs.crossed_out = false,
            Framed => attrs.framed = true,
            Overline => attrs.overline = true,
            NoFramed => attrs.framed = false,
            NoOverline => attrs.overline = false,
        }
    }

    fn set_hyperlink(&mut self, id: &str, uri: &str) {
        if uri.is_empty() {
            self.active_hyperlink = None;
            self.hyperlinks.purge();
        } else {
            self.active_hyperlink = Some(self.hyperlinks.register(id, uri));
            self.listener.hyperlink(id, uri);
        }
    }

    // }}}

    // {{{ resets

    /// RIS: back to power-up state, keeping size and listener
    pub fn reset_hard(&mut self) {
        let max_history = self.main.scrollback.max_lines();
        self.main = ScreenBuffer::new(BufferKind::Main, self.size, max_history);
        self.alternate = ScreenBuffer::new(BufferKind::Alternate, self.size, max_history);
        self.active = BufferKind::Main;
        self.modes.reset();
        self.queued.clear();
        self.synchronized = false;
        self.selection = None;
        self.active_hyperlink = None;
        self.scroll_offset = 0;
        self.window_title.clear();
        self.saved_titles.clear();
    }

    /// DECSTR: restore the soft-reset subset of defaults
    pub fn reset_soft(&mut self) {
        self.modes.set(Mode::Origin, false);
        self.modes.set(Mode::Insert, false);
        self.modes.set(Mode::VisibleCursor, true);
        let buffer = self.buffer_mut();
        buffer.margin = Margin::default();
        buffer.cursor.attrs = Default::default();
        buffer.cursor.visible = true;
        buffer.cursor.pending_wrap = false;
        buffer.charsets.reset();
        buffer.saved_cursors.clear();
    }

    /// Resize both buffers in place, dropping any selection
    pub fn resize(&mut self, size: Dimensions) {
        if size.rows == 0 || size.cols == 0 {
            return;
        }
        self.size = size;
        self.main.resize(size);
        self.alternate.resize(size);
        self.selection = None;
        self.scroll_offset = 0;
    }

    // }}}

    // {{{ viewport

    /// Scroll the viewport up into history. Returns true if it moved.
    pub fn scroll_viewport_up(&mut self, n: usize) -> bool {
        let new_offset = (self.scroll_offset + n).min(self.history_len());
        let moved = new_offset != self.scroll_offset;
        self.scroll_offset = new_offset;
        moved
    }

    /// Scroll the viewport toward the live screen. Returns true if it moved.
    pub fn scroll_viewport_down(&mut self, n: usize) -> bool {
        let new_offset = self.scroll_offset.saturating_sub(n);
        let moved = new_offset != self.scroll_offset;
        self.scroll_offset = new_offset;
        moved
    }

    pub fn scroll_to_top(&mut self) -> bool {
        self.scroll_viewport_up(self.history_len())
    }

    pub fn scroll_to_bottom(&mut self) -> bool {
        let moved = self.scroll_offset != 0;
        self.scroll_offset = 0;
        moved
    }

    /// Jump the viewport to the nearest mark above the current top line
    pub fn scroll_mark_up(&mut self) -> bool {
        let top_absolute = self.main.history_len() + 1 - self.scroll_offset.min(self.main.history_len());
        match self.find_marker_backward(top_absolute) {
            Some(row) => {
                self.scroll_offset = self.main.history_len() + 1 - row;
                true
            }
            None => false,
        }
    }

    /// Jump the viewport to the nearest mark below the current top line
    pub fn scroll_mark_down(&mut self) -> bool {
        let top_absolute = self.main.history_len() + 1 - self.scroll_offset.min(self.main.history_len());
        match self.find_marker_forward(top_absolute) {
            Some(row) if row <= self.main.history_len() => {
                self.scroll_offset = self.main.history_len() + 1 - row;
                true
            }
            Some(_) => self.scroll_to_bottom(),
            None => false,
        }
    }

    /// Nearest marked absolute line strictly before `from`
    pub fn find_marker_backward(&self, from: usize) -> Option<usize> {
        let buffer = &self.main;
        (1..from.min(buffer.total_rows() + 1))
            .rev()
            .find(|&row| buffer.absolute_line(row).map(|l| l.marked).unwrap_or(false))
    }

    /// Nearest marked absolute line strictly after `from`
    pub fn find_marker_forward(&self, from: usize) -> Option<usize> {
        let buffer = &self.main;
        (from + 1..=buffer.total_rows())
            .find(|&row| buffer.absolute_line(row).map(|l| l.marked).unwrap_or(false))
    }

    // }}}

    // {{{ rendering

    /// Pass every visible cell to the callback in row-major order. With a
    /// non-zero scroll offset the top of the frame comes from history;
    /// history lines narrower than the current width render as blank on
    /// the right. Does not mutate state.
    pub fn render<F>(&self, mut callback: F, scroll_offset: usize)
    where
        F: FnMut(Coordinate, &Cell),
    {
        let blank = Cell::new();
        let buffer = self.buffer();
        let offset = scroll_offset.min(buffer.history_len());
        let history_rows = offset.min(self.size.rows);
        let live_rows = self.size.rows - history_rows;

        let mut screen_row = 1;
        let history_start = buffer.history_len() - offset;
        for index in history_start..history_start + history_rows {
            let line = buffer.scrollback.get(index);
            for col in 1..=self.size.cols {
                let cell = line.and_then(|l| l.get(col - 1)).unwrap_or(&blank);
                callback(Coordinate::new(screen_row, col), cell);
            }
            screen_row += 1;
        }

        for row in 0..live_rows {
            let line = buffer.grid.get_line(row);
            for col in 1..=self.size.cols {
                let cell = line.and_then(|l| l.get(col - 1)).unwrap_or(&blank);
                callback(Coordinate::new(screen_row, col), cell);
            }
            screen_row += 1;
        }
    }

    /// Visible buffer as plain text lines joined by newlines
    pub fn render_text(&self) -> String {
        let buffer = self.buffer();
        let mut out = String::new();
        for row in 0..self.size.rows {
            out.push_str(&buffer.grid.line(row).text());
            out.push('\n');
        }
        out
    }

    /// A single visible row as plain text (1-based)
    pub fn render_text_line(&self, row: usize) -> String {
        self.buffer()
            .grid
            .get_line(row.saturating_sub(1))
            .map(|line| line.text())
            .unwrap_or_default()
    }

    /// Serialize the visible buffer into escape sequences that reproduce
    /// its appearance when replayed through a conforming terminal. The
    /// output is self-contained: it clears the screen and homes the
    /// cursor first. Only the active buffer is captured.
    pub fn screenshot(&self) -> String {
        let buffer = self.buffer();
        let mut generator = OutputGenerator::new();

        generator.write_command(&Command::ClearScreen);
        generator.write_command(&Command::MoveCursorTo { row: 1, col: 1 });

        for row in 0..self.size.rows {
            let line = buffer.grid.line(row);
            for col in 0..self.size.cols {
                let cell = line.cell(col);
                if cell.is_continuation() {
                    continue;
                }

                generator.write_command(&Command::SetGraphicsRendition(if cell.attrs.bold {
                    GraphicsRendition::Bold
                } else {
                    GraphicsRendition::Normal
                }));
                generator.write_command(&Command::SetForegroundColor(cell.attrs.fg));
                generator.write_command(&Command::SetBackgroundColor(cell.attrs.bg));

                if cell.content().is_empty() {
                    generator.write_command(&Command::AppendChar(' '));
                } else {
                    for c in cell.content().chars() {
                        generator.write_command(&Command::AppendChar(c));
                    }
                }
            }
            generator.write_command(&Command::SetGraphicsRendition(GraphicsRendition::Reset));
            // The final row keeps the cursor in place so replaying never
            // scrolls the reproduced frame.
            if row + 1 < self.size.rows {
                generator.write_command(&Command::MoveCursorToBeginOfLine);
                generator.write_command(&Command::Linefeed);
            }
        }

        generator.take()
    }

    // }}}

    // {{{ selection

    /// Begin a new selection at an absolute 1-based coordinate, replacing
    /// any previous one.
    pub fn start_selection(&mut self, mode: SelectionMode, at: Coordinate) {
        let buffer = self.buffer();
        let total_rows = buffer.total_rows();
        let selector = Selector::new(
            mode,
            &self.word_delimiters,
            total_rows,
            self.size.cols,
            at,
            buffer,
        );
        self.selection = Some(selector);
    }

    /// Extend the active selection. Returns false if there is none or it
    /// is already complete.
    pub fn extend_selection(&mut self, to: Coordinate) -> bool {
        let Some(mut selector) = self.selection.take() else {
            return false;
        };
        let extended = selector.extend(to, self.buffer());
        self.selection = Some(selector);
        extended
    }

    /// Finalize the active selection; it becomes read-only.
    pub fn finish_selection(&mut self) {
        if let Some(selector) = self.selection.as_mut() {
            selector.finish();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection_available(&self) -> bool {
        self.selection
            .as_ref()
            .map(|s| s.state() != SelectorState::Waiting)
            .unwrap_or(false)
    }

    pub fn selection_state(&self) -> Option<SelectorState> {
        self.selection.as_ref().map(|s| s.state())
    }

    /// Resolved per-line ranges of the active selection
    pub fn selection_ranges(&self) -> Vec<SelectionRange> {
        self.selection
            .as_ref()
            .map(|s| s.selection())
            .unwrap_or_default()
    }

    /// Walk every selected cell in row-major order
    pub fn render_selection<F>(&self, mut callback: F)
    where
        F: FnMut(Coordinate, &Cell),
    {
        let buffer = self.buffer();
        for range in self.selection_ranges() {
            if let Some(line) = buffer.absolute_line(range.line) {
                for col in range.from_col..=range.to_col {
                    if let Some(cell) = line.get(col - 1) {
                        callback(Coordinate::new(range.line, col), cell);
                    }
                }
            }
        }
    }

    /// Text covered by the active selection, lines joined by newlines
    pub fn selected_text(&self) -> String {
        let buffer = self.buffer();
        let mut lines = Vec::new();
        for range in self.selection_ranges() {
            let mut text = String::new();
            if let Some(line) = buffer.absolute_line(range.line) {
                for col in range.from_col..=range.to_col {
                    match line.get(col - 1) {
                        Some(cell) if cell.is_continuation() => {}
                        Some(cell) if cell.content().is_empty() => text.push(' '),
                        Some(cell) => text.push_str(cell.content()),
                        None => {}
                    }
                }
            }
            lines.push(text.trim_end().to_string());
        }
        lines.join("\n")
    }

    // }}}
}

fn pkg_version() -> u32 {
    let major: u32 = env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0);
    let minor: u32 = env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0);
    let patch: u32 = env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0);
    (major * 100 + minor) * 100 + patch
}
