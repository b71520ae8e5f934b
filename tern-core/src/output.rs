//! Escape sequence serialization - the inverse of the parser
//!
//! Turns `Command` values back into exact escape-sequence bytes, used for
//! screenshotting and programmatic output. Consecutive graphics renditions
//! are batched into one SGR sequence: codes accumulate and are flushed
//! when a reset (code 0) arrives, when 16 codes have accumulated, or when
//! any non-SGR command is emitted.

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::charset::{CharsetId, CharsetTable};
use crate::color::Color;
use crate::command::{
    Command, CursorDisplay, CursorShape, GraphicsRendition, StatusString, TabClear,
};

/// One accumulated SGR parameter: code plus optional colon sub-parameter
type SgrCode = (u16, Option<u16>);

/// Maximum accumulated SGR codes before a forced flush
const SGR_BATCH_LIMIT: usize = 16;

/// Serializes commands into escape-sequence bytes
#[derive(Debug, Default)]
pub struct OutputGenerator {
    out: String,
    sgr: Vec<SgrCode>,
    application_cursor_keys: bool,
    underline_color: Option<Color>,
}

impl OutputGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether arrow keys use the CSI encoding (vs. SS3)
    pub fn normal_cursor_keys(&self) -> bool {
        !self.application_cursor_keys
    }

    pub fn set_application_cursor_keys(&mut self, enable: bool) {
        self.application_cursor_keys = enable;
    }

    /// Serialize one command
    pub fn write_command(&mut self, command: &Command) {
        use Command::*;

        // Graphics renditions accumulate; everything else flushes first.
        match command {
            SetGraphicsRendition(_) | SetForegroundColor(_) | SetBackgroundColor(_)
            | SetUnderlineColor(_) => {}
            _ => self.flush(),
        }

        match command {
            Bell => self.out.push('\x07'),
            Linefeed => self.out.push('\n'),
            Backspace => self.out.push('\x08'),
            FullReset => self.out.push_str("\x1bc"),
            DeviceStatusReport => self.out.push_str("\x1b[5n"),
            ReportCursorPosition => self.out.push_str("\x1b[6n"),
            ReportExtendedCursorPosition => self.out.push_str("\x1b[?6n"),
            SendDeviceAttributes => self.out.push_str("\x1b[c"),
            SendTerminalId => self.out.push_str("\x1b[>c"),
            ClearToEndOfScreen => self.out.push_str("\x1b[0J"),
            ClearToBeginOfScreen => self.out.push_str("\x1b[1J"),
            ClearScreen => self.out.push_str("\x1b[2J"),
            ClearScrollbackBuffer => self.out.push_str("\x1b[3J"),
            EraseCharacters(n) => self.csi_n(*n, 'X'),
            ScrollUp(n) => self.csi_n(*n, 'S'),
            ScrollDown(n) => self.csi_n(*n, 'T'),
            CopyToClipboard(data) => {
                let _ = write!(self.out, "\x1b]52;c;{}\x1b\\", BASE64.encode(data));
            }
            ClearToEndOfLine => self.out.push_str("\x1b[K"),
            ClearToBeginOfLine => self.out.push_str("\x1b[1K"),
            ClearLine => self.out.push_str("\x1b[2K"),
            CursorNextLine(n) => self.csi_n(*n, 'E'),
            CursorPreviousLine(n) => self.csi_n(*n, 'F'),
            InsertCharacters(n) => self.csi_n(*n, '@'),
            InsertColumns(n) => {
                let _ = write!(self.out, "\x1b[{}'}}", n);
            }
            InsertLines(n) => self.csi_n(*n, 'L'),
            DeleteLines(n) => self.csi_n(*n, 'M'),
            DeleteCharacters(n) => self.csi_n(*n, 'P'),
            DeleteColumns(n) => {
                let _ = write!(self.out, "\x1b[{}'~", n);
            }
            HorizontalPositionAbsolute(n) => self.csi_n(*n, '`'),
            HorizontalPositionRelative(n) => self.csi_n(*n, 'a'),
            HorizontalTabClear(which) => match which {
                TabClear::UnderCursor => self.out.push_str("\x1b[g"),
                TabClear::AllTabs => self.out.push_str("\x1b[3g"),
            },
            HorizontalTabSet => self.out.push_str("\x1bH"),
            Hyperlink { id, uri } => {
                if id.is_empty() {
                    let _ = write!(self.out, "\x1b]8;;{}\x1b\\", uri);
                } else {
                    let _ = write!(self.out, "\x1b]8;id={};{}\x1b\\", id, uri);
                }
            }
            MoveCursorUp(n) => self.cursor_key(*n, 'A'),
            MoveCursorDown(n) => self.cursor_key(*n, 'B'),
            MoveCursorForward(n) => self.csi_n(*n, 'C'),
            MoveCursorBackward(n) => self.csi_n(*n, 'D'),
            MoveCursorToColumn(col) => self.csi_n(*col, 'G'),
            MoveCursorToBeginOfLine => self.out.push('\r'),
            MoveCursorTo { row, col } => {
                let _ = write!(self.out, "\x1b[{}H", pair_or_none(1, *row, *col));
            }
            MoveCursorToLine(row) => self.csi_n(*row, 'd'),
            MoveCursorToNextTab => self.out.push('\t'),
            Notify { title, body } => {
                let _ = write!(self.out, "\x1b]777;notify;{};{}\x1b\\", title, body);
            }
            CursorBackwardTab(n) => self.csi_n(*n, 'Z'),
            SaveCursor => self.out.push_str("\x1b7"),
            RestoreCursor => self.out.push_str("\x1b8"),
            RequestDynamicColor(name) => {
                let _ = write!(self.out, "\x1b]{};?\x07", name.set_code());
            }
            RequestTabStops => self.out.push_str("\x1b[2$w"),
            SetDynamicColor { name, color } => {
                let _ = write!(
                    self.out,
                    "\x1b]{};rgb:{:04x}/{:04x}/{:04x}\x07",
                    name.set_code(),
                    color.r as u16 * 0x101,
                    color.g as u16 * 0x101,
                    color.b as u16 * 0x101
                );
            }
            ResetDynamicColor(name) => {
                let _ = write!(self.out, "\x1b]{}\x07", name.reset_code());
            }
            DumpState => self.out.push_str("\x1b]888\x07"),
            RequestStatusString(value) => {
                let tail = match value {
                    StatusString::GraphicsRendition => "m",
                    StatusString::TopBottomMargin => "r",
                    StatusString::LeftRightMargin => "s",
                    StatusString::CursorStyle => " q",
                };
                let _ = write!(self.out, "\x1bP$q{}\x1b\\", tail);
            }
            SetForegroundColor(color) => self.sgr_color(*color, 30, 38, 90),
            SetBackgroundColor(color) => self.sgr_color(*color, 40, 48, 100),
            SetUnderlineColor(color) => {
                if self.underline_color != Some(*color) {
                    self.underline_color = Some(*color);
                    match color {
                        Color::Indexed(n) => self.sgr_extend(&[58, 5, *n as u16]),
                        Color::Rgb(rgb) => self.sgr_extend(&[
                            58,
                            2,
                            rgb.r as u16,
                            rgb.g as u16,
                            rgb.b as u16,
                        ]),
                        Color::Default | Color::Bright(_) => {}
                    }
                }
            }
            SetCursorStyle { display, shape } => {
                let ps = match (display, shape) {
                    (CursorDisplay::Blink, CursorShape::Block) => 1,
                    (CursorDisplay::Steady, CursorShape::Block) => 2,
                    (CursorDisplay::Blink, CursorShape::Underscore) => 3,
                    (CursorDisplay::Steady, CursorShape::Underscore) => 4,
                    (CursorDisplay::Blink, CursorShape::Bar) => 5,
                    (CursorDisplay::Steady, CursorShape::Bar) => 6,
                };
                let _ = write!(self.out, "\x1b[{} q", ps);
            }
            SetMark => self.out.push_str("\x1b[>M"),
            SetMode { mode, enable } => {
                let hl = if *enable { 'h' } else { 'l' };
                if mode.is_ansi() {
                    let _ = write!(self.out, "\x1b[{}{}", mode.code(), hl);
                } else {
                    let _ = write!(self.out, "\x1b[?{}{}", mode.code(), hl);
                }
            }
            RequestMode(mode) => {
                if mode.is_ansi() {
                    let _ = write!(self.out, "\x1b[{}$p", mode.code());
                } else {
                    let _ = write!(self.out, "\x1b[?{}$p", mode.code());
                }
            }
            SetTopBottomMargin { top, bottom } => match (top, bottom) {
                (None, None) => self.out.push_str("\x1b[r"),
                (Some(t), None) => {
                    let _ = write!(self.out, "\x1b[{}r", t);
                }
                (None, Some(b)) => {
                    let _ = write!(self.out, "\x1b[;{}r", b);
                }
                (Some(t), Some(b)) => {
                    let _ = write!(self.out, "\x1b[{};{}r", t, b);
                }
            },
            SetLeftRightMargin { left, right } => match (left, right) {
                (None, None) => self.out.push_str("\x1b[s"),
                (Some(l), None) => {
                    let _ = write!(self.out, "\x1b[{}s", l);
                }
                (None, Some(r)) => {
                    let _ = write!(self.out, "\x1b[;{}s", r);
                }
                (Some(l), Some(r)) => {
                    let _ = write!(self.out, "\x1b[{};{}s", l, r);
                }
            },
            ScreenAlignmentPattern => self.out.push_str("\x1b#8"),
            SendMouseEvents { protocol, enable } => {
                let hl = if *enable { 'h' } else { 'l' };
                let _ = write!(self.out, "\x1b[?{}{}", protocol.code(), hl);
            }
            ApplicationKeypadMode(enable) => {
                self.out.push_str(if *enable { "\x1b=" } else { "\x1b>" });
            }
            Index => self.out.push_str("\x1bD"),
            ReverseIndex => self.out.push_str("\x1bM"),
            ForwardIndex => self.out.push_str("\x1b9"),
            BackIndex => self.out.push_str("\x1b6"),
            SetGraphicsRendition(rendition) => {
                let (code, sub) = rendition.code();
                self.sgr_push((code, sub));
                if *rendition == GraphicsRendition::Reset {
                    self.underline_color = None;
                }
            }
            DesignateCharset { table, charset } => {
                let g = match table {
                    CharsetTable::G0 => '(',
                    CharsetTable::G1 => ')',
                    CharsetTable::G2 => '*',
                    CharsetTable::G3 => '+',
                };
                let _ = write!(self.out, "\x1b{}{}", g, charset_final(*charset));
            }
            SingleShiftSelect(table) => match table {
                CharsetTable::G2 => self.out.push_str("\x1bN"),
                CharsetTable::G3 => self.out.push_str("\x1bO"),
                _ => {}
            },
            AppendChar(c) => self.out.push(*c),
            ChangeIconTitle(title) => {
                let _ = write!(self.out, "\x1b]1;{}\x1b\\", title);
            }
            ChangeWindowTitle(title) => {
                let _ = write!(self.out, "\x1b]2;{}\x1b\\", title);
            }
            SoftTerminalReset => self.out.push_str("\x1b[!p"),
            ResizeWindow {
                width,
                height,
                unit,
            } => {
                let op = match unit {
                    crate::command::ResizeUnit::Pixels => 4,
                    crate::command::ResizeUnit::Characters => 8,
                };
                let _ = write!(self.out, "\x1b[{};{};{}t", op, height, width);
            }
            SaveWindowTitle => self.out.push_str("\x1b[22;0;0t"),
            RestoreWindowTitle => self.out.push_str("\x1b[23;0;0t"),
        }
    }

    /// Serialize a batch of commands
    pub fn write_commands<'a>(&mut self, commands: impl IntoIterator<Item = &'a Command>) {
        for command in commands {
            self.write_command(command);
        }
    }

    /// Append a plain SGR code to the accumulator
    fn sgr_add(&mut self, code: u16) {
        self.sgr_push((code, None));
    }

    /// Append a color parameter group atomically. Channel values must not
    /// go through the rendition-code path: a zero channel is not a reset
    /// and repeated channels must not be deduplicated. The group is never
    /// split across a batch flush.
    fn sgr_extend(&mut self, codes: &[u16]) {
        if self.sgr.len() + codes.len() > SGR_BATCH_LIMIT {
            self.flush();
        }
        self.sgr.extend(codes.iter().map(|&c| (c, None)));
        if self.sgr.len() >= SGR_BATCH_LIMIT {
            self.flush();
        }
    }

    fn sgr_push(&mut self, code: SgrCode) {
        if code.0 == 0 && code.1.is_none() {
            // A reset is a batch boundary: pending codes go out as their
            // own sequence, the reset starts the next one.
            self.flush();
            self.sgr.push(code);
        } else {
            if self.sgr.last() != Some(&code) {
                self.sgr.push(code);
            }
            if self.sgr.len() == SGR_BATCH_LIMIT {
                let batch = render_sgr(&self.sgr);
                self.sgr.clear();
                self.out.push_str(&batch);
            }
        }
    }

    /// Emit any pending SGR batch
    pub fn flush(&mut self) {
        if !self.sgr.is_empty() {
            let batch = render_sgr(&self.sgr);
            self.sgr.clear();
            self.out.push_str(&batch);
        }
    }

    /// Flush and drain the serialized bytes accumulated so far
    pub fn take(&mut self) -> String {
        self.flush();
        std::mem::take(&mut self.out)
    }

    fn csi_n(&mut self, n: usize, final_byte: char) {
        let _ = write!(self.out, "\x1b[{}{}", n, final_byte);
    }

    fn cursor_key(&mut self, n: usize, final_byte: char) {
        if self.normal_cursor_keys() {
            self.csi_n(n, final_byte);
        } else {
            for _ in 0..n {
                let _ = write!(self.out, "\x1bO{}", final_byte);
            }
        }
    }

    fn sgr_color(&mut self, color: Color, compact: u16, extended: u16, bright: u16) {
        match color {
            Color::Indexed(n) if n < 8 => self.sgr_add(compact + n as u16),
            Color::Indexed(n) => self.sgr_extend(&[extended, 5, n as u16]),
            Color::Default => self.sgr_add(compact + 9),
            Color::Bright(n) => self.sgr_add(bright + n.min(7) as u16),
            Color::Rgb(rgb) => {
                self.sgr_extend(&[extended, 2, rgb.r as u16, rgb.g as u16, rgb.b as u16])
            }
        }
    }
}

impl Drop for OutputGenerator {
    fn drop(&mut self) {
        self.flush();
    }
}

fn render_sgr(codes: &[SgrCode]) -> String {
    // A lone reset serializes as the empty-parameter form.
    if codes == [(0, None)] {
        return "\x1b[m".to_string();
    }
    let params = codes
        .iter()
        .map(|(code, sub)| match sub {
            Some(sub) => format!("{}:{}", code, sub),
            None => format!("{}", code),
        })
        .collect::<Vec<_>>()
        .join(";");
    format!("\x1b[{}m", params)
}

/// Omit parameters equal to the default, as CUP permits
fn pair_or_none(default: usize, a: usize, b: usize) -> String {
    if a == default && b == default {
        String::new()
    } else if a == default {
        format!(";{}", b)
    } else if b == default {
        format!("{};", a)
    } else {
        format!("{};{}", a, b)
    }
}

/// SCS final byte for a charset id
fn charset_final(charset: CharsetId) -> char {
    match charset {
        CharsetId::Special => '0',
        CharsetId::British => 'A',
        CharsetId::UsAscii => 'B',
        CharsetId::German => 'K',
        CharsetId::Dutch => '4',
        CharsetId::Finnish => 'C',
        CharsetId::French => 'R',
        CharsetId::FrenchCanadian => 'Q',
        CharsetId::NorwegianDanish => 'E',
        CharsetId::Spanish => 'Z',
        CharsetId::Swedish => 'H',
        CharsetId::Swiss => '=',
    }
}
