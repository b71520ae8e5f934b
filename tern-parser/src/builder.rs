//! Command assembly
//!
//! The builder sits between the lexer and the screen: it receives parse
//! events, accumulates them into a [`Sequence`], resolves the finished
//! sequence against the function table, and emits typed [`Command`]s.
//! Malformed or unrecognized input is logged and dropped; nothing here is
//! fatal.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use tern_core::{
    parse_color, CharsetId, CharsetTable, Color, Command, CursorDisplay, CursorShape,
    DynamicColorName, GraphicsRendition, Mode, MouseProtocol, ResizeUnit, StatusString, TabClear,
};

use crate::functions::{select, FunctionDefinition, FunctionId};
use crate::parser::Perform;
use crate::sequence::{FunctionCategory, Sequence};

/// Outcome of applying a resolved function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    Ok,
    /// Recognized function, malformed parameters
    Invalid,
    /// Recognized function, not implemented
    Unsupported,
}

/// Assembles parse events into commands
#[derive(Debug, Default)]
pub struct CommandBuilder {
    sequence: Sequence,
    commands: Vec<Command>,
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands emitted so far; the caller drains between writes
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }

    fn emit_sequence(&mut self) {
        let sequence = std::mem::take(&mut self.sequence);
        match select(&sequence.selector()) {
            Some(definition) => match self.apply(definition, &sequence) {
                ApplyResult::Ok => {}
                ApplyResult::Invalid => {
                    log::debug!("invalid control sequence: {}", sequence);
                }
                ApplyResult::Unsupported => {
                    log::debug!("unsupported control sequence: {}", sequence);
                }
            },
            None => log::debug!("unknown control sequence: {}", sequence),
        }
    }

    fn execute_control(&mut self, byte: u8) {
        match byte {
            0x07 => self.emit(Command::Bell),
            0x08 => self.emit(Command::Backspace),
            0x09 => self.emit(Command::MoveCursorToNextTab),
            0x0A => self.emit(Command::Linefeed),
            // VT and FF behave as index, following xterm
            0x0B | 0x0C => self.emit(Command::Index),
            0x0D => self.emit(Command::MoveCursorToBeginOfLine),
            _ => log::debug!("unsupported control character {:#04x}", byte),
        }
    }

    /// ESC intermediates `(`, `)`, `*`, `+` designate charsets; everything
    /// else goes through the function table.
    fn dispatch_esc(&mut self, final_byte: u8) {
        let charset_table = match self.sequence.intermediates() {
            [b'('] => Some(CharsetTable::G0),
            [b')'] => Some(CharsetTable::G1),
            [b'*'] => Some(CharsetTable::G2),
            [b'+'] => Some(CharsetTable::G3),
            _ => None,
        };

        if let Some(table) = charset_table {
            match charset_from_final(final_byte) {
                Some(charset) => self.emit(Command::DesignateCharset { table, charset }),
                None => log::debug!(
                    "unsupported charset designation: ESC {} {}",
                    self.sequence.intermediates()[0] as char,
                    final_byte as char
                ),
            }
            self.sequence.clear();
            return;
        }

        self.sequence.set_category(FunctionCategory::Esc);
        self.sequence.set_final_byte(final_byte);
        self.emit_sequence();
    }

    fn apply(&mut self, definition: &FunctionDefinition, seq: &Sequence) -> ApplyResult {
        let count = seq.parameter_count();
        if count < definition.min_params || count > definition.max_params {
            return ApplyResult::Invalid;
        }

        use FunctionId::*;
        match definition.id {
            // ESC
            Decaln => self.ok(Command::ScreenAlignmentPattern),
            Decbi => self.ok(Command::BackIndex),
            Decfi => self.ok(Command::ForwardIndex),
            Deckpam => self.ok(Command::ApplicationKeypadMode(true)),
            Deckpnm => self.ok(Command::ApplicationKeypadMode(false)),
            Decrs => self.ok(Command::RestoreCursor),
            Decsc => self.ok(Command::SaveCursor),
            Hts => self.ok(Command::HorizontalTabSet),
            Ind => self.ok(Command::Index),
            Nel => self.ok(Command::CursorNextLine(1)),
            Ri => self.ok(Command::ReverseIndex),
            Ris => self.ok(Command::FullReset),
            Ss2 => self.ok(Command::SingleShiftSelect(CharsetTable::G2)),
            Ss3 => self.ok(Command::SingleShiftSelect(CharsetTable::G3)),

            // CSI
            Cbt => self.ok(Command::CursorBackwardTab(seq.param_or(0, 1) as usize)),
            Cha => self.ok(Command::MoveCursorToColumn(seq.param_or(0, 1) as usize)),
            Cnl => self.ok(Command::CursorNextLine(seq.param_or(0, 1) as usize)),
            Cpl => self.ok(Command::CursorPreviousLine(seq.param_or(0, 1) as usize)),
            Cub => self.ok(Command::MoveCursorBackward(seq.param_or(0, 1) as usize)),
            Cud => self.ok(Command::MoveCursorDown(seq.param_or(0, 1) as usize)),
            Cuf => self.ok(Command::MoveCursorForward(seq.param_or(0, 1) as usize)),
            Cup | Hvp => self.ok(Command::MoveCursorTo {
                row: seq.param_or(0, 1) as usize,
                col: seq.param_or(1, 1) as usize,
            }),
            Cuu => self.ok(Command::MoveCursorUp(seq.param_or(0, 1) as usize)),
            Da1 => self.ok(Command::SendDeviceAttributes),
            Da2 => self.ok(Command::SendTerminalId),
            Dch => self.ok(Command::DeleteCharacters(seq.param_or(0, 1) as usize)),
            Decdc => self.ok(Command::DeleteColumns(seq.param_or(0, 1) as usize)),
            Decic => self.ok(Command::InsertColumns(seq.param_or(0, 1) as usize)),
            Decrm => {
                for i in 0..seq.parameter_count() {
                    self.set_mode_dec(seq, i, false);
                }
                ApplyResult::Ok
            }
            Decrqm => match dec_mode_from_code(seq.param(0)) {
                Some(mode) => self.ok(Command::RequestMode(mode)),
                None => ApplyResult::Unsupported,
            },
            DecrqmAnsi => match ansi_mode_from_code(seq.param(0)) {
                Some(mode) => self.ok(Command::RequestMode(mode)),
                None => ApplyResult::Unsupported,
            },
            Decrqpsr => match seq.param(0) {
                2 => self.ok(Command::RequestTabStops),
                _ => ApplyResult::Invalid,
            },
            Decscusr => match seq.param_or(0, 1) {
                0 | 1 => self.ok(cursor_style(CursorDisplay::Blink, CursorShape::Block)),
                2 => self.ok(cursor_style(CursorDisplay::Steady, CursorShape::Block)),
                3 => self.ok(cursor_style(CursorDisplay::Blink, CursorShape::Underscore)),
                4 => self.ok(cursor_style(CursorDisplay::Steady, CursorShape::Underscore)),
                5 => self.ok(cursor_style(CursorDisplay::Blink, CursorShape::Bar)),
                6 => self.ok(cursor_style(CursorDisplay::Steady, CursorShape::Bar)),
                _ => ApplyResult::Invalid,
            },
            Decsm => {
                for i in 0..seq.parameter_count() {
                    self.set_mode_dec(seq, i, true);
                }
                ApplyResult::Ok
            }
            Decstbm => self.ok(Command::SetTopBottomMargin {
                top: seq.param_opt(0).map(|v| v as usize),
                bottom: seq.param_opt(1).map(|v| v as usize),
            }),
            Decstr => self.ok(Command::SoftTerminalReset),
            Decxcpr => match seq.param(0) {
                6 => self.ok(Command::ReportExtendedCursorPosition),
                _ => ApplyResult::Invalid,
            },
            Dl => self.ok(Command::DeleteLines(seq.param_or(0, 1) as usize)),
            Dsr => match seq.param(0) {
                5 => self.ok(Command::DeviceStatusReport),
                6 => self.ok(Command::ReportCursorPosition),
                _ => ApplyResult::Unsupported,
            },
            Ech => self.ok(Command::EraseCharacters(seq.param_or(0, 1) as usize)),
            Ed => {
                if seq.parameter_count() == 0 {
                    return self.ok(Command::ClearToEndOfScreen);
                }
                for i in 0..seq.parameter_count() {
                    match seq.param(i) {
                        0 => self.emit(Command::ClearToEndOfScreen),
                        1 => self.emit(Command::ClearToBeginOfScreen),
                        2 => self.emit(Command::ClearScreen),
                        3 => self.emit(Command::ClearScrollbackBuffer),
                        _ => {}
                    }
                }
                ApplyResult::Ok
            }
            El => match seq.param(0) {
                0 => self.ok(Command::ClearToEndOfLine),
                1 => self.ok(Command::ClearToBeginOfLine),
                2 => self.ok(Command::ClearLine),
                _ => ApplyResult::Invalid,
            },
            Hpa => self.ok(Command::HorizontalPositionAbsolute(
                seq.param_or(0, 1) as usize
            )),
            Hpr => self.ok(Command::HorizontalPositionRelative(
                seq.param_or(0, 1) as usize
            )),
            Ich => self.ok(Command::InsertCharacters(seq.param_or(0, 1) as usize)),
            Il => self.ok(Command::InsertLines(seq.param_or(0, 1) as usize)),
            Rm => {
                for i in 0..seq.parameter_count() {
                    self.set_mode_ansi(seq, i, false);
                }
                ApplyResult::Ok
            }
            SetMark => self.ok(Command::SetMark),
            Sd => self.ok(Command::ScrollDown(seq.param_or(0, 1) as usize)),
            Sgr => self.dispatch_sgr(seq),
            SlrmOrScosc => {
                if seq.parameter_count() == 0 {
                    self.ok(Command::SaveCursor)
                } else {
                    self.ok(Command::SetLeftRightMargin {
                        left: seq.param_opt(0).map(|v| v as usize),
                        right: seq.param_opt(1).map(|v| v as usize),
                    })
                }
            }
            Sm => {
                for i in 0..seq.parameter_count() {
                    self.set_mode_ansi(seq, i, true);
                }
                ApplyResult::Ok
            }
            Su => self.ok(Command::ScrollUp(seq.param_or(0, 1) as usize)),
            Tbc => match seq.param(0) {
                // Default parameter clears the stop under the cursor.
                0 => self.ok(Command::HorizontalTabClear(TabClear::UnderCursor)),
                3 => self.ok(Command::HorizontalTabClear(TabClear::AllTabs)),
                _ => ApplyResult::Invalid,
            },
            Vpa => self.ok(Command::MoveCursorToLine(seq.param_or(0, 1) as usize)),
            WinManip => self.window_manip(seq),

            // DCS
            Decrqss => match seq.data() {
                "m" => self.ok(Command::RequestStatusString(StatusString::GraphicsRendition)),
                "r" => self.ok(Command::RequestStatusString(StatusString::TopBottomMargin)),
                "s" => self.ok(Command::RequestStatusString(StatusString::LeftRightMargin)),
                " q" => self.ok(Command::RequestStatusString(StatusString::CursorStyle)),
                _ => ApplyResult::Invalid,
            },

            // OSC
            SetTitle => {
                let title = seq.data().to_string();
                self.emit(Command::ChangeIconTitle(title.clone()));
                self.emit(Command::ChangeWindowTitle(title));
                ApplyResult::Ok
            }
            SetIconTitle => self.ok(Command::ChangeIconTitle(seq.data().to_string())),
            SetWindowTitle => self.ok(Command::ChangeWindowTitle(seq.data().to_string())),
            HyperlinkOsc => self.hyperlink(seq),
            Clipboard => self.clipboard(seq),
            ColorFg => self.dynamic_color(seq, DynamicColorName::DefaultForeground),
            ColorBg => self.dynamic_color(seq, DynamicColorName::DefaultBackground),
            ColorCursor => self.dynamic_color(seq, DynamicColorName::TextCursor),
            ColorMouseFg => self.dynamic_color(seq, DynamicColorName::MouseForeground),
            ColorMouseBg => self.dynamic_color(seq, DynamicColorName::MouseBackground),
            ResetColorFg => self.ok(Command::ResetDynamicColor(
                DynamicColorName::DefaultForeground,
            )),
            ResetColorBg => self.ok(Command::ResetDynamicColor(
                DynamicColorName::DefaultBackground,
            )),
            ResetColorCursor => self.ok(Command::ResetDynamicColor(DynamicColorName::TextCursor)),
            ResetColorMouseFg => self.ok(Command::ResetDynamicColor(
                DynamicColorName::MouseForeground,
            )),
            ResetColorMouseBg => self.ok(Command::ResetDynamicColor(
                DynamicColorName::MouseBackground,
            )),
            Notify => self.notify(seq),
            DumpState => self.ok(Command::DumpState),
        }
    }

    fn ok(&mut self, command: Command) -> ApplyResult {
        self.emit(command);
        ApplyResult::Ok
    }

    fn set_mode_ansi(&mut self, seq: &Sequence, index: usize, enable: bool) {
        match seq.param(index) {
            4 => self.emit(Command::SetMode {
                mode: Mode::Insert,
                enable,
            }),
            20 => self.emit(Command::SetMode {
                mode: Mode::AutomaticNewline,
                enable,
            }),
            other => log::debug!("unsupported ANSI mode {}", other),
        }
    }

    fn set_mode_dec(&mut self, seq: &Sequence, index: usize, enable: bool) {
        let emit_mode = |builder: &mut Self, mode| {
            builder.emit(Command::SetMode { mode, enable });
        };
        let emit_mouse = |builder: &mut Self, protocol| {
            builder.emit(Command::SendMouseEvents { protocol, enable });
        };

        match seq.param(index) {
            1 => emit_mode(self, Mode::UseApplicationCursorKeys),
            2 => emit_mode(self, Mode::DesignateCharsetUsAscii),
            3 => emit_mode(self, Mode::Columns132),
            4 => emit_mode(self, Mode::SmoothScroll),
            5 => emit_mode(self, Mode::ReverseVideo),
            6 => emit_mode(self, Mode::Origin),
            7 => emit_mode(self, Mode::AutoWrap),
            9 => emit_mouse(self, MouseProtocol::X10),
            10 => emit_mode(self, Mode::ShowToolbar),
            12 => emit_mode(self, Mode::BlinkingCursor),
            19 => emit_mode(self, Mode::PrinterExtend),
            25 => emit_mode(self, Mode::VisibleCursor),
            30 => emit_mode(self, Mode::ShowScrollbar),
            47 => emit_mode(self, Mode::UseAlternateScreen),
            69 => emit_mode(self, Mode::LeftRightMargin),
            1000 => emit_mouse(self, MouseProtocol::NormalTracking),
            1002 => emit_mouse(self, MouseProtocol::ButtonTracking),
            1003 => emit_mouse(self, MouseProtocol::AnyEventTracking),
            1004 => emit_mode(self, Mode::FocusTracking),
            1005 => emit_mode(self, Mode::MouseExtended),
            1006 => emit_mode(self, Mode::MouseSgr),
            1007 => emit_mode(self, Mode::MouseAlternateScroll),
            1015 => emit_mode(self, Mode::MouseUrxvt),
            1047 => emit_mode(self, Mode::UseAlternateScreen),
            1048 => {
                if enable {
                    self.emit(Command::SaveCursor);
                } else {
                    self.emit(Command::RestoreCursor);
                }
            }
            1049 => {
                if enable {
                    self.emit(Command::SaveCursor);
                    emit_mode(self, Mode::UseAlternateScreen);
                    self.emit(Command::ClearScreen);
                } else {
                    emit_mode(self, Mode::UseAlternateScreen);
                    self.emit(Command::RestoreCursor);
                }
            }
            2004 => emit_mode(self, Mode::BracketedPaste),
            2026 => emit_mode(self, Mode::BatchedRendering),
            other => log::debug!("unsupported DEC mode {}", other),
        }
    }

    fn dispatch_sgr(&mut self, seq: &Sequence) -> ApplyResult {
        use GraphicsRendition::*;

        if seq.parameter_count() == 0 {
            return self.ok(Command::SetGraphicsRendition(Reset));
        }

        let mut i = 0;
        while i < seq.parameter_count() {
            match seq.param(i) {
                0 => self.emit(Command::SetGraphicsRendition(Reset)),
                1 => self.emit(Command::SetGraphicsRendition(Bold)),
                2 => self.emit(Command::SetGraphicsRendition(Faint)),
                3 => self.emit(Command::SetGraphicsRendition(Italic)),
                4 => {
                    let rendition = match (seq.subparam_count(i), seq.subparam(i, 0)) {
                        (0, _) => Underline,
                        (_, 0) => NoUnderline,
                        (_, 1) => Underline,
                        (_, 2) => DoublyUnderlined,
                        (_, 3) => CurlyUnderlined,
                        (_, 4) => DottedUnderline,
                        (_, 5) => DashedUnderline,
                        _ => Underline,
                    };
                    self.emit(Command::SetGraphicsRendition(rendition));
                }
                5 => self.emit(Command::SetGraphicsRendition(Blinking)),
                7 => self.emit(Command::SetGraphicsRendition(Inverse)),
                8 => self.emit(Command::SetGraphicsRendition(Hidden)),
                9 => self.emit(Command::SetGraphicsRendition(CrossedOut)),
                21 => self.emit(Command::SetGraphicsRendition(DoublyUnderlined)),
                22 => self.emit(Command::SetGraphicsRendition(Normal)),
                23 => self.emit(Command::SetGraphicsRendition(NoItalic)),
                24 => self.emit(Command::SetGraphicsRendition(NoUnderline)),
                25 => self.emit(Command::SetGraphicsRendition(NoBlinking)),
                27 => self.emit(Command::SetGraphicsRendition(NoInverse)),
                28 => self.emit(Command::SetGraphicsRendition(NoHidden)),
                29 => self.emit(Command::SetGraphicsRendition(NoCrossedOut)),
                30..=37 => self.emit(Command::SetForegroundColor(Color::Indexed(
                    (seq.param(i) - 30) as u8,
                ))),
                38 => match parse_sgr_color(seq, &mut i) {
                    Some(color) => self.emit(Command::SetForegroundColor(color)),
                    None => {}
                },
                39 => self.emit(Command::SetForegroundColor(Color::Default)),
                40..=47 => self.emit(Command::SetBackgroundColor(Color::Indexed(
                    (seq.param(i) - 40) as u8,
                ))),
                48 => match parse_sgr_color(seq, &mut i) {
                    Some(color) => self.emit(Command::SetBackgroundColor(color)),
                    None => {}
                },
                49 => self.emit(Command::SetBackgroundColor(Color::Default)),
                51 => self.emit(Command::SetGraphicsRendition(Framed)),
                53 => self.emit(Command::SetGraphicsRendition(Overline)),
                54 => self.emit(Command::SetGraphicsRendition(NoFramed)),
                55 => self.emit(Command::SetGraphicsRendition(NoOverline)),
                58 => match parse_sgr_color(seq, &mut i) {
                    Some(color) => self.emit(Command::SetUnderlineColor(color)),
                    None => {}
                },
                90..=97 => self.emit(Command::SetForegroundColor(Color::Bright(
                    (seq.param(i) - 90) as u8,
                ))),
                100..=107 => self.emit(Command::SetBackgroundColor(Color::Bright(
                    (seq.param(i) - 100) as u8,
                ))),
                other => log::debug!("unsupported SGR code {}", other),
            }
            i += 1;
        }
        ApplyResult::Ok
    }

    fn window_manip(&mut self, seq: &Sequence) -> ApplyResult {
        match seq.parameter_count() {
            3 => match seq.param(0) {
                4 => self.ok(Command::ResizeWindow {
                    width: seq.param(2) as usize,
                    height: seq.param(1) as usize,
                    unit: ResizeUnit::Pixels,
                }),
                8 => self.ok(Command::ResizeWindow {
                    width: seq.param(2) as usize,
                    height: seq.param(1) as usize,
                    unit: ResizeUnit::Characters,
                }),
                22 => self.ok(Command::SaveWindowTitle),
                23 => self.ok(Command::RestoreWindowTitle),
                _ => ApplyResult::Unsupported,
            },
            1 => match seq.param(0) {
                // Resize to full display size.
                4 => self.ok(Command::ResizeWindow {
                    width: 0,
                    height: 0,
                    unit: ResizeUnit::Pixels,
                }),
                8 => self.ok(Command::ResizeWindow {
                    width: 0,
                    height: 0,
                    unit: ResizeUnit::Characters,
                }),
                _ => ApplyResult::Unsupported,
            },
            _ => ApplyResult::Unsupported,
        }
    }

    /// OSC 8: `params ; URI` with params as colon separated key=value pairs
    fn hyperlink(&mut self, seq: &Sequence) -> ApplyResult {
        let data = seq.data();
        let Some(separator) = data.find(';') else {
            return ApplyResult::Invalid;
        };
        let params = &data[..separator];
        let uri = &data[separator + 1..];

        let id = params
            .split(':')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "id")
            .map(|(_, value)| value)
            .unwrap_or("");

        self.ok(Command::Hyperlink {
            id: id.to_string(),
            uri: uri.to_string(),
        })
    }

    /// OSC 52: only setting the clipboard is supported, not reading
    fn clipboard(&mut self, seq: &Sequence) -> ApplyResult {
        let mut parts = seq.data().splitn(2, ';');
        match (parts.next(), parts.next()) {
            (Some("c"), Some(payload)) => match BASE64.decode(payload) {
                Ok(decoded) => {
                    let text = String::from_utf8_lossy(&decoded).into_owned();
                    self.ok(Command::CopyToClipboard(text))
                }
                Err(_) => ApplyResult::Invalid,
            },
            _ => ApplyResult::Invalid,
        }
    }

    fn notify(&mut self, seq: &Sequence) -> ApplyResult {
        let parts: Vec<&str> = seq.data().splitn(3, ';').collect();
        match parts.as_slice() {
            ["notify", title, body] => {
                let command = Command::Notify {
                    title: title.to_string(),
                    body: body.to_string(),
                };
                self.ok(command)
            }
            _ => ApplyResult::Unsupported,
        }
    }

    fn dynamic_color(&mut self, seq: &Sequence, name: DynamicColorName) -> ApplyResult {
        let data = seq.data();
        if data == "?" {
            return self.ok(Command::RequestDynamicColor(name));
        }
        match parse_color(data) {
            Ok(color) => self.ok(Command::SetDynamicColor { name, color }),
            Err(_) => ApplyResult::Invalid,
        }
    }
}

/// Extended color parsing for SGR 38/48/58 in both the colon and the
/// legacy semicolon form. Advances `i` past the consumed parameters.
fn parse_sgr_color(seq: &Sequence, i: &mut usize) -> Option<Color> {
    // Colon form: 38:2:r:g:b or 38:5:n
    if seq.subparam_count(*i) >= 1 {
        match seq.subparam(*i, 0) {
            2 if seq.subparam_count(*i) == 4 => {
                let r = seq.subparam(*i, 1);
                let g = seq.subparam(*i, 2);
                let b = seq.subparam(*i, 3);
                if r <= 255 && g <= 255 && b <= 255 {
                    return Some(Color::rgb(r as u8, g as u8, b as u8));
                }
            }
            5 if seq.subparam_count(*i) >= 2 => {
                let index = seq.subparam(*i, 1);
                if index <= 255 {
                    return Some(Color::Indexed(index as u8));
                }
            }
            _ => {}
        }
        return None;
    }

    // Semicolon form: 38;2;r;g;b or 38;5;n
    if *i + 1 < seq.parameter_count() {
        match seq.param(*i + 1) {
            5 if *i + 2 < seq.parameter_count() => {
                let index = seq.param(*i + 2);
                *i += 2;
                if index <= 255 {
                    return Some(Color::Indexed(index as u8));
                }
            }
            2 if *i + 4 < seq.parameter_count() => {
                let r = seq.param(*i + 2);
                let g = seq.param(*i + 3);
                let b = seq.param(*i + 4);
                *i += 4;
                if r <= 255 && g <= 255 && b <= 255 {
                    return Some(Color::rgb(r as u8, g as u8, b as u8));
                }
            }
            _ => *i += 1,
        }
    }
    None
}

fn cursor_style(display: CursorDisplay, shape: CursorShape) -> Command {
    Command::SetCursorStyle { display, shape }
}

/// SCS final byte to charset id, per the DEC designation codes
fn charset_from_final(final_byte: u8) -> Option<CharsetId> {
    match final_byte {
        b'B' | b'@' => Some(CharsetId::UsAscii),
        b'A' => Some(CharsetId::British),
        b'0' | b'2' => Some(CharsetId::Special),
        b'4' => Some(CharsetId::Dutch),
        b'C' | b'5' => Some(CharsetId::Finnish),
        b'R' => Some(CharsetId::French),
        b'Q' => Some(CharsetId::FrenchCanadian),
        b'K' => Some(CharsetId::German),
        b'E' | b'6' => Some(CharsetId::NorwegianDanish),
        b'Z' => Some(CharsetId::Spanish),
        b'H' | b'7' => Some(CharsetId::Swedish),
        b'=' => Some(CharsetId::Swiss),
        _ => None,
    }
}

/// DEC private mode number to the mode it controls (for DECRQM)
fn dec_mode_from_code(code: u16) -> Option<Mode> {
    match code {
        1 => Some(Mode::UseApplicationCursorKeys),
        2 => Some(Mode::DesignateCharsetUsAscii),
        3 => Some(Mode::Columns132),
        4 => Some(Mode::SmoothScroll),
        5 => Some(Mode::ReverseVideo),
        6 => Some(Mode::Origin),
        7 => Some(Mode::AutoWrap),
        10 => Some(Mode::ShowToolbar),
        12 => Some(Mode::BlinkingCursor),
        19 => Some(Mode::PrinterExtend),
        25 => Some(Mode::VisibleCursor),
        30 => Some(Mode::ShowScrollbar),
        47 => Some(Mode::UseAlternateScreen),
        69 => Some(Mode::LeftRightMargin),
        1004 => Some(Mode::FocusTracking),
        1005 => Some(Mode::MouseExtended),
        1006 => Some(Mode::MouseSgr),
        1007 => Some(Mode::MouseAlternateScroll),
        1015 => Some(Mode::MouseUrxvt),
        2004 => Some(Mode::BracketedPaste),
        2026 => Some(Mode::BatchedRendering),
        _ => None,
    }
}

/// ANSI mode number to mode (for DECRQM in ANSI form)
fn ansi_mode_from_code(code: u16) -> Option<Mode> {
    match code {
        2 => Some(Mode::KeyboardAction),
        4 => Some(Mode::Insert),
        12 => Some(Mode::SendReceive),
        20 => Some(Mode::AutomaticNewline),
        _ => None,
    }
}

impl Perform for CommandBuilder {
    fn print(&mut self, c: char) {
        self.emit(Command::AppendChar(c));
    }

    fn execute(&mut self, byte: u8) {
        self.execute_control(byte);
    }

    fn clear(&mut self) {
        self.sequence.clear();
    }

    fn collect_leader(&mut self, byte: u8) {
        self.sequence.set_leader(byte);
    }

    fn collect(&mut self, byte: u8) {
        self.sequence.push_intermediate(byte);
    }

    fn param(&mut self, byte: u8) {
        self.sequence.param_byte(byte);
    }

    fn esc_dispatch(&mut self, final_byte: u8) {
        self.dispatch_esc(final_byte);
    }

    fn csi_dispatch(&mut self, final_byte: u8) {
        self.sequence.set_category(FunctionCategory::Csi);
        self.sequence.set_final_byte(final_byte);
        self.emit_sequence();
    }

    fn osc_start(&mut self) {
        self.sequence.set_category(FunctionCategory::Osc);
    }

    fn osc_put(&mut self, c: char) {
        self.sequence.push_data(c);
    }

    fn osc_end(&mut self) {
        // Split the numeric code off the payload: "2;title" -> 2, "title".
        let data = self.sequence.data();
        let digits = data.chars().take_while(|c| c.is_ascii_digit()).count();
        // A missing or overlong code must not alias a real one.
        let code: u16 = data[..digits].parse().unwrap_or(u16::MAX);
        let skip = if data[digits..].starts_with(';') {
            digits + 1
        } else {
            digits
        };
        self.sequence.push_param(code);
        self.sequence.strip_data_prefix(skip);
        self.emit_sequence();
    }

    fn hook(&mut self, final_byte: u8) {
        self.sequence.set_category(FunctionCategory::Dcs);
        self.sequence.set_final_byte(final_byte);
    }

    fn put(&mut self, c: char) {
        self.sequence.push_data(c);
    }

    fn unhook(&mut self) {
        self.emit_sequence();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn commands(bytes: &[u8]) -> Vec<Command> {
        let mut parser = Parser::new();
        let mut builder = CommandBuilder::new();
        parser.parse(bytes, &mut builder);
        builder.take_commands()
    }

    #[test]
    fn test_print_and_controls() {
        assert_eq!(
            commands(b"a\r\n"),
            vec![
                Command::AppendChar('a'),
                Command::MoveCursorToBeginOfLine,
                Command::Linefeed,
            ]
        );
    }

    #[test]
    fn test_cursor_movement() {
        assert_eq!(commands(b"\x1b[A"), vec![Command::MoveCursorUp(1)]);
        assert_eq!(commands(b"\x1b[5B"), vec![Command::MoveCursorDown(5)]);
        assert_eq!(
            commands(b"\x1b[3;7H"),
            vec![Command::MoveCursorTo { row: 3, col: 7 }]
        );
        assert_eq!(
            commands(b"\x1b[H"),
            vec![Command::MoveCursorTo { row: 1, col: 1 }]
        );
    }

    #[test]
    fn test_sgr_colors() {
        assert_eq!(
            commands(b"\x1b[1;31m"),
            vec![
                Command::SetGraphicsRendition(GraphicsRendition::Bold),
                Command::SetForegroundColor(Color::Indexed(1)),
            ]
        );
        assert_eq!(
            commands(b"\x1b[38;5;100m"),
            vec![Command::SetForegroundColor(Color::Indexed(100))]
        );
        assert_eq!(
            commands(b"\x1b[38;2;10;20;30m"),
            vec![Command::SetForegroundColor(Color::rgb(10, 20, 30))]
        );
        assert_eq!(
            commands(b"\x1b[38:2:10:20:30m"),
            vec![Command::SetForegroundColor(Color::rgb(10, 20, 30))]
        );
        assert_eq!(
            commands(b"\x1b[95m"),
            vec![Command::SetForegroundColor(Color::Bright(5))]
        );
    }

    #[test]
    fn test_sgr_underline_styles() {
        assert_eq!(
            commands(b"\x1b[4:3m"),
            vec![Command::SetGraphicsRendition(
                GraphicsRendition::CurlyUnderlined
            )]
        );
        assert_eq!(
            commands(b"\x1b[4m"),
            vec![Command::SetGraphicsRendition(GraphicsRendition::Underline)]
        );
    }

    #[test]
    fn test_empty_sgr_is_reset() {
        assert_eq!(
            commands(b"\x1b[m"),
            vec![Command::SetGraphicsRendition(GraphicsRendition::Reset)]
        );
    }

    #[test]
    fn test_dec_modes() {
        assert_eq!(
            commands(b"\x1b[?25l"),
            vec![Command::SetMode {
                mode: Mode::VisibleCursor,
                enable: false
            }]
        );
        assert_eq!(
            commands(b"\x1b[?1000h"),
            vec![Command::SendMouseEvents {
                protocol: MouseProtocol::NormalTracking,
                enable: true
            }]
        );
    }

    #[test]
    fn test_mode_1049_compound() {
        assert_eq!(
            commands(b"\x1b[?1049h"),
            vec![
                Command::SaveCursor,
                Command::SetMode {
                    mode: Mode::UseAlternateScreen,
                    enable: true
                },
                Command::ClearScreen,
            ]
        );
        assert_eq!(
            commands(b"\x1b[?1049l"),
            vec![
                Command::SetMode {
                    mode: Mode::UseAlternateScreen,
                    enable: false
                },
                Command::RestoreCursor,
            ]
        );
    }

    #[test]
    fn test_charset_designation() {
        assert_eq!(
            commands(b"\x1b(0"),
            vec![Command::DesignateCharset {
                table: CharsetTable::G0,
                charset: CharsetId::Special
            }]
        );
        assert_eq!(
            commands(b"\x1b+K"),
            vec![Command::DesignateCharset {
                table: CharsetTable::G3,
                charset: CharsetId::German
            }]
        );
        assert_eq!(
            commands(b"\x1bN"),
            vec![Command::SingleShiftSelect(CharsetTable::G2)]
        );
    }

    #[test]
    fn test_osc_title() {
        assert_eq!(
            commands(b"\x1b]2;hello world\x07"),
            vec![Command::ChangeWindowTitle("hello world".into())]
        );
        // OSC 0 sets both titles.
        assert_eq!(
            commands(b"\x1b]0;x\x1b\\"),
            vec![
                Command::ChangeIconTitle("x".into()),
                Command::ChangeWindowTitle("x".into()),
            ]
        );
    }

    #[test]
    fn test_osc_hyperlink() {
        assert_eq!(
            commands(b"\x1b]8;id=foo;https://example.com\x1b\\"),
            vec![Command::Hyperlink {
                id: "foo".into(),
                uri: "https://example.com".into()
            }]
        );
        assert_eq!(
            commands(b"\x1b]8;;\x1b\\"),
            vec![Command::Hyperlink {
                id: "".into(),
                uri: "".into()
            }]
        );
    }

    #[test]
    fn test_osc_clipboard() {
        assert_eq!(
            commands(b"\x1b]52;c;aGk=\x07"),
            vec![Command::CopyToClipboard("hi".into())]
        );
        // Malformed base64 is dropped, not fatal.
        assert_eq!(commands(b"\x1b]52;c;!!!\x07"), vec![]);
    }

    #[test]
    fn test_dynamic_colors() {
        assert_eq!(
            commands(b"\x1b]10;?\x07"),
            vec![Command::RequestDynamicColor(
                DynamicColorName::DefaultForeground
            )]
        );
        assert_eq!(
            commands(b"\x1b]11;#102030\x07"),
            vec![Command::SetDynamicColor {
                name: DynamicColorName::DefaultBackground,
                color: tern_core::RgbColor::new(0x10, 0x20, 0x30),
            }]
        );
        assert_eq!(
            commands(b"\x1b]110\x07"),
            vec![Command::ResetDynamicColor(
                DynamicColorName::DefaultForeground
            )]
        );
    }

    #[test]
    fn test_dcs_status_request() {
        assert_eq!(
            commands(b"\x1bP$qm\x1b\\"),
            vec![Command::RequestStatusString(StatusString::GraphicsRendition)]
        );
        assert_eq!(
            commands(b"\x1bP$qr\x1b\\"),
            vec![Command::RequestStatusString(StatusString::TopBottomMargin)]
        );
    }

    #[test]
    fn test_margins() {
        assert_eq!(
            commands(b"\x1b[2;10r"),
            vec![Command::SetTopBottomMargin {
                top: Some(2),
                bottom: Some(10)
            }]
        );
        assert_eq!(
            commands(b"\x1b[r"),
            vec![Command::SetTopBottomMargin {
                top: None,
                bottom: None
            }]
        );
        // CSI s without parameters is save-cursor, with them DECSLRM.
        assert_eq!(commands(b"\x1b[s"), vec![Command::SaveCursor]);
        assert_eq!(
            commands(b"\x1b[5;40s"),
            vec![Command::SetLeftRightMargin {
                left: Some(5),
                right: Some(40)
            }]
        );
    }

    #[test]
    fn test_window_manip() {
        assert_eq!(
            commands(b"\x1b[8;24;80t"),
            vec![Command::ResizeWindow {
                width: 80,
                height: 24,
                unit: ResizeUnit::Characters
            }]
        );
        assert_eq!(commands(b"\x1b[22;0;0t"), vec![Command::SaveWindowTitle]);
    }

    #[test]
    fn test_invalid_sequences_are_dropped() {
        // Unknown final byte: no command, no panic.
        assert_eq!(commands(b"\x1b[=5z"), vec![]);
        // EL with a bogus mode.
        assert_eq!(commands(b"\x1b[9K"), vec![]);
        // Unknown OSC code.
        assert_eq!(commands(b"\x1b]999;data\x07"), vec![]);
    }

    #[test]
    fn test_multiple_modes_in_one_sequence() {
        assert_eq!(
            commands(b"\x1b[?25;7l"),
            vec![
                Command::SetMode {
                    mode: Mode::VisibleCursor,
                    enable: false
                },
                Command::SetMode {
                    mode: Mode::AutoWrap,
                    enable: false
                },
            ]
        );
    }

    #[test]
    fn test_request_mode() {
        assert_eq!(
            commands(b"\x1b[?2026$p"),
            vec![Command::RequestMode(Mode::BatchedRendering)]
        );
        assert_eq!(
            commands(b"\x1b[4$p"),
            vec![Command::RequestMode(Mode::Insert)]
        );
    }

    #[test]
    fn test_set_mark() {
        assert_eq!(commands(b"\x1b[>M"), vec![Command::SetMark]);
    }
}
