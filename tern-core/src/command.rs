//! The terminal command set
//!
//! One closed enum covering every operation the interpreter understands:
//! cursor motion, erase/insert/delete on characters/lines/columns,
//! scrolling, margins, modes, colors and graphics renditions, charset
//! designation, title/clipboard/hyperlink operations, and report requests.
//!
//! Commands are immutable values once constructed. Consumers (the screen
//! applier and the output generator) match exhaustively, so adding a
//! variant is a compile-visible change everywhere.

use serde::{Deserialize, Serialize};

use crate::charset::{CharsetId, CharsetTable};
use crate::color::{Color, RgbColor};

/// Graphics rendition (SGR) codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphicsRendition {
    Reset,
    Bold,
    Faint,
    Italic,
    Underline,
    Blinking,
    Inverse,
    Hidden,
    CrossedOut,
    DoublyUnderlined,
    CurlyUnderlined,
    DottedUnderline,
    DashedUnderline,
    /// Neither bold nor faint
    Normal,
    NoItalic,
    NoUnderline,
    NoBlinking,
    NoInverse,
    NoHidden,
    NoCrossedOut,
    Framed,
    Overline,
    NoFramed,
    NoOverline,
}

impl GraphicsRendition {
    /// The wire encoding: primary SGR code plus an optional colon
    /// sub-parameter (used by the 4:x underline-style forms).
    pub fn code(&self) -> (u16, Option<u16>) {
        use GraphicsRendition::*;
        match self {
            Reset => (0, None),
            Bold => (1, None),
            Faint => (2, None),
            Italic => (3, None),
            Underline => (4, None),
            Blinking => (5, None),
            Inverse => (7, None),
            Hidden => (8, None),
            CrossedOut => (9, None),
            DoublyUnderlined => (21, None),
            Normal => (22, None),
            NoItalic => (23, None),
            NoUnderline => (24, None),
            NoBlinking => (25, None),
            NoInverse => (27, None),
            NoHidden => (28, None),
            NoCrossedOut => (29, None),
            CurlyUnderlined => (4, Some(3)),
            DottedUnderline => (4, Some(4)),
            DashedUnderline => (4, Some(5)),
            Framed => (51, None),
            Overline => (53, None),
            NoFramed => (54, None),
            NoOverline => (55, None),
        }
    }
}

/// ANSI and DEC-private terminal modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    // ANSI modes
    KeyboardAction,
    Insert,
    SendReceive,
    AutomaticNewline,

    // DEC private modes
    UseApplicationCursorKeys,
    DesignateCharsetUsAscii,
    Columns132,
    SmoothScroll,
    ReverseVideo,
    Origin,
    AutoWrap,
    ShowToolbar,
    BlinkingCursor,
    PrinterExtend,
    VisibleCursor,
    ShowScrollbar,
    UseAlternateScreen,
    LeftRightMargin,
    FocusTracking,
    MouseExtended,
    MouseSgr,
    MouseUrxvt,
    MouseAlternateScroll,
    BracketedPaste,
    /// Synchronized output (CSI ? 2026): queue drawing commands until the
    /// mode is reset, so a concurrent renderer never sees a torn frame.
    BatchedRendering,
}

impl Mode {
    /// True for modes set/reset with plain SM/RM (no `?` prefix)
    pub fn is_ansi(&self) -> bool {
        matches!(
            self,
            Mode::KeyboardAction | Mode::Insert | Mode::SendReceive | Mode::AutomaticNewline
        )
    }

    /// The numeric mode parameter used on the wire
    pub fn code(&self) -> u16 {
        match self {
            Mode::KeyboardAction => 2,
            Mode::Insert => 4,
            Mode::SendReceive => 12,
            Mode::AutomaticNewline => 20,
            Mode::UseApplicationCursorKeys => 1,
            Mode::DesignateCharsetUsAscii => 2,
            Mode::Columns132 => 3,
            Mode::SmoothScroll => 4,
            Mode::ReverseVideo => 5,
            Mode::Origin => 6,
            Mode::AutoWrap => 7,
            Mode::ShowToolbar => 10,
            Mode::BlinkingCursor => 12,
            Mode::PrinterExtend => 19,
            Mode::VisibleCursor => 25,
            Mode::ShowScrollbar => 30,
            Mode::UseAlternateScreen => 47,
            Mode::LeftRightMargin => 69,
            Mode::FocusTracking => 1004,
            Mode::MouseExtended => 1005,
            Mode::MouseSgr => 1006,
            Mode::MouseUrxvt => 1015,
            Mode::MouseAlternateScroll => 1007,
            Mode::BracketedPaste => 2004,
            Mode::BatchedRendering => 2026,
        }
    }
}

/// Mouse reporting protocols (set/reset through DEC private modes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseProtocol {
    /// Mode 9: button press only
    X10,
    /// Mode 1000: press and release
    NormalTracking,
    /// Mode 1002: press, release, and drag
    ButtonTracking,
    /// Mode 1003: any motion
    AnyEventTracking,
}

impl MouseProtocol {
    pub fn code(&self) -> u16 {
        match self {
            MouseProtocol::X10 => 9,
            MouseProtocol::NormalTracking => 1000,
            MouseProtocol::ButtonTracking => 1002,
            MouseProtocol::AnyEventTracking => 1003,
        }
    }
}

/// Cursor shape (DECSCUSR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    #[default]
    Block,
    Underscore,
    Bar,
}

/// Cursor display mode (blinking vs. steady)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorDisplay {
    #[default]
    Blink,
    Steady,
}

/// Colors addressable through OSC dynamic-color sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicColorName {
    DefaultForeground,
    DefaultBackground,
    TextCursor,
    MouseForeground,
    MouseBackground,
}

impl DynamicColorName {
    /// OSC code that sets this color; the reset code is this plus 100.
    pub fn set_code(&self) -> u16 {
        match self {
            DynamicColorName::DefaultForeground => 10,
            DynamicColorName::DefaultBackground => 11,
            DynamicColorName::TextCursor => 12,
            DynamicColorName::MouseForeground => 13,
            DynamicColorName::MouseBackground => 14,
        }
    }

    pub fn reset_code(&self) -> u16 {
        self.set_code() + 100
    }
}

/// Tab clearing scope (TBC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabClear {
    UnderCursor,
    AllTabs,
}

/// Window resize unit (XTWINOPS 4 vs. 8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeUnit {
    Characters,
    Pixels,
}

/// Settings queryable through DECRQSS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusString {
    GraphicsRendition,
    TopBottomMargin,
    LeftRightMargin,
    CursorStyle,
}

/// A single decoded terminal command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print one character at the cursor position
    AppendChar(char),
    /// DECKPAM / DECKPNM
    ApplicationKeypadMode(bool),
    /// DECBI - back index
    BackIndex,
    /// BS
    Backspace,
    /// BEL
    Bell,
    /// OSC 1
    ChangeIconTitle(String),
    /// OSC 2
    ChangeWindowTitle(String),
    /// EL 2
    ClearLine,
    /// ED 2
    ClearScreen,
    /// ED 3
    ClearScrollbackBuffer,
    /// EL 1
    ClearToBeginOfLine,
    /// ED 1
    ClearToBeginOfScreen,
    /// EL 0
    ClearToEndOfLine,
    /// ED 0
    ClearToEndOfScreen,
    /// OSC 52 - set clipboard contents
    CopyToClipboard(String),
    /// CBT
    CursorBackwardTab(usize),
    /// CNL
    CursorNextLine(usize),
    /// CPL
    CursorPreviousLine(usize),
    /// DCH
    DeleteCharacters(usize),
    /// DECDC
    DeleteColumns(usize),
    /// DL
    DeleteLines(usize),
    /// SCS - bind a charset to a G-slot
    DesignateCharset {
        table: CharsetTable,
        charset: CharsetId,
    },
    /// DSR 5
    DeviceStatusReport,
    /// OSC 888 - dump internal state for debugging
    DumpState,
    /// ECH
    EraseCharacters(usize),
    /// DECFI
    ForwardIndex,
    /// RIS
    FullReset,
    /// HPA
    HorizontalPositionAbsolute(usize),
    /// HPR
    HorizontalPositionRelative(usize),
    /// TBC
    HorizontalTabClear(TabClear),
    /// HTS
    HorizontalTabSet,
    /// OSC 8
    Hyperlink { id: String, uri: String },
    /// IND
    Index,
    /// ICH
    InsertCharacters(usize),
    /// DECIC
    InsertColumns(usize),
    /// IL
    InsertLines(usize),
    /// LF
    Linefeed,
    /// CUB
    MoveCursorBackward(usize),
    /// CUD
    MoveCursorDown(usize),
    /// CUF
    MoveCursorForward(usize),
    /// CUP / HVP (1-based)
    MoveCursorTo { row: usize, col: usize },
    /// CR
    MoveCursorToBeginOfLine,
    /// CHA (1-based)
    MoveCursorToColumn(usize),
    /// VPA (1-based)
    MoveCursorToLine(usize),
    /// HT
    MoveCursorToNextTab,
    /// CUU
    MoveCursorUp(usize),
    /// OSC 777;notify
    Notify { title: String, body: String },
    /// DSR 6 (CPR)
    ReportCursorPosition,
    /// DECXCPR
    ReportExtendedCursorPosition,
    /// OSC 10/11/12 with a `?` payload
    RequestDynamicColor(DynamicColorName),
    /// DECRQM
    RequestMode(Mode),
    /// DECRQSS
    RequestStatusString(StatusString),
    /// DECRQPSR 2
    RequestTabStops,
    /// OSC 110-114
    ResetDynamicColor(DynamicColorName),
    /// XTWINOPS 4/8
    ResizeWindow {
        width: usize,
        height: usize,
        unit: ResizeUnit,
    },
    /// DECRC
    RestoreCursor,
    /// XTWINOPS 23
    RestoreWindowTitle,
    /// RI
    ReverseIndex,
    /// DECSC
    SaveCursor,
    /// XTWINOPS 22
    SaveWindowTitle,
    /// DECALN
    ScreenAlignmentPattern,
    /// SD
    ScrollDown(usize),
    /// SU
    ScrollUp(usize),
    /// DA1
    SendDeviceAttributes,
    /// Mouse protocol enable/disable (DEC modes 9/1000/1002/1003)
    SendMouseEvents { protocol: MouseProtocol, enable: bool },
    /// DA2
    SendTerminalId,
    /// SGR 40-49 and friends
    SetBackgroundColor(Color),
    /// DECSCUSR
    SetCursorStyle {
        display: CursorDisplay,
        shape: CursorShape,
    },
    /// OSC 10/11/12 with a color payload
    SetDynamicColor {
        name: DynamicColorName,
        color: RgbColor,
    },
    /// SGR 30-39 and friends
    SetForegroundColor(Color),
    /// SGR style codes
    SetGraphicsRendition(GraphicsRendition),
    /// DECSLRM (1-based, None = screen edge)
    SetLeftRightMargin {
        left: Option<usize>,
        right: Option<usize>,
    },
    /// Set a line mark at the cursor row (used for prompt navigation)
    SetMark,
    /// SM / RM / DECSM / DECRM
    SetMode { mode: Mode, enable: bool },
    /// DECSTBM (1-based, None = screen edge)
    SetTopBottomMargin {
        top: Option<usize>,
        bottom: Option<usize>,
    },
    /// SGR 58
    SetUnderlineColor(Color),
    /// SS2 / SS3
    SingleShiftSelect(CharsetTable),
    /// DECSTR
    SoftTerminalReset,
}

impl Command {
    /// True for commands that do not affect the grid and therefore bypass
    /// the synchronized-output queue: reports, title/clipboard/notify
    /// side channels, mode switches, and resize requests.
    pub fn is_side_channel(&self) -> bool {
        matches!(
            self,
            Command::Bell
                | Command::ChangeIconTitle(_)
                | Command::ChangeWindowTitle(_)
                | Command::SaveWindowTitle
                | Command::RestoreWindowTitle
                | Command::CopyToClipboard(_)
                | Command::Notify { .. }
                | Command::DeviceStatusReport
                | Command::ReportCursorPosition
                | Command::ReportExtendedCursorPosition
                | Command::RequestDynamicColor(_)
                | Command::RequestMode(_)
                | Command::RequestStatusString(_)
                | Command::RequestTabStops
                | Command::SendDeviceAttributes
                | Command::SendTerminalId
                | Command::SendMouseEvents { .. }
                | Command::SetMode { .. }
                | Command::ApplicationKeypadMode(_)
                | Command::ResizeWindow { .. }
                | Command::DumpState
        )
    }
}
