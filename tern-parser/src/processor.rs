//! The byte-to-screen pipeline
//!
//! Owns the lexer and the command builder, and drives a screen from raw
//! child-process output. Everything runs synchronously on the calling
//! (writer) thread; chunk boundaries may fall anywhere, including inside
//! escape sequences and UTF-8 characters.

use tern_core::{Screen, ScreenEvents};

use crate::builder::CommandBuilder;
use crate::parser::Parser;

/// Lexer plus builder, feeding one screen
#[derive(Debug, Default)]
pub struct Processor {
    parser: Parser,
    builder: CommandBuilder,
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk of bytes and apply the resulting commands
    pub fn write<E: ScreenEvents>(&mut self, screen: &mut Screen<E>, bytes: &[u8]) {
        if screen.log_raw() {
            log::trace!(target: "tern::raw", "{}", String::from_utf8_lossy(bytes).escape_debug());
        }

        self.parser.parse(bytes, &mut self.builder);
        for command in self.builder.take_commands() {
            screen.apply(command);
        }
    }

    /// Convenience for text input
    pub fn write_str<E: ScreenEvents>(&mut self, screen: &mut Screen<E>, text: &str) {
        self.write(screen, text.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::{Coordinate, Dimensions, MockEvents};

    fn screen(cols: usize, rows: usize) -> Screen<MockEvents> {
        Screen::with_history(Dimensions::new(cols, rows), MockEvents::default(), None)
    }

    #[test]
    fn test_write_text_and_sequences() {
        let mut processor = Processor::new();
        let mut s = screen(20, 5);

        processor.write_str(&mut s, "hi\r\n\x1b[1mbold");
        assert_eq!(s.render_text_line(1), "hi");
        assert_eq!(s.render_text_line(2), "bold");
        assert!(s.cell_at(Coordinate::new(2, 1)).unwrap().attrs.bold);
    }

    #[test]
    fn test_chunked_escape_sequence() {
        let mut processor = Processor::new();
        let mut s = screen(20, 5);

        processor.write(&mut s, b"\x1b[3");
        processor.write(&mut s, b";4Hx");
        assert_eq!(s.cell_at(Coordinate::new(3, 4)).unwrap().display_char(), 'x');
    }

    #[test]
    fn test_replies_flow_to_listener() {
        let mut processor = Processor::new();
        let mut s = screen(20, 5);

        processor.write(&mut s, b"\x1b[6n");
        assert_eq!(s.listener().replies, "\x1b[1;1R");
    }

    #[test]
    fn test_screenshot_replays() {
        let mut processor = Processor::new();
        let mut s = screen(10, 3);
        processor.write_str(&mut s, "ab\r\ncd");

        let shot = s.screenshot();

        let mut replayed = screen(10, 3);
        let mut second = Processor::new();
        second.write(&mut replayed, shot.as_bytes());

        assert_eq!(replayed.render_text_line(1), "ab");
        assert_eq!(replayed.render_text_line(2), "cd");
    }
}
