//! Callbacks from the screen to its embedder
//!
//! The screen never talks to the outside world directly; everything that
//! leaves the emulation core (replies to the host, title changes, bell,
//! clipboard, resize requests) goes through this listener. All callbacks
//! are fire-and-forget.

use crate::buffer::BufferKind;
use crate::color::RgbColor;
use crate::command::{CursorDisplay, CursorShape, DynamicColorName, MouseProtocol};

/// Event listener implemented by the embedder
pub trait ScreenEvents {
    /// Terminal-to-host response bytes (status reports, mode queries)
    fn reply(&mut self, _response: &str) {}
    fn bell(&mut self) {}
    fn buffer_changed(&mut self, _kind: BufferKind) {}
    fn set_window_title(&mut self, _title: &str) {}
    fn set_icon_title(&mut self, _title: &str) {}
    fn copy_to_clipboard(&mut self, _data: &str) {}
    fn notify(&mut self, _title: &str, _body: &str) {}
    /// Request to resize the window; width/height 0 means "fill display"
    fn resize_window(&mut self, _width: usize, _height: usize, _in_pixels: bool) {}
    fn set_application_keypad(&mut self, _enable: bool) {}
    fn use_application_cursor_keys(&mut self, _enable: bool) {}
    fn set_bracketed_paste(&mut self, _enable: bool) {}
    fn set_generate_focus_events(&mut self, _enable: bool) {}
    fn set_mouse_protocol(&mut self, _protocol: MouseProtocol, _enable: bool) {}
    fn set_cursor_style(&mut self, _display: CursorDisplay, _shape: CursorShape) {}
    fn set_dynamic_color(&mut self, _name: DynamicColorName, _color: RgbColor) {}
    fn reset_dynamic_color(&mut self, _name: DynamicColorName) {}
    /// Asked to report a dynamic color; return None to stay silent
    fn request_dynamic_color(&mut self, _name: DynamicColorName) -> Option<RgbColor> {
        None
    }
    fn hyperlink(&mut self, _id: &str, _uri: &str) {}
    fn dump_state(&mut self) {}
}

/// Listener that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl ScreenEvents for NoopEvents {}

/// Listener that records events, for tests
#[derive(Debug, Default)]
pub struct MockEvents {
    pub replies: String,
    pub bells: usize,
    pub window_titles: Vec<String>,
    pub icon_titles: Vec<String>,
    pub clipboard: Vec<String>,
    pub notifications: Vec<(String, String)>,
    pub resize_requests: Vec<(usize, usize, bool)>,
    pub buffer_changes: Vec<BufferKind>,
}

impl ScreenEvents for MockEvents {
    fn reply(&mut self, response: &str) {
        self.replies.push_str(response);
    }

    fn bell(&mut self) {
        self.bells += 1;
    }

    fn buffer_changed(&mut self, kind: BufferKind) {
        self.buffer_changes.push(kind);
    }

    fn set_window_title(&mut self, title: &str) {
        self.window_titles.push(title.to_string());
    }

    fn set_icon_title(&mut self, title: &str) {
        self.icon_titles.push(title.to_string());
    }

    fn copy_to_clipboard(&mut self, data: &str) {
        self.clipboard.push(data.to_string());
    }

    fn notify(&mut self, title: &str, body: &str) {
        self.notifications.push((title.to_string(), body.to_string()));
    }

    fn resize_window(&mut self, width: usize, height: usize, in_pixels: bool) {
        self.resize_requests.push((width, height, in_pixels));
    }
}
