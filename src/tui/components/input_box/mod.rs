//! # InputBox Component
//!
//! Single-line input editor.
//!
//! ## Responsibilities
//!
//! - Capture text input
//! - Handle editing (backspace, delete, cursor movement, paste)
//! - Hand the text over on submit and clear
//! - Focus/blur: while blurred the box is dimmed and ignores keystrokes
//!
//! ## Single-line Policy
//!
//! A submit always ends the turn, so the box never holds a line break:
//! the newline key (Ctrl+J) is disabled and pasted newlines become spaces.

mod cursor;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::{CursorState, inner_width, next_char_boundary, prev_char_boundary};

/// Rows taken by the box: one text row plus top and bottom borders.
pub const INPUT_HEIGHT: u16 = 3;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Text or cursor changed.
    ContentChanged,
}

/// Text input component.
///
/// # State
///
/// - `buffer`: Current text being typed
/// - `cursor`: Cursor position and horizontal scroll (see `CursorState`)
/// - `focused`: Whether keystrokes are accepted
pub struct InputBox {
    buffer: String,
    cursor: CursorState,
    focused: bool,
    /// Width derived from the terminal size on resize.
    width: u16,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    /// Create a focused, empty input box.
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: CursorState::new(),
            focused: true,
            width: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
        self.cursor.update_scroll(&self.buffer, inner_width(width));
    }

    /// Take the current text and clear the box.
    ///
    /// Returns `None` (and keeps the text) when it is empty or whitespace-only.
    pub fn submit(&mut self) -> Option<String> {
        if self.buffer.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.buffer);
        self.cursor.reset();
        Some(text)
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor.pos, text);
        self.cursor.pos += text.len();
        self.cursor.update_scroll(&self.buffer, inner_width(self.width));
    }

    fn moved(&mut self) -> Option<InputEvent> {
        self.cursor.update_scroll(&self.buffer, inner_width(self.width));
        Some(InputEvent::ContentChanged)
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.width = area.width;
        let width = inner_width(area.width);
        self.cursor.update_scroll(&self.buffer, width);

        let (title, style) = if self.focused {
            ("Message", Style::default().fg(Color::Green))
        } else {
            (
                "Waiting for reply…",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            )
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .padding(Padding::horizontal(1));

        let input = Paragraph::new(self.cursor.visible(&self.buffer, width).to_owned())
            .block(block)
            .style(style);

        frame.render_widget(input, area);

        if self.focused {
            let (cursor_x, cursor_y) = self.cursor.screen_pos(&self.buffer, area);
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if !self.focused {
            return None;
        }
        match event {
            TuiEvent::InputChar('\n' | '\r') => None,
            TuiEvent::InputChar(c) => {
                let mut buf = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut buf));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let flattened = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
                if flattened.is_empty() {
                    return None;
                }
                self.insert_str(&flattened);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor.pos == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(prev..self.cursor.pos);
                self.cursor.pos = prev;
                self.moved()
            }
            TuiEvent::Delete => {
                if self.cursor.pos >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(self.cursor.pos..next);
                self.moved()
            }
            TuiEvent::CursorLeft => {
                if self.cursor.pos == 0 {
                    return None;
                }
                self.cursor.pos = prev_char_boundary(&self.buffer, self.cursor.pos);
                self.moved()
            }
            TuiEvent::CursorRight => {
                if self.cursor.pos >= self.buffer.len() {
                    return None;
                }
                self.cursor.pos = next_char_boundary(&self.buffer, self.cursor.pos);
                self.moved()
            }
            TuiEvent::CursorHome => {
                if self.cursor.pos == 0 {
                    return None;
                }
                self.cursor.pos = 0;
                self.moved()
            }
            // Newlines are disabled: a submit always ends the turn
            TuiEvent::InsertNewline => None,
            _ => None,
        }
    }
}
