//! Cursor position tracking and horizontal scrolling for the InputBox.
//!
//! `CursorState` owns the cursor byte offset and the scroll column. All
//! navigation methods accept `buffer: &str` explicitly; the text data is
//! owned by `InputBox`, keeping the dependency visible.

use ratatui::layout::Rect;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Offset from area edge to content (border + padding)
const CONTENT_OFFSET: u16 = 2;
/// Offset from area top to the text row (border width)
const BORDER_OFFSET: u16 = 1;

/// Calculate the inner content width after subtracting border/padding overhead.
/// Returns 0 if the area is too narrow.
pub(super) fn inner_width(content_width: u16) -> u16 {
    content_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Find the byte offset of the previous character boundary before `pos` in `text`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

/// Cursor and scroll state, separated from the text buffer.
#[derive(Debug, Default)]
pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
    /// First visible display column (0 when the text fits)
    pub scroll: usize,
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset cursor to start (used after submit clears the buffer).
    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll = 0;
    }

    /// Display column of the cursor within the whole buffer.
    fn column(&self, buffer: &str) -> usize {
        buffer[..self.pos].width()
    }

    /// Keep the cursor inside the visible window of `width` columns.
    pub fn update_scroll(&mut self, buffer: &str, width: u16) {
        let width = width as usize;
        if width == 0 {
            self.scroll = 0;
            return;
        }
        let col = self.column(buffer);
        if col < self.scroll {
            self.scroll = col;
        } else if col >= self.scroll + width {
            self.scroll = col + 1 - width;
        }
    }

    /// The slice of the buffer that fits in `width` columns from the scroll column.
    pub fn visible<'a>(&self, buffer: &'a str, width: u16) -> &'a str {
        let width = width as usize;
        let mut col = 0;
        let mut start = buffer.len();
        for (i, ch) in buffer.char_indices() {
            if col >= self.scroll {
                start = i;
                break;
            }
            col += ch.width().unwrap_or(0);
        }

        let mut used = 0;
        let mut end = start;
        for (i, ch) in buffer[start..].char_indices() {
            let w = ch.width().unwrap_or(0);
            if used + w > width {
                break;
            }
            used += w;
            end = start + i + ch.len_utf8();
        }
        &buffer[start..end]
    }

    /// Screen position for the cursor. Returns (column, row).
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let offset = self.column(buffer).saturating_sub(self.scroll) as u16;
        (area.x + CONTENT_OFFSET + offset, area.y + BORDER_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_boundaries_multibyte() {
        let text = "aé😀b";
        assert_eq!(next_char_boundary(text, 0), 1);
        assert_eq!(next_char_boundary(text, 1), 3);
        assert_eq!(prev_char_boundary(text, 7), 3);
        assert_eq!(prev_char_boundary(text, 0), 0);
        assert_eq!(next_char_boundary(text, text.len()), text.len());
    }

    #[test]
    fn test_scroll_follows_cursor_right() {
        let buffer = "abcdefghij";
        let mut cursor = CursorState::new();
        cursor.pos = buffer.len();
        cursor.update_scroll(buffer, 4);
        // Cursor sits after 'j' at column 10; window shows columns 7..11
        assert_eq!(cursor.scroll, 7);
        assert_eq!(cursor.visible(buffer, 4), "hij");
    }

    #[test]
    fn test_scroll_follows_cursor_left() {
        let buffer = "abcdefghij";
        let mut cursor = CursorState { pos: 2, scroll: 6 };
        cursor.update_scroll(buffer, 4);
        assert_eq!(cursor.scroll, 2);
        assert_eq!(cursor.visible(buffer, 4), "cdef");
    }

    #[test]
    fn test_screen_pos_accounts_for_scroll() {
        let buffer = "abcdefghij";
        let cursor = CursorState { pos: 10, scroll: 7 };
        let area = Rect::new(0, 20, 8, 3);
        assert_eq!(cursor.screen_pos(buffer, area), (2 + 3, 21));
    }
}
