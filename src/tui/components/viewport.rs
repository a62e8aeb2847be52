//! # Viewport Component
//!
//! Scrollable window over the materialized conversation.
//!
//! The content arrives pre-wrapped at the render width, so one `Line` is one
//! row and the content height is simply the line count. The offset is owned
//! here and always clamped to `0..=content_height - height`; the
//! `ScrollViewState` only mirrors it for rendering.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::text::Text;
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::action::ScrollKind;
use crate::tui::component::Component;

/// Columns reserved for the vertical scrollbar.
pub const SCROLLBAR_WIDTH: u16 = 1;

#[derive(Default)]
pub struct Viewport {
    state: ScrollViewState,
    content: Text<'static>,
    offset: u16,
    height: u16,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed text, keeping the offset within bounds.
    pub fn set_content(&mut self, content: Text<'static>) {
        self.content = content;
        self.clamp();
    }

    pub fn content(&self) -> &Text<'static> {
        &self.content
    }

    pub fn set_height(&mut self, height: u16) {
        self.height = height;
        self.clamp();
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn content_height(&self) -> u16 {
        u16::try_from(self.content.lines.len()).unwrap_or(u16::MAX)
    }

    pub fn max_offset(&self) -> u16 {
        self.content_height().saturating_sub(self.height)
    }

    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn scroll(&mut self, kind: ScrollKind) {
        let page = self.height.max(1);
        self.offset = match kind {
            ScrollKind::LineUp => self.offset.saturating_sub(1),
            ScrollKind::LineDown => self.offset.saturating_add(1),
            ScrollKind::PageUp => self.offset.saturating_sub(page),
            ScrollKind::PageDown => self.offset.saturating_add(page),
            ScrollKind::Bottom => self.max_offset(),
        };
        self.clamp();
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}

impl Component for Viewport {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if area.height != self.height {
            self.set_height(area.height);
        }

        let content_width = area.width.saturating_sub(SCROLLBAR_WIDTH);
        let content_height = self.content_height();

        let mut scroll_view = ScrollView::new(Size::new(content_width, content_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        scroll_view.render_widget(
            Paragraph::new(self.content.clone()),
            Rect::new(0, 0, content_width, content_height),
        );

        self.state.set_offset(Position {
            x: 0,
            y: self.offset,
        });
        frame.render_stateful_widget(scroll_view, area, &mut self.state);
    }
}
