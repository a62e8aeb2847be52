//! # TitleBar Component
//!
//! Top status line: model name, status text, and a "↓ New" marker when
//! there is content below the current scroll position.
//!
//! Purely presentational. All three props come from the controller:
//!
//! 1. **Unseen content**: `"gpterm (model: gpt-4) | Waiting for reply… | ↓ New"`
//! 2. **Status message**: `"gpterm (model: gpt-4) | Waiting for reply…"`
//! 3. **Default**: `"gpterm (model: gpt-4)"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Top status bar component showing model name, status, and notifications.
pub struct TitleBar<'a> {
    pub model_name: &'a str,
    pub status_message: &'a str,
    pub has_unseen_content: bool,
}

impl<'a> TitleBar<'a> {
    pub fn new(model_name: &'a str, status_message: &'a str, has_unseen_content: bool) -> Self {
        Self {
            model_name,
            status_message,
            has_unseen_content,
        }
    }

    /// Plain text of the bar, in priority order.
    pub fn title_text(&self) -> String {
        let mut title = format!("gpterm (model: {})", self.model_name);
        if !self.status_message.is_empty() {
            title.push_str(" | ");
            title.push_str(self.status_message);
        }
        if self.has_unseen_content {
            title.push_str(" | ↓ New");
        }
        title
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(
            self.title_text(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(line, area);
    }
}
