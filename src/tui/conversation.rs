//! # Conversation Buffer
//!
//! Ordered log of rendered message blocks. Insertion order is chronological
//! order is display order.
//!
//! The log is append-only with one exception: while a request is in flight
//! the last block is a Bot placeholder, and it may be rewritten in place
//! (indicator frames) and finalized exactly once (the reply). The placeholder
//! is tracked as a flag on the log rather than a reference into it, so its
//! index is always `blocks.len() - 1`.

use ratatui::text::{Line, Text};

/// Who a block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    You,
    Bot,
}

/// One rendered turn.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBlock {
    pub author: Author,
    /// Raw text the block was rendered from, kept for re-flow on resize.
    pub source: String,
    pub rendered: Text<'static>,
}

impl MessageBlock {
    pub fn new(author: Author, source: impl Into<String>, rendered: Text<'static>) -> Self {
        Self {
            author,
            source: source.into(),
            rendered,
        }
    }

    /// Rows this block occupies once rendered.
    pub fn height(&self) -> usize {
        self.rendered.lines.len()
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    blocks: Vec<MessageBlock>,
    /// True while the last block is an unresolved Bot placeholder.
    placeholder: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[MessageBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn last(&self) -> Option<&MessageBlock> {
        self.blocks.last()
    }

    pub fn has_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Index of the pending placeholder, if any.
    pub fn placeholder_index(&self) -> Option<usize> {
        self.placeholder.then(|| self.blocks.len() - 1)
    }

    /// Append a finalized block. Refused while a placeholder is pending,
    /// since the placeholder must stay last.
    pub fn push(&mut self, block: MessageBlock) -> bool {
        if self.placeholder {
            return false;
        }
        self.blocks.push(block);
        true
    }

    /// Append a Bot placeholder. At most one may be pending.
    pub fn push_placeholder(&mut self, block: MessageBlock) -> bool {
        if self.placeholder || block.author != Author::Bot {
            return false;
        }
        self.blocks.push(block);
        self.placeholder = true;
        true
    }

    /// Rewrite the pending placeholder in place.
    pub fn update_placeholder(
        &mut self,
        source: impl Into<String>,
        rendered: Text<'static>,
    ) -> bool {
        let Some(block) = self.pending_mut() else {
            return false;
        };
        block.source = source.into();
        block.rendered = rendered;
        true
    }

    /// Replace the pending placeholder with the final block and resolve it.
    pub fn finalize_placeholder(
        &mut self,
        source: impl Into<String>,
        rendered: Text<'static>,
    ) -> bool {
        if !self.update_placeholder(source, rendered) {
            return false;
        }
        self.placeholder = false;
        true
    }

    /// Re-render every block, e.g. after the render width changed.
    /// The closure receives each block and whether it is the pending placeholder.
    pub fn rerender(&mut self, mut render: impl FnMut(&MessageBlock, bool) -> Text<'static>) {
        let pending = self.placeholder_index();
        for (i, block) in self.blocks.iter_mut().enumerate() {
            block.rendered = render(block, pending == Some(i));
        }
    }

    /// Concatenate every block into one display text, separated by a blank line.
    pub fn materialize(&self) -> Text<'static> {
        let mut text = Text::default();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                text.lines.push(Line::default());
            }
            text.lines.extend(block.rendered.lines.iter().cloned());
        }
        text
    }

    fn pending_mut(&mut self) -> Option<&mut MessageBlock> {
        if self.placeholder {
            self.blocks.last_mut()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(author: Author, text: &str) -> MessageBlock {
        MessageBlock::new(author, text, Text::raw(text.to_string()))
    }

    #[test]
    fn test_push_preserves_order() {
        let mut conv = Conversation::new();
        assert!(conv.push(block(Author::Bot, "greeting")));
        assert!(conv.push(block(Author::You, "hi")));
        let authors: Vec<Author> = conv.blocks().iter().map(|b| b.author).collect();
        assert_eq!(authors, vec![Author::Bot, Author::You]);
        assert!(!conv.has_placeholder());
    }

    #[test]
    fn test_only_one_placeholder() {
        let mut conv = Conversation::new();
        assert!(conv.push_placeholder(block(Author::Bot, "⠋")));
        assert!(!conv.push_placeholder(block(Author::Bot, "⠋")));
        assert!(!conv.push(block(Author::You, "sneaky")));
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.placeholder_index(), Some(0));
    }

    #[test]
    fn test_you_block_cannot_be_placeholder() {
        let mut conv = Conversation::new();
        assert!(!conv.push_placeholder(block(Author::You, "hi")));
        assert!(conv.is_empty());
    }

    #[test]
    fn test_finalize_touches_only_last_block() {
        let mut conv = Conversation::new();
        conv.push(block(Author::Bot, "first reply"));
        conv.push(block(Author::You, "again"));
        conv.push_placeholder(block(Author::Bot, "⠋"));

        assert!(conv.finalize_placeholder("second reply", Text::raw("second reply")));
        assert!(!conv.has_placeholder());
        assert_eq!(conv.blocks()[0].source, "first reply");
        assert_eq!(conv.blocks()[2].source, "second reply");

        // Nothing left to finalize
        assert!(!conv.finalize_placeholder("again", Text::raw("again")));
        assert!(!conv.update_placeholder("⠙", Text::raw("⠙")));
        assert_eq!(conv.blocks()[2].source, "second reply");
    }

    #[test]
    fn test_materialize_joins_with_blank_line() {
        let mut conv = Conversation::new();
        conv.push(block(Author::Bot, "a"));
        conv.push(block(Author::You, "b"));
        let text = conv.materialize();
        assert_eq!(text.lines.len(), 3);
        assert_eq!(text.lines[1].width(), 0);
    }

    #[test]
    fn test_rerender_flags_placeholder() {
        let mut conv = Conversation::new();
        conv.push(block(Author::You, "hi"));
        conv.push_placeholder(block(Author::Bot, "⠋"));

        let mut seen = Vec::new();
        conv.rerender(|b, pending| {
            seen.push((b.author, pending));
            Text::raw(b.source.to_uppercase())
        });
        assert_eq!(seen, vec![(Author::You, false), (Author::Bot, true)]);
        assert_eq!(conv.blocks()[0].rendered, Text::raw("HI"));
        assert!(conv.has_placeholder());
    }
}
