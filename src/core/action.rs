//! # Actions
//!
//! Everything that can happen to the conversation becomes an `Action`.
//! User presses Enter? That's `Action::Commit`.
//! The model replies? That's `Action::ReplyReceived(text)`.
//!
//! The controller takes its current state and an action, mutates the state,
//! and returns an `Effect` describing the I/O the event loop must perform.
//! No side effects happen inside the controller itself.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use crate::transport::{TransportError, Turn};

/// Viewport movement requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKind {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Commit key (Enter) pressed.
    Commit,
    /// One of the quit bindings pressed.
    Quit,
    /// Terminal resized to `width` x `height` cells.
    Resize { width: u16, height: u16 },
    /// Busy indicator timer fired.
    Tick,
    Scroll(ScrollKind),
    /// Background transport call finished with a reply.
    ReplyReceived(String),
    /// Background transport call failed.
    TransportFailed(TransportError),
}

/// Work the event loop must carry out after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    /// Start exactly one transport call with this transcript and prompt.
    Dispatch { history: Vec<Turn>, prompt: String },
    /// Unrecoverable error: restore the terminal and exit non-zero.
    Fail(TransportError),
}
