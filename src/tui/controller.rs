//! # Controller
//!
//! The UI state machine. Every event the terminal or a background task
//! produces ends up in [`Controller::update`], which mutates the conversation,
//! indicator, viewport and input box, and returns the [`Effect`] the event
//! loop has to carry out.
//!
//! ```text
//!            Commit (focused, non-empty)
//!   ┌──────┐ ─────────────────────────────▶ ┌─────────┐
//!   │ Idle │                                │ Waiting │ ◀─┐ Tick
//!   └──────┘ ◀───────────────────────────── └─────────┘ ──┘
//!      │           ReplyReceived                 │
//!      │ Quit                    Quit / Failure  │
//!      ▼                                         ▼
//!   ┌──────────────────────────────────────────────┐
//!   │                  Terminated                  │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! The input box is blurred exactly while `Waiting`. Commit requires focus,
//! so a second request can never be dispatched before the first one lands.

use log::{debug, error, info, warn};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::core::action::{Action, Effect, ScrollKind};
use crate::transport::{TransportError, Turn};
use crate::tui::component::EventHandler;
use crate::tui::components::viewport::SCROLLBAR_WIDTH;
use crate::tui::components::{InputBox, Viewport};
use crate::tui::conversation::{Author, Conversation, MessageBlock};
use crate::tui::event::TuiEvent;
use crate::tui::indicator::BusyIndicator;
use crate::tui::markdown::Renderer;
use crate::tui::ui;

/// First block of every session. UI-only; never sent to the model.
pub const GREETING: &str =
    "Hi! Type a message and press **Enter** to chat. Press **Esc** or **Ctrl+C** to quit.";

const DEFAULT_WIDTH: u16 = 80;
const DEFAULT_HEIGHT: u16 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Input focused, no request pending.
    Idle,
    /// Input blurred, one request outstanding, indicator animating.
    Waiting,
    /// Quit or fatal error; the loop is about to exit.
    Terminated,
}

pub struct Controller {
    phase: Phase,
    model_name: String,
    renderer: Renderer,
    conversation: Conversation,
    indicator: BusyIndicator,
    /// Finalized turns, sent as history with the next request.
    transcript: Vec<Turn>,
    /// User text of the request in flight.
    pending_prompt: Option<String>,
    pub(super) viewport: Viewport,
    pub(super) input_box: InputBox,
}

impl Controller {
    /// A controller sized for a default 80x24 terminal. The event loop sends
    /// the real size as the first `Resize`.
    pub fn new(model_name: impl Into<String>) -> Self {
        let mut controller = Self {
            phase: Phase::Idle,
            model_name: model_name.into(),
            renderer: Renderer::new(DEFAULT_WIDTH),
            conversation: Conversation::new(),
            indicator: BusyIndicator::new(),
            transcript: Vec::new(),
            pending_prompt: None,
            viewport: Viewport::new(),
            input_box: InputBox::new(),
        };
        controller.apply_size(DEFAULT_WIDTH, DEFAULT_HEIGHT);

        let greeting = controller.render_block(Author::Bot, GREETING, false);
        controller
            .conversation
            .push(MessageBlock::new(Author::Bot, GREETING, greeting));
        controller.refresh_viewport();
        controller
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.phase == Phase::Waiting
    }

    pub fn is_input_focused(&self) -> bool {
        self.input_box.is_focused()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn render_width(&self) -> u16 {
        self.renderer.width()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn input_box(&self) -> &InputBox {
        &self.input_box
    }

    pub fn status_message(&self) -> &'static str {
        match self.phase {
            Phase::Idle => "Enter to send · Esc to quit",
            Phase::Waiting => "Waiting for reply…",
            Phase::Terminated => "",
        }
    }

    // ── Event entry points ──────────────────────────────────────────────

    /// Route a terminal event: transitions go through `update`, editing keys
    /// go to the input box (which ignores them while blurred).
    pub fn handle_event(&mut self, event: TuiEvent) -> Effect {
        match event {
            TuiEvent::Submit => self.update(Action::Commit),
            TuiEvent::Quit | TuiEvent::ForceQuit => self.update(Action::Quit),
            TuiEvent::Resize(width, height) => self.update(Action::Resize { width, height }),
            TuiEvent::ScrollUp => self.update(Action::Scroll(ScrollKind::LineUp)),
            TuiEvent::ScrollDown => self.update(Action::Scroll(ScrollKind::LineDown)),
            TuiEvent::ScrollPageUp => self.update(Action::Scroll(ScrollKind::PageUp)),
            TuiEvent::ScrollPageDown => self.update(Action::Scroll(ScrollKind::PageDown)),
            TuiEvent::ScrollToBottom => self.update(Action::Scroll(ScrollKind::Bottom)),
            editing => {
                self.input_box.handle_event(&editing);
                Effect::None
            }
        }
    }

    pub fn update(&mut self, action: Action) -> Effect {
        if self.phase == Phase::Terminated {
            debug!("Ignoring {:?} after termination", action);
            return Effect::None;
        }

        match action {
            Action::Commit => self.commit(),
            Action::Quit => {
                info!("Quit requested");
                self.phase = Phase::Terminated;
                Effect::Quit
            }
            Action::Resize { width, height } => {
                self.resize(width, height);
                Effect::None
            }
            Action::Tick => {
                self.tick();
                Effect::None
            }
            Action::Scroll(kind) => {
                self.viewport.scroll(kind);
                Effect::None
            }
            Action::ReplyReceived(reply) => {
                self.reply_received(reply);
                Effect::None
            }
            Action::TransportFailed(err) => self.transport_failed(err),
        }
    }

    // ── Transitions ─────────────────────────────────────────────────────

    fn commit(&mut self) -> Effect {
        if self.phase != Phase::Idle || !self.input_box.is_focused() {
            debug!("Commit ignored in {:?}", self.phase);
            return Effect::None;
        }
        let Some(prompt) = self.input_box.submit() else {
            return Effect::None;
        };

        let you = self.render_block(Author::You, &prompt, false);
        self.conversation
            .push(MessageBlock::new(Author::You, prompt.clone(), you));

        self.indicator.start();
        let frame = self.indicator.current();
        let placeholder = self.render_block(Author::Bot, frame, true);
        self.conversation
            .push_placeholder(MessageBlock::new(Author::Bot, frame, placeholder));

        self.input_box.blur();
        self.phase = Phase::Waiting;
        self.pending_prompt = Some(prompt.clone());

        self.refresh_viewport();
        self.viewport.scroll_to_bottom();

        info!(
            "Dispatching request: {} history turns, {} prompt bytes",
            self.transcript.len(),
            prompt.len()
        );
        Effect::Dispatch {
            history: self.transcript.clone(),
            prompt,
        }
    }

    fn tick(&mut self) {
        if self.phase != Phase::Waiting || self.input_box.is_focused() {
            return;
        }
        let frame = self.indicator.advance();
        let rendered = self.render_block(Author::Bot, frame, true);
        self.conversation.update_placeholder(frame, rendered);
        self.refresh_viewport();
    }

    fn reply_received(&mut self, reply: String) {
        if self.phase != Phase::Waiting {
            warn!("Reply received while {:?}; discarding", self.phase);
            return;
        }

        let rendered = self.render_block(Author::Bot, &reply, false);
        self.conversation.finalize_placeholder(reply.clone(), rendered);

        if let Some(prompt) = self.pending_prompt.take() {
            self.transcript.push(Turn::user(prompt));
        }
        self.transcript.push(Turn::assistant(reply));

        self.indicator.stop();
        self.phase = Phase::Idle;
        self.input_box.focus();

        self.refresh_viewport();
        self.viewport.scroll_to_bottom();
        info!("Reply rendered; {} turns in transcript", self.transcript.len());
    }

    fn transport_failed(&mut self, err: TransportError) -> Effect {
        if self.phase != Phase::Waiting {
            warn!("Transport failure while {:?}; discarding: {}", self.phase, err);
            return Effect::None;
        }
        error!("Transport failed: {}", err);
        self.indicator.stop();
        self.phase = Phase::Terminated;
        Effect::Fail(err)
    }

    fn resize(&mut self, width: u16, height: u16) {
        let was_at_bottom = self.viewport.is_at_bottom();
        self.apply_size(width, height);

        let renderer = self.renderer;
        self.conversation.rerender(|block, placeholder| {
            render_block(&renderer, block.author, &block.source, placeholder)
        });

        self.refresh_viewport();
        if was_at_bottom {
            self.viewport.scroll_to_bottom();
        }
        debug!(
            "Resized to {}x{}; render width {}",
            width,
            height,
            self.renderer.width()
        );
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    /// Push terminal-derived sizes down to the renderer, viewport and editor.
    fn apply_size(&mut self, width: u16, height: u16) {
        let [_title, main, input] = ui::layout(Rect::new(0, 0, width, height));
        self.renderer
            .set_width(main.width.saturating_sub(SCROLLBAR_WIDTH));
        self.viewport.set_height(main.height);
        self.input_box.set_width(input.width);
    }

    fn render_block(&self, author: Author, source: &str, placeholder: bool) -> Text<'static> {
        render_block(&self.renderer, author, source, placeholder)
    }

    fn refresh_viewport(&mut self) {
        self.viewport.set_content(self.conversation.materialize());
    }
}

fn author_color(author: Author) -> Color {
    match author {
        Author::You => Color::Green,
        Author::Bot => Color::Blue,
    }
}

/// A header row naming the author, then the body rendered at the current width.
fn render_block(
    renderer: &Renderer,
    author: Author,
    source: &str,
    placeholder: bool,
) -> Text<'static> {
    let color = author_color(author);
    let label = match author {
        Author::You => "You",
        Author::Bot => "Bot",
    };
    let header = Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));

    let body = if placeholder {
        Text::from(Line::from(Span::styled(
            format!("{source} thinking…"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )))
    } else {
        renderer.render(source, color)
    };

    let mut text = Text::from(header);
    text.lines.extend(body.lines);
    text
}
