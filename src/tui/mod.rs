//! # TUI Adapter
//!
//! The ratatui-specific layer. Owns the terminal, runs the event loop, and
//! feeds everything that happens into the [`Controller`].
//!
//! ## Event Loop
//!
//! One thread does all UI work. Each iteration:
//!
//! 1. Draw.
//! 2. Block on terminal input until the next busy-indicator tick is due.
//! 3. Emit `Tick` if the tick interval has elapsed.
//! 4. Drain every pending terminal event.
//! 5. Drain every action posted by background transport tasks.
//!
//! Transport calls run on tokio tasks and report back through an `mpsc`
//! channel, so the UI never blocks on the network.

mod component;
pub mod components;
pub mod controller;
pub mod conversation;
pub mod event;
pub mod indicator;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Instant;

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use thiserror::Error;

use crate::core::action::{Action, Effect};
use crate::transport::{ChatTransport, TransportError, Turn};
use crate::tui::event::{poll_event_immediate, poll_event_timeout};
use crate::tui::indicator::TICK_RATE;

pub use controller::{Controller, Phase};

/// Why the UI stopped before the user quit.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        info!("Terminal modes enabled (mouse, bracketed paste)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
    }
}

/// Run the chat UI until the user quits or the transport fails.
///
/// Must be called from inside a tokio runtime; transport calls are spawned
/// onto it.
pub fn run(model_name: &str, transport: Arc<dyn ChatTransport>) -> Result<(), RunError> {
    let mut terminal = ratatui::init();
    let result = TerminalModeGuard::new()
        .map_err(RunError::from)
        .and_then(|_guard| event_loop(&mut terminal, model_name, transport));
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    model_name: &str,
    transport: Arc<dyn ChatTransport>,
) -> Result<(), RunError> {
    let mut controller = Controller::new(model_name);

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let size = terminal.size()?;
    controller.update(Action::Resize {
        width: size.width,
        height: size.height,
    });

    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw_ui(f, &mut controller))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        let mut effects = Vec::new();

        if let Some(event) = poll_event_timeout(timeout)? {
            effects.push(controller.handle_event(event));
            while let Some(event) = poll_event_immediate()? {
                effects.push(controller.handle_event(event));
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            effects.push(controller.update(Action::Tick));
            last_tick = Instant::now();
        }

        while let Ok(action) = rx.try_recv() {
            debug!("Event loop received: {:?}", action);
            effects.push(controller.update(action));
        }

        for effect in effects {
            match effect {
                Effect::None => {}
                Effect::Quit => {
                    info!("Leaving event loop");
                    return Ok(());
                }
                Effect::Dispatch { history, prompt } => {
                    spawn_request(transport.clone(), history, prompt, tx.clone());
                }
                Effect::Fail(err) => return Err(err.into()),
            }
        }
    }
}

fn spawn_request(
    transport: Arc<dyn ChatTransport>,
    history: Vec<Turn>,
    prompt: String,
    tx: mpsc::Sender<Action>,
) {
    info!("Spawning request via {}", transport.name());
    tokio::spawn(async move {
        let started = Instant::now();
        let action = match transport.ask(&history, &prompt).await {
            Ok(reply) => {
                info!(
                    "Reply received: {} bytes in {}ms",
                    reply.len(),
                    started.elapsed().as_millis()
                );
                Action::ReplyReceived(reply)
            }
            Err(err) => {
                info!("Request failed: {}", err);
                Action::TransportFailed(err)
            }
        };
        if tx.send(action).is_err() {
            warn!("Failed to send transport result: receiver dropped");
        }
    });
}
