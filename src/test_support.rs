//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;
use ratatui::text::Text;

use crate::transport::{ChatTransport, TransportError, Turn};
use crate::tui::controller::Controller;
use crate::tui::event::TuiEvent;

/// Flatten styled text into one plain string per line.
pub fn plain_lines(text: &Text) -> Vec<String> {
    text.lines
        .iter()
        .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
        .collect()
}

/// Creates a controller for a fresh session against a fake model name.
pub fn test_controller() -> Controller {
    Controller::new("test-model")
}

/// Feed `text` into the controller one keystroke at a time.
pub fn type_text(controller: &mut Controller, text: &str) {
    for c in text.chars() {
        controller.handle_event(TuiEvent::InputChar(c));
    }
}

/// A transport that answers every request with the same outcome and records
/// what it was asked.
pub struct FixedTransport {
    outcome: Result<String, TransportError>,
    requests: Mutex<Vec<(Vec<Turn>, String)>>,
}

impl FixedTransport {
    pub fn reply(text: &str) -> Self {
        Self::with_outcome(Ok(text.to_string()))
    }

    pub fn failing(err: TransportError) -> Self {
        Self::with_outcome(Err(err))
    }

    fn with_outcome(outcome: Result<String, TransportError>) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(Vec<Turn>, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for FixedTransport {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn ask(&self, history: &[Turn], text: &str) -> Result<String, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((history.to_vec(), text.to_string()));
        self.outcome.clone()
    }
}
