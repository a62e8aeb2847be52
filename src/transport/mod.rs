//! # Chat Transport
//!
//! The one call the UI makes to the outside world: send the conversation so
//! far plus the new user text, get one reply back. The UI never awaits this
//! on its own thread; a background task does and posts the outcome back.

mod openai;

pub use openai::OpenAiTransport;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who said a turn, in chat-completions terminology.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One finalized exchange entry sent as history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    #[serde(rename = "content")]
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Errors that can occur while asking the remote model.
/// None of them are retried; once the UI is running they end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// HTTP client could not be built (bad proxy URL, TLS backend failure).
    #[error("could not build HTTP client: {0}")]
    Client(String),
    /// Connection, DNS or I/O failure.
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {:?}", .0)]
    Timeout(Duration),
    /// Non-2xx response; the body is kept verbatim for the report.
    #[error("response failed with status code: {status} and\nbody: {body}")]
    Status { status: u16, body: String },
    /// 2xx response whose body is not a chat completion.
    #[error("malformed reply body: {0}")]
    Malformed(String),
}

impl TransportError {
    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Returns the name of the transport.
    fn name(&self) -> &str;

    /// Asks the model for a reply to `text`, given the finalized turns before it.
    async fn ask(&self, history: &[Turn], text: &str) -> Result<String, TransportError>;
}
