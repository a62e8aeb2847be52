//! OpenAI-compatible chat completions transport.
//!
//! One blocking-from-the-caller request per turn: the full transcript goes up,
//! `choices[0].message.content` comes back.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::core::config::ChatConfig;
use crate::transport::{ChatTransport, Role, TransportError, Turn};

// ============================================================================
// Chat Completions API Types
// ============================================================================

/// The request body for the chat completions endpoint
#[derive(Serialize, Debug)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Turn>,
}

#[derive(Deserialize, Debug)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize, Debug)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// Transport Implementation
// ============================================================================

pub struct OpenAiTransport {
    endpoint: String,
    model: String,
    api_key: String,
    system_prompt: String,
    timeout: std::time::Duration,
    client: reqwest::Client,
}

impl OpenAiTransport {
    /// Builds the HTTP client once; proxy and timeout apply to every request.
    pub fn new(config: &ChatConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(proxy_url) = &config.http_proxy {
            let proxy = reqwest::Proxy::all(proxy_url.as_str())
                .map_err(|e| TransportError::Client(format!("invalid proxy {proxy_url:?}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            system_prompt: config.system_prompt.clone(),
            timeout: config.timeout,
            client,
        })
    }

    fn messages(&self, history: &[Turn], text: &str) -> Vec<Turn> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if !self.system_prompt.is_empty() {
            messages.push(Turn {
                role: Role::System,
                text: self.system_prompt.clone(),
            });
        }
        messages.extend_from_slice(history);
        messages.push(Turn::user(text));
        messages
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl ChatTransport for OpenAiTransport {
    fn name(&self) -> &str {
        "openai"
    }

    async fn ask(&self, history: &[Turn], text: &str) -> Result<String, TransportError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: self.messages(history, text),
        };

        info!(
            "Chat completion request: model={}, message_count={}",
            self.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        debug!("Chat completion response status: {}", status);

        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            warn!("Chat completion API error: {} - {}", status.as_u16(), body);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TransportError::Malformed("response has no choices".to_string()))?;

        info!("Chat completion reply: {} bytes", reply.len());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(system_prompt: &str) -> ChatConfig {
        ChatConfig {
            endpoint: "http://localhost:1/v1/chat/completions".into(),
            model: "test-model".into(),
            api_key: "sk-test".into(),
            http_proxy: None,
            timeout: Duration::from_secs(5),
            system_prompt: system_prompt.into(),
        }
    }

    #[test]
    fn test_messages_prepend_system_and_append_user() {
        let transport = OpenAiTransport::new(&config("Be brief.")).unwrap();
        let history = vec![Turn::user("hi"), Turn::assistant("hello")];
        let messages = transport.messages(&history, "how are you?");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].text, "Be brief.");
        assert_eq!(messages[1], Turn::user("hi"));
        assert_eq!(messages[3], Turn::user("how are you?"));
    }

    #[test]
    fn test_empty_system_prompt_is_omitted() {
        let transport = OpenAiTransport::new(&config("")).unwrap();
        let messages = transport.messages(&[], "hi");
        assert_eq!(messages, vec![Turn::user("hi")]);
    }

    #[test]
    fn test_request_serialization() {
        let request = CompletionRequest {
            model: "gpt-4-turbo",
            messages: vec![Turn::user("hi")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_invalid_proxy_is_client_error() {
        let mut cfg = config("");
        cfg.http_proxy = Some("http://[bad".into());
        assert!(matches!(
            OpenAiTransport::new(&cfg),
            Err(TransportError::Client(_))
        ));
    }
}
