//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::inference::{PostRequest, Transport, TransportError};

/// What a `StubTransport` saw for one call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub bearer_token: Option<String>,
    pub body: serde_json::Value,
}

enum Reply {
    Body(String),
    Fail(Box<dyn Fn() -> TransportError + Send + Sync>),
}

/// A transport that records every request and answers with a canned reply.
pub struct StubTransport {
    reply: Reply,
    delay: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubTransport {
    pub fn replying(body: impl Into<String>) -> Self {
        Self {
            reply: Reply::Body(body.into()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(make_error: impl Fn() -> TransportError + Send + Sync + 'static) -> Self {
        Self {
            reply: Reply::Fail(Box::new(make_error)),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleeps before replying, to simulate a hung provider.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn post_json(&self, request: PostRequest<'_>) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: request.url.to_string(),
            bearer_token: request.bearer_token.map(str::to_string),
            body: request.body,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Reply::Body(body) => Ok(body.clone()),
            Reply::Fail(make_error) => Err(make_error()),
        }
    }
}

/// An OpenAI-style reply with a single choice.
pub fn choices_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

/// An Ollama-style reply with a top-level message.
pub fn message_body(content: &str) -> String {
    serde_json::json!({
        "message": {"role": "assistant", "content": content},
        "done": true
    })
    .to_string()
}
