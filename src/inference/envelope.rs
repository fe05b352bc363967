//! Chat-completions wire format shared by every backend.
//!
//! Ollama's `/api/chat` and the OpenAI-compatible `/chat/completions`
//! endpoints accept the same request body; they differ in where the
//! completion sits in the reply. Every response field is defaulted so a
//! missing field decodes cleanly and is classified later.

use serde::{Deserialize, Serialize};

use super::types::ConversationMessage;

/// Request body. Streaming is always off: one fully buffered completion per call.
#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ConversationMessage],
    pub stream: bool,
}

/// Assistant message as a provider returns it. Refusals and content-filter
/// hits arrive with `"content": null`.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ReplyMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ReplyMessage>,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token accounting. Decoded for logging only.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Provider reply: either a `choices` list or a single top-level `message`.
#[derive(Deserialize, Debug, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub model: Option<String>,
    /// `Option` so that `"choices": null` decodes like an absent list.
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    #[serde(default)]
    pub message: Option<ReplyMessage>,
    #[serde(default)]
    pub usage: Option<Usage>,
}
