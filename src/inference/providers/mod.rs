//! Backend descriptors.
//!
//! Every backend speaks the same request shape, so a backend is data, not
//! code: a `ProviderSpec` says where to send the request, whether it needs
//! a key, which model name to ask for, and where the completion lives in
//! the reply.

pub mod ollama;
pub mod openai;

use std::fmt;
use std::str::FromStr;

use super::envelope::ChatResponse;
use super::provider::ProviderError;

pub use ollama::OLLAMA;
pub use openai::{GROQ, OPENAI};

/// Where the completion text sits in a provider's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{"message": {"role", "content"}}` (Ollama `/api/chat`).
    TopLevelMessage,
    /// `{"choices": [{"message": {...}}, ...]}` (OpenAI-compatible).
    FirstChoice,
}

/// Static description of one backend.
#[derive(Debug)]
pub struct ProviderSpec {
    /// Internal name, used in config files.
    pub name: &'static str,
    /// Human-readable name for logs and error messages.
    pub display_name: &'static str,
    pub default_endpoint: &'static str,
    pub default_model: &'static str,
    /// Conventional environment variable holding this backend's API key.
    pub env_key: Option<&'static str>,
    /// Whether a bearer token must be configured before calling.
    pub requires_auth: bool,
    pub response_shape: ResponseShape,
}

impl ProviderSpec {
    /// The endpoint to POST to: a non-empty override wins over the default.
    pub fn endpoint<'a>(&'a self, override_url: Option<&'a str>) -> &'a str {
        match override_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => self.default_endpoint,
        }
    }

    /// Pulls the completion text out of a decoded reply. A missing message or
    /// `null` content is an empty completion.
    pub fn extract_completion(&self, response: ChatResponse) -> Result<String, ProviderError> {
        let message = match self.response_shape {
            ResponseShape::TopLevelMessage => response.message,
            ResponseShape::FirstChoice => response
                .choices
                .and_then(|choices| choices.into_iter().next())
                .and_then(|choice| choice.message),
        };
        message
            .and_then(|m| m.content)
            .ok_or(ProviderError::EmptyCompletion {
                provider: self.display_name,
            })
    }
}

/// Closed set of supported backends, keyed by their config identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Locally hosted open-weight model served by Ollama.
    Llama3,
    /// OpenAI chat completions.
    Gpt4o,
    /// Groq's OpenAI-compatible endpoint.
    Groq,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Llama3, Backend::Gpt4o, Backend::Groq];

    /// The identifier accepted in config and on the command line.
    pub fn identifier(self) -> &'static str {
        match self {
            Backend::Llama3 => "llama3",
            Backend::Gpt4o => "gpt4-o",
            Backend::Groq => "groq",
        }
    }

    pub fn spec(self) -> &'static ProviderSpec {
        match self {
            Backend::Llama3 => &OLLAMA,
            Backend::Gpt4o => &OPENAI,
            Backend::Groq => &GROQ,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Backend {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Backend::ALL
            .into_iter()
            .find(|b| b.identifier() == wanted)
            .ok_or_else(|| ProviderError::NoModelSelected(wanted.to_string()))
    }
}
