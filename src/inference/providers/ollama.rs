//! Ollama running on the honeypot host. No API key.

use super::{ProviderSpec, ResponseShape};

pub static OLLAMA: ProviderSpec = ProviderSpec {
    name: "ollama",
    display_name: "Ollama",
    default_endpoint: "http://localhost:11434/api/chat",
    default_model: "llama3",
    env_key: None,
    requires_auth: false,
    response_shape: ResponseShape::TopLevelMessage,
};
