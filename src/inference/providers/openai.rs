//! OpenAI-compatible cloud backends. Both need a bearer token and answer
//! with a `choices` list.

use super::{ProviderSpec, ResponseShape};

pub static OPENAI: ProviderSpec = ProviderSpec {
    name: "openai",
    display_name: "OpenAI",
    default_endpoint: "https://api.openai.com/v1/chat/completions",
    default_model: "gpt-4o",
    env_key: Some("OPENAI_API_KEY"),
    requires_auth: true,
    response_shape: ResponseShape::FirstChoice,
};

pub static GROQ: ProviderSpec = ProviderSpec {
    name: "groq",
    display_name: "Groq",
    default_endpoint: "https://api.groq.com/openai/v1/chat/completions",
    default_model: "llama3-8b-8192",
    env_key: Some("GROQ_API_KEY"),
    requires_auth: true,
    response_shape: ResponseShape::FirstChoice,
};
