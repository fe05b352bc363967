pub mod dispatcher;
pub mod envelope;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod transport;
pub mod types;

pub use dispatcher::{DEFAULT_TIMEOUT, HoneypotSessionConfig, LlmHoneypot};
pub use envelope::{ChatRequest, ChatResponse, Choice, ReplyMessage, Usage};
pub use prompt::{BYPASS_TOKEN, DEFAULT_TERMINAL_PERSONA, GUARDED_SECRET, build_prompt};
pub use provider::ProviderError;
pub use providers::{Backend, ProviderSpec, ResponseShape};
pub use transport::{HttpTransport, PostRequest, Transport, TransportError};
pub use types::{ConversationHistory, ConversationMessage, Protocol, Role};
