use std::fmt;

use super::transport::TransportError;

/// Errors that can occur while assembling a prompt or dispatching it.
/// None of these are retried internally; retry policy belongs to the caller.
#[derive(Debug)]
pub enum ProviderError {
    /// No prompt exists for the requested protocol. Raised before any I/O.
    UnsupportedProtocol(String),
    /// The configured backend identifier is not a known backend. Raised before any I/O.
    NoModelSelected(String),
    /// Backend requires an API key and none (or an empty one) was configured.
    MissingCredential { provider: &'static str },
    /// The HTTP exchange failed (connect, DNS, timeout, non-2xx, undecodable body).
    Transport {
        provider: &'static str,
        source: TransportError,
    },
    /// Exchange succeeded but the envelope held no completion where one was expected.
    EmptyCompletion { provider: &'static str },
}

impl ProviderError {
    /// True for errors detected locally, before a request could have been sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ProviderError::UnsupportedProtocol(_)
                | ProviderError::NoModelSelected(_)
                | ProviderError::MissingCredential { .. }
        )
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::UnsupportedProtocol(protocol) => {
                write!(f, "no prompt for protocol selected: {protocol}")
            }
            ProviderError::NoModelSelected(model) => {
                write!(f, "no model selected: model {model} not found")
            }
            ProviderError::MissingCredential { provider } => {
                write!(f, "{provider}: API key is empty")
            }
            ProviderError::Transport { provider, source } => {
                write!(f, "{provider} request failed: {source}")
            }
            ProviderError::EmptyCompletion { provider } => {
                write!(f, "no choices in {provider} API response")
            }
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}
