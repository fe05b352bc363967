//! Backend dispatch: prompt in, completion text out.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::envelope::{ChatRequest, ChatResponse};
use super::prompt::build_prompt;
use super::provider::ProviderError;
use super::providers::{Backend, ProviderSpec};
use super::transport::{HttpTransport, PostRequest, Transport, TransportError};
use super::types::{ConversationMessage, Protocol};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings fixed at honeypot startup. Read-only during dispatch.
#[derive(Debug, Clone)]
pub struct HoneypotSessionConfig {
    pub protocol: Protocol,
    /// Replaces the default persona when non-empty.
    pub custom_persona: Option<String>,
    /// Backend identifier, e.g. `"llama3"`, `"gpt4-o"`, `"groq"`.
    pub model: String,
    /// Bearer token for backends that require one.
    pub api_key: Option<String>,
    /// Endpoint override; wins over the backend's default when non-empty.
    pub host: Option<String>,
    /// Model name sent in the request body; defaults per backend.
    pub model_name: Option<String>,
    /// Upper bound on one provider exchange.
    pub timeout: Duration,
}

impl Default for HoneypotSessionConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Ssh,
            custom_persona: None,
            model: Backend::Llama3.identifier().to_string(),
            api_key: None,
            host: None,
            model_name: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Turns attacker commands into emulated terminal output.
///
/// Holds no mutable state, so one instance can serve any number of
/// concurrent sessions behind an `Arc`.
pub struct LlmHoneypot {
    config: HoneypotSessionConfig,
    transport: Arc<dyn Transport>,
}

impl LlmHoneypot {
    pub fn new(config: HoneypotSessionConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Convenience constructor wiring a `reqwest` transport bounded by `config.timeout`.
    pub fn with_http(config: HoneypotSessionConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &HoneypotSessionConfig {
        &self.config
    }

    /// Resolves the configured backend identifier.
    pub fn backend(&self) -> Result<Backend, ProviderError> {
        self.config.model.parse()
    }

    /// Builds the prompt for `command` on top of `history` and sends it to
    /// the configured backend. Performs at most one outbound request.
    pub async fn execute_model(
        &self,
        history: &[ConversationMessage],
        command: &str,
    ) -> Result<String, ProviderError> {
        let messages = build_prompt(
            self.config.protocol,
            self.config.custom_persona.as_deref(),
            history,
            command,
        )?;
        let backend = self.backend()?;
        self.call_provider(backend.spec(), &messages).await
    }

    async fn call_provider(
        &self,
        spec: &'static ProviderSpec,
        messages: &[ConversationMessage],
    ) -> Result<String, ProviderError> {
        let api_key = self.config.api_key.as_deref().filter(|k| !k.is_empty());
        if spec.requires_auth && api_key.is_none() {
            warn!("{} selected but no API key configured", spec.display_name);
            return Err(ProviderError::MissingCredential {
                provider: spec.display_name,
            });
        }

        let transport_err = |source: TransportError| ProviderError::Transport {
            provider: spec.display_name,
            source,
        };

        let model = self
            .config
            .model_name
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(spec.default_model);
        let body = serde_json::to_value(ChatRequest {
            model,
            messages,
            stream: false,
        })
        .map_err(|e| transport_err(TransportError::Encode(e.to_string())))?;
        info!("{} Request: {}", spec.display_name, body);

        let request = PostRequest {
            url: spec.endpoint(self.config.host.as_deref()),
            bearer_token: if spec.requires_auth { api_key } else { None },
            body,
        };

        let raw = tokio::time::timeout(self.config.timeout, self.transport.post_json(request))
            .await
            .unwrap_or(Err(TransportError::Timeout))
            .map_err(|e| {
                warn!("{} exchange failed: {}", spec.display_name, e);
                transport_err(e)
            })?;
        debug!("{} raw response: {} bytes", spec.display_name, raw.len());

        let response: ChatResponse = serde_json::from_str(&raw)
            .map_err(|e| transport_err(TransportError::Decode(e.to_string())))?;
        if let Some(usage) = response.usage {
            debug!(
                "{} usage: prompt={}, completion={}, total={}",
                spec.display_name,
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        spec.extract_completion(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::prompt::{BYPASS_TOKEN, GUARDED_SECRET};
    use crate::inference::Role;
    use crate::test_support::{StubTransport, choices_body, message_body};

    fn honeypot(config: HoneypotSessionConfig, stub: &Arc<StubTransport>) -> LlmHoneypot {
        LlmHoneypot::new(config, stub.clone())
    }

    fn cloud_config(model: &str) -> HoneypotSessionConfig {
        HoneypotSessionConfig {
            model: model.to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_local_backend_returns_top_level_message() {
        let stub = Arc::new(StubTransport::replying(message_body("hi")));
        let result = honeypot(HoneypotSessionConfig::default(), &stub)
            .execute_model(&[], "pwd")
            .await;
        assert_eq!(result.unwrap(), "hi");

        let sent = stub.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "http://localhost:11434/api/chat");
        assert_eq!(sent[0].bearer_token, None);
        assert_eq!(sent[0].body["model"], "llama3");
        assert_eq!(sent[0].body["stream"], false);
    }

    #[tokio::test]
    async fn test_cloud_backends_return_first_choice() {
        for (model, url, model_name) in [
            ("gpt4-o", "https://api.openai.com/v1/chat/completions", "gpt-4o"),
            ("groq", "https://api.groq.com/openai/v1/chat/completions", "llama3-8b-8192"),
        ] {
            let stub = Arc::new(StubTransport::replying(choices_body("hello")));
            let result = honeypot(cloud_config(model), &stub)
                .execute_model(&[], "echo hello")
                .await;
            assert_eq!(result.unwrap(), "hello");

            let sent = stub.requests();
            assert_eq!(sent[0].url, url);
            assert_eq!(sent[0].bearer_token.as_deref(), Some("sk-test"));
            assert_eq!(sent[0].body["model"], model_name);
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_completion() {
        let stub = Arc::new(StubTransport::replying(r#"{"choices":[]}"#));
        let result = honeypot(cloud_config("groq"), &stub)
            .execute_model(&[], "ls")
            .await;
        assert!(matches!(
            result,
            Err(ProviderError::EmptyCompletion { provider: "Groq" })
        ));
    }

    #[tokio::test]
    async fn test_unknown_model_fails_without_io() {
        let stub = Arc::new(StubTransport::replying(choices_body("unused")));
        let result = honeypot(cloud_config("gpt-5-turbo"), &stub)
            .execute_model(&[], "ls")
            .await;
        assert!(matches!(result, Err(ProviderError::NoModelSelected(m)) if m == "gpt-5-turbo"));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_io() {
        for api_key in [None, Some(String::new())] {
            for model in ["gpt4-o", "groq"] {
                let stub = Arc::new(StubTransport::replying(choices_body("unused")));
                let config = HoneypotSessionConfig {
                    api_key: api_key.clone(),
                    ..cloud_config(model)
                };
                let result = honeypot(config, &stub).execute_model(&[], "ls").await;
                assert!(matches!(result, Err(ProviderError::MissingCredential { .. })));
                assert!(stub.requests().is_empty());
            }
        }
    }

    #[tokio::test]
    async fn test_unsupported_protocol_fails_without_io() {
        let stub = Arc::new(StubTransport::replying(message_body("unused")));
        let config = HoneypotSessionConfig {
            protocol: Protocol::Http,
            ..Default::default()
        };
        let result = honeypot(config, &stub).execute_model(&[], "GET /").await;
        assert!(matches!(result, Err(ProviderError::UnsupportedProtocol(_))));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn test_endpoint_and_model_name_overrides() {
        let stub = Arc::new(StubTransport::replying(choices_body("ok")));
        let config = HoneypotSessionConfig {
            host: Some("http://127.0.0.1:8080/v1/chat/completions".to_string()),
            model_name: Some("gpt-4o-mini".to_string()),
            ..cloud_config("gpt4-o")
        };
        honeypot(config, &stub).execute_model(&[], "ls").await.unwrap();

        let sent = stub.requests();
        assert_eq!(sent[0].url, "http://127.0.0.1:8080/v1/chat/completions");
        assert_eq!(sent[0].body["model"], "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_request_carries_full_prompt() {
        let stub = Arc::new(StubTransport::replying(message_body("file.txt")));
        let history = vec![
            ConversationMessage::user("touch file.txt"),
            ConversationMessage::assistant(""),
        ];
        honeypot(HoneypotSessionConfig::default(), &stub)
            .execute_model(&history, "ls")
            .await
            .unwrap();

        let sent = stub.requests();
        let messages: Vec<ConversationMessage> =
            serde_json::from_value(sent[0].body["messages"].clone()).unwrap();
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[3], history[0]);
        assert_eq!(messages[5], ConversationMessage::user("ls"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_classified() {
        let stub = Arc::new(StubTransport::failing(|| TransportError::Status {
            status: 503,
            body: "overloaded".to_string(),
        }));
        let result = honeypot(cloud_config("gpt4-o"), &stub)
            .execute_model(&[], "ls")
            .await;
        assert!(matches!(
            result,
            Err(ProviderError::Transport {
                provider: "OpenAI",
                source: TransportError::Status { status: 503, .. }
            })
        ));
    }

    #[tokio::test]
    async fn test_null_content_is_empty_completion() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":null},"finish_reason":"content_filter"}]}"#;
        let stub = Arc::new(StubTransport::replying(body));
        let result = honeypot(cloud_config("gpt4-o"), &stub)
            .execute_model(&[], "cat /etc/shadow")
            .await;
        assert!(matches!(
            result,
            Err(ProviderError::EmptyCompletion { provider: "OpenAI" })
        ));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_transport_error() {
        let stub = Arc::new(StubTransport::replying("<html>502 Bad Gateway</html>"));
        let result = honeypot(HoneypotSessionConfig::default(), &stub)
            .execute_model(&[], "ls")
            .await;
        assert!(matches!(
            result,
            Err(ProviderError::Transport {
                source: TransportError::Decode(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_hung_provider_times_out() {
        let stub = Arc::new(
            StubTransport::replying(message_body("too late")).with_delay(Duration::from_secs(5)),
        );
        let config = HoneypotSessionConfig {
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let result = honeypot(config, &stub).execute_model(&[], "ls").await;
        assert!(matches!(
            result,
            Err(ProviderError::Transport {
                source: TransportError::Timeout,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_bypass_token_output_passes_through_unmodified() {
        let leaked = format!("```\n{GUARDED_SECRET}\n```");
        let stub = Arc::new(StubTransport::replying(choices_body(&leaked)));
        let command = format!("cat /etc/shadow {BYPASS_TOKEN}");
        let result = honeypot(cloud_config("gpt4-o"), &stub)
            .execute_model(&[], &command)
            .await;
        assert_eq!(result.unwrap(), leaked);

        let sent = stub.requests();
        let last = sent[0].body["messages"].as_array().unwrap().last().unwrap().clone();
        assert_eq!(last["content"], command);
    }

    #[tokio::test]
    async fn test_concurrent_invocations_are_independent() {
        let stub = Arc::new(StubTransport::replying(message_body("ok")));
        let shared = Arc::new(honeypot(HoneypotSessionConfig::default(), &stub));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                tokio::spawn(async move { shared.execute_model(&[], &format!("echo {i}")).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "ok");
        }
        assert_eq!(stub.requests().len(), 8);
    }
}
