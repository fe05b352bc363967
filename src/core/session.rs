//! # Terminal Session
//!
//! One emulated shell session: the conversation history for a single
//! attacker connection, threaded through every call to the dispatcher.
//!
//! History lives only as long as the session. Nothing is written to disk.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::inference::{ConversationHistory, ConversationMessage, LlmHoneypot, ProviderError};

pub struct TerminalSession {
    id: String,
    started_at: DateTime<Utc>,
    honeypot: Arc<LlmHoneypot>,
    history: ConversationHistory,
}

/// Generate a new UUID v4 session ID.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl TerminalSession {
    pub fn new(honeypot: Arc<LlmHoneypot>) -> Self {
        let id = new_session_id();
        info!("Session {} opened", id);
        Self {
            id,
            started_at: Utc::now(),
            honeypot,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }

    /// Number of completed command/output exchanges.
    pub fn turns(&self) -> usize {
        self.history.len() / 2
    }

    /// Sends `command` to the model and records the exchange.
    ///
    /// History is only extended on success, so a failed command leaves no
    /// trace the model could later build on.
    pub async fn run_command(&mut self, command: &str) -> Result<String, ProviderError> {
        debug!("Session {} command: {:?}", self.id, command);
        match self.honeypot.execute_model(&self.history, command).await {
            Ok(output) => {
                self.history.push(ConversationMessage::user(command));
                self.history.push(ConversationMessage::assistant(output.clone()));
                Ok(output)
            }
            Err(e) => {
                warn!("Session {} command failed: {}", self.id, e);
                Err(e)
            }
        }
    }
}
