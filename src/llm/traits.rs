use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One conversation entry; the same shape is used for history storage and
/// the wire payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    /// The transport's own ceiling elapsed. Distinct from a user-initiated
    /// cancellation, which never reaches the client at all.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("chat endpoint returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed chat response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
}

/// ChatClient sends one conversation snapshot and returns the assistant
/// reply. Implementations are shared across tasks, so a request in flight
/// may outlive the caller that dispatched it.
#[async_trait]
pub trait ChatClient: Send + Sync {
    fn model_name(&self) -> &str;

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

pub type SharedChatClient = Arc<dyn ChatClient>;
