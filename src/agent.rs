use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::llm::ChatMessage;

/// Conversation state for a single named agent.
///
/// The REPL appends the user message before dispatching a request, so a
/// cancelled cycle rolls that provisional entry back out and the abandoned
/// turn leaves no trace.
pub struct Agent {
    name: String,
    history: Vec<ChatMessage>,
}

impl Agent {
    pub fn new(name: &str, system_prompt: Option<&str>) -> Self {
        let mut history = Vec::new();
        if let Some(prompt) = system_prompt {
            history.push(ChatMessage::system(prompt));
        }
        Self {
            name: name.to_string(),
            history,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Snapshot of the conversation to send with the next request,
    /// including the pending user message.
    pub fn request_messages(&self) -> Vec<ChatMessage> {
        self.history.clone()
    }

    pub fn push_user(&mut self, content: &str) {
        self.history.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: &str) {
        self.history.push(ChatMessage::assistant(content));
    }

    /// Remove the provisional user message after a cancelled request.
    pub fn rollback_user(&mut self) {
        if self.history.last().is_some_and(|msg| msg.role == "user") {
            self.history.pop();
        }
    }

    /// Drop everything but the system message.
    pub fn clear(&mut self) {
        self.history.retain(|msg| msg.role == "system");
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.history).context("serializing conversation")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn load(&mut self, path: &Path) -> Result<()> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        self.history =
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(())
    }
}
