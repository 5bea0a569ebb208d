pub mod openai;
pub mod traits;

pub use openai::OpenAIClient;
pub use traits::{ChatClient, ChatError, ChatMessage, SharedChatClient};

use std::sync::Arc;

use crate::config::LLMConfig;

pub fn instantiate(config: &LLMConfig) -> anyhow::Result<SharedChatClient> {
    match config {
        LLMConfig::OpenAI(openai_cfg) => {
            let client = OpenAIClient::new(openai_cfg)?;
            Ok(Arc::new(client) as SharedChatClient)
        } // Future LLM providers can be added here.
    }
}
