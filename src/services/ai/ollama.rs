use async_trait::async_trait;
use serde_json::json;

use super::{chat_messages, post_chat, LlmProvider, Message};

/// A local Ollama server's `/api/chat`.
pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "messages": chat_messages(system_prompt, messages),
            "format": "json",
            "stream": false,
        });
        let request = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&body);

        let data = post_chat("Ollama", request).await?;
        data["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Ollama reply has no message content"))
    }
}
