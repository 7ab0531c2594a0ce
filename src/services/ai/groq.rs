use async_trait::async_trait;
use serde_json::json;

use super::{chat_messages, post_chat, LlmProvider, Message};

const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// OpenAI-compatible chat completions, Groq by default.
pub struct GroqProvider {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GroqProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            endpoint: GROQ_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "messages": chat_messages(system_prompt, messages),
            "temperature": 0.4,
            "response_format": { "type": "json_object" },
        });
        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);

        let data = post_chat("Groq", request).await?;
        data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Groq reply has no message content"))
    }
}
