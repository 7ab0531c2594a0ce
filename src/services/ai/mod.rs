pub mod groq;
pub mod ollama;
pub mod recommendation;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AppConfig;
use crate::errors::AppError;
use groq::GroqProvider;
use ollama::OllamaProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String>;
}

/// System prompt first, then the conversation, in chat-completions shape.
fn chat_messages(system_prompt: &str, messages: &[Message]) -> Vec<serde_json::Value> {
    std::iter::once(json!({ "role": "system", "content": system_prompt }))
        .chain(
            messages
                .iter()
                .map(|m| json!({ "role": m.role, "content": m.content })),
        )
        .collect()
}

/// Send a chat request and decode the JSON reply, failing on non-2xx.
async fn post_chat(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> anyhow::Result<serde_json::Value> {
    let resp = request
        .send()
        .await
        .with_context(|| format!("failed to reach {provider}"))?;
    let status = resp.status();
    let data: serde_json::Value = resp
        .json()
        .await
        .with_context(|| format!("{provider} returned a non-JSON reply"))?;

    if !status.is_success() {
        let detail = data.get("error").unwrap_or(&data);
        anyhow::bail!("{provider} error ({status}): {detail}");
    }
    tracing::debug!(provider, "llm reply received");
    Ok(data)
}

/// Pick the provider named by `LLM_PROVIDER`, defaulting to Ollama.
pub fn provider_from_config(config: &AppConfig) -> Result<Box<dyn LlmProvider>, AppError> {
    match config.llm_provider.as_str() {
        "groq" => {
            if config.groq_api_key.is_empty() {
                return Err(AppError::Config(
                    "GROQ_API_KEY must be set when LLM_PROVIDER=groq".to_string(),
                ));
            }
            tracing::info!(model = %config.groq_model, "using Groq LLM provider");
            Ok(Box::new(GroqProvider::new(
                config.groq_api_key.clone(),
                config.groq_model.clone(),
            )))
        }
        _ => {
            tracing::info!(url = %config.ollama_url, model = %config.ollama_model, "using Ollama LLM provider");
            Ok(Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_messages_puts_system_first() {
        let msgs = chat_messages("be brief", &[Message::user("hi")]);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0]["role"], "system");
        assert_eq!(msgs[1]["content"], "hi");
    }

    #[test]
    fn test_groq_requires_key() {
        let config = AppConfig {
            llm_provider: "groq".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            provider_from_config(&config),
            Err(AppError::Config(m)) if m.contains("GROQ_API_KEY")
        ));
        assert!(provider_from_config(&AppConfig::default()).is_ok());
    }
}
