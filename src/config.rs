use std::env;
use std::time::Duration;

use rust_decimal::Decimal;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub session_db: String,
    pub request_timeout: Duration,
    pub advance_fee: Decimal,
    pub booking_window_days: i64,
    pub suggestion_debounce: Duration,
    pub llm_provider: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub groq_api_key: String,
    pub groq_model: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
            session_db: env::var("SESSION_DB")
                .unwrap_or_else(|_| "autocare-session.db".to_string()),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15),
            ),
            advance_fee: env::var("ADVANCE_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| Decimal::new(20, 0)),
            booking_window_days: env::var("BOOKING_WINDOW_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            suggestion_debounce: Duration::from_millis(
                env::var("SUGGESTION_DEBOUNCE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(300),
            ),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "ollama".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
            groq_model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            session_db: ":memory:".to_string(),
            request_timeout: Duration::from_secs(15),
            advance_fee: Decimal::new(20, 0),
            booking_window_days: 30,
            suggestion_debounce: Duration::from_millis(300),
            llm_provider: "ollama".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            groq_api_key: String::new(),
            groq_model: "llama-3.1-8b-instant".to_string(),
        }
    }
}
