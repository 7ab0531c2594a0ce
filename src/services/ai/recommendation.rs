use serde::Deserialize;

use crate::errors::AppError;
use crate::services::ai::{LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"You are an expert auto mechanic. Based on the make, model and year of a vehicle, you provide a list of recommended services and potential issues.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "recommendations": "the recommended services and potential issues as readable text"
}
"#;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServiceRecommendation {
    pub recommendations: String,
}

/// Ask the model for maintenance advice on one vehicle.
pub async fn recommend(
    llm: &dyn LlmProvider,
    make: &str,
    model: &str,
    year: i32,
    current_year: i32,
) -> Result<ServiceRecommendation, AppError> {
    let (make, model) = (make.trim(), model.trim());
    if make.is_empty() || model.is_empty() {
        return Err(AppError::Validation(
            "Make and model are required.".to_string(),
        ));
    }
    if year <= 1900 || year > current_year + 1 {
        return Err(AppError::Validation(format!(
            "Year must be between 1901 and {}.",
            current_year + 1
        )));
    }

    let question = format!(
        "Make: {make}\nModel: {model}\nYear: {year}\n\nWhat are the recommended services and potential issues?"
    );
    tracing::info!(make, model, year, "requesting service recommendations");

    let response = llm
        .chat(SYSTEM_PROMPT, &[Message::user(question)])
        .await
        .map_err(|e| AppError::Ai(format!("{e:#}")))?;

    Ok(parse_recommendation(&response))
}

fn parse_recommendation(response: &str) -> ServiceRecommendation {
    if let Ok(parsed) = serde_json::from_str::<ServiceRecommendation>(response) {
        return parsed;
    }

    // Strip markdown code fences
    let trimmed = response.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Ok(parsed) = serde_json::from_str::<ServiceRecommendation>(cleaned) {
        return parsed;
    }

    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if start < end {
            if let Ok(parsed) = serde_json::from_str::<ServiceRecommendation>(&cleaned[start..=end]) {
                return parsed;
            }
        }
    }

    tracing::warn!("recommendation was not JSON, using raw text");
    ServiceRecommendation {
        recommendations: trimmed.to_string(),
    }
}
