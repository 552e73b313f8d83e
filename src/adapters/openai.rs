use crate::config::{RaterConfig, Secrets};
use crate::domain::model::{CandidateResponse, Rating, RatingCriteria};
use crate::domain::ports::ResponseRater;
use crate::utils::error::{RaterError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are an AI Quality Analyst that only outputs valid JSON.";

/// `ResponseRater` backed by the OpenAI chat completions API in JSON mode.
pub struct OpenAiRater {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiRater {
    pub fn new(config: &RaterConfig, secrets: &Secrets) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.rating.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.openai.base_url.trim_end_matches('/').to_string(),
            model: config.rating.model.clone(),
            api_key: secrets.openai_api_key.clone(),
        })
    }
}

#[async_trait]
impl ResponseRater for OpenAiRater {
    async fn rate(
        &self,
        criteria: &RatingCriteria,
        candidate: &CandidateResponse,
    ) -> Result<Rating> {
        tracing::debug!("🤖 Requesting rating for page {}", candidate.page_id);

        let body = json!({
            "model": &self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": master_prompt(criteria, candidate) }
            ]
        });

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RaterError::OpenAiApiError {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RaterError::ModelOutputError {
                message: "completion contained no choices".to_string(),
            })?;

        let parsed: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| RaterError::ModelOutputError {
                message: format!("completion is not valid JSON: {}", e),
            })?;

        Rating::from_model_output(&parsed).ok_or_else(|| RaterError::ModelOutputError {
            message: "completion is not a JSON object".to_string(),
        })
    }
}

/// The evaluation prompt: criteria, the interaction under review, and the
/// required output shape.
fn master_prompt(criteria: &RatingCriteria, candidate: &CandidateResponse) -> String {
    format!(
        r#"
You are an expert AI Quality Analyst. Your task is to evaluate a chatbot's response based on a set of predefined criteria. Provide your rating in a single, clean JSON object. Do not add any commentary, greetings, or explanations outside of the JSON structure.

# RATING CRITERIA
{criteria}

# CHATBOT INTERACTION TO EVALUATE
User Prompt: "{prompt}"
Chatbot Response: "{response}"

# YOUR TASK
Analyze the "Chatbot Response" based on the "User Prompt" and the "RATING CRITERIA". Provide your evaluation as a single JSON object with keys for each score (e.g., "clarity_score", "accuracy_score") and a final key "evaluation_notes" which contains a brief justification for your ratings. The score keys in your JSON output must be in snake_case (e.g., 'clarity_score').
"#,
        criteria = criteria.0,
        prompt = candidate.prompt,
        response = candidate.response,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_criteria_and_interaction() {
        let criteria = RatingCriteria("Clarity above all.".to_string());
        let candidate = CandidateResponse {
            page_id: "page-1".to_string(),
            prompt: "What is Rust?".to_string(),
            response: "A systems language.".to_string(),
        };

        let prompt = master_prompt(&criteria, &candidate);
        assert!(prompt.contains("# RATING CRITERIA"));
        assert!(prompt.contains("Clarity above all."));
        assert!(prompt.contains("User Prompt: \"What is Rust?\""));
        assert!(prompt.contains("Chatbot Response: \"A systems language.\""));
        assert!(prompt.contains("snake_case"));
    }
}
