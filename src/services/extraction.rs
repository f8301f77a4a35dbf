use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Turns a meal description into raw model output listing foods and grams.
///
/// The output is returned untouched; parsing happens in
/// [`crate::services::candidates`].
#[async_trait]
pub trait CandidateExtractor: Send + Sync {
    async fn extract(&self, meal_text: &str, vocabulary: &[&str]) -> Result<String, ExtractionError>;
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExtractionError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl CandidateExtractor for GeminiClient {
    async fn extract(&self, meal_text: &str, vocabulary: &[&str]) -> Result<String, ExtractionError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let request_body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(meal_text, vocabulary) }]
            }],
            "generationConfig": { "temperature": 0.0 }
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.into_text().ok_or(ExtractionError::EmptyResponse)
    }
}

/// Prompt asking for a JSON array of `{alimento, quantidade}` records that
/// use the exact vocabulary spelling and gram quantities.
pub fn build_prompt(meal_text: &str, vocabulary: &[&str]) -> String {
    format!(
        concat!(
            "You convert meal descriptions into foods from a nutrition database.\n\n",
            "Valid food names, one per line:\n{vocabulary}\n\n",
            "For each food in the meal, pick the closest name from the list and copy it exactly, ",
            "including accents, commas and capitalization. Convert amounts to grams ",
            "(1 tablespoon = 15 g, 1 teaspoon = 5 g, 1 cup = 240 g, one unit = typical weight).\n\n",
            "Answer with a JSON array only, no prose:\n",
            "[{{\"alimento\": \"<exact name>\", \"quantidade\": <grams>}}]\n\n",
            "Meal: \"{meal}\"\n"
        ),
        vocabulary = vocabulary.join("\n"),
        meal = meal_text.trim(),
    )
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Extraction request timed out")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("Extraction API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Extraction API returned no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for ExtractionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExtractionError::Timeout
        } else {
            ExtractionError::Http(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_vocabulary_and_meal() {
        let prompt = build_prompt("  2 ovos cozidos ", &["Ovo, galinha, cozido", "Banana, prata, crua"]);
        assert!(prompt.contains("Ovo, galinha, cozido\nBanana, prata, crua"));
        assert!(prompt.contains("Meal: \"2 ovos cozidos\""));
        assert!(prompt.contains("\"alimento\""));
        assert!(prompt.contains("\"quantidade\""));
    }

    #[test]
    fn test_response_text_joined() {
        let body = r#"{
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "```json\n[" }, { "text": "]\n```" }] },
                "finishReason": "STOP"
            }]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("```json\n[]\n```"));
    }

    #[test]
    fn test_response_without_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert!(parsed.into_text().is_none());

        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(parsed.into_text().is_none());
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = GeminiClient::new("key", "gemini-2.0-flash", "http://localhost:9/v1beta/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:9/v1beta");
    }
}
