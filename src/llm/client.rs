use crate::error::{Result, TrackerError};
use crate::llm::types::*;
use reqwest::Client;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    pub fn with_client(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Points the client at a different API root, e.g. a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs a single generateContent call and returns the first text part.
    pub async fn generate_content(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        messages: Vec<Content>,
        response_schema: Option<serde_json::Value>,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents: messages,
            system_instruction: system_prompt.map(|prompt| Content {
                role: None,
                parts: vec![Part::text(prompt)],
            }),
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
            },
        };

        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(TrackerError::Classification(format!(
                "Gemini API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateContentResponse = res.json().await?;

        body.candidates
            .ok_or_else(|| TrackerError::Classification("No candidates returned".to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| TrackerError::Classification("Empty candidates list".to_string()))?
            .content
            .parts
            .into_iter()
            .find_map(|part| part.text)
            .ok_or_else(|| {
                TrackerError::Classification("Model returned non-text content".to_string())
            })
    }
}
