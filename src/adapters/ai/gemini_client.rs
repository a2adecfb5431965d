use serde::Deserialize;
use tracing::debug;

use crate::core::errors::{IgnitionError, Result};
use crate::core::models::ai::{GenerationConfig, ResponseFormat};
use crate::core::models::http::{HttpMethod, HttpRequest};
use crate::core::traits::http_transport::HttpTransport;
use crate::core::traits::text_generator::TextGenerator;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// `TextGenerator` backed by the Gemini `generateContent` API.
pub struct GeminiClient<T: HttpTransport> {
    transport: T,
    api_key: String,
    endpoint: String,
    model: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl<T: HttpTransport> GeminiClient<T> {
    pub fn new(transport: T, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl<T: HttpTransport> TextGenerator for GeminiClient<T> {
    fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let mime = match config.format {
            ResponseFormat::Text => "text/plain",
            ResponseFormat::Json => "application/json",
        };
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": config.temperature,
                "responseMimeType": mime,
            },
        });
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let request = HttpRequest::new(HttpMethod::Post, url)
            .header("x-goog-api-key", self.api_key.as_str())
            .json_body(payload.to_string());

        debug!(model = %self.model, prompt_chars = prompt.len(), "generateContent");
        let response = self
            .transport
            .send(&request)
            .map_err(|e| IgnitionError::GenerationFailed {
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            let detail = serde_json::from_str::<serde_json::Value>(&response.body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| response.body.chars().take(200).collect());
            return Err(IgnitionError::GenerationFailed {
                reason: format!("HTTP {}: {detail}", response.status),
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&response.body).map_err(|e| IgnitionError::GenerationFailed {
                reason: format!("unexpected response body: {e}"),
            })?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(IgnitionError::GenerationFailed {
                reason: "the model returned no candidates".into(),
            });
        }
        Ok(text)
    }
}
