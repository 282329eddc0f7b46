use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::ai_provider::PromptSequence,
    infra::http_client,
};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Text generation over the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_url: String,
    api_key: SecretString,
    model: String,
}

impl GeminiClient {
    pub fn new(api_url: String, api_key: SecretString, model: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client::build_client()?,
            api_url,
            api_key,
            model,
        })
    }

    pub async fn generate_content(&self, prompt: &PromptSequence) -> AppResult<String> {
        let request = GenerateContentRequest::from_prompt(prompt);

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.api_url.trim_end_matches('/'),
                self.model
            ))
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::Provider(format!("Gemini request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                AppError::Provider(format!("Failed to read Gemini response: {}", e.without_url()))
            })?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Gemini API error");
            return Err(AppError::Provider(format!("Gemini API error: {}", status)));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Gemini response");
            AppError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        parsed
            .text()
            .ok_or_else(|| AppError::Provider("Gemini returned no text candidates".into()))
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &PromptSequence) -> Self {
        Self {
            contents: vec![Content {
                role: Role::User,
                parts: prompt
                    .parts
                    .iter()
                    .map(|text| TextPart { text: text.clone() })
                    .collect(),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<TextPart>,
    pub role: Role,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Content,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.as_ref()?.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        Some(text)
    }
}
