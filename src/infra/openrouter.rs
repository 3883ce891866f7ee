use crate::core::context_generator::build_prompt;
use crate::core::generation::TextGenerator;
use crate::domain::errors::GenerationError;
use crate::domain::models::EvidencePackage;
use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "https://openrouter.ai/api/v1";
const REFERER: &str = "https://github.com/gemini-cli/mkaireadme";
const TITLE: &str = "mkaireadme CLI";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const EMPTY_COMPLETION: &str = "# README Generation Failed";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    code: Option<Value>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    id: String,
}

/// Pulls a readable message out of an error body, falling back to the raw text.
fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            return msg.to_string();
        }
        if let Some(msg) = json["message"].as_str() {
            return msg.to_string();
        }
    }
    format!("HTTP {status}: {}", body.trim())
}

fn classify_status(status: u16, body: &str, model: &str) -> GenerationError {
    match StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR) {
        StatusCode::UNAUTHORIZED => GenerationError::AuthInvalid,
        StatusCode::FORBIDDEN => GenerationError::ContentRejected {
            model: model.to_string(),
        },
        StatusCode::NOT_FOUND => GenerationError::ModelNotFound {
            model: model.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited,
        _ => GenerationError::Unknown(extract_error_message(body, status)),
    }
}

fn completion_text(response: ChatResponse, model: &str) -> Result<String, GenerationError> {
    if let Some(error) = response.error {
        let status = error
            .code
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(500);
        let message = error.message.unwrap_or_else(|| "unknown error".to_string());
        return Err(match classify_status(status, "", model) {
            GenerationError::Unknown(_) => GenerationError::Unknown(message),
            kind => kind,
        });
    }

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty());
    Ok(content.unwrap_or_else(|| EMPTY_COMPLETION.to_string()))
}

pub struct OpenRouterClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("http-referer", HeaderValue::from_static(REFERER));
        headers.insert("x-title", HeaderValue::from_static(TITLE));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/models", self.base_url);
        debug!("Fetching model list from {}", url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|e| GenerationError::Unknown(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body, ""));
        }

        let models: ModelsResponse = response
            .json()
            .map_err(|e| GenerationError::Unknown(e.to_string()))?;
        let mut ids: Vec<String> = models.data.into_iter().map(|m| m.id).collect();
        ids.sort();
        Ok(ids)
    }
}

impl TextGenerator for OpenRouterClient {
    fn generate(
        &self,
        evidence: &EvidencePackage,
        guidance: &str,
        model: &str,
    ) -> Result<String, GenerationError> {
        let prompt = build_prompt(evidence, guidance);
        info!(
            "Requesting completion from model '{}' ({} prompt bytes)",
            model,
            prompt.len()
        );

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| GenerationError::Unknown(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let err = classify_status(status.as_u16(), &body, model);
            debug!("Provider returned {} ({}): {}", status, err.kind(), body);
            return Err(err);
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| GenerationError::Unknown(format!("invalid response body: {e}")))?;
        completion_text(parsed, model)
    }
}
