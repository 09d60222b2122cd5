//! Gemini API client
//!
//! Non-streaming `generateContent` calls against the Google AI REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::ChronosConfig;
use crate::constants;

/// Why a generation call produced no text
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport failure (connect, timeout, TLS, body read)
    #[error("request failed: {}", describe_request_error(.0))]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the API
    #[error("API error: {status} - {message}")]
    Api { status: StatusCode, message: String },

    /// Response body was not the expected JSON
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The prompt was rejected by the provider's safety filters
    #[error("prompt blocked: {0}")]
    Blocked(String),

    /// The model answered without any text
    #[error("the model returned no text")]
    EmptyResponse,
}

/// Anything that can turn a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Strip the optional `models/` prefix from a model name
pub fn model_id(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

/// Describe a transport error including its cause chain
///
/// reqwest's own message stops at "error sending request"; the causes say
/// whether the call timed out or the connection was refused.
pub(crate) fn describe_request_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }

    if err.is_timeout() && !message.contains("timed out") {
        message.push_str(" (timed out)");
    } else if err.is_connect() && !message.contains("connect") {
        message.push_str(" (connection failed)");
    }
    message
}

/// Pull the provider's error message out of a Google API error body
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Gemini API client
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create the HTTP client; generation has no overall timeout, only a connect timeout
    fn create_http_client() -> Client {
        Client::builder()
            .user_agent(constants::http::USER_AGENT)
            .connect_timeout(constants::http::CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build HTTP client: {}. Using default client.", e);
                Client::new()
            })
    }

    /// Create a new client from the resolved configuration
    pub fn new(config: &ChronosConfig) -> Self {
        Self {
            http: Self::create_http_client(),
            api_key: config.gemini_api_key.clone(),
            model: config.model.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Model name as configured
    pub fn model(&self) -> &str {
        &self.model
    }

    /// URL of the `generateContent` endpoint for the configured model
    pub fn generate_url(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url,
            constants::ai::API_VERSION,
            model_id(&self.model)
        )
    }

    /// URL of the model listing endpoint
    pub fn models_url(&self) -> String {
        format!("{}/{}/models", self.base_url, constants::ai::API_VERSION)
    }

    /// Build a request with the API key header attached
    pub(crate) fn build_request(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("x-goog-api-key", &self.api_key)
    }

    /// Turn a non-success response into an error
    pub(crate) async fn handle_error_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        error!("Gemini API error response: {} - {}", status, error_text);
        Err(GenerationError::Api {
            status,
            message: api_error_message(&error_text),
        })
    }

    /// Single non-streaming generation call
    ///
    /// Returns the concatenated text parts of the first candidate, trimmed.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}]
            }]
        });

        info!("Calling Gemini model {}", self.model);
        let response = self
            .build_request(reqwest::Method::POST, &self.generate_url())
            .json(&body)
            .send()
            .await?;
        let response = self.handle_error_response(response).await?;

        let text = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        extract_text(parsed)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.generate_content(prompt).await
    }
}

/// Extract the text of the first candidate
fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return match response.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(GenerationError::Blocked(reason)),
            None => Err(GenerationError::EmptyResponse),
        };
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
        .trim()
        .to_string();

    if text.is_empty() {
        debug!(
            "Candidate had no text (finish reason: {:?})",
            candidate.finish_reason
        );
        return Err(GenerationError::EmptyResponse);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn test_config(base_url: String) -> ChronosConfig {
        ChronosConfig::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("test-key".to_string()),
            _ => None,
        })
        .unwrap()
        .with_gemini_base_url(base_url)
    }

    #[test]
    fn test_model_id_strips_prefix() {
        assert_eq!(model_id("models/gemini-2.5-flash"), "gemini-2.5-flash");
        assert_eq!(model_id("gemini-2.5-flash"), "gemini-2.5-flash");
    }

    #[test]
    fn test_generate_url() {
        let config = test_config("https://example.test/".to_string())
            .with_model("models/gemini-2.5-flash");
        let client = GeminiClient::new(&config);
        assert_eq!(
            client.generate_url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.models_url(), "https://example.test/v1beta/models");
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid."}}"#;
        assert_eq!(api_error_message(body), "API key not valid.");
        assert_eq!(api_error_message("  plain text \n"), "plain text");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"text": "  Be right back, "}, {"text": "got to go.\n"}], "role": "model"},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Be right back, got to go.");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(matches!(
            extract_text(response),
            Err(GenerationError::Blocked(reason)) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_extract_text_empty_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();
        assert!(matches!(
            extract_text(response),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_generate_content_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-2.5-flash:generateContent")
                    .header("x-goog-api-key", "test-key")
                    .body_includes("brb gtg ttyl");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "candidates": [{
                            "content": {"parts": [{"text": "Be right back.\n"}], "role": "model"}
                        }]
                    }));
            })
            .await;

        let client = GeminiClient::new(&test_config(server.base_url()));
        let text = client.generate_content("brb gtg ttyl").await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "Be right back.");
    }

    #[tokio::test]
    async fn test_generate_content_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(403).json_body(json!({
                    "error": {"code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED"}
                }));
            })
            .await;

        let client = GeminiClient::new(&test_config(server.base_url()));
        let err = client.generate_content("hi").await.unwrap_err();
        match err {
            GenerationError::Api { status, message } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "Permission denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_content_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("not json");
            })
            .await;

        let client = GeminiClient::new(&test_config(server.base_url()));
        let err = client.generate_content("hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::Decode(_)));
    }

    #[tokio::test]
    async fn test_generate_content_connection_refused() {
        let client = GeminiClient::new(&test_config("http://127.0.0.1:1".to_string()));
        let err = client.generate_content("hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::Http(_)));
        let message = err.to_string();
        assert!(message.starts_with("request failed: error sending request"));
        assert!(
            message.len() > "request failed: error sending request".len(),
            "cause chain missing: {message}"
        );
    }
}
