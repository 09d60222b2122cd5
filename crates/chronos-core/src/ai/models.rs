//! Gemini model listing
//!
//! Fetches every model visible to the configured API key, following pagination.

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, info};

use super::client::GeminiClient;

/// Response from the models endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Single model from the Gemini API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-2.5-flash`
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Fetch all available models
pub async fn list_models(client: &GeminiClient) -> Result<Vec<ModelInfo>> {
    let url = client.models_url();
    let mut models = Vec::new();
    let mut page_token: Option<String> = None;

    info!("Fetching models from Gemini...");

    loop {
        let mut request = client.build_request(reqwest::Method::GET, &url);
        if let Some(token) = &page_token {
            request = request.query(&[("pageToken", token.as_str())]);
        }

        let response = request.send().await?;
        let response = client.handle_error_response(response).await?;
        let page: ModelsResponse = response.json().await?;

        debug!("Models page returned {} entries", page.models.len());
        models.extend(page.models);

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!("Gemini returned {} models", models.len());
    Ok(models)
}

/// Render model names on one line, e.g. `Available models: ['models/a', 'models/b']`
pub fn format_model_names(models: &[ModelInfo]) -> String {
    let names: Vec<String> = models.iter().map(|m| format!("'{}'", m.name)).collect();
    format!("Available models: [{}]", names.join(", "))
}
