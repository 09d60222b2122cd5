//! Google Custom Search JSON API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::{ContextSearch, SearchError, SearchHit};
use crate::ai::client::api_error_message;
use crate::config::ChronosConfig;
use crate::constants;

/// Response from the Custom Search endpoint; `items` is absent when nothing matched
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

/// Google Custom Search client
pub struct GoogleSearchClient {
    http: Client,
    api_key: Option<String>,
    cx_id: Option<String>,
    url: String,
}

impl GoogleSearchClient {
    fn create_http_client(timeout: Duration) -> Client {
        Client::builder()
            .user_agent(constants::http::USER_AGENT)
            .connect_timeout(constants::http::CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build HTTP client: {}. Using default client.", e);
                Client::new()
            })
    }

    /// Create a new client from the resolved configuration
    pub fn new(config: &ChronosConfig) -> Self {
        Self {
            http: Self::create_http_client(config.search_timeout),
            api_key: config.google_api_key.clone(),
            cx_id: config.google_cx_id.clone(),
            url: config.search_url.clone(),
        }
    }
}

#[async_trait]
impl ContextSearch for GoogleSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SearchError::MissingCredential(constants::env::GOOGLE_API_KEY))?;
        let cx_id = self
            .cx_id
            .as_deref()
            .ok_or(SearchError::MissingCredential(constants::env::GOOGLE_CX_ID))?;

        info!("Searching for context: {}", query);

        let num = constants::search::RESULT_COUNT.to_string();
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("key", api_key),
                ("cx", cx_id),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Search API error response: {}", status);
            return Err(SearchError::Api {
                status,
                message: api_error_message(&body),
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        debug!("Search returned {} items", parsed.items.len());

        Ok(parsed
            .items
            .into_iter()
            .take(constants::search::RESULT_COUNT)
            .collect())
    }
}
