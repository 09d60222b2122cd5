//! Context search
//!
//! Looks up web sources for the reconstructed text and formats them as
//! numbered citation lines.

pub mod google;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::ai::client::describe_request_error;
use crate::constants;

pub use google::GoogleSearchClient;

/// Line shown when the search succeeded but found nothing
pub const NO_SOURCES_PLACEHOLDER: &str = "(No relevant sources found.)";

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Why a search produced no results list
#[derive(Debug, Error)]
pub enum SearchError {
    /// A required credential is not configured; no request was sent
    #[error("{0} is not configured")]
    MissingCredential(&'static str),

    /// Transport failure, including the request timeout
    #[error("request failed: {}", describe_request_error(.0))]
    Http(reqwest::Error),

    /// Non-success status returned by the API
    #[error("API error: {status} - {message}")]
    Api { status: StatusCode, message: String },

    /// Response body was not the expected JSON
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs carry the API key as a query parameter
        SearchError::Http(err.without_url())
    }
}

/// Anything that can look up sources for a query
#[async_trait]
pub trait ContextSearch: Send + Sync {
    /// Return at most `RESULT_COUNT` hits in provider order
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;
}

/// Format a search outcome as 1 to `RESULT_COUNT` report lines
pub fn source_lines(result: &Result<Vec<SearchHit>, SearchError>) -> Vec<String> {
    match result {
        Ok(hits) if hits.is_empty() => vec![NO_SOURCES_PLACEHOLDER.to_string()],
        Ok(hits) => hits
            .iter()
            .take(constants::search::RESULT_COUNT)
            .enumerate()
            .map(|(i, hit)| format!("{}. {} — {}", i + 1, hit.title, hit.link))
            .collect(),
        Err(e) => vec![search_placeholder(e)],
    }
}

/// Placeholder line shown when the search fails
pub fn search_placeholder(error: &SearchError) -> String {
    format!("(Search error: {})", error)
}

/// Search, logging a failure before handing it back
pub async fn search_sources(
    searcher: &dyn ContextSearch,
    query: &str,
) -> Result<Vec<SearchHit>, SearchError> {
    let result = searcher.search(query).await;
    if let Err(e) = &result {
        warn!("Context search failed: {}", e);
    }
    result
}

/// Search and format, substituting a placeholder on failure
pub async fn search_context(searcher: &dyn ContextSearch, query: &str) -> Vec<String> {
    source_lines(&search_sources(searcher, query).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSearch(Vec<SearchHit>);

    #[async_trait]
    impl ContextSearch for FixedSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, SearchError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSearch;

    #[async_trait]
    impl ContextSearch for BrokenSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, SearchError> {
            Err(SearchError::MissingCredential("GOOGLE_CX_ID"))
        }
    }

    #[test]
    fn test_source_lines_numbered_in_order() {
        let result = Ok(vec![
            SearchHit::new("Title A", "https://a.example"),
            SearchHit::new("Title B", "https://b.example"),
        ]);
        assert_eq!(
            source_lines(&result),
            vec![
                "1. Title A — https://a.example",
                "2. Title B — https://b.example"
            ]
        );
    }

    #[test]
    fn test_source_lines_capped_at_five() {
        let hits: Vec<SearchHit> = (1..=8)
            .map(|i| SearchHit::new(format!("T{i}"), format!("https://{i}.example")))
            .collect();
        let lines = source_lines(&Ok(hits));
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "5. T5 — https://5.example");
    }

    #[test]
    fn test_source_lines_empty() {
        assert_eq!(source_lines(&Ok(Vec::new())), vec![NO_SOURCES_PLACEHOLDER]);
    }

    #[test]
    fn test_source_lines_error() {
        let lines = source_lines(&Err(SearchError::MissingCredential("GOOGLE_API_KEY")));
        assert_eq!(lines, vec!["(Search error: GOOGLE_API_KEY is not configured)"]);
    }

    #[tokio::test]
    async fn test_search_context_never_fails() {
        let lines = search_context(&BrokenSearch, "anything").await;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("(Search error:"));

        let lines = search_context(&FixedSearch(Vec::new()), "anything").await;
        assert_eq!(lines, vec![NO_SOURCES_PLACEHOLDER]);
    }
}
