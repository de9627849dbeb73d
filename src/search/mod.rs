//! Web search providers.
//!
//! The step executor only needs one operation from a search backend: turn a
//! query into an ordered list of candidate URLs. Two backends are provided:
//! DuckDuckGo via the daedra crate (no credentials required) and Google
//! results via the Serper REST API.

use crate::types::{AppError, Result};
use async_trait::async_trait;

/// Page fetching and summarization.
pub mod reader;

pub use reader::{PageSummarizer, SourceReader};

/// A web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Searches the web for `query`, returning up to `limit` candidate URLs
    /// ordered by the provider's ranking.
    ///
    /// An empty result list is a valid outcome, never an error; providers may
    /// return fewer results than requested.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

/// Web search powered by daedra (DuckDuckGo backend).
pub struct DaedraSearch;

impl DaedraSearch {
    /// Creates the provider.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DaedraSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DaedraSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: limit,
                ..Default::default()
            }),
        };

        match daedra::tools::search::perform_search(&search_args).await {
            Ok(response) => Ok(response
                .data
                .iter()
                .map(|r| r.url.clone())
                .filter(|url| !url.is_empty())
                .collect()),
            Err(e) => Err(AppError::Search(format!("Search failed: {}", e))),
        }
    }
}

/// Web search via the Serper REST API (Google results).
pub struct SerperSearch {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SerperSearch {
    /// Creates a provider posting to `endpoint` with `api_key`.
    pub fn new(api_key: String, endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint,
        }
    }
}

#[async_trait]
impl SearchProvider for SerperSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let payload = serde_json::json!({
            "q": query,
            "num": limit,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Serper request failed: {}", e)))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Serper returned invalid JSON: {}", e)))?;

        // Entries without a link are skipped; an empty organic array is a
        // valid "no results" outcome.
        let mut urls = Vec::new();
        if let Some(results) = body.get("organic").and_then(|v| v.as_array()) {
            for result in results {
                if let Some(link) = result.get("link").and_then(|l| l.as_str()) {
                    if !link.is_empty() {
                        urls.push(link.to_string());
                    }
                }
            }
        } else {
            tracing::warn!(%query, "search response carried no organic results");
        }

        Ok(urls)
    }
}
