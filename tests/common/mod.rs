//! Hand-rolled collaborator fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use deepsprint::llm::LLMClient;
use deepsprint::search::{SearchProvider, SourceReader};
use deepsprint::types::{AppError, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

// ============= Mock LLM Client =============

/// LLM fake with a canned default response, optional per-prompt routing,
/// and a record of every prompt it saw.
pub struct ScriptedLLM {
    default_response: String,
    routes: Vec<(String, String)>,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLLM {
    pub fn new(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            routes: Vec::new(),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            default_response: String::new(),
            routes: Vec::new(),
            fail: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Responds with `response` whenever the prompt contains `needle`.
    pub fn with_route(mut self, needle: &str, response: &str) -> Self {
        self.routes.push((needle.to_string(), response.to_string()));
        self
    }

    /// Every prompt this fake has answered, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLM {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(AppError::LLM("scripted LLM failure".to_string()));
        }
        for (needle, response) in &self.routes {
            if prompt.contains(needle) {
                return Ok(response.clone());
            }
        }
        Ok(self.default_response.clone())
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

// ============= Mock Search Provider =============

/// Search fake that routes queries to URL lists by substring match.
pub struct KeyedSearch {
    routes: Vec<(String, Vec<String>)>,
    default: Vec<String>,
    fail: bool,
}

impl KeyedSearch {
    pub fn with_default(urls: Vec<String>) -> Self {
        Self {
            routes: Vec::new(),
            default: urls,
            fail: false,
        }
    }

    /// Returns no results for every query.
    pub fn empty() -> Self {
        Self::with_default(Vec::new())
    }

    /// Errors on every query.
    pub fn failing() -> Self {
        Self {
            routes: Vec::new(),
            default: Vec::new(),
            fail: true,
        }
    }

    /// Returns `urls` whenever the query contains `needle`.
    pub fn with_route(mut self, needle: &str, urls: Vec<String>) -> Self {
        self.routes.push((needle.to_string(), urls));
        self
    }
}

#[async_trait]
impl SearchProvider for KeyedSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        if self.fail {
            return Err(AppError::Search("scripted search outage".to_string()));
        }
        for (needle, urls) in &self.routes {
            if query.contains(needle) {
                return Ok(urls.iter().take(limit).cloned().collect());
            }
        }
        Ok(self.default.iter().take(limit).cloned().collect())
    }
}

// ============= Mock Source Reader =============

/// Reader fake with per-URL failures and delays.
#[derive(Default)]
pub struct FakeReader {
    failures: Vec<String>,
    delays: HashMap<String, Duration>,
}

impl FakeReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors for each of `urls`.
    pub fn failing_for(urls: Vec<String>) -> Self {
        Self {
            failures: urls,
            delays: HashMap::new(),
        }
    }

    /// Sleeps `delay` before answering for `url`.
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }
}

#[async_trait]
impl SourceReader for FakeReader {
    async fn fetch_and_summarize(&self, url: &str) -> Result<String> {
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.iter().any(|u| u == url) {
            return Err(AppError::Scrape(format!("scripted fetch failure for {url}")));
        }
        Ok(format!("Summary of {url}"))
    }
}
