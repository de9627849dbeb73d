//! Fetch-and-summarize for candidate sources.

use crate::llm::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Pages with less text than this are not worth a summarization call.
const MIN_CONTENT_LEN: usize = 50;

/// Turns one candidate URL into a text summary of its content.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Fetches `url` and returns a detailed summary of its content.
    async fn fetch_and_summarize(&self, url: &str) -> Result<String>;
}

/// Fetches a page via daedra and summarizes its content with the LLM.
pub struct PageSummarizer {
    llm: Arc<dyn LLMClient>,
}

impl PageSummarizer {
    /// Creates a summarizer using `llm` for the summary pass.
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl SourceReader for PageSummarizer {
    async fn fetch_and_summarize(&self, url: &str) -> Result<String> {
        let fetch_args = daedra::VisitPageArgs {
            url: url.to_string(),
            include_images: false,
            selector: None,
        };

        let page = daedra::tools::fetch::fetch_page(&fetch_args)
            .await
            .map_err(|e| AppError::Scrape(format!("Failed to fetch {}: {}", url, e)))?;

        if page.content.trim().len() < MIN_CONTENT_LEN {
            tracing::warn!(%url, "page content too short or empty");
            return Ok(format!(
                "Unable to extract meaningful content from {}. The page might be protected, \
                 require JavaScript, or contain no accessible text content.",
                url
            ));
        }

        let prompt = format!(
            "Here is a text:\n{}\n\nYour goal is to perform this task:\n\
             Create a detailed summary of the provided content. Do not miss out on any \
             fact or detail. Keep links and dates intact.\n-------\n\nAnswer:",
            page.content
        );

        self.llm.generate(&prompt).await
    }
}
