//! Final report synthesis over the accumulated step output.

use crate::artifacts::ArtifactStore;
use crate::llm::LLMClient;
use crate::types::Result;
use crate::utils::markup::{normalize_markup, strip_code_fences, with_stylesheet};
use std::sync::Arc;

/// Combines the accumulated step output into one executive report.
#[derive(Clone)]
pub struct ReportSynthesizer {
    llm: Arc<dyn LLMClient>,
    artifacts: Arc<ArtifactStore>,
}

impl ReportSynthesizer {
    /// Creates a synthesizer using `llm`, persisting through `artifacts`.
    pub fn new(llm: Arc<dyn LLMClient>, artifacts: Arc<ArtifactStore>) -> Self {
        Self { llm, artifacts }
    }

    /// Produces, persists and returns the final report for the accumulated
    /// step text.
    ///
    /// The input is taken verbatim (it may cover a strict subset of the
    /// run's steps when some failed) and is never mutated, so repeated calls
    /// with the same text produce independent artifacts.
    pub async fn synthesize(&self, run_id: &str, all_results: &str) -> Result<String> {
        tracing::debug!(run_id, "synthesizing final report");

        let prompt = format!(
            "Create a verbose, detailed executive summary report in HTML from the \
             content below. You must include most of the details from the original \
             content. Feel free to restructure it; use tables and lists for the key \
             findings. Have a conclusion section with cross-data insights that ties \
             back to the original research topic.\n\
             Content: {all_results}"
        );

        let raw = self.llm.generate(&prompt).await?;
        let report = with_stylesheet(&normalize_markup(&strip_code_fences(&raw)));

        self.artifacts
            .save(run_id, "final", "final_report.html", &report)
            .await;

        Ok(report)
    }
}
