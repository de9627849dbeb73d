//! Single-step execution: search, fetch, summarize, compose, persist.

use crate::artifacts::ArtifactStore;
use crate::llm::LLMClient;
use crate::search::{SearchProvider, SourceReader};
use crate::types::{AppError, KeyEntities, Result, StepReport, StepTask};
use crate::utils::markup::{normalize_markup, strip_code_fences, with_stylesheet};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::time::Instant;

/// Default number of candidate URLs requested from the search provider.
const DEFAULT_RESULT_CAP: usize = 40;
/// Default number of candidates actually visited per step.
const DEFAULT_SOURCES_PER_STEP: usize = 10;

/// Runs one research step to completion.
///
/// The executor owns no per-run state; one instance is cloned into every
/// concurrent step execution of a run.
#[derive(Clone)]
pub struct StepExecutor {
    llm: Arc<dyn LLMClient>,
    search: Arc<dyn SearchProvider>,
    reader: Arc<dyn SourceReader>,
    artifacts: Arc<ArtifactStore>,
    result_cap: usize,
    sources_per_step: usize,
}

impl StepExecutor {
    /// Creates an executor with the default scanning limits.
    pub fn new(
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn SearchProvider>,
        reader: Arc<dyn SourceReader>,
        artifacts: Arc<ArtifactStore>,
    ) -> Self {
        Self {
            llm,
            search,
            reader,
            artifacts,
            result_cap: DEFAULT_RESULT_CAP,
            sources_per_step: DEFAULT_SOURCES_PER_STEP,
        }
    }

    /// Overrides how many candidates are requested and how many are visited.
    pub fn with_limits(mut self, result_cap: usize, sources_per_step: usize) -> Self {
        self.result_cap = result_cap;
        self.sources_per_step = sources_per_step;
        self
    }

    /// Executes one step: resolve the query, gather and summarize sources,
    /// compose the step report, persist it, and report the elapsed time.
    ///
    /// Per-source failures are skipped; the step itself fails only when the
    /// search provider errors, every visited source fails, or the composing
    /// LLM call errors.
    pub async fn run(
        &self,
        run_id: &str,
        task: &StepTask,
        entities: &KeyEntities,
    ) -> Result<StepReport> {
        let started = Instant::now();
        let step = task.display_number();
        let query = task.effective_query(entities);
        tracing::debug!(run_id, step, %query, "executing research step");

        let urls = self.search.search(&query, self.result_cap).await?;
        self.artifacts.append_search_log(run_id, &query, &urls).await;

        // No sources is still a completed step, not a failure.
        if urls.is_empty() {
            tracing::warn!(run_id, step, "no sources found");
            let summary = with_stylesheet(&format!(
                "<p>No sources found for: {}</p>",
                task.step_text
            ));
            self.persist(run_id, step, &summary).await;
            return Ok(StepReport {
                step_index: task.step_index,
                summary,
                elapsed: started.elapsed(),
            });
        }

        let mut gathered = String::new();
        let mut visited = 0usize;
        for url in urls.iter().take(self.sources_per_step) {
            visited += 1;
            match self.reader.fetch_and_summarize(url).await {
                Ok(summary) => {
                    let _ = write!(gathered, "\nSource: {url}\n{summary}\n");
                }
                Err(e) => {
                    tracing::warn!(run_id, step, %url, error = %e, "skipping source");
                    continue;
                }
            }
        }

        if gathered.is_empty() {
            return Err(AppError::Scrape(format!(
                "all {visited} candidate sources failed"
            )));
        }

        let prompt = compose_report_prompt(&task.step_text, entities, &gathered);
        let raw = self.llm.generate(&prompt).await?;
        let report = with_stylesheet(&normalize_markup(&strip_code_fences(&raw)));

        self.persist(run_id, step, &report).await;

        tracing::info!(run_id, step, elapsed = ?started.elapsed(), "step complete");
        Ok(StepReport {
            step_index: task.step_index,
            summary: report,
            elapsed: started.elapsed(),
        })
    }

    async fn persist(&self, run_id: &str, step: usize, report: &str) {
        self.artifacts
            .save(run_id, &step.to_string(), "step_report.html", report)
            .await;
    }
}

// The "no conclusion" instruction is load-bearing: step reports are
// concatenated for final synthesis, which adds the one conclusion itself.
fn compose_report_prompt(step_text: &str, entities: &KeyEntities, gathered: &str) -> String {
    let entity_line = entities.non_empty().collect::<Vec<_>>().join(", ");
    format!(
        "You are a research assistant. You are given a topic and content gathered from \
         multiple websites. Synthesize the information into a verbose, detailed HTML \
         report on the topic. Prefer tables and lists over prose. List source citations \
         at the end. DO NOT HAVE A CONCLUSION section.\n\
         Topic: {step_text}\n\
         Key entities: {entity_line}\n\
         Gathered content:\n{gathered}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeyEntities;

    #[test]
    fn report_prompt_embeds_instruction_entities_and_sources() {
        let entities = KeyEntities {
            entity1: Some("Navan".to_string()),
            entity2: None,
            entity3: Some("Ilan Twig".to_string()),
        };
        let prompt = compose_report_prompt(
            "Find the funding history",
            &entities,
            "\nSource: https://a.example\nsummary\n",
        );

        assert!(prompt.contains("Topic: Find the funding history"));
        assert!(prompt.contains("Key entities: Navan, Ilan Twig"));
        assert!(prompt.contains("Source: https://a.example"));
        assert!(prompt.contains("DO NOT HAVE A CONCLUSION"));
    }
}
