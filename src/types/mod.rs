//! Common types shared across the crate: API payloads, the research run data
//! model, step outcomes, and error handling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use utoipa::ToSchema;

// ============= API Request/Response Types =============

/// Request to build a research plan for a topic.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanRequest {
    /// Free-text research topic.
    pub topic: String,
}

/// A freshly built research plan.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    /// Identifier scoping all artifacts of this run.
    pub run_id: String,
    /// The topic the plan was built for.
    pub topic: String,
    /// Ordered research steps.
    pub steps: Vec<PlanStep>,
    /// Key entities extracted from the topic, used to bias every search.
    pub entities: KeyEntities,
}

/// Request to execute a research run.
///
/// Either `steps` (an ad-hoc batch) or `run_id` (resume a persisted run)
/// must be present.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ExecuteRequest {
    /// Run identifier; required when `steps` is absent.
    #[serde(default)]
    pub run_id: Option<String>,
    /// Ordered step instructions to execute.
    #[serde(default)]
    pub steps: Option<Vec<String>>,
    /// Key entities appended to every step's search query.
    #[serde(default)]
    pub entities: Option<KeyEntities>,
    /// Precomputed search query overrides, keyed by step key.
    #[serde(default)]
    pub search_terms: Option<HashMap<String, String>>,
}

// ============= Research Run Types =============

/// One entry of a research plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlanStep {
    /// Logical step name, e.g. `"step3"`.
    pub key: String,
    /// The research instruction.
    pub text: String,
}

/// Up to three key entities used to bias every step's search towards the
/// research subject.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct KeyEntities {
    /// Primary entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity1: Option<String>,
    /// Secondary entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity2: Option<String>,
    /// Tertiary entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity3: Option<String>,
}

impl KeyEntities {
    /// Iterates over the entities that are present and non-blank.
    pub fn non_empty(&self) -> impl Iterator<Item = &str> + '_ {
        [
            self.entity1.as_deref(),
            self.entity2.as_deref(),
            self.entity3.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
    }

    /// True when no entity is set.
    pub fn is_empty(&self) -> bool {
        self.non_empty().next().is_none()
    }
}

/// One end-to-end research execution, scoped by `run_id`.
///
/// Built by the planner (or ad hoc from a list of step instructions),
/// optionally enriched with entities and search-term overrides before
/// execution starts, and immutable while the run executes. Persisted once as
/// `run.json` and re-loadable for resuming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRun {
    /// Short opaque token scoping all artifacts of this run.
    pub run_id: String,
    /// The research topic.
    pub topic: String,
    /// Key entities appended to every step's search query.
    #[serde(default)]
    pub entities: KeyEntities,
    /// Ordered research steps.
    pub steps: Vec<PlanStep>,
    /// Search query overrides, keyed by step key.
    #[serde(default)]
    pub search_terms: HashMap<String, String>,
    /// When the plan was built.
    pub created_at: DateTime<Utc>,
}

impl ResearchRun {
    /// Creates an empty run for `topic`.
    pub fn new(run_id: String, topic: String) -> Self {
        Self {
            run_id,
            topic,
            entities: KeyEntities::default(),
            steps: Vec::new(),
            search_terms: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Creates a run from a plain ordered list of step instructions,
    /// assigning `step1`..`stepN` keys by position.
    pub fn from_steps(run_id: String, steps: Vec<String>) -> Self {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, text)| PlanStep {
                key: format!("step{}", i + 1),
                text,
            })
            .collect();
        Self {
            run_id,
            topic: String::new(),
            entities: KeyEntities::default(),
            steps,
            search_terms: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Normalizes the plan into executable tasks: contiguous 0-based
    /// `step_index`, with each step's search term resolved from the
    /// override map where present.
    pub fn step_tasks(&self) -> Vec<StepTask> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepTask {
                step_index: i,
                step_key: step.key.clone(),
                step_text: step.text.clone(),
                search_term: self.search_terms.get(&step.key).cloned(),
            })
            .collect()
    }
}

/// One unit of research work.
#[derive(Debug, Clone)]
pub struct StepTask {
    /// 0-based position; unique and contiguous within a run.
    pub step_index: usize,
    /// Logical step name, e.g. `"step3"`.
    pub step_key: String,
    /// The research instruction.
    pub step_text: String,
    /// Resolved search query override, if any.
    pub search_term: Option<String>,
}

impl StepTask {
    /// 1-based number used everywhere user-visible (wire records,
    /// accumulator blocks, artifact names).
    pub fn display_number(&self) -> usize {
        self.step_index + 1
    }

    /// The query actually sent to the search provider: the override if
    /// present, else the step text, with non-blank entities appended.
    pub fn effective_query(&self, entities: &KeyEntities) -> String {
        let mut query = self
            .search_term
            .as_deref()
            .unwrap_or(&self.step_text)
            .to_string();
        for entity in entities.non_empty() {
            query.push(' ');
            query.push_str(entity);
        }
        query
    }
}

// ============= Step Outcome Types =============

/// Successful output of one step execution.
#[derive(Debug, Clone)]
pub struct StepReport {
    /// 0-based index of the step this report belongs to.
    pub step_index: usize,
    /// The composed step report (HTML).
    pub summary: String,
    /// Wall-clock duration of the search/fetch/compose pipeline.
    pub elapsed: Duration,
}

/// Outcome of one step execution; exactly one per step, delivered exactly
/// once.
#[derive(Debug, Clone)]
pub enum StepResult {
    /// The step produced a report.
    Completed(StepReport),
    /// The step failed; siblings are unaffected.
    Failed {
        /// 0-based index of the failed step.
        step_index: usize,
        /// The failure message.
        error: String,
    },
}

impl StepResult {
    /// 0-based index of the step this result belongs to.
    pub fn step_index(&self) -> usize {
        match self {
            StepResult::Completed(report) => report.step_index,
            StepResult::Failed { step_index, .. } => *step_index,
        }
    }

    /// 1-based display number.
    pub fn display_number(&self) -> usize {
        self.step_index() + 1
    }

    /// True for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, StepResult::Completed(_))
    }
}

/// One record of the streamed research output: N step results in completion
/// order, then at most one closing record.
#[derive(Debug, Clone)]
pub enum ResearchEvent {
    /// A step finished (success or failure).
    Step(StepResult),
    /// The synthesized final report; closes a run with at least one success.
    Final(String),
    /// A fatal orchestration error; closes the stream.
    Fatal(String),
}

impl ResearchEvent {
    /// The wire representation forwarded verbatim by the HTTP layer, one
    /// JSON object per line.
    pub fn to_record(&self) -> serde_json::Value {
        match self {
            ResearchEvent::Step(StepResult::Completed(report)) => json!({
                "step": report.step_index + 1,
                "result": report.summary,
                "execution_time": format!("{:.2}s", report.elapsed.as_secs_f64()),
            }),
            ResearchEvent::Step(StepResult::Failed { step_index, error }) => json!({
                "step": step_index + 1,
                "error": error,
            }),
            ResearchEvent::Final(report) => json!({ "final_report": report }),
            ResearchEvent::Fatal(error) => json!({ "error": error }),
        }
    }
}

// ============= Error Types =============

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The search provider failed.
    #[error("Search error: {0}")]
    Search(String),

    /// A page could not be fetched or summarized.
    #[error("Scrape error: {0}")]
    Scrape(String),

    /// The LLM collaborator failed or returned unusable output.
    #[error("LLM error: {0}")]
    LLM(String),

    /// Artifact persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal bookkeeping error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Search(msg) | AppError::Scrape(msg) | AppError::LLM(msg) => {
                (axum::http::StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Storage(msg) | AppError::Internal(msg) => {
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_tasks_are_contiguous_and_resolve_search_terms() {
        let mut run = ResearchRun::from_steps(
            "1234".to_string(),
            vec!["Find A".to_string(), "Find B".to_string()],
        );
        run.search_terms
            .insert("step2".to_string(), "\"B\" funding".to_string());

        let tasks = run.step_tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].step_index, 0);
        assert_eq!(tasks[1].step_index, 1);
        assert_eq!(tasks[0].step_key, "step1");
        assert_eq!(tasks[0].search_term, None);
        assert_eq!(tasks[1].search_term, Some("\"B\" funding".to_string()));
    }

    #[test]
    fn effective_query_appends_entities_and_falls_back_to_step_text() {
        let task = StepTask {
            step_index: 0,
            step_key: "step1".to_string(),
            step_text: "Find funding history".to_string(),
            search_term: None,
        };
        let entities = KeyEntities {
            entity1: Some("mindtrip.ai".to_string()),
            entity2: Some("   ".to_string()),
            entity3: None,
        };

        assert_eq!(
            task.effective_query(&entities),
            "Find funding history mindtrip.ai"
        );

        let hinted = StepTask {
            search_term: Some("\"mindtrip\" funding".to_string()),
            ..task
        };
        assert_eq!(
            hinted.effective_query(&KeyEntities::default()),
            "\"mindtrip\" funding"
        );
    }

    #[test]
    fn wire_records_use_one_based_step_numbers() {
        let success = ResearchEvent::Step(StepResult::Completed(StepReport {
            step_index: 0,
            summary: "<p>ok</p>".to_string(),
            elapsed: Duration::from_millis(1500),
        }));
        let record = success.to_record();
        assert_eq!(record["step"], 1);
        assert_eq!(record["result"], "<p>ok</p>");
        assert_eq!(record["execution_time"], "1.50s");

        let failure = ResearchEvent::Step(StepResult::Failed {
            step_index: 2,
            error: "boom".to_string(),
        });
        let record = failure.to_record();
        assert_eq!(record["step"], 3);
        assert_eq!(record["error"], "boom");
        assert!(record.get("result").is_none());

        let report = ResearchEvent::Final("done".to_string());
        assert_eq!(report.to_record()["final_report"], "done");
    }

    #[test]
    fn entities_skip_blank_values() {
        let entities = KeyEntities {
            entity1: Some("".to_string()),
            entity2: Some("Navan".to_string()),
            entity3: None,
        };
        let collected: Vec<&str> = entities.non_empty().collect();
        assert_eq!(collected, vec!["Navan"]);
        assert!(!entities.is_empty());
        assert!(KeyEntities::default().is_empty());
    }
}
