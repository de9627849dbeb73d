//! Topic decomposition: plan, key entities and per-step search terms.
//!
//! Every planner prompt demands a JSON object; models decorate JSON with
//! fences and prose often enough that each response goes through
//! fence-stripping and brace extraction before parsing. Only a missing or
//! unparseable plan is an error; entity and search-term derivation degrade
//! to their fallbacks.

use crate::llm::LLMClient;
use crate::types::{AppError, KeyEntities, PlanStep, ResearchRun, Result};
use crate::utils::markup::{extract_json_object, strip_code_fences};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a [`ResearchRun`] from a free-text topic via the LLM.
pub struct ResearchPlanner {
    llm: Arc<dyn LLMClient>,
}

impl ResearchPlanner {
    /// Creates a planner using `llm`.
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Builds the complete run for `topic`: ordered steps, key entities and
    /// one optimized search term per step.
    pub async fn build_run(&self, run_id: String, topic: &str) -> Result<ResearchRun> {
        let steps = self.build_plan(topic).await?;
        let entities = self.derive_entities(topic).await;

        let mut search_terms = HashMap::new();
        for step in &steps {
            search_terms.insert(step.key.clone(), self.optimize_query(&step.text).await);
        }

        let mut run = ResearchRun::new(run_id, topic.to_string());
        run.entities = entities;
        run.steps = steps;
        run.search_terms = search_terms;
        Ok(run)
    }

    /// Decomposes `topic` into single-line research steps.
    pub async fn build_plan(&self, topic: &str) -> Result<Vec<PlanStep>> {
        let prompt = format!(
            "You are planning a multi-step web research sprint.\n\n\
             Example topic: Create a detailed profile on the startup mindtrip.ai\n\
             Example plan:\n\
             (1) Find general information about mindtrip.ai.\n\
             (2) Find news articles about mindtrip.ai.\n\
             (3) Find the funding history of mindtrip.ai.\n\
             (4) Find the profiles of the founders of mindtrip.ai.\n\
             (5) Find reviews or testimonials about mindtrip.ai.\n\n\
             Create a research plan for: {topic}\n\n\
             Every step is a single line and must carry the context of the main topic.\n\
             Your response must be in JSON format: {{\"step1\": \"<step description>\"}}.\n\
             Your response must start with {{"
        );

        let response = self.llm.generate(&prompt).await?;
        tracing::debug!(topic, "received research plan");

        let steps = parse_plan(&response)?;
        if steps.is_empty() {
            return Err(AppError::LLM("research plan came back empty".to_string()));
        }
        Ok(steps)
    }

    /// Extracts up to three key entities from the topic. Malformed output
    /// degrades to no entities.
    pub async fn derive_entities(&self, topic: &str) -> KeyEntities {
        let prompt = format!(
            "Identify up to three key entities (companies, people, products) in this \
             research topic: {topic}\n\n\
             Your response must be in JSON format: \
             {{\"entity1\": \"<name>\", \"entity2\": \"<name>\", \"entity3\": \"<name>\"}}. \
             Omit entities you cannot identify. Your response must start with {{"
        );

        match self.llm.generate(&prompt).await {
            Ok(response) => parse_entities(&response),
            Err(e) => {
                tracing::warn!(topic, error = %e, "entity derivation failed; continuing without");
                KeyEntities::default()
            }
        }
    }

    /// Rewrites a step instruction into a search-engine query. Any failure
    /// falls back to the raw step text.
    pub async fn optimize_query(&self, step_text: &str) -> String {
        let prompt = format!(
            "Example of research:\n\
             Provide a comprehensive overview of mindtrip.ai, including its founding, \
             mission, and business model.\n\n\
             Example of a search query that maximizes the results for this research:\n\
             (\"mindtrip.ai\" OR \"mindtrip ai\") (founder OR founded OR mission OR \
             \"business model\" OR startup OR funding)\n\n\
             Based on the example above, provide a search query that maximizes the \
             results for this research: {step_text}\n\n\
             Your response must be in JSON format: {{\"query\": \"<your proposed query>\"}}. \
             Your response must start with {{"
        );

        match self.llm.generate(&prompt).await {
            Ok(response) => parse_query(&response).unwrap_or_else(|| {
                tracing::warn!(step_text, "query optimization returned no usable query");
                step_text.to_string()
            }),
            Err(e) => {
                tracing::warn!(step_text, error = %e, "query optimization failed");
                step_text.to_string()
            }
        }
    }
}

fn parse_plan(response: &str) -> Result<Vec<PlanStep>> {
    let cleaned = strip_code_fences(response);
    let payload = extract_json_object(&cleaned)
        .ok_or_else(|| AppError::LLM("plan response contained no JSON object".to_string()))?;

    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| AppError::LLM(format!("invalid plan JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| AppError::LLM("plan JSON was not an object".to_string()))?;

    // Key order is not preserved through JSON maps; order by numeric suffix
    // so step10 lands after step9.
    let mut ranked: Vec<(u64, PlanStep)> = Vec::new();
    for (key, value) in object {
        let Some(text) = value.as_str() else { continue };
        let rank = key
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .parse::<u64>()
            .unwrap_or(u64::MAX);
        ranked.push((
            rank,
            PlanStep {
                key: key.clone(),
                text: text.to_string(),
            },
        ));
    }
    ranked.sort_by_key(|(rank, _)| *rank);

    Ok(ranked.into_iter().map(|(_, step)| step).collect())
}

fn parse_entities(response: &str) -> KeyEntities {
    let cleaned = strip_code_fences(response);
    extract_json_object(&cleaned)
        .and_then(|payload| serde_json::from_str(payload).ok())
        .unwrap_or_default()
}

fn parse_query(response: &str) -> Option<String> {
    let cleaned = strip_code_fences(response);
    let payload = extract_json_object(&cleaned)?;
    let value: serde_json::Value = serde_json::from_str(payload).ok()?;
    let query = value.get("query")?.as_str()?.trim().replace('\'', "\"");
    (!query.is_empty()).then_some(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_fenced_plan_with_prose_around_it() {
        let response = "Here is the plan:\n```json\n{\"step1\": \"Find A\", \"step2\": \"Find B\"}\n```\nGood luck!";
        let steps = parse_plan(response).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].key, "step1");
        assert_eq!(steps[0].text, "Find A");
        assert_eq!(steps[1].key, "step2");
    }

    #[test]
    fn orders_steps_by_numeric_suffix() {
        let response = r#"{"step10": "tenth", "step2": "second", "step1": "first"}"#;
        let steps = parse_plan(response).unwrap();
        let keys: Vec<&str> = steps.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["step1", "step2", "step10"]);
    }

    #[test]
    fn skips_non_string_plan_values() {
        let response = r#"{"step1": "Find A", "step2": 7}"#;
        let steps = parse_plan(response).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].text, "Find A");
    }

    #[test]
    fn rejects_a_plan_without_json() {
        assert!(parse_plan("I could not produce a plan.").is_err());
    }

    #[test]
    fn malformed_entities_degrade_to_default() {
        assert!(parse_entities("not json").is_empty());
        assert!(parse_entities(r#"{"entity1": 42}"#).is_empty());

        let entities = parse_entities(r#"{"entity1": "Navan", "entity2": "Ariel Cohen"}"#);
        assert_eq!(entities.entity1.as_deref(), Some("Navan"));
        assert_eq!(entities.entity2.as_deref(), Some("Ariel Cohen"));
        assert_eq!(entities.entity3, None);
    }

    #[test]
    fn query_parsing_normalizes_quotes_and_rejects_blanks() {
        assert_eq!(
            parse_query(r#"{"query": "'acme' funding"}"#).as_deref(),
            Some("\"acme\" funding")
        );
        assert_eq!(parse_query(r#"{"query": "   "}"#), None);
        assert_eq!(parse_query("no json"), None);
    }
}
