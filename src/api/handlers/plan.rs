use crate::{
    AppState,
    research::ResearchPlanner,
    types::{AppError, PlanRequest, PlanResponse, Result},
};
use axum::{Json, extract::State};

/// Build a research plan for a topic
#[utoipa::path(
    post,
    path = "/api/plan",
    request_body = PlanRequest,
    responses(
        (status = 200, description = "Plan built", body = PlanResponse),
        (status = 400, description = "Invalid input"),
        (status = 502, description = "LLM collaborator failed")
    ),
    tag = "plan"
)]
pub async fn build_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanRequest>,
) -> Result<Json<PlanResponse>> {
    let topic = payload.topic.trim();
    if topic.is_empty() {
        return Err(AppError::InvalidInput(
            "research topic must not be empty".to_string(),
        ));
    }

    let run_id = state.runs.regenerate();
    let planner = ResearchPlanner::new(state.llm.clone());
    let run = planner.build_run(run_id, topic).await?;

    state.artifacts.save_run(&run).await?;
    tracing::info!(run_id = %run.run_id, steps = run.steps.len(), "research plan built");

    Ok(Json(PlanResponse {
        run_id: run.run_id,
        topic: run.topic,
        steps: run.steps,
        entities: run.entities,
    }))
}

/// Rebuild the plan for a topic under a fresh run id
#[utoipa::path(
    post,
    path = "/api/plan/regenerate",
    request_body = PlanRequest,
    responses(
        (status = 200, description = "Plan rebuilt", body = PlanResponse),
        (status = 400, description = "Invalid input"),
        (status = 502, description = "LLM collaborator failed")
    ),
    tag = "plan"
)]
pub async fn regenerate_plan(
    state: State<AppState>,
    payload: Json<PlanRequest>,
) -> Result<Json<PlanResponse>> {
    build_plan(state, payload).await
}
