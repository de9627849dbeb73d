use crate::{
    AppState,
    research::{ReportSynthesizer, ResearchCoordinator, StepExecutor},
    types::{AppError, ExecuteRequest, ResearchRun, Result},
};
use axum::{
    Json,
    body::Body,
    extract::State,
    http::header,
    response::Response,
};
use futures::StreamExt;
use std::convert::Infallible;

/// Execute a research run, streaming results as they complete
///
/// The response is `application/x-ndjson`: one JSON object per line, flushed
/// as produced. Step records arrive in completion order (fast steps surface
/// before slow ones), followed by one `final_report` record when at least one
/// step succeeded.
#[utoipa::path(
    post,
    path = "/api/research/execute",
    request_body = ExecuteRequest,
    responses(
        (status = 200, description = "NDJSON stream of step results and the final report"),
        (status = 400, description = "Neither steps nor run_id supplied"),
        (status = 404, description = "Unknown run_id")
    ),
    tag = "research"
)]
pub async fn execute_research(
    State(state): State<AppState>,
    Json(payload): Json<ExecuteRequest>,
) -> Result<Response> {
    let run = resolve_run(&state, payload).await?;
    state.artifacts.save_run(&run).await?;

    let executor = StepExecutor::new(
        state.llm.clone(),
        state.search.clone(),
        state.reader.clone(),
        state.artifacts.clone(),
    )
    .with_limits(
        state.config.search.result_cap,
        state.config.search.sources_per_step,
    );
    let synthesizer = ReportSynthesizer::new(state.llm.clone(), state.artifacts.clone());
    let coordinator = ResearchCoordinator::new(executor, synthesizer)
        .with_step_timeout(state.config.step_timeout());

    let lines = coordinator
        .execute(run)
        .map(|event| Ok::<_, Infallible>(format!("{}\n", event.to_record())));

    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from_stream(lines))
        .map_err(|e| AppError::Internal(format!("failed to build stream response: {e}")))
}

/// An ad-hoc `steps` batch takes priority; otherwise `run_id` re-loads a
/// persisted run. Entities and search-term overrides apply in both cases.
async fn resolve_run(state: &AppState, payload: ExecuteRequest) -> Result<ResearchRun> {
    let mut run = if let Some(steps) = payload.steps {
        let run_id = match payload.run_id {
            Some(id) => {
                state.runs.set(id.clone());
                id
            }
            None => state.runs.current(),
        };
        ResearchRun::from_steps(run_id, steps)
    } else if let Some(run_id) = payload.run_id {
        let run = state.artifacts.load_run(&run_id).await?;
        state.runs.set(run_id);
        run
    } else {
        return Err(AppError::InvalidInput(
            "either steps or run_id is required".to_string(),
        ));
    };

    if let Some(entities) = payload.entities {
        run.entities = entities;
    }
    if let Some(search_terms) = payload.search_terms {
        run.search_terms = search_terms;
    }
    Ok(run)
}
