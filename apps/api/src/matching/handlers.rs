//! Axum route handlers for the Matching API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::models::{CandidateInput, RankedResultSet, TopK};
use crate::matching::runs::RunSnapshot;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Multipart upload shared by the synchronous and background endpoints.
///
/// Fields: `job_description` (text), `top_k` (optional, integer or "all"),
/// and one `resumes` file part per candidate.
#[derive(Debug)]
pub struct MatchForm {
    pub job_description: String,
    pub top_k: Option<TopK>,
    pub candidates: Vec<CandidateInput>,
}

#[derive(Debug, Serialize)]
pub struct StartRunResponse {
    pub run_id: Uuid,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matches
///
/// Scores every uploaded resume against the job description and returns the
/// ranked top-K. Blocks until the whole batch is scored.
pub async fn handle_match(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RankedResultSet>, AppError> {
    let form = read_match_form(multipart).await?;
    let top_k = form.top_k.unwrap_or(state.config.default_top_k);

    let ranked = state
        .pipeline
        .run(&form.job_description, form.candidates, top_k)
        .await?;

    Ok(Json(ranked))
}

/// POST /api/v1/runs
///
/// Starts the same scoring in the background and returns a run id to poll.
pub async fn handle_start_run(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<StartRunResponse>), AppError> {
    let form = read_match_form(multipart).await?;
    let top_k = form.top_k.unwrap_or(state.config.default_top_k);

    let run_id = state
        .runs
        .start(
            state.pipeline.clone(),
            form.job_description,
            form.candidates,
            top_k,
        )
        .await?;

    Ok((StatusCode::ACCEPTED, Json(StartRunResponse { run_id })))
}

/// GET /api/v1/runs/:id
///
/// Returns run state and progress; `results` is filled once the run completes.
pub async fn handle_get_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<RunSnapshot>, AppError> {
    state
        .runs
        .snapshot(run_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Run {run_id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart parsing
// ────────────────────────────────────────────────────────────────────────────

async fn read_match_form(mut multipart: Multipart) -> Result<MatchForm, AppError> {
    let mut job_description = String::new();
    let mut top_k = None;
    let mut candidates = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => job_description = field.text().await?,
            "top_k" => {
                let raw = field.text().await?;
                if !raw.trim().is_empty() {
                    top_k = Some(raw.parse::<TopK>()?);
                }
            }
            "resumes" | "resume" => {
                let identifier = field
                    .file_name()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("resume-{}", candidates.len() + 1));
                let content = field.bytes().await?;
                candidates.push(CandidateInput::new(identifier, content));
            }
            other => debug!("Ignoring unknown multipart field '{other}'"),
        }
    }

    Ok(MatchForm {
        job_description,
        top_k,
        candidates,
    })
}
