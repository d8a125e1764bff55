use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::{error, info};

use bounty_db::DbError;

use crate::orchestrator::run_blocking;
use crate::{ApiError, AppState, validate};

pub async fn list_submissions(
    State(state): State<AppState>,
    Path(bounty_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let submissions = run_blocking(state.io_timeout, move || {
        store.submissions_for_bounty(&bounty_id)
    })
    .await
    .unwrap_or_else(|e| Err(DbError::Unavailable(e)))
    .map_err(|e| {
        error!("Listing submissions: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(submissions))
}

/// Submission intake. Not part of the dual-write protocol: no chain check, no backup.
pub async fn create_submission(
    State(state): State<AppState>,
    Path(bounty_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let submission = validate::new_submission(&body)?;

    let store = state.store.clone();
    let created = run_blocking(state.io_timeout, move || {
        store.create_submission(&bounty_id, &submission)
    })
    .await
    .unwrap_or_else(|e| Err(DbError::Unavailable(e)))
    .map_err(|e| match e {
        DbError::NotFound => ApiError::BountyNotFound,
        DbError::Duplicate(_) => ApiError::Conflict("Submission"),
        e => {
            error!("Creating submission: {}", e);
            ApiError::Internal
        }
    })?;

    info!(
        "Submission {} added to bounty {} by {}",
        created.id, created.bounty_id, created.hunter
    );
    Ok((StatusCode::CREATED, Json(created)))
}
