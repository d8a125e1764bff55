use axum::{Json, extract::State, response::IntoResponse};
use bytes::Bytes;
use tracing::error;

use bounty_db::DbError;
use bounty_types::MessageResponse;

use crate::orchestrator::run_blocking;
use crate::{ApiError, AppState, Outcome};

pub async fn health() -> Json<MessageResponse> {
    Json(MessageResponse::new("Active and Strong"))
}

pub async fn list_bounties(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let bounties = run_blocking(state.io_timeout, move || store.list_bounties())
        .await
        .unwrap_or_else(|e| Err(DbError::Unavailable(e)))
        .map_err(|e| {
            error!("Listing bounties: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(bounties))
}

/// POST /bounties. The body is validated by the orchestrator rather than an
/// extractor, so malformed JSON is a 422 like any other invalid input.
pub async fn create_bounty(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let message = match state.orchestrator.create_bounty(&body).await? {
        Outcome::Stored => "Bounty added",
        Outcome::BackedUp => "Bounty backed up",
    };
    Ok(Json(MessageResponse::new(message)))
}

/// POST /bounties/complete
pub async fn complete_bounty(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let message = match state.orchestrator.complete_bounty(&body).await? {
        Outcome::Stored => "Bounty completed",
        Outcome::BackedUp => "Bounty completion backed up",
    };
    Ok(Json(MessageResponse::new(message)))
}
