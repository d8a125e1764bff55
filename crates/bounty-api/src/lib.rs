pub mod bounties;
pub mod error;
pub mod orchestrator;
pub mod submissions;
pub mod validate;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};

use bounty_db::BountyStore;

pub use error::ApiError;
pub use orchestrator::{Orchestrator, Outcome};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    /// Read side of the primary store; writes go through the orchestrator.
    pub store: Arc<dyn BountyStore>,
    pub orchestrator: Orchestrator,
    pub io_timeout: Duration,
}

/// All routes of the service, without transport layers (tracing, CORS).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(bounties::health))
        .route(
            "/bounties",
            get(bounties::list_bounties).post(bounties::create_bounty),
        )
        .route("/bounties/complete", post(bounties::complete_bounty))
        .route(
            "/bounty/{bounty_id}/submissions",
            get(submissions::list_submissions).post(submissions::create_submission),
        )
        .with_state(state)
}
