use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use bounty_types::{FieldError, MessageResponse};

/// Every terminal failure of a request. The `Display` text is the response message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input")]
    Validation(Vec<FieldError>),

    #[error("Bounty not found")]
    BountyNotFound,

    #[error("Payment details not found")]
    PaymentNotFound,

    #[error("Submission not found")]
    SubmissionNotFound,

    #[error("{0} already exists")]
    Conflict(&'static str),

    /// The chain could not be read, so the request cannot be authorized.
    #[error("Could not verify {0} on-chain")]
    ChainUnavailable(&'static str),

    #[error("Could not backup {0} data")]
    BackupFailed(&'static str),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BountyNotFound | Self::SubmissionNotFound => StatusCode::NOT_FOUND,
            Self::PaymentNotFound => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ChainUnavailable(_) | Self::BackupFailed(_) | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let errors = match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        };
        (status, Json(MessageResponse { message, errors })).into_response()
    }
}
