pub mod api;
pub mod models;

pub use api::{CompleteBounty, FieldError, MessageResponse, NewBounty, NewSubmission};
pub use models::{Bounty, BountyStatus, Submission};
