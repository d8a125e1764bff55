//! Best-effort backup of bounty writes the primary store could not confirm.
//!
//! Every backup is one atomic batch of two commands: the record's fields go
//! into the hash `bounty:{id}`, and the id joins a recovery set so an
//! out-of-band job can find it later.

pub mod error;
pub mod kv;

use bounty_types::{CompleteBounty, NewBounty};
use tracing::debug;

pub use error::BackupError;
pub use kv::{Batch, Command, KvStore};

pub const BOUNTY_KEY_PREFIX: &str = "bounty:";
/// Ids of bounties whose creation was only backed up.
pub const BOUNTY_SET_KEY: &str = "bounties";
/// Ids of bounties whose completion was only backed up.
pub const BOUNTY_COMPLETE_SET_KEY: &str = "bounties:complete";

pub fn bounty_key(bounty_id: &str) -> String {
    format!("{}{}", BOUNTY_KEY_PREFIX, bounty_id)
}

pub trait BackupStore: Send + Sync {
    fn backup_create(&self, bounty: &NewBounty) -> Result<(), BackupError>;

    fn backup_complete(&self, completion: &CompleteBounty) -> Result<(), BackupError>;
}

impl BackupStore for KvStore {
    fn backup_create(&self, bounty: &NewBounty) -> Result<(), BackupError> {
        let mut batch = Batch::new();
        batch
            .hset(
                bounty_key(&bounty.id),
                [
                    ("id", bounty.id.clone()),
                    ("creator", bounty.creator.clone()),
                    ("title", bounty.title.clone()),
                    ("description", bounty.description.clone()),
                    ("amount", bounty.amount.to_string()),
                ],
            )
            .sadd(BOUNTY_SET_KEY, bounty.id.as_str());

        let replies = self.exec(batch)?;
        check_replies(&replies)?;

        debug!("Backed up creation of bounty {}", bounty.id);
        Ok(())
    }

    fn backup_complete(&self, completion: &CompleteBounty) -> Result<(), BackupError> {
        let mut batch = Batch::new();
        batch
            .hset(
                bounty_key(&completion.bounty_id),
                [
                    ("hash", completion.hash.clone()),
                    ("bountyId", completion.bounty_id.clone()),
                    ("submissionId", completion.submission_id.to_string()),
                ],
            )
            .sadd(BOUNTY_COMPLETE_SET_KEY, completion.bounty_id.as_str());

        let replies = self.exec(batch)?;
        check_replies(&replies)?;

        debug!("Backed up completion of bounty {}", completion.bounty_id);
        Ok(())
    }
}

fn check_replies(replies: &[i64]) -> Result<(), BackupError> {
    if replies.len() != 2 {
        return Err(BackupError::MissingReply(replies.len()));
    }
    Ok(())
}
