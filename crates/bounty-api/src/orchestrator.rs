//! The dual-write protocol behind `POST /bounties` and `POST /bounties/complete`.
//!
//! Every request runs the same steps in order: validate, authorize against
//! the chain, write the primary store, and only when that write fails for a
//! reason other than the data itself, write the backup store. A completion is
//! authorized only by a payment event emitted by the configured contract.
//! The two stores are never reconciled here.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use bounty_backup::{BackupError, BackupStore};
use bounty_chain::{Address, ChainError, ChainReader};
use bounty_db::{BountyStore, DbError};

use crate::{ApiError, validate};

/// Which store ended up holding the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Stored,
    BackedUp,
}

pub struct Orchestrator {
    chain: Arc<dyn ChainReader>,
    primary: Arc<dyn BountyStore>,
    backup: Arc<dyn BackupStore>,
    contract: Address,
    io_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        primary: Arc<dyn BountyStore>,
        backup: Arc<dyn BackupStore>,
        contract: Address,
        io_timeout: Duration,
    ) -> Self {
        Self {
            chain,
            primary,
            backup,
            contract,
            io_timeout,
        }
    }

    pub async fn create_bounty(&self, body: &[u8]) -> Result<Outcome, ApiError> {
        let bounty = validate::new_bounty(body)?;

        let info = self
            .chain_step("bounty", self.chain.bounty_info(&self.contract, &bounty.id))
            .await?;
        if !info.is_valid() {
            info!("Bounty {} rejected: no valid on-chain record ({:?})", bounty.id, info);
            return Err(ApiError::BountyNotFound);
        }

        let primary = self.primary.clone();
        let record = bounty.clone();
        match run_blocking(self.io_timeout, move || primary.create_bounty(&record))
            .await
            .unwrap_or_else(|e| Err(DbError::Unavailable(e)))
        {
            Ok(created) => {
                info!("Bounty {} added by {}", created.id, created.creator);
                return Ok(Outcome::Stored);
            }
            Err(DbError::Duplicate(id)) => {
                info!("Bounty {} already exists", id);
                return Err(ApiError::Conflict("Bounty"));
            }
            Err(e) => warn!("Primary write of bounty {} failed, backing up: {}", bounty.id, e),
        }

        let backup = self.backup.clone();
        let id = bounty.id.clone();
        match run_blocking(self.io_timeout, move || backup.backup_create(&bounty))
            .await
            .unwrap_or_else(|e| Err(BackupError::Unavailable(e)))
        {
            Ok(()) => {
                info!("Bounty {} backed up", id);
                Ok(Outcome::BackedUp)
            }
            Err(e) => {
                error!("Backup of bounty {} failed: {}", id, e);
                Err(ApiError::BackupFailed("bounty"))
            }
        }
    }

    pub async fn complete_bounty(&self, body: &[u8]) -> Result<Outcome, ApiError> {
        let completion = validate::complete_bounty(body)?;
        let hash = validate::tx_hash(&completion.hash)?;

        let event = self
            .chain_step("payment", self.chain.payment_event(hash))
            .await?;
        if !event
            .as_ref()
            .is_some_and(|emitted| emitted.is_payment_from(&self.contract))
        {
            info!(
                "Completion of bounty {} rejected: no payment in {} ({:?})",
                completion.bounty_id, completion.hash, event
            );
            return Err(ApiError::PaymentNotFound);
        }

        let primary = self.primary.clone();
        let bounty_id = completion.bounty_id.clone();
        let submission_id = completion.submission_id;
        match run_blocking(self.io_timeout, move || {
            primary.complete_bounty(&bounty_id, submission_id)
        })
        .await
        .unwrap_or_else(|e| Err(DbError::Unavailable(e)))
        {
            Ok(()) => {
                info!(
                    "Bounty {} completed by submission {}",
                    completion.bounty_id, completion.submission_id
                );
                return Ok(Outcome::Stored);
            }
            Err(DbError::NotFound) => {
                info!(
                    "Completion targets unknown submission {}/{}",
                    completion.bounty_id, completion.submission_id
                );
                return Err(ApiError::SubmissionNotFound);
            }
            Err(e) => warn!(
                "Primary completion of bounty {} failed, backing up: {}",
                completion.bounty_id, e
            ),
        }

        let backup = self.backup.clone();
        let id = completion.bounty_id.clone();
        match run_blocking(self.io_timeout, move || backup.backup_complete(&completion))
            .await
            .unwrap_or_else(|e| Err(BackupError::Unavailable(e)))
        {
            Ok(()) => {
                info!("Completion of bounty {} backed up", id);
                Ok(Outcome::BackedUp)
            }
            Err(e) => {
                error!("Backup of completion for bounty {} failed: {}", id, e);
                Err(ApiError::BackupFailed("completion"))
            }
        }
    }

    /// Run one chain read under the I/O timeout. Any failure means the request
    /// cannot be authorized.
    async fn chain_step<T>(
        &self,
        what: &'static str,
        read: impl Future<Output = Result<T, ChainError>>,
    ) -> Result<T, ApiError> {
        match tokio::time::timeout(self.io_timeout, read).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Chain read for {} failed: {}", what, e);
                Err(ApiError::ChainUnavailable(what))
            }
            Err(_) => {
                error!("Chain read for {} timed out after {:?}", what, self.io_timeout);
                Err(ApiError::ChainUnavailable(what))
            }
        }
    }
}

/// Run a blocking store call off the async runtime, bounded by `timeout`.
/// The outer `Err` describes why the call produced no result at all.
pub(crate) async fn run_blocking<T, E, F>(timeout: Duration, f: F) -> Result<Result<T, E>, String>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(join)) => Err(format!("store task failed: {}", join)),
        Err(_) => Err(format!("store call timed out after {:?}", timeout)),
    }
}
