pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use bounty_types::{Bounty, NewBounty, NewSubmission, Submission};

pub use error::DbError;

/// The primary store. Every operation is blocking; async callers go through
/// `tokio::task::spawn_blocking`.
pub trait BountyStore: Send + Sync {
    /// Insert one bounty. A second insert with the same id is `DbError::Duplicate`.
    fn create_bounty(&self, bounty: &NewBounty) -> Result<Bounty, DbError>;

    /// Mark the bounty and one of its submissions complete, atomically.
    fn complete_bounty(&self, bounty_id: &str, submission_id: i64) -> Result<(), DbError>;

    fn list_bounties(&self) -> Result<Vec<Bounty>, DbError>;

    fn submissions_for_bounty(&self, bounty_id: &str) -> Result<Vec<Submission>, DbError>;

    fn create_submission(
        &self,
        bounty_id: &str,
        submission: &NewSubmission,
    ) -> Result<Submission, DbError>;
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DbError::Unavailable(format!("DB lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Like `with_conn`, but hands out `&mut` so the closure can open a transaction.
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut Connection) -> Result<T, DbError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DbError::Unavailable(format!("DB lock poisoned: {}", e)))?;
        f(&mut conn)
    }
}
